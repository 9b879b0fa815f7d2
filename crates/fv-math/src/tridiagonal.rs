//! Tridiagonal operators and the Thomas algorithm.
//!
//! Shared by the cubic-spline construction and the implicit finite
//! difference schemes.

use fv_core::{ensure, errors::Result, Real};

/// A tridiagonal matrix stored as three bands.
///
/// Row `i` reads `lower[i]·x[i−1] + diag[i]·x[i] + upper[i]·x[i+1]`;
/// `lower[0]` and `upper[n−1]` are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct TridiagonalOperator {
    /// Sub-diagonal (index 0 unused).
    pub lower: Vec<Real>,
    /// Main diagonal.
    pub diag: Vec<Real>,
    /// Super-diagonal (last index unused).
    pub upper: Vec<Real>,
}

impl TridiagonalOperator {
    /// Create a zero operator of size `n`.
    pub fn new(n: usize) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
        }
    }

    /// The identity operator of size `n`.
    pub fn identity(n: usize) -> Self {
        let mut op = Self::new(n);
        op.diag.fill(1.0);
        op
    }

    /// Number of rows.
    pub fn size(&self) -> usize {
        self.diag.len()
    }

    /// Set row `i` to `(lower, diag, upper)`.
    pub fn set_row(&mut self, i: usize, lower: Real, diag: Real, upper: Real) {
        self.lower[i] = lower;
        self.diag[i] = diag;
        self.upper[i] = upper;
    }

    /// Apply the operator: `y = A · x`.
    pub fn apply(&self, x: &[Real]) -> Result<Vec<Real>> {
        let n = self.size();
        ensure!(x.len() == n, "vector length {} does not match operator size {n}", x.len());
        if n == 1 {
            return Ok(vec![self.diag[0] * x[0]]);
        }
        let mut y = vec![0.0; n];
        y[0] = self.diag[0] * x[0] + self.upper[0] * x[1];
        for i in 1..n - 1 {
            y[i] = self.lower[i] * x[i - 1] + self.diag[i] * x[i] + self.upper[i] * x[i + 1];
        }
        y[n - 1] = self.lower[n - 1] * x[n - 2] + self.diag[n - 1] * x[n - 1];
        Ok(y)
    }

    /// Solve `A · x = rhs` with the Thomas algorithm.
    ///
    /// # Errors
    /// Fails on a size mismatch or a zero pivot.
    pub fn solve(&self, rhs: &[Real]) -> Result<Vec<Real>> {
        let n = self.size();
        ensure!(n > 0, "empty tridiagonal system");
        ensure!(rhs.len() == n, "rhs length {} does not match operator size {n}", rhs.len());

        let mut c_prime = vec![0.0; n];
        let mut d_prime = vec![0.0; n];

        ensure!(self.diag[0] != 0.0, "zero pivot in row 0");
        c_prime[0] = self.upper[0] / self.diag[0];
        d_prime[0] = rhs[0] / self.diag[0];
        for i in 1..n {
            let m = self.diag[i] - self.lower[i] * c_prime[i - 1];
            ensure!(m != 0.0, "zero pivot in row {i}");
            c_prime[i] = if i < n - 1 { self.upper[i] / m } else { 0.0 };
            d_prime[i] = (rhs[i] - self.lower[i] * d_prime[i - 1]) / m;
        }

        let mut x = d_prime;
        for i in (0..n - 1).rev() {
            x[i] -= c_prime[i] * x[i + 1];
        }
        Ok(x)
    }
}
