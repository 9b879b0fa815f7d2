//! Linear least-squares regression on a set of basis functions.
//!
//! Solves `y ≈ A β` where `A[i][j] = φⱼ(xᵢ)` through an SVD of the design
//! matrix, dropping singular values below `max(n, m) · ε · s_max`. Used by
//! the Longstaff-Schwartz regression of continuation values.

use fv_core::{
    ensure,
    errors::{Error, Result},
    Real,
};
use nalgebra::{DMatrix, DVector};

/// Fitted linear least-squares model.
#[derive(Debug, Clone)]
pub struct LinearLeastSquaresRegression {
    coefficients: DVector<Real>,
    residuals: DVector<Real>,
}

impl LinearLeastSquaresRegression {
    /// Fit `y` on the basis functions evaluated at `x`.
    pub fn new<F>(x: &[Real], y: &[Real], basis: &[F]) -> Result<Self>
    where
        F: Fn(Real) -> Real,
    {
        let n = x.len();
        let m = basis.len();
        ensure!(n == y.len(), "x and y must have the same length");
        ensure!(m > 0, "at least one basis function is required");
        ensure!(n >= m, "more basis functions ({m}) than observations ({n})");

        let a = DMatrix::from_fn(n, m, |i, j| basis[j](x[i]));
        Self::from_design_matrix(a, y)
    }

    /// Fit the model given a pre-built `n × m` design matrix.
    pub fn from_design_matrix(a: DMatrix<Real>, y: &[Real]) -> Result<Self> {
        let (n, m) = a.shape();
        ensure!(y.len() == n, "y length must equal number of rows of A");

        let y = DVector::from_column_slice(y);
        let svd = a.clone().svd(true, true);
        let s_max = svd.singular_values.max();
        let eps = n.max(m) as Real * f64::EPSILON * s_max;
        let coefficients = svd
            .solve(&y, eps)
            .map_err(|e| Error::Runtime(format!("least-squares solve failed: {e}")))?;
        let residuals = &y - &a * &coefficients;

        Ok(Self {
            coefficients,
            residuals,
        })
    }

    /// Fitted coefficients β.
    pub fn coefficients(&self) -> &[Real] {
        self.coefficients.as_slice()
    }

    /// Residuals `y − A β`.
    pub fn residuals(&self) -> &[Real] {
        self.residuals.as_slice()
    }

    /// Evaluate `Σ βⱼ φⱼ(x)`.
    pub fn predict<F>(&self, x: Real, basis: &[F]) -> Real
    where
        F: Fn(Real) -> Real,
    {
        self.coefficients
            .iter()
            .zip(basis)
            .map(|(b, phi)| b * phi(x))
            .sum()
    }

    /// R² statistic.
    pub fn r_squared(&self, y: &[Real]) -> Real {
        let n = y.len();
        if n == 0 {
            return 0.0;
        }
        let y_mean: Real = y.iter().sum::<Real>() / n as Real;
        let ss_tot: Real = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();
        let ss_res: Real = self.residuals.iter().map(|r| r * r).sum();
        if ss_tot == 0.0 {
            1.0
        } else {
            1.0 - ss_res / ss_tot
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    type Basis = Box<dyn Fn(Real) -> Real>;

    #[test]
    fn quadratic_fit() {
        let x: Vec<Real> = (0..30).map(|i| -5.0 + i as Real * 0.5).collect();
        let y: Vec<Real> = x.iter().map(|&xi| 1.0 - 2.0 * xi + 0.5 * xi * xi).collect();
        let basis: Vec<Basis> = vec![Box::new(|_| 1.0), Box::new(|x| x), Box::new(|x| x * x)];

        let reg = LinearLeastSquaresRegression::new(&x, &y, &basis).unwrap();
        let c = reg.coefficients();
        assert_abs_diff_eq!(c[0], 1.0, epsilon = 1e-8);
        assert_abs_diff_eq!(c[1], -2.0, epsilon = 1e-8);
        assert_abs_diff_eq!(c[2], 0.5, epsilon = 1e-8);
        assert_abs_diff_eq!(reg.predict(1.5, &basis), 1.0 - 3.0 + 1.125, epsilon = 1e-8);
        assert_abs_diff_eq!(reg.r_squared(&y), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn noisy_linear_fit() {
        let x: Vec<Real> = (0..100).map(|i| i as Real * 0.1).collect();
        let noise = [0.01, -0.02, 0.015, -0.005, 0.03, -0.01, 0.02, -0.03, 0.005, 0.01];
        let y: Vec<Real> = x
            .iter()
            .enumerate()
            .map(|(i, &xi)| 1.0 + 2.0 * xi + noise[i % noise.len()])
            .collect();
        let basis: Vec<Basis> = vec![Box::new(|_| 1.0), Box::new(|x| x)];

        let reg = LinearLeastSquaresRegression::new(&x, &y, &basis).unwrap();
        assert_abs_diff_eq!(reg.coefficients()[0], 1.0, epsilon = 0.1);
        assert_abs_diff_eq!(reg.coefficients()[1], 2.0, epsilon = 0.01);
    }

    #[test]
    fn collinear_basis_does_not_blow_up() {
        // x and 2x span the same space; the pseudo-inverse picks the
        // minimum-norm solution
        let x: Vec<Real> = (1..10).map(|i| i as Real).collect();
        let y: Vec<Real> = x.iter().map(|&xi| 5.0 * xi).collect();
        let basis: Vec<Basis> = vec![Box::new(|x| x), Box::new(|x| 2.0 * x)];
        let reg = LinearLeastSquaresRegression::new(&x, &y, &basis).unwrap();
        assert_abs_diff_eq!(reg.predict(3.0, &basis), 15.0, epsilon = 1e-8);
    }

    #[test]
    fn too_few_observations() {
        let basis: Vec<Basis> = vec![Box::new(|_| 1.0), Box::new(|x| x)];
        assert!(LinearLeastSquaresRegression::new(&[1.0], &[2.0], &basis).is_err());
    }
}
