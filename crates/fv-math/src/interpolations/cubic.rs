//! C² cubic spline interpolation.
//!
//! The spline is parameterised by its second derivatives `Mᵢ` at the nodes,
//! found from the tridiagonal continuity system. On `[xᵢ, xᵢ₊₁]` with
//! `t = x − xᵢ`:
//!
//! `S(x) = yᵢ + bᵢ t + ½Mᵢ t² + (Mᵢ₊₁ − Mᵢ)/(6hᵢ) t³`

use fv_core::{errors::Result, Real};

use super::{check_nodes, locate, Interpolation1D};
use crate::tridiagonal::TridiagonalOperator;

/// End conditions of a [`CubicSpline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplineBoundary {
    /// Zero second derivative at both ends.
    Natural,
    /// Continuous third derivative at the second and penultimate nodes.
    #[default]
    NotAKnot,
}

/// Cubic spline through a set of nodes.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    m: Vec<Real>,
}

impl CubicSpline {
    /// Build a spline with the default (not-a-knot) end conditions.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        Self::with_boundary(xs, ys, SplineBoundary::default())
    }

    /// Build a natural spline.
    pub fn natural(xs: &[Real], ys: &[Real]) -> Result<Self> {
        Self::with_boundary(xs, ys, SplineBoundary::Natural)
    }

    /// Build a spline with explicit end conditions.
    ///
    /// # Errors
    /// Natural splines need 3 nodes, not-a-knot splines 4; abscissae must be
    /// strictly increasing.
    pub fn with_boundary(xs: &[Real], ys: &[Real], boundary: SplineBoundary) -> Result<Self> {
        let min_points = match boundary {
            SplineBoundary::Natural => 3,
            SplineBoundary::NotAKnot => 4,
        };
        check_nodes(xs, ys, min_points)?;

        let n = xs.len();
        let h: Vec<Real> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let slopes: Vec<Real> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();
        // rhs of the interior rows i = 1..n-2
        let rhs: Vec<Real> = (1..n - 1)
            .map(|i| 6.0 * (slopes[i] - slopes[i - 1]))
            .collect();

        let mut op = TridiagonalOperator::new(n - 2);
        for (row, i) in (1..n - 1).enumerate() {
            op.set_row(row, h[i - 1], 2.0 * (h[i - 1] + h[i]), h[i]);
        }

        let m = match boundary {
            SplineBoundary::Natural => {
                let inner = op.solve(&rhs)?;
                let mut m = Vec::with_capacity(n);
                m.push(0.0);
                m.extend(inner);
                m.push(0.0);
                m
            }
            SplineBoundary::NotAKnot => {
                let last = n - 3;
                let (h0, h1) = (h[0], h[1]);
                let (ha, hb) = (h[n - 3], h[n - 2]);
                op.diag[0] = 3.0 * h0 + 2.0 * h1 + h0 * h0 / h1;
                op.upper[0] = h1 - h0 * h0 / h1;
                op.lower[last] = ha - hb * hb / ha;
                op.diag[last] = 2.0 * ha + 3.0 * hb + hb * hb / ha;
                let inner = op.solve(&rhs)?;
                let m1 = inner[0];
                let m2 = inner[1];
                let ma = inner[last - 1];
                let mb = inner[last];
                let mut m = Vec::with_capacity(n);
                m.push(m1 * (1.0 + h0 / h1) - h0 / h1 * m2);
                m.extend(inner);
                m.push(mb * (1.0 + hb / ha) - hb / ha * ma);
                m
            }
        };

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            m,
        })
    }

    fn segment(&self, x: Real) -> (usize, Real, Real, Real) {
        let i = locate(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let t = x - self.xs[i];
        let b = (self.ys[i + 1] - self.ys[i]) / h - h * (2.0 * self.m[i] + self.m[i + 1]) / 6.0;
        (i, h, t, b)
    }

    /// First derivative `S'(x)`.
    pub fn derivative(&self, x: Real) -> Real {
        let (i, h, t, b) = self.segment(x);
        b + self.m[i] * t + (self.m[i + 1] - self.m[i]) / (2.0 * h) * t * t
    }

    /// Second derivative `S''(x)`.
    pub fn second_derivative(&self, x: Real) -> Real {
        let (i, h, t, _) = self.segment(x);
        self.m[i] + (self.m[i + 1] - self.m[i]) * t / h
    }
}

impl Interpolation1D for CubicSpline {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn value(&self, x: Real) -> Real {
        let (i, h, t, b) = self.segment(x);
        self.ys[i] + t * (b + t * (0.5 * self.m[i] + t * (self.m[i + 1] - self.m[i]) / (6.0 * h)))
    }
}
