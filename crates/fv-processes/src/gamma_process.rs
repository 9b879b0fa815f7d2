//! Gamma process.
//!
//! A pure-jump increasing Lévy process with independent gamma increments.
//! With mean rate `μ` and variance rate `ν`, the increment over `Δt` is
//! Gamma(shape `Δt μ²/ν`, scale `ν/μ`), so `E[G(t)] = μt` and
//! `Var[G(t)] = νt`.

use fv_core::{ensure, errors::Result, Real, Time};
use fv_math::random_numbers::GammaSampler;

/// A gamma process parameterised by its mean and variance per unit time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GammaProcess {
    mean_rate: Real,
    variance_rate: Real,
}

impl GammaProcess {
    /// Create a gamma process with `E[G(1)] = mean_rate` and
    /// `Var[G(1)] = variance_rate`.
    pub fn new(mean_rate: Real, variance_rate: Real) -> Result<Self> {
        ensure!(
            mean_rate > 0.0 && mean_rate.is_finite(),
            "gamma process mean rate must be positive, got {mean_rate}"
        );
        ensure!(
            variance_rate > 0.0 && variance_rate.is_finite(),
            "gamma process variance rate must be positive, got {variance_rate}"
        );
        Ok(Self {
            mean_rate,
            variance_rate,
        })
    }

    /// Gamma process whose unit-time increment is Gamma(shape `α`, rate `λ`).
    pub fn from_shape_rate(alpha: Real, lambda: Real) -> Result<Self> {
        ensure!(alpha > 0.0, "shape must be positive, got {alpha}");
        ensure!(lambda > 0.0, "rate must be positive, got {lambda}");
        Self::new(alpha / lambda, alpha / (lambda * lambda))
    }

    /// Mean per unit time.
    pub fn mean_rate(&self) -> Real {
        self.mean_rate
    }

    /// Variance per unit time.
    pub fn variance_rate(&self) -> Real {
        self.variance_rate
    }

    /// Shape and scale of the increment over `dt`.
    pub fn increment_shape_scale(&self, dt: Time) -> (Real, Real) {
        (
            dt * self.mean_rate * self.mean_rate / self.variance_rate,
            self.variance_rate / self.mean_rate,
        )
    }

    /// Sampler for increments over `dt`.
    pub fn increment_sampler(&self, dt: Time) -> Result<GammaSampler> {
        let (shape, scale) = self.increment_shape_scale(dt);
        GammaSampler::new(shape, scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn shape_scale_reproduce_moments() {
        let g = GammaProcess::new(2.0, 0.5).unwrap();
        let (k, theta) = g.increment_shape_scale(0.25);
        assert_abs_diff_eq!(k * theta, 2.0 * 0.25, epsilon = 1e-15);
        assert_abs_diff_eq!(k * theta * theta, 0.5 * 0.25, epsilon = 1e-15);
    }

    #[test]
    fn shape_rate_parameterisation() {
        let g = GammaProcess::from_shape_rate(1.18, 10.57).unwrap();
        let (k, theta) = g.increment_shape_scale(0.1);
        assert_abs_diff_eq!(k, 0.118, epsilon = 1e-12);
        assert_abs_diff_eq!(theta, 1.0 / 10.57, epsilon = 1e-12);
    }

    #[test]
    fn rejects_degenerate_rates() {
        assert!(GammaProcess::new(0.0, 1.0).is_err());
        assert!(GammaProcess::new(1.0, 0.0).is_err());
    }
}
