//! Homogeneous Poisson counting process.

use fv_core::{ensure, errors::Result, Real, Time};

/// Poisson process with constant intensity `λ`: `N(t) ~ Poisson(λt)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoissonProcess {
    intensity: Real,
}

impl PoissonProcess {
    /// Create a process with intensity `λ ≥ 0`.
    pub fn new(intensity: Real) -> Result<Self> {
        ensure!(
            intensity >= 0.0 && intensity.is_finite(),
            "intensity must be non-negative, got {intensity}"
        );
        Ok(Self { intensity })
    }

    /// Jump intensity.
    pub fn intensity(&self) -> Real {
        self.intensity
    }

    /// Expected number of jumps over `t`.
    pub fn expected_count(&self, t: Time) -> Real {
        self.intensity * t
    }
}
