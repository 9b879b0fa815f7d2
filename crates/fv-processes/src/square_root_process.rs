//! Square-root (Cox-Ingersoll-Ross) process.
//!
//! ```text
//! dX = κ(θ − X) dt + σ √X dW
//! ```
//!
//! The Euler scheme can step below zero. Paths are kept admissible by
//! reflection: a negative value `x` is replaced by `−x`.

use crate::stochastic_process::StochasticProcess1D;
use fv_core::{ensure, errors::Result, Real, Time};

/// A square-root (CIR) process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareRootProcess {
    x0: Real,
    speed: Real,
    mean: Real,
    volatility: Real,
}

impl SquareRootProcess {
    /// Create a new square-root process.
    ///
    /// * `speed` — mean-reversion speed `κ`
    /// * `mean` — long-run level `θ`
    /// * `volatility` — volatility `σ`
    /// * `x0` — initial value
    pub fn new(speed: Real, mean: Real, volatility: Real, x0: Real) -> Result<Self> {
        ensure!(x0 >= 0.0, "initial value must be non-negative, got {x0}");
        ensure!(speed >= 0.0, "mean-reversion speed must be non-negative, got {speed}");
        ensure!(mean >= 0.0, "long-run level must be non-negative, got {mean}");
        ensure!(volatility >= 0.0, "volatility must be non-negative, got {volatility}");
        Ok(Self {
            x0,
            speed,
            mean,
            volatility,
        })
    }

    /// Mean-reversion speed.
    pub fn speed(&self) -> Real {
        self.speed
    }

    /// Long-run mean level.
    pub fn mean(&self) -> Real {
        self.mean
    }

    /// Volatility.
    pub fn volatility(&self) -> Real {
        self.volatility
    }

    /// Feller condition `2κθ ≥ σ²`: when it holds, zero is unattainable in
    /// continuous time.
    pub fn feller_condition(&self) -> bool {
        2.0 * self.speed * self.mean >= self.volatility * self.volatility
    }

    /// Exact conditional mean `E[X(t)] = θ + (x₀ − θ) e^{−κt}`.
    pub fn expected_value(&self, t: Time) -> Real {
        self.mean + (self.x0 - self.mean) * (-self.speed * t).exp()
    }

    /// Euler step followed by reflection at zero.
    ///
    /// Returns the new value and whether the raw step went negative.
    pub fn evolve_reflected(&self, x: Real, dt: Time, dw: Real) -> (Real, bool) {
        reflect(self.evolve_1d(0.0, x, dt, dw))
    }
}

/// Reflect a value at zero: `x → |x|`, flagging whether it was negative.
#[inline]
pub fn reflect(x: Real) -> (Real, bool) {
    if x < 0.0 {
        (-x, true)
    } else {
        (x, false)
    }
}

impl StochasticProcess1D for SquareRootProcess {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift_1d(&self, _t: Time, x: Real) -> Real {
        self.speed * (self.mean - x)
    }

    fn diffusion_1d(&self, _t: Time, x: Real) -> Real {
        self.volatility * x.max(0.0).sqrt()
    }
}
