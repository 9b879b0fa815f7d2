//! Black-Scholes-Merton process with flat rates.
//!
//! ```text
//! dS = (r − q) S dt + σ S dW
//! ```

use crate::stochastic_process::StochasticProcess1D;
use fv_core::{ensure, errors::Result, DiscountFactor, Rate, Real, Time, Volatility};

/// Geometric Brownian motion under the risk-neutral measure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholesMertonProcess {
    s0: Real,
    r: Rate,
    q: Rate,
    sigma: Volatility,
}

impl BlackScholesMertonProcess {
    /// Create a process with spot `s0`, risk-free rate `r`, dividend yield
    /// `q` and volatility `sigma`.
    pub fn new(s0: Real, r: Rate, q: Rate, sigma: Volatility) -> Result<Self> {
        ensure!(s0 > 0.0 && s0.is_finite(), "spot must be positive, got {s0}");
        ensure!(r.is_finite() && q.is_finite(), "rates must be finite");
        ensure!(
            sigma >= 0.0 && sigma.is_finite(),
            "volatility must be non-negative, got {sigma}"
        );
        Ok(Self { s0, r, q, sigma })
    }

    /// Spot price.
    pub fn s0(&self) -> Real {
        self.s0
    }

    /// Risk-free rate.
    pub fn risk_free_rate(&self) -> Rate {
        self.r
    }

    /// Dividend yield.
    pub fn dividend_yield(&self) -> Rate {
        self.q
    }

    /// Volatility.
    pub fn volatility(&self) -> Volatility {
        self.sigma
    }

    /// Same market with a different spot.
    pub fn with_spot(&self, s0: Real) -> Result<Self> {
        Self::new(s0, self.r, self.q, self.sigma)
    }

    /// Same market with a different volatility.
    pub fn with_volatility(&self, sigma: Volatility) -> Result<Self> {
        Self::new(self.s0, self.r, self.q, sigma)
    }

    /// Risk-free discount factor `e^{−rT}`.
    pub fn discount(&self, t: Time) -> DiscountFactor {
        (-self.r * t).exp()
    }

    /// Dividend discount factor `e^{−qT}`.
    pub fn dividend_discount(&self, t: Time) -> DiscountFactor {
        (-self.q * t).exp()
    }

    /// Forward price `S₀ e^{(r−q)T}`.
    pub fn forward(&self, t: Time) -> Real {
        self.s0 * ((self.r - self.q) * t).exp()
    }

    /// Exact lognormal step:
    /// `S e^{(r − q − σ²/2)Δt + σ√Δt · dw}`.
    pub fn evolve_exact(&self, s: Real, dt: Time, dw: Real) -> Real {
        s * ((self.r - self.q - 0.5 * self.sigma * self.sigma) * dt
            + self.sigma * dt.sqrt() * dw)
            .exp()
    }
}

impl StochasticProcess1D for BlackScholesMertonProcess {
    fn x0(&self) -> Real {
        self.s0
    }

    fn drift_1d(&self, _t: Time, x: Real) -> Real {
        (self.r - self.q) * x
    }

    fn diffusion_1d(&self, _t: Time, x: Real) -> Real {
        self.sigma * x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn euler_step_matches_multiplicative_form() {
        let p = BlackScholesMertonProcess::new(100.0, 0.06, 0.02, 0.4).unwrap();
        let dt: f64 = 0.01;
        let x = 0.7;
        let expected = 100.0 * (1.0 + 0.04 * dt + 0.4 * dt.sqrt() * x);
        assert_abs_diff_eq!(p.evolve_1d(0.0, 100.0, dt, x), expected, epsilon = 1e-12);
    }

    #[test]
    fn exact_step_with_zero_shock() {
        let p = BlackScholesMertonProcess::new(100.0, 0.05, 0.0, 0.2).unwrap();
        let s = p.evolve_exact(100.0, 1.0, 0.0);
        assert_abs_diff_eq!(s, 100.0 * (0.05 - 0.02_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn forward_and_discounts() {
        let p = BlackScholesMertonProcess::new(90.0, 0.05, 0.02, 0.2).unwrap();
        assert_abs_diff_eq!(p.forward(3.0), 90.0 * 0.09_f64.exp(), epsilon = 1e-12);
        assert_abs_diff_eq!(p.discount(2.0), (-0.1_f64).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(p.dividend_discount(2.0), (-0.04_f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn invalid_parameters() {
        assert!(BlackScholesMertonProcess::new(0.0, 0.05, 0.0, 0.2).is_err());
        assert!(BlackScholesMertonProcess::new(100.0, 0.05, 0.0, -0.2).is_err());
        assert!(BlackScholesMertonProcess::new(100.0, f64::NAN, 0.0, 0.2).is_err());
    }
}
