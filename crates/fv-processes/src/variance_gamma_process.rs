//! Variance Gamma process.
//!
//! ```text
//! X(t) = θ G(t) + σ W(G(t))
//! ln S(t) = ln S(0) + (r − q + ω) t + X(t)
//! ```
//!
//! `G` is a gamma subordinator with unit mean rate and variance rate `ν`;
//! `ω = ln(1 − θν − σ²ν/2)/ν` makes the discounted price a martingale.
//! Equivalently `X = G⁺ − G⁻`, the difference of two independent gamma
//! processes with mean rates `μ± = ½√(θ² + 2σ²/ν) ± ½θ` and variance rates
//! `μ±² ν`.

use crate::gamma_process::GammaProcess;
use fv_core::{ensure, errors::Result, Rate, Real};

/// Variance Gamma process for asset pricing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarianceGammaProcess {
    s0: Real,
    r: Rate,
    q: Rate,
    sigma: Real,
    nu: Real,
    theta: Real,
}

impl VarianceGammaProcess {
    /// Create a new Variance Gamma process.
    pub fn new(s0: Real, r: Rate, q: Rate, sigma: Real, nu: Real, theta: Real) -> Result<Self> {
        ensure!(s0 > 0.0, "spot must be positive, got {s0}");
        ensure!(sigma > 0.0, "sigma must be positive, got {sigma}");
        ensure!(nu > 0.0, "nu must be positive, got {nu}");
        ensure!(
            1.0 - theta * nu - 0.5 * sigma * sigma * nu > 0.0,
            "martingale correction undefined: 1 − θν − σ²ν/2 must be positive"
        );
        Ok(Self {
            s0,
            r,
            q,
            sigma,
            nu,
            theta,
        })
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

    /// Volatility of the subordinated Brownian motion.
    pub fn sigma(&self) -> Real {
        self.sigma
    }

    /// Variance rate of the gamma time change.
    pub fn nu(&self) -> Real {
        self.nu
    }

    /// Drift of the subordinated Brownian motion.
    pub fn theta(&self) -> Real {
        self.theta
    }

    /// Martingale correction `ω = ln(1 − θν − σ²ν/2)/ν`.
    pub fn omega(&self) -> Real {
        (1.0 - self.theta * self.nu - 0.5 * self.sigma * self.sigma * self.nu).ln() / self.nu
    }

    /// Upward and downward gamma legs `(G⁺, G⁻)` with `X = G⁺ − G⁻`.
    pub fn gamma_legs(&self) -> Result<(GammaProcess, GammaProcess)> {
        let root = 0.5 * (self.theta * self.theta + 2.0 * self.sigma * self.sigma / self.nu).sqrt();
        let mu_p = root + 0.5 * self.theta;
        let mu_m = root - 0.5 * self.theta;
        Ok((
            GammaProcess::new(mu_p, mu_p * mu_p * self.nu)?,
            GammaProcess::new(mu_m, mu_m * mu_m * self.nu)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn vg() -> VarianceGammaProcess {
        VarianceGammaProcess::new(100.0, 0.06, 0.0, 0.4, 0.2, 0.05).unwrap()
    }

    #[test]
    fn omega_value() {
        let expected = (1.0 - 0.05 * 0.2 - 0.5 * 0.16 * 0.2_f64).ln() / 0.2;
        assert_abs_diff_eq!(vg().omega(), expected, epsilon = 1e-15);
    }

    #[test]
    fn legs_reproduce_vg_moments() {
        let p = vg();
        let (up, down) = p.gamma_legs().unwrap();
        // E[X(1)] = θ, Var[X(1)] = σ² + θ²ν
        assert_abs_diff_eq!(up.mean_rate() - down.mean_rate(), 0.05, epsilon = 1e-14);
        assert_abs_diff_eq!(
            up.variance_rate() + down.variance_rate(),
            0.16 + 0.0025 * 0.2,
            epsilon = 1e-14
        );
    }

    #[test]
    fn rejects_undefined_correction() {
        assert!(VarianceGammaProcess::new(100.0, 0.05, 0.0, 2.0, 1.0, 0.5).is_err());
    }
}
