//! Heston stochastic volatility process.
//!
//! ```text
//! dS = (r − q) S dt + √v S dW₁
//! dv = κ(θ − v) dt + σ √v dW₂
//! dW₁ dW₂ = ρ dt
//! ```
//!
//! The joint state `(S, v)` is advanced with a multiplicative Euler step on
//! the spot and an Euler or Milstein step on the variance, reflected at zero.

use crate::square_root_process::{reflect, SquareRootProcess};
use fv_core::{ensure, errors::Result, Rate, Real, Time};
use serde::{Deserialize, Serialize};

/// Discretisation of the variance equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarianceScheme {
    /// `v + κ(θ − v)Δt + σ√(vΔt) z`
    #[default]
    Euler,
    /// Euler plus the Milstein correction `¼σ²(z² − 1)Δt`.
    Milstein,
}

/// Outcome of one joint step of spot and variance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HestonStep {
    /// New spot.
    pub s: Real,
    /// New (reflected) variance.
    pub v: Real,
    /// Whether the raw variance step went negative.
    pub reflected: bool,
}

/// The Heston stochastic volatility process with flat rates.
///
/// * `v0`    — initial variance
/// * `kappa` — mean-reversion speed of variance
/// * `theta` — long-run variance level
/// * `sigma` — volatility of variance
/// * `rho`   — correlation between the two Brownian motions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HestonProcess {
    s0: Real,
    v0: Real,
    r: Rate,
    q: Rate,
    kappa: Real,
    theta: Real,
    sigma: Real,
    rho: Real,
}

impl HestonProcess {
    /// Create a new Heston process.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        s0: Real,
        v0: Real,
        r: Rate,
        q: Rate,
        kappa: Real,
        theta: Real,
        sigma: Real,
        rho: Real,
    ) -> Result<Self> {
        ensure!(s0 > 0.0, "spot must be positive, got {s0}");
        ensure!(
            (-1.0..=1.0).contains(&rho),
            "correlation ρ must be in [-1, 1], got {rho}"
        );
        ensure!(v0 >= 0.0, "initial variance must be non-negative, got {v0}");
        ensure!(kappa >= 0.0, "mean reversion speed must be non-negative, got {kappa}");
        ensure!(theta >= 0.0, "long-run variance must be non-negative, got {theta}");
        ensure!(sigma >= 0.0, "vol-of-vol must be non-negative, got {sigma}");
        ensure!(r.is_finite() && q.is_finite(), "rates must be finite");

        Ok(Self {
            s0,
            v0,
            r,
            q,
            kappa,
            theta,
            sigma,
            rho,
        })
    }

    /// Spot price.
    pub fn s0(&self) -> Real {
        self.s0
    }

    /// Initial variance.
    pub fn v0(&self) -> Real {
        self.v0
    }

    /// Risk-free rate.
    pub fn risk_free_rate(&self) -> Rate {
        self.r
    }

    /// Dividend yield.
    pub fn dividend_yield(&self) -> Rate {
        self.q
    }

    /// Mean-reversion speed.
    pub fn kappa(&self) -> Real {
        self.kappa
    }

    /// Long-run variance.
    pub fn theta(&self) -> Real {
        self.theta
    }

    /// Vol-of-vol.
    pub fn sigma(&self) -> Real {
        self.sigma
    }

    /// Correlation.
    pub fn rho(&self) -> Real {
        self.rho
    }

    /// The variance as a stand-alone square-root process.
    pub fn variance_process(&self) -> Result<SquareRootProcess> {
        SquareRootProcess::new(self.kappa, self.theta, self.sigma, self.v0)
    }

    /// Feller condition `2κθ ≥ σ²` of the variance process.
    pub fn feller_condition(&self) -> bool {
        2.0 * self.kappa * self.theta >= self.sigma * self.sigma
    }

    /// Advance `(s, v)` by `dt` given independent standard normals `z1`
    /// (spot) and `z2`; the variance shock is `ρ z1 + √(1−ρ²) z2`.
    ///
    /// `lambda` tilts the spot drift to `r − q − λ√v` for importance
    /// sampling (zero for the risk-neutral dynamics). The spot uses the
    /// multiplicative Euler form `S(1 + μΔt + √(vΔt) z1)`.
    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &self,
        s: Real,
        v: Real,
        dt: Time,
        z1: Real,
        z2: Real,
        scheme: VarianceScheme,
        lambda: Real,
    ) -> HestonStep {
        let sqrt_v_dt = (v * dt).sqrt();
        let z3 = self.rho * z1 + (1.0 - self.rho * self.rho).sqrt() * z2;

        let s_new = s * (1.0 + (self.r - self.q - lambda * v.sqrt()) * dt + sqrt_v_dt * z1);

        let mut v_new = v + self.kappa * (self.theta - v) * dt + self.sigma * sqrt_v_dt * z3;
        if scheme == VarianceScheme::Milstein {
            v_new += 0.25 * self.sigma * self.sigma * (z3 * z3 - 1.0) * dt;
        }
        let (v_new, reflected) = reflect(v_new);

        HestonStep {
            s: s_new,
            v: v_new,
            reflected,
        }
    }
}
