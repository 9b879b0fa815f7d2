//! Bilateral Gamma process.
//!
//! `X = G⁺ − G⁻` with independent gamma processes whose unit-time
//! increments are Gamma(α⁺, rate λ⁺) and Gamma(α⁻, rate λ⁻). The asset is
//! `S(t) = S(0) exp((r − q + ξ) t + X(t))` with martingale correction
//! `ξ = −α⁺ ln(λ⁺/(λ⁺ − 1)) − α⁻ ln(λ⁻/(λ⁻ + 1))`.

use crate::gamma_process::GammaProcess;
use fv_core::{ensure, errors::Result, Rate, Real};

/// Bilateral Gamma process for asset pricing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilateralGammaProcess {
    s0: Real,
    r: Rate,
    q: Rate,
    alpha_plus: Real,
    lambda_plus: Real,
    alpha_minus: Real,
    lambda_minus: Real,
}

impl BilateralGammaProcess {
    /// Create a new Bilateral Gamma process.
    ///
    /// `λ⁺ > 1` is required for `E[S(t)]` to be finite.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        s0: Real,
        r: Rate,
        q: Rate,
        alpha_plus: Real,
        lambda_plus: Real,
        alpha_minus: Real,
        lambda_minus: Real,
    ) -> Result<Self> {
        ensure!(s0 > 0.0, "spot must be positive, got {s0}");
        ensure!(
            alpha_plus > 0.0 && alpha_minus > 0.0,
            "shape parameters must be positive"
        );
        ensure!(
            lambda_plus > 1.0,
            "λ⁺ must exceed 1 for a finite forward, got {lambda_plus}"
        );
        ensure!(lambda_minus > 0.0, "λ⁻ must be positive, got {lambda_minus}");
        Ok(Self {
            s0,
            r,
            q,
            alpha_plus,
            lambda_plus,
            alpha_minus,
            lambda_minus,
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

    /// `(α⁺, λ⁺)` of the upward leg.
    pub fn upward(&self) -> (Real, Real) {
        (self.alpha_plus, self.lambda_plus)
    }

    /// `(α⁻, λ⁻)` of the downward leg.
    pub fn downward(&self) -> (Real, Real) {
        (self.alpha_minus, self.lambda_minus)
    }

    /// Martingale correction `ξ`.
    pub fn xi(&self) -> Real {
        -self.alpha_plus * (self.lambda_plus / (self.lambda_plus - 1.0)).ln()
            - self.alpha_minus * (self.lambda_minus / (self.lambda_minus + 1.0)).ln()
    }

    /// Upward and downward gamma legs `(G⁺, G⁻)`.
    pub fn gamma_legs(&self) -> Result<(GammaProcess, GammaProcess)> {
        Ok((
            GammaProcess::from_shape_rate(self.alpha_plus, self.lambda_plus)?,
            GammaProcess::from_shape_rate(self.alpha_minus, self.lambda_minus)?,
        ))
    }
}
