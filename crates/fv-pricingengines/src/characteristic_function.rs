//! Characteristic functions of the terminal log price.
//!
//! `φ(u) = E[exp(iu ln S_T)]` for complex `u` in the strip where the
//! expectation exists. Fourier engines only need `φ` plus the spot and the
//! flat rates, which [`CharacteristicFunction`] exposes.

use fv_core::{Rate, Real, Time};
use fv_processes::{
    BilateralGammaProcess, BlackScholesMertonProcess, HestonProcess, VarianceGammaProcess,
};
use num_complex::Complex64;
use std::fmt;

const I: Complex64 = Complex64::new(0.0, 1.0);

/// A model with a closed-form characteristic function of `ln S_T`.
pub trait CharacteristicFunction: fmt::Debug + Send + Sync {
    /// Spot price.
    fn spot(&self) -> Real;

    /// Risk-free rate.
    fn risk_free_rate(&self) -> Rate;

    /// Dividend yield.
    fn dividend_yield(&self) -> Rate;

    /// `E[exp(iu ln S_T)]` at expiry `t`.
    fn log_price_cf(&self, u: Complex64, t: Time) -> Complex64;

    /// Risk-neutral forward `S₀ e^{(r−q)T}`, i.e. `φ(−i)`.
    fn forward(&self, t: Time) -> Real {
        self.spot() * ((self.risk_free_rate() - self.dividend_yield()) * t).exp()
    }
}

impl<C: CharacteristicFunction + ?Sized> CharacteristicFunction for Box<C> {
    fn spot(&self) -> Real {
        (**self).spot()
    }

    fn risk_free_rate(&self) -> Rate {
        (**self).risk_free_rate()
    }

    fn dividend_yield(&self) -> Rate {
        (**self).dividend_yield()
    }

    fn log_price_cf(&self, u: Complex64, t: Time) -> Complex64 {
        (**self).log_price_cf(u, t)
    }
}

/// `exp(iu (ln S₀ + drift·T))`.
fn drift_factor(u: Complex64, spot: Real, drift: Real, t: Time) -> Complex64 {
    (I * u * (spot.ln() + drift * t)).exp()
}

impl CharacteristicFunction for BlackScholesMertonProcess {
    fn spot(&self) -> Real {
        self.s0()
    }

    fn risk_free_rate(&self) -> Rate {
        BlackScholesMertonProcess::risk_free_rate(self)
    }

    fn dividend_yield(&self) -> Rate {
        BlackScholesMertonProcess::dividend_yield(self)
    }

    fn log_price_cf(&self, u: Complex64, t: Time) -> Complex64 {
        let sigma2 = self.volatility() * self.volatility();
        let drift = self.risk_free_rate() - self.dividend_yield() - 0.5 * sigma2;
        drift_factor(u, self.s0(), drift, t) * (-0.5 * sigma2 * t * u * u).exp()
    }
}

impl CharacteristicFunction for VarianceGammaProcess {
    fn spot(&self) -> Real {
        self.s0()
    }

    fn risk_free_rate(&self) -> Rate {
        VarianceGammaProcess::risk_free_rate(self)
    }

    fn dividend_yield(&self) -> Rate {
        VarianceGammaProcess::dividend_yield(self)
    }

    fn log_price_cf(&self, u: Complex64, t: Time) -> Complex64 {
        let (sigma, nu, theta) = (self.sigma(), self.nu(), self.theta());
        let drift = self.risk_free_rate() - self.dividend_yield() + self.omega();
        let base = 1.0 - I * u * theta * nu + 0.5 * sigma * sigma * nu * u * u;
        drift_factor(u, self.s0(), drift, t) * base.powf(-t / nu)
    }
}

impl CharacteristicFunction for BilateralGammaProcess {
    fn spot(&self) -> Real {
        self.s0()
    }

    fn risk_free_rate(&self) -> Rate {
        BilateralGammaProcess::risk_free_rate(self)
    }

    fn dividend_yield(&self) -> Rate {
        BilateralGammaProcess::dividend_yield(self)
    }

    fn log_price_cf(&self, u: Complex64, t: Time) -> Complex64 {
        let (alpha_p, lambda_p) = self.upward();
        let (alpha_m, lambda_m) = self.downward();
        let drift = self.risk_free_rate() - self.dividend_yield() + self.xi();
        let up = (lambda_p / (lambda_p - I * u)).powf(t * alpha_p);
        let down = (lambda_m / (lambda_m + I * u)).powf(t * alpha_m);
        drift_factor(u, self.s0(), drift, t) * up * down
    }
}

/// Heston in the "little trap" form: `Re d ≥ 0` and
/// `g = (β − d)/(β + d)`, so the complex logarithm never crosses its
/// branch cut.
impl CharacteristicFunction for HestonProcess {
    fn spot(&self) -> Real {
        self.s0()
    }

    fn risk_free_rate(&self) -> Rate {
        HestonProcess::risk_free_rate(self)
    }

    fn dividend_yield(&self) -> Rate {
        HestonProcess::dividend_yield(self)
    }

    fn log_price_cf(&self, u: Complex64, t: Time) -> Complex64 {
        let (kappa, eta, sigma, rho) = (self.kappa(), self.theta(), self.sigma(), self.rho());
        let sigma2 = sigma * sigma;
        let iu = I * u;
        let beta = kappa - rho * sigma * iu;

        let mut d = (beta * beta + sigma2 * (u * u + iu)).sqrt();
        if d.re < 0.0 {
            d = -d;
        }
        let g = (beta - d) / (beta + d);
        let e = (-d * t).exp();

        let c = kappa * eta / sigma2 * ((beta - d) * t - 2.0 * ((1.0 - g * e) / (1.0 - g)).ln());
        let dv = (beta - d) / sigma2 * (1.0 - e) / (1.0 - g * e);
        let drift = self.risk_free_rate() - self.dividend_yield();
        drift_factor(u, self.s0(), drift, t) * (c + dv * self.v0()).exp()
    }
}
