//! Carr-Madan FFT pricing of European options.
//!
//! The damped call price `e^{αk} C(k)` in log strike `k` has the Fourier
//! transform
//!
//! ```text
//! ψ(v) = e^{−rT} φ(v − (α+1)i) / (α² + α − v² + i(2α+1)v)
//! ```
//!
//! A single FFT of Simpson-weighted samples of `ψ` yields calls on the
//! log-strike grid `k_j = −b + jλ`, `λ = 2π/(Nη)`, `b = λN/2`. A cubic
//! spline in strike space reads off the price at any strike on the grid.

use fv_core::{ensure, ensure_post, errors::Result, Real, Time};
use fv_instruments::{OptionType, PricingEngine, PricingResults, VanillaOptionArguments};
use fv_math::{CubicSpline, Interpolation1D};
use num_complex::Complex64;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

use crate::analytic_european_engine::require_european;
use crate::characteristic_function::CharacteristicFunction;

/// Grid and damping of the Carr-Madan transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarrMadanParams {
    /// Number of FFT points, a power of two.
    pub n: usize,
    /// Damping exponent `α`.
    pub alpha: Real,
    /// Frequency spacing `η`.
    pub eta: Real,
}

impl Default for CarrMadanParams {
    fn default() -> Self {
        Self {
            n: 4096,
            alpha: 1.5,
            eta: 0.25,
        }
    }
}

impl CarrMadanParams {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.n >= 4 && self.n.is_power_of_two(),
            "FFT size must be a power of two >= 4, got {}",
            self.n
        );
        ensure!(self.alpha > 0.0 && self.alpha.is_finite(), "damping α must be positive");
        ensure!(self.eta > 0.0 && self.eta.is_finite(), "frequency spacing η must be positive");
        Ok(())
    }

    /// Log-strike spacing `λ = 2π/(Nη)`.
    pub fn log_strike_spacing(&self) -> Real {
        2.0 * PI / (self.n as Real * self.eta)
    }
}

/// Call prices on the FFT strike grid.
#[derive(Debug, Clone)]
pub struct CallCurve {
    /// Strikes `e^{k_j}`, increasing.
    pub strikes: Vec<Real>,
    /// Call prices at `strikes`.
    pub calls: Vec<Real>,
}

fn simpson_weight(j: usize) -> Real {
    match j {
        0 => 1.0 / 3.0,
        j if j % 2 == 1 => 4.0 / 3.0,
        _ => 2.0 / 3.0,
    }
}

/// Call prices at expiry `maturity` on the full log-strike grid.
pub fn carr_madan_call_curve(
    model: &dyn CharacteristicFunction,
    maturity: Time,
    params: CarrMadanParams,
) -> Result<CallCurve> {
    params.validate()?;
    ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");

    let n = params.n;
    let alpha = params.alpha;
    let lambda = params.log_strike_spacing();
    let b = 0.5 * lambda * n as Real;
    let discount = (-model.risk_free_rate() * maturity).exp();
    let i = Complex64::new(0.0, 1.0);

    let mut buffer: Vec<Complex64> = (0..n)
        .map(|j| {
            let v = j as Real * params.eta;
            let u = Complex64::new(v, -(alpha + 1.0));
            let denom = Complex64::new(alpha * alpha + alpha - v * v, (2.0 * alpha + 1.0) * v);
            let psi = discount * model.log_price_cf(u, maturity) / denom;
            psi * (i * v * b).exp() * params.eta * simpson_weight(j)
        })
        .collect();

    FftPlanner::<Real>::new().plan_fft_forward(n).process(&mut buffer);

    let (strikes, calls): (Vec<Real>, Vec<Real>) = buffer
        .iter()
        .enumerate()
        .map(|(j, z)| {
            let k = -b + j as Real * lambda;
            (k.exp(), (-alpha * k).exp() * z.re / PI)
        })
        .unzip();
    ensure_post!(
        calls.iter().all(|c| c.is_finite()),
        "non-finite Carr-Madan call prices; check the model parameters and α"
    );
    Ok(CallCurve { strikes, calls })
}

/// European price at `strike`. Puts follow from parity
/// `P = C − S₀e^{−qT} + Ke^{−rT}`.
pub fn carr_madan_price(
    model: &dyn CharacteristicFunction,
    option_type: OptionType,
    strike: Real,
    maturity: Time,
    params: CarrMadanParams,
) -> Result<Real> {
    ensure!(strike > 0.0, "strike must be positive, got {strike}");
    let curve = carr_madan_call_curve(model, maturity, params)?;
    let spline = CubicSpline::new(&curve.strikes, &curve.calls)?;
    ensure!(
        spline.is_in_range(strike),
        "strike {strike} outside the FFT strike grid [{:.3e}, {:.3e}]",
        spline.x_min(),
        spline.x_max()
    );
    let call = spline.value(strike);
    debug!(strike, maturity, call, n = params.n, "carr-madan");
    Ok(match option_type {
        OptionType::Call => call,
        OptionType::Put => {
            let (r, q) = (model.risk_free_rate(), model.dividend_yield());
            call - model.spot() * (-q * maturity).exp() + strike * (-r * maturity).exp()
        }
    })
}

/// Fourier pricing engine for European options under any model with a
/// [`CharacteristicFunction`].
#[derive(Debug, Clone)]
pub struct CarrMadanEngine<C> {
    model: C,
    params: CarrMadanParams,
}

impl<C: CharacteristicFunction> CarrMadanEngine<C> {
    /// Engine with the default grid.
    pub fn new(model: C) -> Self {
        Self::with_params(model, CarrMadanParams::default())
    }

    /// Engine with an explicit grid.
    pub fn with_params(model: C, params: CarrMadanParams) -> Self {
        Self { model, params }
    }
}

impl<C: CharacteristicFunction> PricingEngine<VanillaOptionArguments> for CarrMadanEngine<C> {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        require_european(args, "Carr-Madan engine")?;
        let price = carr_madan_price(
            &self.model,
            args.option_type(),
            args.strike(),
            args.maturity(),
            self.params,
        )?;
        Ok(PricingResults::from_npv(price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic_european_engine::black_scholes_merton;
    use crate::analytic_heston_engine::heston_price;
    use fv_instruments::VanillaOption;
    use fv_processes::{BlackScholesMertonProcess, HestonProcess, VarianceGammaProcess};

    #[test]
    fn bsm_call_matches_closed_form() {
        // T=3, r=5%, σ=40%, S0=100, K=70
        let p = BlackScholesMertonProcess::new(100.0, 0.05, 0.0, 0.4).unwrap();
        let fft = carr_madan_price(&p, OptionType::Call, 70.0, 3.0, CarrMadanParams::default())
            .unwrap();
        let bs = black_scholes_merton(OptionType::Call, 100.0, 70.0, 0.05, 0.0, 0.4, 3.0).price;
        assert!((fft - bs).abs() < 1e-3, "FFT = {fft:.6}, BS = {bs:.6}");
    }

    #[test]
    fn put_uses_dividend_parity() {
        let p = BlackScholesMertonProcess::new(100.0, 0.05, 0.03, 0.25).unwrap();
        let fft = carr_madan_price(&p, OptionType::Put, 110.0, 1.0, CarrMadanParams::default())
            .unwrap();
        let bs = black_scholes_merton(OptionType::Put, 100.0, 110.0, 0.05, 0.03, 0.25, 1.0).price;
        assert!((fft - bs).abs() < 1e-3, "FFT put = {fft:.6}, BS = {bs:.6}");
    }

    #[test]
    fn heston_matches_semi_analytic() {
        let p = HestonProcess::new(100.0, 0.04, 0.05, 0.0, 1.5, 0.04, 0.3, -0.7).unwrap();
        let fft = carr_madan_price(&p, OptionType::Call, 95.0, 1.0, CarrMadanParams::default())
            .unwrap();
        let reference = heston_price(&p, OptionType::Call, 95.0, 1.0).unwrap();
        assert!((fft - reference).abs() < 5e-3, "FFT = {fft:.6}, ref = {reference:.6}");
    }

    #[test]
    fn vg_prices_are_monotone_in_strike() {
        let p = VarianceGammaProcess::new(100.0, 0.05, 0.0, 0.2, 0.2, -0.15).unwrap();
        let curve = carr_madan_call_curve(&p, 1.0, CarrMadanParams::default()).unwrap();
        // away from the noisy far tails
        let window: Vec<Real> = curve
            .strikes
            .iter()
            .zip(&curve.calls)
            .filter(|(k, _)| (50.0..200.0).contains(*k))
            .map(|(_, c)| *c)
            .collect();
        assert!(window.len() > 10);
        assert!(window.windows(2).all(|w| w[1] <= w[0] + 1e-8));
    }

    #[test]
    fn engine_prices_european_and_rejects_american() {
        let p = BlackScholesMertonProcess::new(100.0, 0.05, 0.0, 0.2).unwrap();
        let engine = CarrMadanEngine::new(p);
        let call = VanillaOption::european(OptionType::Call, 100.0, 1.0).unwrap();
        assert!((call.price(&engine).unwrap().npv - 10.4506).abs() < 1e-3);
        let american = VanillaOption::american(OptionType::Call, 100.0, 1.0).unwrap();
        assert!(american.price(&engine).is_err());
    }

    #[test]
    fn invalid_grid_is_rejected() {
        let p = BlackScholesMertonProcess::new(100.0, 0.05, 0.0, 0.2).unwrap();
        let params = CarrMadanParams {
            n: 1000,
            ..CarrMadanParams::default()
        };
        assert!(carr_madan_call_curve(&p, 1.0, params).is_err());
    }
}
