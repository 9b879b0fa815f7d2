//! Analytic (semi-analytic) Heston model pricing engine.
//!
//! Prices European options under the Heston stochastic volatility model by
//! Gil-Pelaez inversion of the characteristic function of `ln S_T`.

use std::f64::consts::PI;

use fv_core::{ensure, errors::Result, Real, Time};
use fv_instruments::{OptionType, PricingEngine, PricingResults, VanillaOptionArguments};
use fv_math::integrals::{Integrator, SimpsonIntegral};
use fv_processes::HestonProcess;
use num_complex::Complex64;

use crate::analytic_european_engine::require_european;
use crate::characteristic_function::CharacteristicFunction;

/// Upper limit of the inversion integrals.
const UPPER_LIMIT: Real = 250.0;

/// Semi-analytic Heston pricing engine.
///
/// The Heston model assumes the variance follows a CIR process:
///
/// $$dS = (r-q) S \, dt + \sqrt{v} S \, dW_1$$
/// $$dv = \kappa(\theta - v) \, dt + \sigma_v \sqrt{v} \, dW_2$$
/// $$dW_1 dW_2 = \rho \, dt$$
///
/// The call price is $C = S e^{-qT} P_1 - K e^{-rT} P_2$ where $P_1, P_2$
/// are exercise probabilities under the stock and money-market measures.
#[derive(Debug, Clone)]
pub struct AnalyticHestonEngine {
    process: HestonProcess,
}

impl AnalyticHestonEngine {
    /// Create a new Heston engine.
    pub fn new(process: HestonProcess) -> Self {
        Self { process }
    }
}

/// `Pⱼ = ½ + (1/π) ∫₀^∞ Re[e^{−iu ln K} f(u) / (iu)] du`.
fn exercise_probability<F>(f: F, strike: Real) -> Result<Real>
where
    F: Fn(Real) -> Complex64,
{
    let ln_k = strike.ln();
    let integrand = |u: Real| {
        let z = (Complex64::new(0.0, -u * ln_k)).exp() * f(u) / Complex64::new(0.0, u);
        z.re
    };
    let integral = SimpsonIntegral::new(1e-10, 1 << 20).integrate(integrand, 1e-8, UPPER_LIMIT)?;
    Ok(0.5 + integral / PI)
}

/// Price a European option under the Heston model.
pub fn heston_price(
    process: &HestonProcess,
    option_type: OptionType,
    strike: Real,
    maturity: Time,
) -> Result<Real> {
    ensure!(strike > 0.0, "strike must be positive, got {strike}");
    ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
    ensure!(process.sigma() > 0.0, "semi-analytic Heston needs positive vol-of-vol");

    let forward = process.forward(maturity);
    let p1 = exercise_probability(
        |u| process.log_price_cf(Complex64::new(u, -1.0), maturity) / forward,
        strike,
    )?;
    let p2 = exercise_probability(|u| process.log_price_cf(Complex64::new(u, 0.0), maturity), strike)?;

    let df_q = (-process.dividend_yield() * maturity).exp();
    let df_r = (-process.risk_free_rate() * maturity).exp();
    let call = process.s0() * df_q * p1 - strike * df_r * p2;

    Ok(match option_type {
        OptionType::Call => call,
        OptionType::Put => call - process.s0() * df_q + strike * df_r,
    })
}

impl PricingEngine<VanillaOptionArguments> for AnalyticHestonEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        require_european(args, "analytic Heston engine")?;
        let price = heston_price(&self.process, args.option_type(), args.strike(), args.maturity())?;
        Ok(PricingResults::from_npv(price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic_european_engine::black_scholes_merton;
    use fv_instruments::VanillaOption;

    /// Heston with small vol-of-vol and v0 = θ stays close to BS.
    #[test]
    fn heston_close_to_bs_low_vol_of_vol() {
        let p = HestonProcess::new(100.0, 0.04, 0.05, 0.0, 2.0, 0.04, 0.1, 0.0).unwrap();
        let heston = heston_price(&p, OptionType::Call, 100.0, 1.0).unwrap();
        let bs = black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.20, 1.0).price;
        assert!((heston - bs).abs() < 0.2, "heston={heston}, bs={bs}");
    }

    #[test]
    fn heston_put_call_parity() {
        let p = HestonProcess::new(100.0, 0.04, 0.05, 0.02, 2.0, 0.04, 0.3, -0.7).unwrap();
        let call = heston_price(&p, OptionType::Call, 105.0, 1.0).unwrap();
        let put = heston_price(&p, OptionType::Put, 105.0, 1.0).unwrap();
        let rhs = 100.0 * (-0.02_f64).exp() - 105.0 * (-0.05_f64).exp();
        assert!((call - put - rhs).abs() < 1e-10);
        assert!(put > 0.0 && call > 0.0);
    }

    #[test]
    fn negative_correlation_fattens_the_left_tail() {
        let skewed = HestonProcess::new(100.0, 0.04, 0.05, 0.0, 2.0, 0.04, 0.4, -0.7).unwrap();
        let flat = HestonProcess::new(100.0, 0.04, 0.05, 0.0, 2.0, 0.04, 0.4, 0.0).unwrap();
        let otm_skewed = heston_price(&skewed, OptionType::Put, 80.0, 1.0).unwrap();
        let otm_flat = heston_price(&flat, OptionType::Put, 80.0, 1.0).unwrap();
        assert!(otm_skewed > otm_flat, "ρ<0: {otm_skewed}, ρ=0: {otm_flat}");
    }

    #[test]
    fn engine_prices_atm_call() {
        let p = HestonProcess::new(100.0, 0.04, 0.05, 0.0, 2.0, 0.04, 0.3, -0.5).unwrap();
        let option = VanillaOption::european(OptionType::Call, 100.0, 1.0).unwrap();
        let npv = option.price(&AnalyticHestonEngine::new(p)).unwrap().npv;
        assert!(npv > 5.0 && npv < 20.0, "npv = {npv}");
    }

    #[test]
    fn zero_vol_of_vol_is_rejected() {
        let p = HestonProcess::new(100.0, 0.04, 0.05, 0.0, 2.0, 0.04, 0.0, 0.0).unwrap();
        assert!(heston_price(&p, OptionType::Call, 100.0, 1.0).is_err());
    }
}
