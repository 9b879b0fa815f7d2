//! Analytic European option engine (Black-Scholes-Merton).
//!
//! Prices European vanilla options using the closed-form Black-Scholes-Merton
//! formula, with first and second order Greeks. [`finite_difference_greeks`]
//! recovers the same sensitivities by bump-and-reprice.

use fv_core::{errors::Error, errors::Result, Real, Time};
use fv_instruments::{
    ExerciseType, OptionType, PricingEngine, PricingResults, VanillaOptionArguments,
};
use fv_math::distributions::{normal_cdf, normal_pdf};
use fv_processes::BlackScholesMertonProcess;

/// Bump used by [`finite_difference_greeks`].
pub const GREEK_BUMP: Real = 1e-3;

/// Price and Greeks of a European option.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BsmResults {
    /// Present value.
    pub price: Real,
    /// `∂V/∂S`.
    pub delta: Real,
    /// `∂²V/∂S²`.
    pub gamma: Real,
    /// `∂V/∂σ` per unit of volatility.
    pub vega: Real,
    /// `∂V/∂t` per year of calendar time.
    pub theta: Real,
    /// `∂V/∂r` per unit of rate.
    pub rho: Real,
}

impl BsmResults {
    fn into_pricing_results(self) -> PricingResults {
        PricingResults::from_npv(self.price)
            .with_result("delta", self.delta)
            .with_result("gamma", self.gamma)
            .with_result("vega", self.vega)
            .with_result("theta", self.theta)
            .with_result("rho", self.rho)
    }
}

/// Analytic pricing engine for European vanilla options.
///
/// Implements the Black-Scholes-Merton closed-form solution:
///
/// $$C = S e^{-qT} N(d_1) - K e^{-rT} N(d_2)$$
/// $$P = K e^{-rT} N(-d_2) - S e^{-qT} N(-d_1)$$
///
/// where $d_{1,2} = \frac{\ln(S/K) + (r - q \pm \sigma^2/2)T}{\sigma\sqrt{T}}$
#[derive(Debug, Clone)]
pub struct AnalyticEuropeanEngine {
    process: BlackScholesMertonProcess,
}

impl AnalyticEuropeanEngine {
    /// Create a new engine with the given Black-Scholes process.
    pub fn new(process: BlackScholesMertonProcess) -> Self {
        Self { process }
    }
}

/// Compute Black-Scholes price and Greeks for a European option.
///
/// A non-positive `time_to_expiry` returns the intrinsic value with zero
/// Greeks.
pub fn black_scholes_merton(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Real,
    dividend_yield: Real,
    volatility: Real,
    time_to_expiry: Time,
) -> BsmResults {
    let phi = option_type.sign();
    let t = time_to_expiry;

    if t <= 0.0 {
        return BsmResults {
            price: (phi * (spot - strike)).max(0.0),
            ..BsmResults::default()
        };
    }

    let r = risk_free_rate;
    let q = dividend_yield;
    let sigma = volatility;
    let sqrt_t = t.sqrt();
    let std_dev = sigma * sqrt_t;
    let df_r = (-r * t).exp();
    let df_q = (-q * t).exp();
    let fwd = spot * ((r - q) * t).exp();

    let (d1, d2) = if std_dev > 1e-15 {
        let d1 = ((spot / strike).ln() + (r - q + 0.5 * sigma * sigma) * t) / std_dev;
        (d1, d1 - std_dev)
    } else {
        let big = if fwd > strike { 1e15 } else { -1e15 };
        (big, big)
    };

    let nd1 = normal_cdf(phi * d1);
    let nd2 = normal_cdf(phi * d2);
    let npd1 = normal_pdf(d1);

    let gamma = if std_dev > 1e-15 {
        df_q * npd1 / (spot * std_dev)
    } else {
        0.0
    };
    let theta = -(spot * df_q * npd1 * sigma) / (2.0 * sqrt_t) - phi * r * strike * df_r * nd2
        + phi * q * spot * df_q * nd1;

    BsmResults {
        price: phi * (spot * df_q * nd1 - strike * df_r * nd2),
        delta: phi * df_q * nd1,
        gamma,
        vega: spot * df_q * npd1 * sqrt_t,
        theta,
        rho: phi * strike * t * df_r * nd2,
    }
}

/// Greeks by central differences of [`black_scholes_merton`] prices with
/// bump [`GREEK_BUMP`] on spot, volatility, rate and expiry.
///
/// `theta` is `−∂V/∂T`. Spot, volatility and expiry must exceed the bump so
/// every bumped input stays positive; otherwise [`Error::InvalidArgument`].
pub fn finite_difference_greeks(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Real,
    dividend_yield: Real,
    volatility: Real,
    time_to_expiry: Time,
) -> Result<BsmResults> {
    let h = GREEK_BUMP;
    for (name, value) in [
        ("spot", spot),
        ("volatility", volatility),
        ("time to expiry", time_to_expiry),
    ] {
        if value.is_nan() || value <= h {
            return Err(Error::InvalidArgument(format!(
                "{name} {value} must exceed the bump {h}"
            )));
        }
    }
    let price = |s: Real, r: Real, sigma: Real, t: Time| {
        black_scholes_merton(option_type, s, strike, r, dividend_yield, sigma, t).price
    };
    let (s, r, sigma, t) = (spot, risk_free_rate, volatility, time_to_expiry);
    let v0 = price(s, r, sigma, t);

    Ok(BsmResults {
        price: v0,
        delta: (price(s + h, r, sigma, t) - price(s - h, r, sigma, t)) / (2.0 * h),
        gamma: (price(s + h, r, sigma, t) - 2.0 * v0 + price(s - h, r, sigma, t)) / (h * h),
        vega: (price(s, r, sigma + h, t) - price(s, r, sigma - h, t)) / (2.0 * h),
        theta: -(price(s, r, sigma, t + h) - price(s, r, sigma, t - h)) / (2.0 * h),
        rho: (price(s, r + h, sigma, t) - price(s, r - h, sigma, t)) / (2.0 * h),
    })
}

/// Reject anything but European exercise for engines that only price
/// at expiry.
pub(crate) fn require_european(args: &VanillaOptionArguments, engine: &str) -> Result<()> {
    match args.exercise.exercise_type() {
        ExerciseType::European => Ok(()),
        other => Err(Error::NotImplemented(format!(
            "{engine} prices European exercise only, got {other}"
        ))),
    }
}

impl PricingEngine<VanillaOptionArguments> for AnalyticEuropeanEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        require_european(args, "analytic Black-Scholes engine")?;
        let p = &self.process;
        let results = black_scholes_merton(
            args.option_type(),
            p.s0(),
            args.strike(),
            p.risk_free_rate(),
            p.dividend_yield(),
            p.volatility(),
            args.maturity(),
        );
        Ok(results.into_pricing_results())
    }
}
