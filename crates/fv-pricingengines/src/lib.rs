//! # fv-pricingengines
//!
//! Pricing engines for vanilla options, one per numerical technique. Each
//! engine implements [`PricingEngine`](fv_instruments::PricingEngine) for
//! [`VanillaOptionArguments`](fv_instruments::VanillaOptionArguments), so
//! the same option can be priced by any of them and the results compared.
//!
//! ## Engines
//!
//! - [`AnalyticEuropeanEngine`] — Black-Scholes-Merton closed form with Greeks
//! - [`LognormalIntegralEngine`] — quadrature against the lognormal density
//! - [`AnalyticHestonEngine`] — semi-analytic Heston reference price
//! - [`BinomialEngine`] — CRR / Jarrow-Rudd / Tian trees, European and American
//! - [`CarrMadanEngine`] — FFT inversion for any [`CharacteristicFunction`]
//! - [`FdBlackScholesEngine`] — finite differences in spot space
//! - [`McEuropeanEngine`], [`McHestonEngine`], [`McVarianceGammaEngine`],
//!   [`McBilateralGammaEngine`] — Monte Carlo European pricing
//! - [`McAmericanEngine`] — least-squares Monte Carlo
//!
//! [`implied_volatility`](implied_volatility::implied_volatility) inverts the
//! closed form by bisection.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analytic_european_engine;
pub mod analytic_heston_engine;
pub mod binomial_engine;
pub mod carr_madan_engine;
pub mod characteristic_function;
pub mod fd_black_scholes_engine;
pub mod implied_volatility;
pub mod lognormal_integral_engine;
pub mod mc_engines;

pub use analytic_european_engine::{
    black_scholes_merton, finite_difference_greeks, AnalyticEuropeanEngine, BsmResults,
};
pub use analytic_heston_engine::{heston_price, AnalyticHestonEngine};
pub use binomial_engine::{
    american_european_sweep, BinomialEngine, SweepPoint, SweepSettings, TreeKind,
};
pub use carr_madan_engine::{
    carr_madan_call_curve, carr_madan_price, CallCurve, CarrMadanEngine, CarrMadanParams,
};
pub use characteristic_function::CharacteristicFunction;
pub use fd_black_scholes_engine::FdBlackScholesEngine;
pub use implied_volatility::{
    implied_volatility, price_curve_over_volatility, DEFAULT_CURVE_POINTS,
    DEFAULT_VOLATILITY_BRACKET,
};
pub use lognormal_integral_engine::{lognormal_integral_price, LognormalIntegralEngine};
pub use mc_engines::{
    ImportanceSampling, McAmericanEngine, McBilateralGammaEngine, McEuropeanEngine,
    McHestonEngine, McVarianceGammaEngine,
};
