//! # fairvalue
//!
//! Fair values of vanilla options under Black-Scholes-Merton, Heston,
//! Variance-Gamma and Bilateral-Gamma dynamics, computed with closed
//! forms, binomial trees, Monte Carlo, Carr-Madan FFT and finite
//! differences.
//!
//! This crate is a **façade** that re-exports the workspace crates and adds
//! the scenario [`config`] read by the `fairvalue` binary.
//!
//! ## Quick start
//!
//! ```rust
//! use fairvalue::instruments::{OptionType, VanillaOption};
//! use fairvalue::pricingengines::AnalyticEuropeanEngine;
//! use fairvalue::processes::BlackScholesMertonProcess;
//!
//! let process = BlackScholesMertonProcess::new(100.0, 0.05, 0.0, 0.2).unwrap();
//! let option = VanillaOption::european(OptionType::Call, 100.0, 1.0).unwrap();
//! let npv = option.price(&AnalyticEuropeanEngine::new(process)).unwrap().npv;
//! assert!((npv - 10.4506).abs() < 1e-3);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;

/// Core types, aliases, and error definitions.
pub use fv_core as core;

/// Mathematical utilities: distributions, RNG, interpolation, integration.
pub use fv_math as math;

/// Option types, payoffs, exercise and the pricing engine trait.
pub use fv_instruments as instruments;

/// Stochastic process definitions.
pub use fv_processes as processes;

/// Numerical methods (lattices, finite differences, Monte Carlo).
pub use fv_methods as methods;

/// Pricing engines.
pub use fv_pricingengines as pricingengines;
