//! # fv-methods
//!
//! Numerical methods: recombining binomial trees, a finite difference
//! Black-Scholes solver, and Monte Carlo path simulation for the GBM,
//! CIR, Heston, gamma-family and Poisson models.
//!
//! # Modules
//!
//! * [`lattice`] — binomial trees and backward-induction pricing
//! * [`monte_carlo`] — path generation, estimators, least-squares MC
//! * [`finite_differences`] — θ-scheme Black-Scholes PDE solver

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Lattice methods: binomial trees, backward induction.
pub mod lattice;

/// Monte Carlo simulation: path generation, pricing, statistics.
pub mod monte_carlo;

/// Finite difference methods for the Black-Scholes PDE.
pub mod finite_differences;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use finite_differences::{BlackScholesPdeSolver, FdSolution, FdmScheme, PdeGrid};
pub use lattice::{price_american, price_european, BinomialTree};
pub use monte_carlo::{
    EuropeanPathPricer, McEstimate, McSettings, MonteCarloModel, MultiPath, Path, PathGenerator,
    PathPricer, TimeGrid,
};
