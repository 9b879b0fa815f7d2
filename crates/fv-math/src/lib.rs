//! # fv-math
//!
//! Numerical building blocks: the normal distribution, Mersenne-Twister
//! based samplers, a statistics accumulator, 1-D root finders, cubic spline
//! interpolation, quadrature and least-squares regression (over nalgebra).

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Probability distributions.
pub mod distributions;

/// Uniform grids.
pub mod grid;

/// Numerical integration.
pub mod integrals;

/// 1D interpolation schemes.
pub mod interpolations;

/// Linear least-squares regression.
pub mod linear_least_squares;

/// Random number generators and samplers.
pub mod random_numbers;

/// 1D root-finding solvers.
pub mod solvers1d;

/// Statistics accumulators.
pub mod statistics;

/// Tridiagonal operators and the Thomas algorithm.
pub mod tridiagonal;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use distributions::{normal_cdf, normal_cdf_inverse, normal_pdf};
pub use grid::linspace;
pub use integrals::{Integrator, QuadratureEstimate, SimpsonIntegral};
pub use interpolations::{CubicSpline, Interpolation1D};
pub use random_numbers::MersenneTwisterUniformRng;
pub use statistics::Statistics;
pub use tridiagonal::TridiagonalOperator;
