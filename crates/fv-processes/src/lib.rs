//! # fv-processes
//!
//! Stochastic models of the underlying: geometric Brownian motion, the
//! square-root (CIR) variance process, Heston stochastic volatility, and the
//! pure-jump gamma family (gamma, Variance-Gamma, Bilateral-Gamma), plus
//! the Poisson counting process.
//!
//! All models use flat continuously compounded rates and time in years.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bilateral_gamma_process;
pub mod black_scholes_process;
pub mod gamma_process;
pub mod heston_process;
pub mod poisson_process;
pub mod square_root_process;
pub mod stochastic_process;
pub mod variance_gamma_process;

pub use bilateral_gamma_process::BilateralGammaProcess;
pub use black_scholes_process::BlackScholesMertonProcess;
pub use gamma_process::GammaProcess;
pub use heston_process::{HestonProcess, HestonStep, VarianceScheme};
pub use poisson_process::PoissonProcess;
pub use square_root_process::SquareRootProcess;
pub use stochastic_process::StochasticProcess1D;
pub use variance_gamma_process::VarianceGammaProcess;
