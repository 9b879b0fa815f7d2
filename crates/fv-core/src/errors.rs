//! Error types for fairvalue.
//!
//! Every fallible operation in the workspace returns [`Result`]. Argument
//! checks go through [`ensure!`](crate::ensure), result checks through
//! [`ensure_post!`](crate::ensure_post), and unconditional failures through
//! [`fail!`](crate::fail).

use thiserror::Error;

/// The error type used throughout fairvalue.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// A model or option parameter is out of its admissible range.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// A computed result failed a sanity check.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// An iterative method (root finder, quadrature) did not converge.
    #[error("no convergence after {iterations} iterations: {message}")]
    Convergence {
        /// Number of iterations (or function evaluations) spent.
        iterations: usize,
        /// What failed to converge.
        message: String,
    },

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested combination (engine, exercise, payoff) is not supported.
    #[error("not implemented: {0}")]
    NotImplemented(String),
}

/// Shorthand `Result` type used throughout fairvalue.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use fv_core::{ensure, errors::Error};
/// fn positive(x: f64) -> fv_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use fv_core::{ensure_post, errors::Error};
/// fn compute(x: f64) -> fv_core::errors::Result<f64> {
///     let result = x * 2.0;
///     ensure_post!(result > 0.0, "result must be positive, got {result}");
///     Ok(result)
/// }
/// assert!(compute(1.0).is_ok());
/// assert!(compute(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use fv_core::{fail, errors::Error};
/// fn always_err() -> fv_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
