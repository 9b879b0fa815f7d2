//! Probability distributions.
//!
//! Only the standard normal is needed in closed form; gamma, Poisson and
//! Bernoulli variates are drawn through [`crate::random_numbers`].

pub mod normal;

pub use normal::{normal_cdf, normal_cdf_inverse, normal_pdf};
