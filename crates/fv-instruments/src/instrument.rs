//! Pricing results and the pricing-engine interface.

use fv_core::{errors::Result, Real};
use std::collections::BTreeMap;
use std::fmt;

/// Results of pricing an instrument.
///
/// Contains the NPV, an optional error estimate (Monte Carlo standard
/// error) and additional named results such as Greeks or diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingResults {
    /// Net present value.
    pub npv: Real,
    /// Error estimate (e.g. from MC simulation).
    pub error_estimate: Option<Real>,
    /// Additional named results.
    pub additional_results: BTreeMap<String, Real>,
}

impl PricingResults {
    /// Create pricing results with just an NPV.
    pub fn from_npv(npv: Real) -> Self {
        Self {
            npv,
            error_estimate: None,
            additional_results: BTreeMap::new(),
        }
    }

    /// Attach an error estimate.
    pub fn with_error_estimate(mut self, error: Real) -> Self {
        self.error_estimate = Some(error);
        self
    }

    /// Add a named result.
    pub fn with_result(mut self, key: impl Into<String>, value: Real) -> Self {
        self.additional_results.insert(key.into(), value);
        self
    }

    /// Look up a named result.
    pub fn result(&self, key: &str) -> Option<Real> {
        self.additional_results.get(key).copied()
    }
}

impl fmt::Display for PricingResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "npv = {:.6}", self.npv)?;
        if let Some(e) = self.error_estimate {
            write!(f, " (± {e:.6})")?;
        }
        for (k, v) in &self.additional_results {
            write!(f, ", {k} = {v:.6}")?;
        }
        Ok(())
    }
}

/// Base trait for all pricing engines.
///
/// A pricing engine computes [`PricingResults`] for a specific instrument
/// description.
pub trait PricingEngine<Args>: fmt::Debug + Send + Sync {
    /// Price the instrument described by `args`.
    fn calculate(&self, args: &Args) -> Result<PricingResults>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_results_builder() {
        let r = PricingResults::from_npv(42.0)
            .with_error_estimate(0.1)
            .with_result("delta", 0.55)
            .with_result("gamma", 0.02);
        assert_eq!(r.npv, 42.0);
        assert_eq!(r.result("delta"), Some(0.55));
        assert_eq!(r.result("vega"), None);
        assert_eq!(
            r.to_string(),
            "npv = 42.000000 (± 0.100000), delta = 0.550000, gamma = 0.020000"
        );
    }
}
