//! Finite-difference Black-Scholes engine.

use fv_core::{errors::Result, Real};
use fv_instruments::{PricingEngine, PricingResults, VanillaOptionArguments};
use fv_methods::finite_differences::{BlackScholesPdeSolver, FdmScheme, PdeGrid};
use fv_processes::BlackScholesMertonProcess;
use tracing::debug;

use crate::analytic_european_engine::require_european;

/// Prices European options on a spot grid and reports delta and gamma at
/// the initial spot.
#[derive(Debug, Clone)]
pub struct FdBlackScholesEngine {
    process: BlackScholesMertonProcess,
    grid: PdeGrid,
    scheme: FdmScheme,
}

impl FdBlackScholesEngine {
    /// Engine with the default grid and the explicit scheme.
    pub fn new(process: BlackScholesMertonProcess) -> Self {
        Self {
            process,
            grid: PdeGrid::default(),
            scheme: FdmScheme::default(),
        }
    }

    /// Set the grid.
    pub fn with_grid(mut self, grid: PdeGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Set the time-stepping scheme.
    pub fn with_scheme(mut self, scheme: FdmScheme) -> Self {
        self.scheme = scheme;
        self
    }
}

impl PricingEngine<VanillaOptionArguments> for FdBlackScholesEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        require_european(args, "finite-difference engine")?;
        let solver =
            BlackScholesPdeSolver::new(self.process, args.maturity(), self.grid, self.scheme)?;
        let solution = solver.solve(args.payoff.as_ref())?;
        let s0: Real = self.process.s0();
        let npv = solution.value_at(s0)?;
        let delta = solution.delta_at(s0)?;
        let gamma = solution.gamma_at(s0)?;
        debug!(scheme = ?self.scheme, npv, delta, gamma, "fd black-scholes");
        Ok(PricingResults::from_npv(npv)
            .with_result("delta", delta)
            .with_result("gamma", gamma))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic_european_engine::black_scholes_merton;
    use fv_instruments::{OptionType, VanillaOption};

    #[test]
    fn crank_nicolson_matches_closed_form_with_greeks() {
        let process = BlackScholesMertonProcess::new(100.0, 0.05, 0.0, 0.2).unwrap();
        let engine = FdBlackScholesEngine::new(process)
            .with_scheme(FdmScheme::CrankNicolson)
            .with_grid(PdeGrid {
                spot_points: 401,
                time_steps: 400,
                width: 3.0,
            });
        let option = VanillaOption::european(OptionType::Put, 100.0, 1.0).unwrap();
        let res = option.price(&engine).unwrap();
        let bs = black_scholes_merton(OptionType::Put, 100.0, 100.0, 0.05, 0.0, 0.2, 1.0);
        assert!((res.npv - bs.price).abs() < 0.05, "{} vs {}", res.npv, bs.price);
        assert!((res.result("delta").unwrap() - bs.delta).abs() < 0.01);
        assert!((res.result("gamma").unwrap() - bs.gamma).abs() < 0.005);
    }

    #[test]
    fn american_exercise_is_not_supported() {
        let process = BlackScholesMertonProcess::new(100.0, 0.05, 0.0, 0.2).unwrap();
        let option = VanillaOption::american(OptionType::Put, 100.0, 1.0).unwrap();
        assert!(option.price(&FdBlackScholesEngine::new(process)).is_err());
    }
}
