//! Finite difference methods for PDE-based option pricing.
//!
//! Solves the Black-Scholes PDE in time-to-expiry `τ`
//!
//! ```text
//! ∂V/∂τ = ½σ²S² ∂²V/∂S² + (r − q) S ∂V/∂S − rV
//! ```
//!
//! on a uniform spot grid centred on `S₀` with half-width `a·S₀σT`.
//! Gamma vanishes at both edges and delta is pinned to its deep-in or
//! deep-out-of-the-money value, so the edge rows read
//! `∂V/∂τ = −rV + (r − q) S Δ`.
//!
//! # Overview
//!
//! * [`FdmScheme`] — explicit, implicit, or Crank-Nicolson time stepping
//! * [`BlackScholesPdeSolver`] — grid construction and time stepping
//! * [`FdSolution`] — the grid at `τ = T` with spline readout at any spot

use fv_core::{ensure, errors::Result, Real, Time};
use fv_instruments::{OptionType, StrikedPayoff};
use fv_math::{linspace, CubicSpline, Interpolation1D, TridiagonalOperator};
use fv_processes::BlackScholesMertonProcess;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ─── FDM scheme selection ─────────────────────────────────────────────────────

/// Finite difference time-stepping scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FdmScheme {
    /// Forward Euler in `τ` (FTCS); conditionally stable.
    #[default]
    Explicit,
    /// Backward Euler in `τ`; unconditionally stable.
    Implicit,
    /// Average of explicit and implicit; second order in time.
    CrankNicolson,
}

impl FdmScheme {
    /// Implicitness θ of the scheme.
    fn theta(self) -> Real {
        match self {
            FdmScheme::Explicit => 0.0,
            FdmScheme::Implicit => 1.0,
            FdmScheme::CrankNicolson => 0.5,
        }
    }
}

// ─── Grid parameters ──────────────────────────────────────────────────────────

/// Discretisation of the spot and time axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdeGrid {
    /// Number of spot nodes before dropping non-positive ones; odd keeps
    /// `S₀` on the grid.
    pub spot_points: usize,
    /// Number of time steps.
    pub time_steps: usize,
    /// Half-width of the spot range in units of `S₀σT`.
    pub width: Real,
}

impl Default for PdeGrid {
    fn default() -> Self {
        Self {
            spot_points: 1001,
            time_steps: 300_000,
            width: 3.0,
        }
    }
}

// ─── Solver ───────────────────────────────────────────────────────────────────

/// A 1-D finite difference solver for the Black-Scholes PDE in spot space.
#[derive(Debug, Clone)]
pub struct BlackScholesPdeSolver {
    process: BlackScholesMertonProcess,
    maturity: Time,
    grid: PdeGrid,
    scheme: FdmScheme,
}

impl BlackScholesPdeSolver {
    /// Create a solver.
    pub fn new(
        process: BlackScholesMertonProcess,
        maturity: Time,
        grid: PdeGrid,
        scheme: FdmScheme,
    ) -> Result<Self> {
        ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
        ensure!(process.volatility() > 0.0, "PDE grid needs positive volatility");
        ensure!(grid.spot_points >= 5, "need at least 5 spot points");
        ensure!(grid.time_steps > 0, "need at least one time step");
        ensure!(grid.width > 0.0, "grid width must be positive");
        Ok(Self {
            process,
            maturity,
            grid,
            scheme,
        })
    }

    /// Spot nodes: `S₀ + linspace(−1, 1, n)·S₀σT·a`, keeping `S > 0`.
    pub fn spot_grid(&self) -> Vec<Real> {
        let s0 = self.process.s0();
        let half_width = s0 * self.process.volatility() * self.maturity * self.grid.width;
        linspace(-1.0, 1.0, self.grid.spot_points)
            .into_iter()
            .map(|x| s0 + x * half_width)
            .filter(|&s| s > 0.0)
            .collect()
    }

    /// Roll the payoff back to `τ = T`.
    pub fn solve(&self, payoff: &dyn StrikedPayoff) -> Result<FdSolution> {
        let spots = self.spot_grid();
        let n = spots.len();
        ensure!(n >= 5, "fewer than 5 positive spot nodes; widen or refine the grid");

        let r = self.process.risk_free_rate();
        let mu = r - self.process.dividend_yield();
        let sigma2 = self.process.volatility().powi(2);
        let ds = spots[1] - spots[0];
        let dt = self.maturity / self.grid.time_steps as Real;
        let s_max = spots[n - 1];

        if self.scheme == FdmScheme::Explicit {
            let bound = dt * (sigma2 * s_max * s_max / (ds * ds) + r);
            ensure!(
                bound <= 1.0,
                "explicit scheme unstable: dt·(σ²S²/dS² + r) = {bound:.3} > 1; \
                 use more time steps or an implicit scheme"
            );
        }

        // spatial operator L and the constant edge source g
        let (delta_low, delta_high) = match payoff.option_type() {
            OptionType::Call => (0.0, 1.0),
            OptionType::Put => (-1.0, 0.0),
        };
        let mut op = TridiagonalOperator::new(n);
        op.set_row(0, 0.0, -r, 0.0);
        op.set_row(n - 1, 0.0, -r, 0.0);
        for (i, &s) in spots.iter().enumerate().take(n - 1).skip(1) {
            let diffusion = 0.5 * sigma2 * s * s / (ds * ds);
            let convection = 0.5 * mu * s / ds;
            op.set_row(i, diffusion - convection, -2.0 * diffusion - r, diffusion + convection);
        }
        let mut source = vec![0.0; n];
        source[0] = mu * spots[0] * delta_low;
        source[n - 1] = mu * s_max * delta_high;

        let theta = self.scheme.theta();
        let lhs = (theta > 0.0).then(|| {
            let mut lhs = TridiagonalOperator::identity(n);
            for i in 0..n {
                lhs.lower[i] = -theta * dt * op.lower[i];
                lhs.diag[i] = 1.0 - theta * dt * op.diag[i];
                lhs.upper[i] = -theta * dt * op.upper[i];
            }
            lhs
        });

        let mut values: Vec<Real> = spots.iter().map(|&s| payoff.value(s)).collect();
        for _ in 0..self.grid.time_steps {
            let lv = op.apply(&values)?;
            let rhs: Vec<Real> = values
                .iter()
                .zip(&lv)
                .zip(&source)
                .map(|((v, l), g)| v + (1.0 - theta) * dt * l + dt * g)
                .collect();
            values = match &lhs {
                Some(lhs) => lhs.solve(&rhs)?,
                None => rhs,
            };
        }

        debug!(
            scheme = ?self.scheme,
            nodes = n,
            steps = self.grid.time_steps,
            ds,
            dt,
            "black-scholes pde solved"
        );
        FdSolution::new(spots, values)
    }
}

// ─── Solution ─────────────────────────────────────────────────────────────────

/// Option values on the spot grid at the valuation date.
#[derive(Debug, Clone)]
pub struct FdSolution {
    spots: Vec<Real>,
    values: Vec<Real>,
    spline: CubicSpline,
}

impl FdSolution {
    fn new(spots: Vec<Real>, values: Vec<Real>) -> Result<Self> {
        let spline = CubicSpline::new(&spots, &values)?;
        Ok(Self {
            spots,
            values,
            spline,
        })
    }

    /// Spot nodes.
    pub fn spots(&self) -> &[Real] {
        &self.spots
    }

    /// Option values at the nodes.
    pub fn values(&self) -> &[Real] {
        &self.values
    }

    /// Value at `spot` by cubic spline.
    pub fn value_at(&self, spot: Real) -> Result<Real> {
        self.check_range(spot)?;
        Ok(self.spline.value(spot))
    }

    /// `∂V/∂S` at `spot`.
    pub fn delta_at(&self, spot: Real) -> Result<Real> {
        self.check_range(spot)?;
        Ok(self.spline.derivative(spot))
    }

    /// `∂²V/∂S²` at `spot`.
    pub fn gamma_at(&self, spot: Real) -> Result<Real> {
        self.check_range(spot)?;
        Ok(self.spline.second_derivative(spot))
    }

    fn check_range(&self, spot: Real) -> Result<()> {
        ensure!(
            self.spline.is_in_range(spot),
            "spot {spot} outside the PDE grid [{}, {}]",
            self.spline.x_min(),
            self.spline.x_max()
        );
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use fv_instruments::PlainVanillaPayoff;
    use fv_pricingengines::analytic_european_engine::black_scholes_merton;

    fn grid(time_steps: usize) -> PdeGrid {
        PdeGrid {
            spot_points: 401,
            time_steps,
            width: 3.0,
        }
    }

    fn process() -> BlackScholesMertonProcess {
        BlackScholesMertonProcess::new(100.0, 0.05, 0.0, 0.4).unwrap()
    }

    #[test]
    fn crank_nicolson_call_converges_to_bs() {
        // T=3, K=70: the grid reaches below zero and is truncated
        let solver =
            BlackScholesPdeSolver::new(process(), 3.0, grid(600), FdmScheme::CrankNicolson).unwrap();
        assert!(solver.spot_grid()[0] > 0.0);
        let payoff = PlainVanillaPayoff::new(OptionType::Call, 70.0);
        let sol = solver.solve(&payoff).unwrap();
        let bs = black_scholes_merton(OptionType::Call, 100.0, 70.0, 0.05, 0.0, 0.4, 3.0);
        let price = sol.value_at(100.0).unwrap();
        assert!((price - bs.price).abs() < 0.05, "FD CN call = {price:.4}, BS = {:.4}", bs.price);
        assert!((sol.delta_at(100.0).unwrap() - bs.delta).abs() < 0.01);
        assert!((sol.gamma_at(100.0).unwrap() - bs.gamma).abs() < 0.001);
    }

    #[test]
    fn implicit_put_converges_to_bs() {
        let p = BlackScholesMertonProcess::new(100.0, 0.05, 0.02, 0.25).unwrap();
        let solver = BlackScholesPdeSolver::new(p, 1.0, grid(1_000), FdmScheme::Implicit).unwrap();
        let payoff = PlainVanillaPayoff::new(OptionType::Put, 105.0);
        let price = solver.solve(&payoff).unwrap().value_at(100.0).unwrap();
        let bs = black_scholes_merton(OptionType::Put, 100.0, 105.0, 0.05, 0.02, 0.25, 1.0).price;
        assert!((price - bs).abs() < 0.05, "FD implicit put = {price:.4}, BS = {bs:.4}");
    }

    #[test]
    fn explicit_scheme_matches_when_stable() {
        let p = BlackScholesMertonProcess::new(100.0, 0.05, 0.0, 0.2).unwrap();
        let g = PdeGrid {
            spot_points: 201,
            time_steps: 20_000,
            width: 4.0,
        };
        let solver = BlackScholesPdeSolver::new(p, 1.0, g, FdmScheme::Explicit).unwrap();
        let payoff = PlainVanillaPayoff::new(OptionType::Call, 100.0);
        let price = solver.solve(&payoff).unwrap().value_at(100.0).unwrap();
        let bs = black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.2, 1.0).price;
        assert!((price - bs).abs() < 0.05, "FD explicit call = {price:.4}, BS = {bs:.4}");
    }

    #[test]
    fn explicit_scheme_rejects_unstable_steps() {
        let solver = BlackScholesPdeSolver::new(process(), 3.0, grid(100), FdmScheme::Explicit).unwrap();
        let payoff = PlainVanillaPayoff::new(OptionType::Call, 70.0);
        assert!(solver.solve(&payoff).is_err());
    }

    #[test]
    fn readout_outside_grid_is_an_error() {
        let solver =
            BlackScholesPdeSolver::new(process(), 1.0, grid(200), FdmScheme::CrankNicolson).unwrap();
        let sol = solver.solve(&PlainVanillaPayoff::new(OptionType::Put, 100.0)).unwrap();
        assert!(sol.value_at(10_000.0).is_err());
        assert_eq!(sol.spots().len(), sol.values().len());
    }

    #[test]
    fn invalid_setup_is_rejected() {
        assert!(BlackScholesPdeSolver::new(process(), 0.0, grid(10), FdmScheme::Implicit).is_err());
        let flat = process().with_volatility(0.0).unwrap();
        assert!(BlackScholesPdeSolver::new(flat, 1.0, grid(10), FdmScheme::Implicit).is_err());
    }
}
