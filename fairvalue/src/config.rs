//! Scenario configuration for the `fairvalue` binary.
//!
//! A TOML file overrides any subset of the defaults:
//!
//! ```toml
//! [market]
//! s0 = 120.0
//! sigma = 0.3
//!
//! [option]
//! option_type = "put"
//! exercise = "american"
//!
//! [mc]
//! paths = 40000
//! ```
//!
//! Missing sections and keys keep their [`Default`] values.

use std::path::Path;

use anyhow::Context;
use fv_core::{Real, Time};
use fv_instruments::{ExerciseType, OptionType, VanillaOption};
use fv_methods::finite_differences::{FdmScheme, PdeGrid};
use fv_methods::monte_carlo::{heston::HestonMcOptions, levy::BgSamplingMeasure, poisson::PoissonMethod};
use fv_methods::McSettings;
use fv_pricingengines::{CarrMadanParams, SweepSettings, TreeKind};
use fv_processes::{
    BilateralGammaProcess, BlackScholesMertonProcess, GammaProcess, HestonProcess, PoissonProcess,
    SquareRootProcess, VarianceGammaProcess, VarianceScheme,
};
use serde::{Deserialize, Serialize};

/// All configuration sections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spot, rates and Black-Scholes volatility.
    pub market: MarketConfig,
    /// The option being priced.
    pub option: OptionConfig,
    /// Monte Carlo size and seed.
    pub mc: McSettings,
    /// Heston variance dynamics.
    pub heston: HestonConfig,
    /// Variance-Gamma parameters.
    pub vg: VgConfig,
    /// Bilateral-Gamma parameters.
    pub bg: BgConfig,
    /// Carr-Madan grid.
    pub fft: CarrMadanParams,
    /// Finite-difference grid and scheme.
    pub pde: PdeConfig,
    /// Binomial tree depth, kind and sweep range.
    pub tree: TreeConfig,
    /// Square-root process for path simulation.
    pub cir: CirConfig,
    /// Poisson process for path simulation.
    pub poisson: PoissonConfig,
    /// Gamma process for path simulation.
    pub gamma: GammaConfig,
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }
}

// ─── Market and option ────────────────────────────────────────────────────────

/// Spot, continuously compounded rates and Black-Scholes volatility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Initial spot.
    pub s0: Real,
    /// Risk-free rate.
    pub r: Real,
    /// Dividend yield.
    pub q: Real,
    /// Volatility.
    pub sigma: Real,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            s0: 100.0,
            r: 0.05,
            q: 0.02,
            sigma: 0.2,
        }
    }
}

impl MarketConfig {
    /// The Black-Scholes-Merton process.
    pub fn bsm_process(&self) -> fv_core::Result<BlackScholesMertonProcess> {
        BlackScholesMertonProcess::new(self.s0, self.r, self.q, self.sigma)
    }
}

/// Contract terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionConfig {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike.
    pub strike: Real,
    /// Time to expiry in years.
    pub maturity: Time,
    /// European or American.
    pub exercise: ExerciseType,
}

impl Default for OptionConfig {
    fn default() -> Self {
        Self {
            option_type: OptionType::Call,
            strike: 100.0,
            maturity: 1.0,
            exercise: ExerciseType::European,
        }
    }
}

impl OptionConfig {
    /// The vanilla option these terms describe.
    pub fn vanilla(&self) -> fv_core::Result<VanillaOption> {
        match self.exercise {
            ExerciseType::European => {
                VanillaOption::european(self.option_type, self.strike, self.maturity)
            }
            ExerciseType::American => {
                VanillaOption::american(self.option_type, self.strike, self.maturity)
            }
        }
    }
}

// ─── Models ───────────────────────────────────────────────────────────────────

/// Heston variance parameters; spot and rates come from [`MarketConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HestonConfig {
    /// Initial variance.
    pub v0: Real,
    /// Mean-reversion speed `κ`.
    pub kappa: Real,
    /// Long-run variance.
    pub theta: Real,
    /// Volatility of variance.
    pub sigma: Real,
    /// Spot-variance correlation.
    pub rho: Real,
    /// Variance discretisation for Monte Carlo.
    pub variance_scheme: VarianceScheme,
    /// Importance-sampling shift; zero disables it.
    pub lambda: Real,
}

impl Default for HestonConfig {
    fn default() -> Self {
        Self {
            v0: 0.04,
            kappa: 1.0,
            theta: 0.04,
            sigma: 0.1,
            rho: -0.3,
            variance_scheme: VarianceScheme::Euler,
            lambda: 0.0,
        }
    }
}

impl HestonConfig {
    /// The Heston process on `market`.
    pub fn process(&self, market: &MarketConfig) -> fv_core::Result<HestonProcess> {
        HestonProcess::new(
            market.s0, self.v0, market.r, market.q, self.kappa, self.theta, self.sigma, self.rho,
        )
    }

    /// Monte Carlo options.
    pub fn mc_options(&self) -> HestonMcOptions {
        HestonMcOptions {
            variance_scheme: self.variance_scheme,
            lambda: self.lambda,
        }
    }
}

/// Variance-Gamma parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VgConfig {
    /// Volatility of the subordinated Brownian motion.
    pub sigma: Real,
    /// Variance rate of the gamma time change.
    pub nu: Real,
    /// Drift of the subordinated Brownian motion.
    pub theta: Real,
}

impl Default for VgConfig {
    fn default() -> Self {
        Self {
            sigma: 0.4,
            nu: 0.2,
            theta: 0.05,
        }
    }
}

impl VgConfig {
    /// The Variance-Gamma process on `market`.
    pub fn process(&self, market: &MarketConfig) -> fv_core::Result<VarianceGammaProcess> {
        VarianceGammaProcess::new(market.s0, market.r, market.q, self.sigma, self.nu, self.theta)
    }
}

/// Bilateral-Gamma parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BgConfig {
    /// Shape of the upward leg.
    pub alpha_plus: Real,
    /// Rate of the upward leg.
    pub lambda_plus: Real,
    /// Shape of the downward leg.
    pub alpha_minus: Real,
    /// Rate of the downward leg.
    pub lambda_minus: Real,
    /// Optional sampling measure for Monte Carlo.
    pub sampling: Option<BgSamplingMeasure>,
}

impl Default for BgConfig {
    fn default() -> Self {
        Self {
            alpha_plus: 1.18,
            lambda_plus: 11.0,
            alpha_minus: 1.44,
            lambda_minus: 6.0,
            sampling: None,
        }
    }
}

impl BgConfig {
    /// The Bilateral-Gamma process on `market`.
    pub fn process(&self, market: &MarketConfig) -> fv_core::Result<BilateralGammaProcess> {
        BilateralGammaProcess::new(
            market.s0,
            market.r,
            market.q,
            self.alpha_plus,
            self.lambda_plus,
            self.alpha_minus,
            self.lambda_minus,
        )
    }
}

// ─── Methods ──────────────────────────────────────────────────────────────────

/// Finite-difference settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdeConfig {
    /// Spot nodes.
    pub spot_points: usize,
    /// Time steps.
    pub time_steps: usize,
    /// Half-width of the spot range in units of `S₀σT`.
    pub width: Real,
    /// Time-stepping scheme.
    pub scheme: FdmScheme,
}

impl Default for PdeConfig {
    fn default() -> Self {
        let grid = PdeGrid::default();
        Self {
            spot_points: grid.spot_points,
            time_steps: grid.time_steps,
            width: grid.width,
            scheme: FdmScheme::default(),
        }
    }
}

impl PdeConfig {
    /// The solver grid.
    pub fn grid(&self) -> PdeGrid {
        PdeGrid {
            spot_points: self.spot_points,
            time_steps: self.time_steps,
            width: self.width,
        }
    }
}

/// Binomial tree settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Tree depth.
    pub steps: usize,
    /// Tree parameterisation.
    pub kind: TreeKind,
    /// American/European sweep.
    pub sweep: SweepSettings,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            steps: 4000,
            kind: TreeKind::default(),
            sweep: SweepSettings::default(),
        }
    }
}

/// Square-root (CIR) process for path simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CirConfig {
    /// Initial value.
    pub x0: Real,
    /// Mean-reversion speed.
    pub speed: Real,
    /// Long-run level.
    pub mean: Real,
    /// Volatility.
    pub volatility: Real,
}

impl Default for CirConfig {
    fn default() -> Self {
        Self {
            x0: 0.2,
            speed: 1.0,
            mean: 0.4,
            volatility: 0.2,
        }
    }
}

impl CirConfig {
    /// The square-root process.
    pub fn process(&self) -> fv_core::Result<SquareRootProcess> {
        SquareRootProcess::new(self.speed, self.mean, self.volatility, self.x0)
    }
}

/// Poisson process for path simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoissonConfig {
    /// Arrival rate.
    pub intensity: Real,
    /// Horizon.
    pub maturity: Time,
    /// Simulation method.
    pub method: PoissonMethod,
}

impl Default for PoissonConfig {
    fn default() -> Self {
        Self {
            intensity: 10.0,
            maturity: 50.0,
            method: PoissonMethod::default(),
        }
    }
}

impl PoissonConfig {
    /// The Poisson process.
    pub fn process(&self) -> fv_core::Result<PoissonProcess> {
        PoissonProcess::new(self.intensity)
    }
}

/// Gamma process for path simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GammaConfig {
    /// Mean growth per unit time.
    pub mean_rate: Real,
    /// Variance per unit time.
    pub variance_rate: Real,
    /// Horizon.
    pub maturity: Time,
}

impl Default for GammaConfig {
    fn default() -> Self {
        Self {
            mean_rate: 1.0,
            variance_rate: 10.0,
            maturity: 50.0,
        }
    }
}

impl GammaConfig {
    /// The gamma process.
    pub fn process(&self) -> fv_core::Result<GammaProcess> {
        GammaProcess::new(self.mean_rate, self.variance_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn empty_document_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.tree.steps, 4000);
        assert_eq!(config.fft.n, 4096);
        assert_eq!(config.pde.spot_points, 1001);
    }

    #[test]
    fn sections_override_only_given_keys() {
        let config = Config::from_toml_str(
            r#"
            [market]
            s0 = 120.0

            [option]
            option_type = "put"
            exercise = "american"

            [mc]
            paths = 40000

            [pde]
            scheme = "crank-nicolson"

            [tree]
            kind = "tian"

            [tree.sweep]
            points = 25

            [bg.sampling]
            lambda_plus = 12.0
            lambda_minus = 4.0
            "#,
        )
        .unwrap();
        assert_abs_diff_eq!(config.market.s0, 120.0);
        assert_abs_diff_eq!(config.market.r, 0.05);
        assert_eq!(config.option.option_type, OptionType::Put);
        assert_eq!(config.option.exercise, ExerciseType::American);
        assert_eq!(config.mc.paths, 40_000);
        assert_eq!(config.mc.steps, McSettings::default().steps);
        assert_eq!(config.pde.scheme, FdmScheme::CrankNicolson);
        assert_eq!(config.tree.kind, TreeKind::Tian);
        assert_eq!(config.tree.sweep.points, 25);
        assert_abs_diff_eq!(config.tree.sweep.high, 2.0);
        assert_eq!(config.bg.sampling, Some(BgSamplingMeasure::default()));
    }

    #[test]
    fn builds_processes_and_option() {
        let config = Config::default();
        assert!(config.market.bsm_process().is_ok());
        assert!(config.heston.process(&config.market).is_ok());
        assert!(config.vg.process(&config.market).is_ok());
        assert!(config.bg.process(&config.market).is_ok());
        assert!(config.cir.process().is_ok());
        assert!(config.poisson.process().is_ok());
        assert!(config.gamma.process().is_ok());
        let option = config.option.vanilla().unwrap();
        assert_eq!(option.option_type(), OptionType::Call);
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        assert!(Config::from_toml_str("[pde]\nscheme = \"leapfrog\"").is_err());
    }
}
