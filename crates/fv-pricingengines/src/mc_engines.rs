//! Monte Carlo pricing engines.
//!
//! Thin [`PricingEngine`] wrappers over the estimators in
//! [`fv_methods::monte_carlo`]. Every engine reports the standard error of
//! its estimate through [`PricingResults::error_estimate`]; model-specific
//! diagnostics go into the additional results.

use fv_core::{errors::Error, errors::Result, Real};
use fv_instruments::{ExerciseType, PricingEngine, PricingResults, VanillaOptionArguments};
use fv_methods::monte_carlo::{
    gbm::{mc_bsm_european, mc_bsm_importance, optimal_bsm_lambda, GbmScheme},
    heston::{mc_heston_european, HestonMcOptions},
    levy::{mc_bg_european, mc_vg_european, BgSamplingMeasure},
    longstaff_schwartz::longstaff_schwartz,
    McEstimate, McSettings,
};
use fv_processes::{
    BilateralGammaProcess, BlackScholesMertonProcess, HestonProcess, VarianceGammaProcess,
};
use serde::{Deserialize, Serialize};

use crate::analytic_european_engine::require_european;

fn estimate_results(estimate: &McEstimate) -> PricingResults {
    PricingResults::from_npv(estimate.value)
        .with_error_estimate(estimate.std_error)
        .with_result("variance", estimate.variance)
        .with_result("samples", estimate.samples as Real)
}

// ─── Black-Scholes-Merton ─────────────────────────────────────────────────────

/// Drift tilt applied by [`McEuropeanEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportanceSampling {
    /// Shift `λ`; `None` centres the terminal spot on the strike.
    pub lambda: Option<Real>,
    /// Pair each path with its mirrored shocks.
    pub antithetic: bool,
}

/// European Monte Carlo engine under Black-Scholes-Merton.
#[derive(Debug, Clone)]
pub struct McEuropeanEngine {
    process: BlackScholesMertonProcess,
    settings: McSettings,
    scheme: GbmScheme,
    importance: Option<ImportanceSampling>,
}

impl McEuropeanEngine {
    /// Plain sampling with [`GbmScheme::ExactBrownianSum`].
    pub fn new(process: BlackScholesMertonProcess, settings: McSettings) -> Self {
        Self {
            process,
            settings,
            scheme: GbmScheme::default(),
            importance: None,
        }
    }

    /// Select the path scheme. Ignored under importance sampling, which
    /// always steps with Euler.
    pub fn with_scheme(mut self, scheme: GbmScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Enable importance sampling.
    pub fn with_importance_sampling(mut self, importance: ImportanceSampling) -> Self {
        self.importance = Some(importance);
        self
    }
}

impl PricingEngine<VanillaOptionArguments> for McEuropeanEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        require_european(args, "Monte Carlo BSM engine")?;
        let maturity = args.maturity();
        let payoff = args.payoff.as_ref();
        match self.importance {
            None => {
                let estimate =
                    mc_bsm_european(&self.process, payoff, maturity, self.settings, self.scheme)?;
                Ok(estimate_results(&estimate))
            }
            Some(importance) => {
                let lambda = match importance.lambda {
                    Some(lambda) => lambda,
                    None => optimal_bsm_lambda(&self.process, args.strike(), maturity)?,
                };
                let estimate = mc_bsm_importance(
                    &self.process,
                    payoff,
                    maturity,
                    self.settings,
                    lambda,
                    importance.antithetic,
                )?;
                Ok(estimate_results(&estimate).with_result("lambda", lambda))
            }
        }
    }
}

// ─── Heston ───────────────────────────────────────────────────────────────────

/// European Monte Carlo engine under Heston.
#[derive(Debug, Clone)]
pub struct McHestonEngine {
    process: HestonProcess,
    settings: McSettings,
    options: HestonMcOptions,
}

impl McHestonEngine {
    /// Euler variance steps, no importance sampling.
    pub fn new(process: HestonProcess, settings: McSettings) -> Self {
        Self {
            process,
            settings,
            options: HestonMcOptions::default(),
        }
    }

    /// Set the variance scheme and importance shift.
    pub fn with_options(mut self, options: HestonMcOptions) -> Self {
        self.options = options;
        self
    }
}

impl PricingEngine<VanillaOptionArguments> for McHestonEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        require_european(args, "Monte Carlo Heston engine")?;
        let outcome = mc_heston_european(
            &self.process,
            args.payoff.as_ref(),
            args.maturity(),
            self.settings,
            self.options,
        )?;
        Ok(estimate_results(&outcome.estimate).with_result("reflection_rate", outcome.reflection_rate))
    }
}

// ─── Lévy models ──────────────────────────────────────────────────────────────

/// European Monte Carlo engine under Variance-Gamma.
#[derive(Debug, Clone)]
pub struct McVarianceGammaEngine {
    process: VarianceGammaProcess,
    settings: McSettings,
}

impl McVarianceGammaEngine {
    /// Create the engine.
    pub fn new(process: VarianceGammaProcess, settings: McSettings) -> Self {
        Self { process, settings }
    }
}

impl PricingEngine<VanillaOptionArguments> for McVarianceGammaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        require_european(args, "Monte Carlo VG engine")?;
        let outcome =
            mc_vg_european(&self.process, args.payoff.as_ref(), args.maturity(), self.settings)?;
        Ok(estimate_results(&outcome.estimate)
            .with_result("mean_terminal_spot", outcome.mean_terminal_spot)
            .with_result("expected_terminal_spot", outcome.expected_terminal_spot))
    }
}

/// European Monte Carlo engine under Bilateral Gamma, optionally sampling
/// the gamma legs under a different measure.
#[derive(Debug, Clone)]
pub struct McBilateralGammaEngine {
    process: BilateralGammaProcess,
    settings: McSettings,
    measure: Option<BgSamplingMeasure>,
}

impl McBilateralGammaEngine {
    /// Sample under the pricing measure.
    pub fn new(process: BilateralGammaProcess, settings: McSettings) -> Self {
        Self {
            process,
            settings,
            measure: None,
        }
    }

    /// Sample under `measure` and reweight.
    pub fn with_sampling_measure(mut self, measure: BgSamplingMeasure) -> Self {
        self.measure = Some(measure);
        self
    }
}

impl PricingEngine<VanillaOptionArguments> for McBilateralGammaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        require_european(args, "Monte Carlo BG engine")?;
        let estimate = mc_bg_european(
            &self.process,
            args.payoff.as_ref(),
            args.maturity(),
            self.settings,
            self.measure,
        )?;
        Ok(estimate_results(&estimate))
    }
}

// ─── American ─────────────────────────────────────────────────────────────────

/// Least-squares Monte Carlo engine for American options.
#[derive(Debug, Clone)]
pub struct McAmericanEngine {
    process: BlackScholesMertonProcess,
    settings: McSettings,
}

impl McAmericanEngine {
    /// Exercise dates are the `settings.steps` simulation dates.
    pub fn new(process: BlackScholesMertonProcess, settings: McSettings) -> Self {
        Self { process, settings }
    }
}

impl PricingEngine<VanillaOptionArguments> for McAmericanEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        if args.exercise.exercise_type() != ExerciseType::American {
            return Err(Error::NotImplemented(
                "least-squares Monte Carlo engine prices American exercise only".into(),
            ));
        }
        let estimate =
            longstaff_schwartz(&self.process, args.payoff.as_ref(), args.maturity(), self.settings)?;
        Ok(estimate_results(&estimate))
    }
}
