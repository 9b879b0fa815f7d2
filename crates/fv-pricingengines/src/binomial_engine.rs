//! Binomial-tree engine for European and American vanilla options.

use fv_core::{ensure, errors::Result, Real, Time};
use fv_instruments::{
    ExerciseType, OptionType, Payoff, PlainVanillaPayoff, PricingEngine, PricingResults,
    VanillaOptionArguments,
};
use fv_math::linspace;
use fv_methods::lattice::{price_american, price_european, BinomialTree};
use fv_processes::BlackScholesMertonProcess;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analytic_european_engine::black_scholes_merton;

/// Parameterisation of the binomial tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TreeKind {
    /// Cox-Ross-Rubinstein.
    #[default]
    CoxRossRubinstein,
    /// Jarrow-Rudd equal probabilities.
    JarrowRudd,
    /// Tian moment matching.
    Tian,
}

impl TreeKind {
    /// Build a tree of this kind.
    pub fn build(
        self,
        process: &BlackScholesMertonProcess,
        maturity: Time,
        steps: usize,
    ) -> Result<BinomialTree> {
        match self {
            TreeKind::CoxRossRubinstein => BinomialTree::cox_ross_rubinstein(process, maturity, steps),
            TreeKind::JarrowRudd => BinomialTree::jarrow_rudd(process, maturity, steps),
            TreeKind::Tian => BinomialTree::tian(process, maturity, steps),
        }
    }
}

/// Lattice pricing engine.
#[derive(Debug, Clone)]
pub struct BinomialEngine {
    process: BlackScholesMertonProcess,
    steps: usize,
    kind: TreeKind,
}

impl BinomialEngine {
    /// Default tree depth.
    pub const DEFAULT_STEPS: usize = 4000;

    /// Cox-Ross-Rubinstein engine with [`Self::DEFAULT_STEPS`] steps.
    pub fn new(process: BlackScholesMertonProcess) -> Self {
        Self {
            process,
            steps: Self::DEFAULT_STEPS,
            kind: TreeKind::default(),
        }
    }

    /// Set the tree depth.
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Set the tree parameterisation.
    pub fn with_kind(mut self, kind: TreeKind) -> Self {
        self.kind = kind;
        self
    }
}

impl PricingEngine<VanillaOptionArguments> for BinomialEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let maturity = args.maturity();
        if maturity == 0.0 {
            return Ok(PricingResults::from_npv(args.payoff.value(self.process.s0())));
        }
        let tree = self.kind.build(&self.process, maturity, self.steps)?;
        let payoff = |s: Real| args.payoff.value(s);
        let npv = match args.exercise.exercise_type() {
            ExerciseType::European => price_european(&tree, &payoff),
            ExerciseType::American => price_american(&tree, &payoff),
        };
        debug!(kind = ?self.kind, steps = self.steps, npv, "binomial tree");
        Ok(PricingResults::from_npv(npv).with_result("probability_up", tree.probability_up()))
    }
}

// ─── American versus European sweep ───────────────────────────────────────────

/// Spot range and tree depth of [`american_european_sweep`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSettings {
    /// Lowest spot as a multiple of the strike.
    pub low: Real,
    /// Highest spot as a multiple of the strike.
    pub high: Real,
    /// Number of spots.
    pub points: usize,
    /// Tree depth for the American prices.
    pub steps: usize,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            low: 0.5,
            high: 2.0,
            points: 100,
            steps: 2000,
        }
    }
}

/// One spot of the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    /// Initial spot.
    pub spot: Real,
    /// Immediate exercise value.
    pub intrinsic: Real,
    /// American price from the tree.
    pub american: Real,
    /// European closed-form price.
    pub european: Real,
}

/// Intrinsic, American and European values over a range of spots. The
/// process supplies rates and volatility; its spot is replaced.
pub fn american_european_sweep(
    process: &BlackScholesMertonProcess,
    option_type: OptionType,
    strike: Real,
    maturity: Time,
    settings: SweepSettings,
) -> Result<Vec<SweepPoint>> {
    ensure!(strike > 0.0, "strike must be positive, got {strike}");
    ensure!(
        settings.low > 0.0 && settings.high > settings.low,
        "spot range must satisfy 0 < low < high"
    );
    ensure!(settings.points >= 2, "need at least two spots");
    let payoff = PlainVanillaPayoff::new(option_type, strike);
    let exercise = |s: Real| payoff.value(s);

    linspace(settings.low * strike, settings.high * strike, settings.points)
        .into_iter()
        .map(|spot| {
            let p = process.with_spot(spot)?;
            let tree = BinomialTree::cox_ross_rubinstein(&p, maturity, settings.steps)?;
            Ok(SweepPoint {
                spot,
                intrinsic: payoff.value(spot),
                american: price_american(&tree, &exercise),
                european: black_scholes_merton(
                    option_type,
                    spot,
                    strike,
                    p.risk_free_rate(),
                    p.dividend_yield(),
                    p.volatility(),
                    maturity,
                )
                .price,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fv_instruments::VanillaOption;

    fn process() -> BlackScholesMertonProcess {
        BlackScholesMertonProcess::new(100.0, 0.05, 0.02, 0.2).unwrap()
    }

    #[test]
    fn european_matches_closed_form() {
        let option = VanillaOption::european(OptionType::Put, 100.0, 1.0).unwrap();
        let bs = black_scholes_merton(OptionType::Put, 100.0, 100.0, 0.05, 0.02, 0.2, 1.0).price;
        for kind in [TreeKind::CoxRossRubinstein, TreeKind::JarrowRudd, TreeKind::Tian] {
            let engine = BinomialEngine::new(process()).with_steps(1_000).with_kind(kind);
            let npv = option.price(&engine).unwrap().npv;
            assert!((npv - bs).abs() < 0.01, "{kind:?}: {npv:.5} vs {bs:.5}");
        }
    }

    #[test]
    fn american_put_carries_early_exercise_premium() {
        let engine = BinomialEngine::new(process()).with_steps(1_000);
        let am = VanillaOption::american(OptionType::Put, 110.0, 1.0).unwrap();
        let eu = VanillaOption::european(OptionType::Put, 110.0, 1.0).unwrap();
        let (a, e) = (am.price(&engine).unwrap().npv, eu.price(&engine).unwrap().npv);
        assert!(a > e + 0.05, "American {a:.4} vs European {e:.4}");
    }

    #[test]
    fn expired_option_is_intrinsic() {
        let option = VanillaOption::american(OptionType::Put, 110.0, 0.0).unwrap();
        let npv = option.price(&BinomialEngine::new(process())).unwrap().npv;
        assert_eq!(npv, 10.0);
    }

    #[test]
    fn sweep_orders_values() {
        let settings = SweepSettings {
            points: 20,
            steps: 300,
            ..SweepSettings::default()
        };
        let sweep = american_european_sweep(&process(), OptionType::Put, 100.0, 1.0, settings).unwrap();
        assert_eq!(sweep.len(), 20);
        assert_eq!(sweep[0].spot, 50.0);
        assert_eq!(sweep[19].spot, 200.0);
        for pt in &sweep {
            assert!(pt.american + 1e-9 >= pt.intrinsic, "{pt:?}");
            assert!(pt.american + 0.01 >= pt.european, "{pt:?}");
        }
        // deep in the money the American put is exercised at once
        assert!((sweep[0].american - 50.0).abs() < 1e-9);
        assert!(sweep[0].european < 50.0);
    }
}
