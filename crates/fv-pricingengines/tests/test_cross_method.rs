//! Cross-method agreement.
//!
//! Every engine is handed the same instrument; deterministic engines must
//! agree with the closed form to their discretisation error and Monte Carlo
//! engines to a few standard errors.

use fv_instruments::{OptionType, PricingEngine, VanillaOption, VanillaOptionArguments};
use fv_methods::finite_differences::{FdmScheme, PdeGrid};
use fv_methods::McSettings;
use fv_pricingengines::{
    AnalyticEuropeanEngine, AnalyticHestonEngine, BinomialEngine, CarrMadanEngine,
    FdBlackScholesEngine, LognormalIntegralEngine, McAmericanEngine, McEuropeanEngine,
    McHestonEngine,
};
use fv_processes::{BlackScholesMertonProcess, HestonProcess};

fn bsm() -> BlackScholesMertonProcess {
    BlackScholesMertonProcess::new(100.0, 0.05, 0.02, 0.25).unwrap()
}

fn npv(option: &VanillaOption, engine: &dyn PricingEngine<VanillaOptionArguments>) -> f64 {
    option.price(engine).unwrap().npv
}

// ───────────────────────── deterministic engines ─────────────────────────

#[test]
fn test_european_put_agrees_across_deterministic_engines() {
    let option = VanillaOption::european(OptionType::Put, 105.0, 1.5).unwrap();
    let reference = npv(&option, &AnalyticEuropeanEngine::new(bsm()));

    let candidates: [(&str, Box<dyn PricingEngine<VanillaOptionArguments>>, f64); 4] = [
        ("lognormal integral", Box::new(LognormalIntegralEngine::new(bsm())), 1e-6),
        ("binomial", Box::new(BinomialEngine::new(bsm()).with_steps(1_500)), 1e-2),
        ("carr-madan", Box::new(CarrMadanEngine::new(bsm())), 1e-3),
        (
            "crank-nicolson",
            Box::new(
                FdBlackScholesEngine::new(bsm())
                    .with_scheme(FdmScheme::CrankNicolson)
                    .with_grid(PdeGrid {
                        spot_points: 601,
                        time_steps: 600,
                        width: 3.0,
                    }),
            ),
            5e-2,
        ),
    ];
    for (name, engine, tolerance) in candidates {
        let value = npv(&option, engine.as_ref());
        assert!(
            (value - reference).abs() < tolerance,
            "{name}: {value:.6} vs closed form {reference:.6}"
        );
    }
}

#[test]
fn test_every_european_engine_rejects_american_exercise() {
    let option = VanillaOption::american(OptionType::Put, 100.0, 1.0).unwrap();
    let settings = McSettings::new(100, 5, 1).unwrap();
    let engines: [Box<dyn PricingEngine<VanillaOptionArguments>>; 5] = [
        Box::new(AnalyticEuropeanEngine::new(bsm())),
        Box::new(LognormalIntegralEngine::new(bsm())),
        Box::new(CarrMadanEngine::new(bsm())),
        Box::new(FdBlackScholesEngine::new(bsm())),
        Box::new(McEuropeanEngine::new(bsm(), settings)),
    ];
    for engine in engines {
        assert!(option.price(engine.as_ref()).is_err());
    }
}

// ───────────────────────── Monte Carlo ─────────────────────────

#[test]
fn test_mc_european_within_four_standard_errors() {
    let option = VanillaOption::european(OptionType::Call, 95.0, 1.0).unwrap();
    let reference = npv(&option, &AnalyticEuropeanEngine::new(bsm()));
    let res = option
        .price(&McEuropeanEngine::new(bsm(), McSettings::new(40_000, 20, 2024).unwrap()))
        .unwrap();
    let err = res.error_estimate.unwrap();
    assert!((res.npv - reference).abs() < 4.0 * err, "{} ± {err} vs {reference}", res.npv);
}

#[test]
fn test_lsm_close_to_binomial_american_put() {
    let option = VanillaOption::american(OptionType::Put, 110.0, 1.0).unwrap();
    let tree = npv(&option, &BinomialEngine::new(bsm()).with_steps(2_000));
    let lsm = option
        .price(&McAmericanEngine::new(bsm(), McSettings::new(20_000, 50, 17).unwrap()))
        .unwrap();
    // discrete exercise dates and the regression bias keep LSM slightly low
    assert!((lsm.npv - tree).abs() < 0.15, "LSM {:.4} vs tree {tree:.4}", lsm.npv);
}

#[test]
fn test_heston_fft_and_mc_agree_with_semi_analytic() {
    let heston = HestonProcess::new(100.0, 0.04, 0.03, 0.0, 1.5, 0.04, 0.3, -0.6).unwrap();
    let option = VanillaOption::european(OptionType::Put, 100.0, 1.0).unwrap();
    let reference = npv(&option, &AnalyticHestonEngine::new(heston));

    let fft = npv(&option, &CarrMadanEngine::new(heston));
    assert!((fft - reference).abs() < 5e-3, "FFT {fft:.5} vs {reference:.5}");

    let mc = option
        .price(&McHestonEngine::new(heston, McSettings::new(20_000, 200, 99).unwrap()))
        .unwrap();
    let err = mc.error_estimate.unwrap();
    // Euler bias adds to the sampling error
    assert!((mc.npv - reference).abs() < 4.0 * err + 0.05, "MC {} ± {err} vs {reference}", mc.npv);
}
