//! `fairvalue` command-line pricer.
//!
//! Every subcommand reads the scenario from `--config` (defaults when
//! absent), runs one technique and prints either `key: value` lines or CSV.
//! Logs go to stderr; set `RUST_LOG` to change the level.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fairvalue::config::Config;
use fv_core::{Real, Time};
use fv_math::normal_cdf_inverse;
use fv_instruments::{PricingEngine, PricingResults, VanillaOption, VanillaOptionArguments};
use fv_methods::monte_carlo::{
    cir::simulate_cir_paths, gbm::simulate_gbm_paths, gbm::GbmScheme,
    heston::simulate_heston_paths, levy::simulate_bg_paths, levy::simulate_gamma_paths,
    levy::simulate_vg_paths, path_mean, poisson::simulate_poisson_paths, MultiPath, Path,
};
use fv_pricingengines::{
    american_european_sweep, black_scholes_merton, carr_madan_call_curve, finite_difference_greeks,
    implied_volatility, lognormal_integral_price, price_curve_over_volatility,
    AnalyticHestonEngine, BinomialEngine, CarrMadanEngine, CharacteristicFunction,
    FdBlackScholesEngine, ImportanceSampling, McAmericanEngine, McBilateralGammaEngine,
    McEuropeanEngine, McHestonEngine, McVarianceGammaEngine, DEFAULT_CURVE_POINTS,
    DEFAULT_VOLATILITY_BRACKET,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "fairvalue")]
#[command(about = "Numerical option pricing under BSM, Heston, VG and BG dynamics")]
#[command(version)]
struct Cli {
    /// TOML scenario file overriding the defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the number of Monte Carlo paths
    #[arg(long, global = true)]
    paths: Option<usize>,

    /// Override the number of Monte Carlo time steps
    #[arg(long, global = true)]
    steps: Option<usize>,

    /// Override the Monte Carlo seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Black-Scholes-Merton closed form, bumped Greeks and the lognormal integral
    Analytic,
    /// Implied volatility of a European price
    ImpliedVol {
        /// Observed option price
        #[arg(long)]
        price: Real,
        /// Print the price-over-volatility curve as CSV instead
        #[arg(long)]
        curve: bool,
    },
    /// Binomial tree price (European or American per the config)
    Tree,
    /// Intrinsic, American and European values over a range of spots, as CSV
    Sweep,
    /// Least-squares Monte Carlo price of the option with American exercise
    Lsm,
    /// Semi-analytic Heston price
    Heston,
    /// Carr-Madan FFT price
    Fft {
        #[arg(long, value_enum, default_value_t = Model::Bsm)]
        model: Model,
        /// Print the whole call curve as CSV instead
        #[arg(long)]
        curve: bool,
    },
    /// Finite-difference price, delta and gamma
    Pde,
    /// Monte Carlo European price
    Mc {
        #[arg(long, value_enum, default_value_t = Model::Bsm)]
        model: Model,
        /// Path scheme for BSM
        #[arg(long, value_enum, default_value_t = GbmScheme::ExactBrownianSum)]
        scheme: GbmScheme,
        /// Importance sampling for BSM; the shift defaults to the strike-centring one
        #[arg(long)]
        importance: bool,
        /// Explicit importance shift λ
        #[arg(long, requires = "importance")]
        lambda: Option<Real>,
        /// Antithetic pairs under importance sampling
        #[arg(long, requires = "importance")]
        antithetic: bool,
    },
    /// Simulated paths as CSV, one column per path
    Paths {
        #[arg(value_enum)]
        process: PathProcess,
        /// Append the pointwise sample mean and the analytic mean of each series
        #[arg(long)]
        mean: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Model {
    Bsm,
    Heston,
    Vg,
    Bg,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PathProcess {
    Gbm,
    Cir,
    Heston,
    Vg,
    Bg,
    Gamma,
    Poisson,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(paths) = cli.paths {
        config.mc.paths = paths;
    }
    if let Some(steps) = cli.steps {
        config.mc.steps = steps;
    }
    if let Some(seed) = cli.seed {
        config.mc.seed = seed;
    }
    config.mc.validate()?;

    run(cli.command, &config)
}

fn run(command: Commands, config: &Config) -> Result<()> {
    let market = &config.market;
    let terms = &config.option;
    let option = terms.vanilla()?;
    let mut out = io::stdout().lock();

    match command {
        Commands::Analytic => {
            let bsm = market.bsm_process()?;
            let (kind, s0, strike, r, q, sigma, maturity) = (
                terms.option_type,
                market.s0,
                terms.strike,
                market.r,
                market.q,
                market.sigma,
                terms.maturity,
            );
            let closed = black_scholes_merton(kind, s0, strike, r, q, sigma, maturity);
            let bumped = finite_difference_greeks(kind, s0, strike, r, q, sigma, maturity)?;
            let integral = lognormal_integral_price(&bsm, option.payoff(), terms.maturity)?;
            writeln!(out, "method,price,delta,gamma,vega,theta,rho")?;
            for (name, g) in [("closed-form", closed), ("bumped", bumped)] {
                writeln!(
                    out,
                    "{name},{},{},{},{},{},{}",
                    g.price, g.delta, g.gamma, g.vega, g.theta, g.rho
                )?;
            }
            writeln!(out, "lognormal-integral,{integral},,,,,")?;
        }
        Commands::ImpliedVol { price, curve } => {
            if curve {
                let points = price_curve_over_volatility(
                    terms.option_type,
                    market.s0,
                    terms.strike,
                    market.r,
                    market.q,
                    terms.maturity,
                    DEFAULT_VOLATILITY_BRACKET,
                    DEFAULT_CURVE_POINTS,
                )?;
                writeln!(out, "sigma,price")?;
                for (sigma, value) in points {
                    writeln!(out, "{sigma},{value}")?;
                }
            } else {
                let sigma = implied_volatility(
                    terms.option_type,
                    price,
                    market.s0,
                    terms.strike,
                    market.r,
                    market.q,
                    terms.maturity,
                    DEFAULT_VOLATILITY_BRACKET,
                    1e-10,
                )
                .context("implied volatility")?;
                writeln!(out, "implied_volatility: {sigma}")?;
            }
        }
        Commands::Tree => {
            let engine = BinomialEngine::new(market.bsm_process()?)
                .with_steps(config.tree.steps)
                .with_kind(config.tree.kind);
            report(&mut out, &option.price(&engine)?)?;
        }
        Commands::Sweep => {
            let sweep = american_european_sweep(
                &market.bsm_process()?,
                terms.option_type,
                terms.strike,
                terms.maturity,
                config.tree.sweep,
            )?;
            writeln!(out, "spot,intrinsic,american,european")?;
            for p in sweep {
                writeln!(out, "{},{},{},{}", p.spot, p.intrinsic, p.american, p.european)?;
            }
        }
        Commands::Lsm => {
            let american = VanillaOption::american(terms.option_type, terms.strike, terms.maturity)?;
            let engine = McAmericanEngine::new(market.bsm_process()?, config.mc);
            report(&mut out, &american.price(&engine)?)?;
        }
        Commands::Heston => {
            let engine = AnalyticHestonEngine::new(config.heston.process(market)?);
            report(&mut out, &option.price(&engine)?)?;
        }
        Commands::Fft { model, curve } => {
            let cf: Box<dyn CharacteristicFunction> = match model {
                Model::Bsm => Box::new(market.bsm_process()?),
                Model::Heston => Box::new(config.heston.process(market)?),
                Model::Vg => Box::new(config.vg.process(market)?),
                Model::Bg => Box::new(config.bg.process(market)?),
            };
            if curve {
                let calls = carr_madan_call_curve(cf.as_ref(), terms.maturity, config.fft)?;
                writeln!(out, "strike,call")?;
                for (k, c) in calls.strikes.iter().zip(&calls.calls) {
                    writeln!(out, "{k},{c}")?;
                }
            } else {
                let engine = CarrMadanEngine::with_params(cf, config.fft);
                report(&mut out, &option.price(&engine)?)?;
            }
        }
        Commands::Pde => {
            let engine = FdBlackScholesEngine::new(market.bsm_process()?)
                .with_grid(config.pde.grid())
                .with_scheme(config.pde.scheme);
            report(&mut out, &option.price(&engine)?)?;
        }
        Commands::Mc {
            model,
            scheme,
            importance,
            lambda,
            antithetic,
        } => {
            let engine: Box<dyn PricingEngine<VanillaOptionArguments>> = match model {
                Model::Bsm => {
                    let engine = McEuropeanEngine::new(market.bsm_process()?, config.mc)
                        .with_scheme(scheme);
                    if importance {
                        Box::new(engine.with_importance_sampling(ImportanceSampling { lambda, antithetic }))
                    } else {
                        Box::new(engine)
                    }
                }
                Model::Heston => Box::new(
                    McHestonEngine::new(config.heston.process(market)?, config.mc)
                        .with_options(config.heston.mc_options()),
                ),
                Model::Vg => Box::new(McVarianceGammaEngine::new(config.vg.process(market)?, config.mc)),
                Model::Bg => {
                    let engine = McBilateralGammaEngine::new(config.bg.process(market)?, config.mc);
                    match config.bg.sampling {
                        Some(measure) => Box::new(engine.with_sampling_measure(measure)),
                        None => Box::new(engine),
                    }
                }
            };
            report(&mut out, &option.price(engine.as_ref())?)?;
        }
        Commands::Paths { process, mean } => write_paths(&mut out, process, mean, config)?,
    }
    Ok(())
}

fn report(out: &mut impl Write, results: &PricingResults) -> Result<()> {
    writeln!(out, "npv: {}", results.npv)?;
    if let Some(err) = results.error_estimate {
        let z = normal_cdf_inverse(0.975)?;
        writeln!(out, "std_error: {err}")?;
        writeln!(out, "ci95: [{}, {}]", results.npv - z * err, results.npv + z * err)?;
    }
    for (key, value) in &results.additional_results {
        writeln!(out, "{key}: {value}")?;
    }
    Ok(())
}

/// Columns of the chosen asset of each multi-asset path.
fn asset_paths(paths: &[MultiPath], asset: usize) -> Result<Vec<Path>> {
    paths
        .iter()
        .map(|p| p.asset(asset).cloned().context("missing path component"))
        .collect()
}

/// One family of simulated trajectories with its analytic mean `E[X_t]`.
struct PathSeries {
    label: &'static str,
    paths: Vec<Path>,
    expected: Box<dyn Fn(Time) -> Real>,
}

impl PathSeries {
    fn new(label: &'static str, paths: Vec<Path>, expected: impl Fn(Time) -> Real + 'static) -> Self {
        Self {
            label,
            paths,
            expected: Box::new(expected),
        }
    }
}

fn simulate_series(process: PathProcess, config: &Config) -> Result<Vec<PathSeries>> {
    let market = &config.market;
    let maturity = config.option.maturity;
    let mc = config.mc;
    let (s0, carry) = (market.s0, market.r - market.q);
    let forward = move |t: Time| s0 * (carry * t).exp();

    let series = match process {
        PathProcess::Gbm => {
            let bsm = market.bsm_process()?;
            vec![PathSeries::new("path", simulate_gbm_paths(&bsm, maturity, mc)?, forward)]
        }
        PathProcess::Cir => {
            let cir = config.cir.process()?;
            let reflected = simulate_cir_paths(&cir, maturity, mc)?;
            info!(rate = reflected.reflection_rate, "negative-variance rate");
            vec![PathSeries::new("path", reflected.paths, move |t| cir.expected_value(t))]
        }
        PathProcess::Heston => {
            let heston = config.heston.process(market)?;
            let variance = heston.variance_process()?;
            let reflected = simulate_heston_paths(&heston, maturity, mc)?;
            info!(rate = reflected.reflection_rate, "negative-variance rate");
            vec![
                PathSeries::new("spot", asset_paths(&reflected.paths, 0)?, forward),
                PathSeries::new("variance", asset_paths(&reflected.paths, 1)?, move |t| {
                    variance.expected_value(t)
                }),
            ]
        }
        PathProcess::Vg => {
            let paths = simulate_vg_paths(&config.vg.process(market)?, maturity, mc)?;
            vec![PathSeries::new("path", asset_paths(&paths, 0)?, forward)]
        }
        PathProcess::Bg => {
            let paths = simulate_bg_paths(&config.bg.process(market)?, maturity, mc)?;
            vec![PathSeries::new("path", asset_paths(&paths, 0)?, forward)]
        }
        PathProcess::Gamma => {
            let gamma = config.gamma.process()?;
            let paths = simulate_gamma_paths(&gamma, config.gamma.maturity, mc)?;
            vec![PathSeries::new("path", paths, move |t| gamma.mean_rate() * t)]
        }
        PathProcess::Poisson => {
            let poisson = config.poisson.process()?;
            let paths =
                simulate_poisson_paths(&poisson, config.poisson.maturity, mc, config.poisson.method)?;
            vec![PathSeries::new("path", paths, move |t| poisson.expected_count(t))]
        }
    };
    Ok(series)
}

/// CSV with a time column, one column per path of each series and, with
/// `mean`, the sample mean next to the analytic mean of each series.
fn write_paths(out: &mut impl Write, process: PathProcess, mean: bool, config: &Config) -> Result<()> {
    let series = simulate_series(process, config)?;
    let Some(times) = series.first().and_then(|s| s.paths.first()).map(|p| p.times.clone()) else {
        bail!("no paths simulated");
    };
    let averages = if mean {
        series
            .iter()
            .map(|s| path_mean(&s.paths))
            .collect::<fv_core::Result<Vec<_>>>()?
    } else {
        Vec::new()
    };

    write!(out, "t")?;
    for s in &series {
        for j in 0..s.paths.len() {
            write!(out, ",{}{j}", s.label)?;
        }
    }
    if mean {
        for s in &series {
            write!(out, ",{0}_mean,{0}_expected", s.label)?;
        }
    }
    writeln!(out)?;
    for (i, &t) in times.iter().enumerate() {
        write!(out, "{t}")?;
        for s in &series {
            for p in &s.paths {
                write!(out, ",{}", p.values[i])?;
            }
        }
        for (s, avg) in series.iter().zip(&averages) {
            write!(out, ",{},{}", avg[i], (s.expected)(t))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["fairvalue", "--paths", "100", "mc", "--model", "heston"]).unwrap();
        assert_eq!(cli.paths, Some(100));
        assert!(matches!(cli.command, Commands::Mc { model: Model::Heston, .. }));

        let cli = Cli::try_parse_from(["fairvalue", "paths", "cir", "--mean"]).unwrap();
        assert!(matches!(cli.command, Commands::Paths { process: PathProcess::Cir, mean: true }));
    }

    #[test]
    fn lambda_requires_importance() {
        assert!(Cli::try_parse_from(["fairvalue", "mc", "--lambda", "0.5"]).is_err());
    }

    #[test]
    fn report_lists_results_in_order() {
        let results = PricingResults::from_npv(1.5)
            .with_error_estimate(0.01)
            .with_result("gamma", 0.2)
            .with_result("delta", 0.5);
        let mut buf = Vec::new();
        report(&mut buf, &results).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "npv: 1.5");
        assert_eq!(lines[1], "std_error: 0.01");
        assert!(lines[2].starts_with("ci95: [1.48"));
        assert_eq!(&lines[3..], ["delta: 0.5", "gamma: 0.2"]);
    }

    #[test]
    fn writes_path_csv_with_sample_and_analytic_means() {
        let mut config = Config::default();
        config.mc.paths = 3;
        config.mc.steps = 4;
        let mut buf = Vec::new();
        write_paths(&mut buf, PathProcess::Gbm, true, &config).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "t,path0,path1,path2,path_mean,path_expected");
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "0,100,100,100,100,100");
        let last: Vec<f64> = lines[5].split(',').map(|v| v.parse().unwrap()).collect();
        // S₀ e^{(r−q)T} with r = 5%, q = 2%, T = 1
        assert!((last[5] - 100.0 * 0.03_f64.exp()).abs() < 1e-9);
    }

    #[test]
    fn heston_paths_include_variance() {
        let mut config = Config::default();
        config.mc.paths = 2;
        config.mc.steps = 3;
        let mut buf = Vec::new();
        write_paths(&mut buf, PathProcess::Heston, true, &config).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "t,spot0,spot1,variance0,variance1,spot_mean,spot_expected,variance_mean,variance_expected"
        );
        assert_eq!(lines[1], "0,100,100,0.04,0.04,100,100,0.04,0.04");
    }

    #[test]
    fn lsm_prices_american_under_default_scenario() {
        let mut config = Config::default();
        config.mc.paths = 500;
        config.mc.steps = 10;
        assert_eq!(config.option.exercise, fv_instruments::ExerciseType::European);
        run(Commands::Lsm, &config).unwrap();
    }

    #[test]
    fn scheme_flag_parses_into_gbm_scheme() {
        let cli = Cli::try_parse_from(["fairvalue", "mc", "--scheme", "terminal-sample"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Mc { scheme: GbmScheme::TerminalSample, .. }
        ));
    }
}
