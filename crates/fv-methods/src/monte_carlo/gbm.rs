//! Geometric Brownian motion under Black-Scholes-Merton.
//!
//! Three estimators of a European price share one interface
//! ([`GbmScheme`]). [`mc_bsm_importance`] tilts the drift by `−σλ` and
//! reweights each path with the Radon-Nikodym factor
//! `exp(λW_T − ½λ²T)`, optionally pairing paths antithetically.

use fv_core::{ensure, errors::Result, Real, Time};
use fv_instruments::Payoff;
use fv_math::Statistics;
use fv_processes::BlackScholesMertonProcess;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EuropeanPathPricer, McEstimate, McSettings, MonteCarloModel, Path};

/// How terminal spot prices are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum GbmScheme {
    /// Sum `n` Brownian increments, then apply the exact lognormal map.
    #[default]
    ExactBrownianSum,
    /// One normal draw for `ln S_T`.
    TerminalSample,
    /// Multiplicative Euler stepping on `S`.
    Euler,
}

/// Euler paths `S_{i+1} = S_i (1 + (r−q)Δt + σ√Δt x)`.
pub fn simulate_gbm_paths(
    process: &BlackScholesMertonProcess,
    maturity: Time,
    settings: McSettings,
) -> Result<Vec<Path>> {
    MonteCarloModel::new(process, maturity, settings)?.paths()
}

/// Monte Carlo price of a European payoff on `S_T`.
pub fn mc_bsm_european(
    process: &BlackScholesMertonProcess,
    payoff: &dyn Payoff,
    maturity: Time,
    settings: McSettings,
    scheme: GbmScheme,
) -> Result<McEstimate> {
    settings.validate()?;
    ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");

    let stats = match scheme {
        GbmScheme::Euler => MonteCarloModel::new(process, maturity, settings)?
            .simulate(&EuropeanPathPricer::new(payoff))?,
        GbmScheme::ExactBrownianSum => {
            let mut rng = settings.rng();
            let sqrt_dt = (maturity / settings.steps as Real).sqrt();
            let sqrt_t = maturity.sqrt();
            (0..settings.paths)
                .map(|_| {
                    let w: Real = (0..settings.steps).map(|_| sqrt_dt * rng.next_gaussian()).sum();
                    payoff.value(process.evolve_exact(process.s0(), maturity, w / sqrt_t))
                })
                .collect::<Statistics>()
        }
        GbmScheme::TerminalSample => {
            let mut rng = settings.rng();
            (0..settings.paths)
                .map(|_| payoff.value(process.evolve_exact(process.s0(), maturity, rng.next_gaussian())))
                .collect::<Statistics>()
        }
    };

    let estimate = McEstimate::from_statistics(&stats, process.discount(maturity))?;
    debug!(?scheme, paths = settings.paths, steps = settings.steps, %estimate, "bsm european mc");
    Ok(estimate)
}

/// Drift shift `λ = ln(S₀/K)/(σT) + (r−q)/σ − σ/2` that centres the
/// sampled terminal spot on the strike.
pub fn optimal_bsm_lambda(
    process: &BlackScholesMertonProcess,
    strike: Real,
    maturity: Time,
) -> Result<Real> {
    let sigma = process.volatility();
    ensure!(sigma > 0.0, "importance shift needs positive volatility");
    ensure!(strike > 0.0, "strike must be positive, got {strike}");
    ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
    Ok((process.s0() / strike).ln() / (sigma * maturity)
        + (process.risk_free_rate() - process.dividend_yield()) / sigma
        - 0.5 * sigma)
}

/// Importance-sampled European price with drift `r − q − σλ`.
///
/// Paths are simulated in pairs. With `antithetic` the second path of a
/// pair uses the negated shocks and each pair contributes its mean as one
/// sample; otherwise both paths are independent samples.
pub fn mc_bsm_importance(
    process: &BlackScholesMertonProcess,
    payoff: &dyn Payoff,
    maturity: Time,
    settings: McSettings,
    lambda: Real,
    antithetic: bool,
) -> Result<McEstimate> {
    settings.validate()?;
    ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
    ensure!(lambda.is_finite(), "importance shift must be finite");

    let dt = maturity / settings.steps as Real;
    let weight = |w: Real| (lambda * w - 0.5 * lambda * lambda * maturity).exp();
    let mut rng = settings.rng();
    let mut shocks = vec![0.0; settings.steps];
    let mut stats = Statistics::new();

    if antithetic {
        ensure!(settings.paths >= 2, "antithetic sampling needs at least two paths");
        for _ in 0..settings.paths / 2 {
            rng.fill_gaussian(&mut shocks);
            let (s1, w1) = tilted_terminal(process, lambda, dt, &shocks, 1.0);
            let (s2, w2) = tilted_terminal(process, lambda, dt, &shocks, -1.0);
            stats.add(0.5 * (weight(w1) * payoff.value(s1) + weight(w2) * payoff.value(s2)));
        }
    } else {
        for _ in 0..settings.paths {
            rng.fill_gaussian(&mut shocks);
            let (s, w) = tilted_terminal(process, lambda, dt, &shocks, 1.0);
            stats.add(weight(w) * payoff.value(s));
        }
    }

    let estimate = McEstimate::from_statistics(&stats, process.discount(maturity))?;
    debug!(lambda, antithetic, paths = settings.paths, %estimate, "bsm importance mc");
    Ok(estimate)
}

/// Terminal spot and `W_T` of one tilted Euler path.
fn tilted_terminal(
    process: &BlackScholesMertonProcess,
    lambda: Real,
    dt: Time,
    shocks: &[Real],
    sign: Real,
) -> (Real, Real) {
    let sigma = process.volatility();
    let drift = (process.risk_free_rate() - process.dividend_yield() - sigma * lambda) * dt;
    let vol = sigma * dt.sqrt();
    let mut s = process.s0();
    let mut w = 0.0;
    for &x in shocks {
        let x = sign * x;
        w += x;
        s *= 1.0 + drift + vol * x;
    }
    (s, w * dt.sqrt())
}
