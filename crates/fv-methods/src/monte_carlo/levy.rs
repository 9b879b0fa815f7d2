//! Pure-jump models built from gamma processes.
//!
//! * Gamma process paths (cumulative gamma increments)
//! * Variance-Gamma: `X = G⁺ − G⁻`, `S = S₀ exp((r−q+ω)t + X)`
//! * Bilateral Gamma: `X = G⁺ − G⁻`, `S = S₀ exp((r−q+ξ)t + X)`, with an
//!   optional change of the gamma rates for importance sampling

use fv_core::{ensure, errors::Result, Real, Time};
use fv_instruments::Payoff;
use fv_math::{random_numbers::GammaSampler, MersenneTwisterUniformRng, Statistics};
use fv_processes::{BilateralGammaProcess, GammaProcess, VarianceGammaProcess};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{McEstimate, McSettings, MultiPath, Path, TimeGrid};

/// Cumulative sum of `steps` gamma increments, starting at 0.
fn gamma_values(
    sampler: &GammaSampler,
    steps: usize,
    rng: &mut MersenneTwisterUniformRng,
) -> Vec<Real> {
    let mut values = Vec::with_capacity(steps + 1);
    let mut g = 0.0;
    values.push(g);
    for _ in 0..steps {
        g += sampler.sample(rng);
        values.push(g);
    }
    values
}

/// Sum of `steps` gamma increments.
fn gamma_total(sampler: &GammaSampler, steps: usize, rng: &mut MersenneTwisterUniformRng) -> Real {
    (0..steps).map(|_| sampler.sample(rng)).sum()
}

/// Spot path `S₀ exp(μt + G⁺(t) − G⁻(t))` bundled with both legs.
fn spot_multipath(
    grid: &TimeGrid,
    s0: Real,
    drift: Real,
    up: Vec<Real>,
    down: Vec<Real>,
) -> Result<MultiPath> {
    let spot = grid
        .times()
        .iter()
        .zip(up.iter().zip(&down))
        .map(|(&t, (&gp, &gm))| s0 * (drift * t + gp - gm).exp())
        .collect();
    MultiPath::new(vec![
        Path::new(grid, spot)?,
        Path::new(grid, up)?,
        Path::new(grid, down)?,
    ])
}

// ─── Gamma ────────────────────────────────────────────────────────────────────

/// Paths of a gamma process starting at 0.
pub fn simulate_gamma_paths(
    process: &GammaProcess,
    maturity: Time,
    settings: McSettings,
) -> Result<Vec<Path>> {
    settings.validate()?;
    let grid = TimeGrid::uniform(maturity, settings.steps)?;
    let sampler = process.increment_sampler(grid.dt())?;
    let mut rng = settings.rng();
    (0..settings.paths)
        .map(|_| Path::new(&grid, gamma_values(&sampler, settings.steps, &mut rng)))
        .collect()
}

// ─── Variance-Gamma ───────────────────────────────────────────────────────────

/// VG price estimate together with the forward check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VgMcOutcome {
    /// Discounted price estimate.
    pub estimate: McEstimate,
    /// Sample mean of `S_T`.
    pub mean_terminal_spot: Real,
    /// Model forward `S₀ e^{(r−q)T}`.
    pub expected_terminal_spot: Real,
}

/// Variance-Gamma paths. Each [`MultiPath`] holds the spot, `G⁺` and `G⁻`.
pub fn simulate_vg_paths(
    process: &VarianceGammaProcess,
    maturity: Time,
    settings: McSettings,
) -> Result<Vec<MultiPath>> {
    settings.validate()?;
    let grid = TimeGrid::uniform(maturity, settings.steps)?;
    let (up, down) = process.gamma_legs()?;
    let (up, down) = (up.increment_sampler(grid.dt())?, down.increment_sampler(grid.dt())?);
    let drift = process.risk_free_rate() - process.dividend_yield() + process.omega();
    let mut rng = settings.rng();
    (0..settings.paths)
        .map(|_| {
            let gp = gamma_values(&up, settings.steps, &mut rng);
            let gm = gamma_values(&down, settings.steps, &mut rng);
            spot_multipath(&grid, process.s0(), drift, gp, gm)
        })
        .collect()
}

/// Monte Carlo price of a European payoff under Variance-Gamma.
pub fn mc_vg_european(
    process: &VarianceGammaProcess,
    payoff: &dyn Payoff,
    maturity: Time,
    settings: McSettings,
) -> Result<VgMcOutcome> {
    settings.validate()?;
    ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
    let dt = maturity / settings.steps as Real;
    let (up, down) = process.gamma_legs()?;
    let (up, down) = (up.increment_sampler(dt)?, down.increment_sampler(dt)?);
    let (r, q) = (process.risk_free_rate(), process.dividend_yield());
    let forward_drift = (r - q + process.omega()) * maturity;

    let mut rng = settings.rng();
    let mut stats = Statistics::new();
    let mut spots = Statistics::new();
    for _ in 0..settings.paths {
        let x = gamma_total(&up, settings.steps, &mut rng) - gamma_total(&down, settings.steps, &mut rng);
        let s = process.s0() * (forward_drift + x).exp();
        spots.add(s);
        stats.add(payoff.value(s));
    }

    let outcome = VgMcOutcome {
        estimate: McEstimate::from_statistics(&stats, (-r * maturity).exp())?,
        mean_terminal_spot: spots.mean(),
        expected_terminal_spot: process.s0() * ((r - q) * maturity).exp(),
    };
    debug!(
        paths = settings.paths,
        steps = settings.steps,
        mean_spot = outcome.mean_terminal_spot,
        forward = outcome.expected_terminal_spot,
        estimate = %outcome.estimate,
        "variance gamma european mc"
    );
    Ok(outcome)
}

// ─── Bilateral Gamma ──────────────────────────────────────────────────────────

/// Gamma rates `(λ⁺', λ⁻')` of the sampling measure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BgSamplingMeasure {
    /// Rate of the upward leg under sampling.
    pub lambda_plus: Real,
    /// Rate of the downward leg under sampling.
    pub lambda_minus: Real,
}

impl Default for BgSamplingMeasure {
    fn default() -> Self {
        Self {
            lambda_plus: 12.0,
            lambda_minus: 4.0,
        }
    }
}

/// Bilateral Gamma paths. Each [`MultiPath`] holds the spot, `G⁺` and `G⁻`.
pub fn simulate_bg_paths(
    process: &BilateralGammaProcess,
    maturity: Time,
    settings: McSettings,
) -> Result<Vec<MultiPath>> {
    settings.validate()?;
    let grid = TimeGrid::uniform(maturity, settings.steps)?;
    let (up, down) = process.gamma_legs()?;
    let (up, down) = (up.increment_sampler(grid.dt())?, down.increment_sampler(grid.dt())?);
    let drift = process.risk_free_rate() - process.dividend_yield() + process.xi();
    let mut rng = settings.rng();
    (0..settings.paths)
        .map(|_| {
            let gp = gamma_values(&up, settings.steps, &mut rng);
            let gm = gamma_values(&down, settings.steps, &mut rng);
            spot_multipath(&grid, process.s0(), drift, gp, gm)
        })
        .collect()
}

/// Monte Carlo price of a European payoff under Bilateral Gamma.
///
/// With a sampling `measure` the legs are drawn with rates `λ±'` and each
/// sample is weighted by
/// `(λ⁺/λ⁺')^{α⁺T} (λ⁻/λ⁻')^{α⁻T} exp(−(λ⁺−λ⁺')G⁺_T − (λ⁻−λ⁻')G⁻_T)`.
pub fn mc_bg_european(
    process: &BilateralGammaProcess,
    payoff: &dyn Payoff,
    maturity: Time,
    settings: McSettings,
    measure: Option<BgSamplingMeasure>,
) -> Result<McEstimate> {
    settings.validate()?;
    ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
    let (alpha_p, lambda_p) = process.upward();
    let (alpha_m, lambda_m) = process.downward();
    let sampling = measure.unwrap_or(BgSamplingMeasure {
        lambda_plus: lambda_p,
        lambda_minus: lambda_m,
    });
    ensure!(
        sampling.lambda_plus > 0.0 && sampling.lambda_minus > 0.0,
        "sampling rates must be positive"
    );

    let dt = maturity / settings.steps as Real;
    let up = GammaSampler::new(dt * alpha_p, 1.0 / sampling.lambda_plus)?;
    let down = GammaSampler::new(dt * alpha_m, 1.0 / sampling.lambda_minus)?;
    let (r, q) = (process.risk_free_rate(), process.dividend_yield());
    let forward_drift = (r - q + process.xi()) * maturity;
    let log_scale = alpha_p * maturity * (lambda_p / sampling.lambda_plus).ln()
        + alpha_m * maturity * (lambda_m / sampling.lambda_minus).ln();

    let mut rng = settings.rng();
    let mut stats = Statistics::new();
    for _ in 0..settings.paths {
        let gp = gamma_total(&up, settings.steps, &mut rng);
        let gm = gamma_total(&down, settings.steps, &mut rng);
        let s = process.s0() * (forward_drift + gp - gm).exp();
        let weight = (log_scale
            - (lambda_p - sampling.lambda_plus) * gp
            - (lambda_m - sampling.lambda_minus) * gm)
            .exp();
        stats.add(weight * payoff.value(s));
    }

    let estimate = McEstimate::from_statistics(&stats, (-r * maturity).exp())?;
    debug!(?measure, paths = settings.paths, steps = settings.steps, %estimate, "bilateral gamma european mc");
    Ok(estimate)
}
