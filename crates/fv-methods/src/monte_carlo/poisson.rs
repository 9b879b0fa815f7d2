//! Poisson counting paths.

use fv_core::{ensure, errors::Result, Real, Time};
use fv_math::random_numbers::{BernoulliSampler, PoissonSampler};
use fv_processes::PoissonProcess;
use serde::{Deserialize, Serialize};

use super::{McSettings, Path, TimeGrid};

/// Simulation method for a Poisson counting process on a uniform grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PoissonMethod {
    /// Draw the total count over `[0, T]`, scatter uniform arrival times,
    /// then count arrivals up to each grid point.
    #[default]
    ArrivalTimes,
    /// Independent Poisson(λΔt) counts per step.
    StepCounts,
    /// At most one arrival per step with probability λΔt.
    Bernoulli,
}

/// Counting paths `N(t)` on `settings.steps` uniform intervals.
pub fn simulate_poisson_paths(
    process: &PoissonProcess,
    maturity: Time,
    settings: McSettings,
    method: PoissonMethod,
) -> Result<Vec<Path>> {
    settings.validate()?;
    let grid = TimeGrid::uniform(maturity, settings.steps)?;
    let mut rng = settings.rng();
    let steps = settings.steps;

    match method {
        PoissonMethod::ArrivalTimes => {
            let total = PoissonSampler::new(process.expected_count(maturity))?;
            (0..settings.paths)
                .map(|_| {
                    let n = total.sample(&mut rng);
                    let mut arrivals: Vec<Real> =
                        (0..n).map(|_| rng.next_real() * maturity).collect();
                    arrivals.sort_by(Real::total_cmp);
                    let counts = grid
                        .times()
                        .iter()
                        .map(|&t| arrivals.partition_point(|&a| a <= t) as Real)
                        .collect();
                    Path::new(&grid, counts)
                })
                .collect()
        }
        PoissonMethod::StepCounts => {
            let per_step = PoissonSampler::new(process.expected_count(grid.dt()))?;
            (0..settings.paths)
                .map(|_| Path::new(&grid, cumulative(steps, || per_step.sample(&mut rng))))
                .collect()
        }
        PoissonMethod::Bernoulli => {
            let p = process.expected_count(grid.dt());
            ensure!(
                p <= 1.0,
                "λΔt = {p} exceeds 1; use more steps for the Bernoulli method"
            );
            let trial = BernoulliSampler::new(p)?;
            (0..settings.paths)
                .map(|_| {
                    Path::new(&grid, cumulative(steps, || u64::from(trial.sample(&mut rng))))
                })
                .collect()
        }
    }
}

/// `[0, c₁, c₁+c₂, …]` over `steps` draws.
fn cumulative(steps: usize, mut draw: impl FnMut() -> u64) -> Vec<Real> {
    let mut values = Vec::with_capacity(steps + 1);
    let mut count = 0u64;
    values.push(0.0);
    for _ in 0..steps {
        count += draw();
        values.push(count as Real);
    }
    values
}
