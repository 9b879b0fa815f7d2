//! Cox-Ingersoll-Ross paths with reflection at zero.

use fv_core::{errors::Result, Time};
use fv_processes::{SquareRootProcess, StochasticProcess1D};
use tracing::{debug, warn};

use super::{reflection_rate, McSettings, Path, ReflectedPaths, TimeGrid};

/// Euler paths of a square-root process, reflecting negative steps.
pub fn simulate_cir_paths(
    process: &SquareRootProcess,
    maturity: Time,
    settings: McSettings,
) -> Result<ReflectedPaths<Path>> {
    settings.validate()?;
    let grid = TimeGrid::uniform(maturity, settings.steps)?;
    if !process.feller_condition() {
        warn!(
            speed = process.speed(),
            mean = process.mean(),
            volatility = process.volatility(),
            "Feller condition violated; zero is attainable"
        );
    }

    let dt = grid.dt();
    let mut rng = settings.rng();
    let mut reflections = 0;
    let mut paths = Vec::with_capacity(settings.paths);
    for _ in 0..settings.paths {
        let mut v = process.x0();
        let mut values = Vec::with_capacity(settings.steps + 1);
        values.push(v);
        for _ in 0..settings.steps {
            let (next, reflected) = process.evolve_reflected(v, dt, rng.next_gaussian());
            reflections += usize::from(reflected);
            v = next;
            values.push(v);
        }
        paths.push(Path::new(&grid, values)?);
    }

    let rate = reflection_rate(reflections, &settings);
    debug!(paths = settings.paths, steps = settings.steps, rate, "cir paths");
    Ok(ReflectedPaths {
        paths,
        reflections,
        reflection_rate: rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monte_carlo::path_mean;

    #[test]
    fn paths_stay_non_negative() {
        // Feller fails: 2·1·0.04 < 0.5²
        let p = SquareRootProcess::new(1.0, 0.04, 0.5, 0.04).unwrap();
        let sim = simulate_cir_paths(&p, 3.0, McSettings::new(32, 500, 1).unwrap()).unwrap();
        assert_eq!(sim.paths.len(), 32);
        assert!(sim.paths.iter().flat_map(|p| &p.values).all(|&v| v >= 0.0));
        assert!(sim.reflections > 0);
        assert!(sim.reflection_rate > 0.0 && sim.reflection_rate < 1.0);
    }

    #[test]
    fn mean_reverts_to_long_run_level() {
        let p = SquareRootProcess::new(1.0, 0.4, 0.2, 0.2).unwrap();
        let sim = simulate_cir_paths(&p, 3.0, McSettings::new(4_000, 300, 2).unwrap()).unwrap();
        let mean = path_mean(&sim.paths).unwrap();
        let last = mean[mean.len() - 1];
        approx::assert_abs_diff_eq!(last, p.expected_value(3.0), epsilon = 0.01);
        assert_eq!(sim.reflections, 0);
    }
}
