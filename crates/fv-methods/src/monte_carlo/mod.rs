//! Monte Carlo simulation framework.
//!
//! # Overview
//!
//! * [`McSettings`] — number of paths, time steps and the RNG seed
//! * [`McEstimate`] — discounted sample mean with its variance and standard error
//! * [`Path`] / [`MultiPath`] — realisations on a [`TimeGrid`]
//! * [`PathGenerator`] — Euler paths of any [`StochasticProcess1D`]
//! * [`PathPricer`] / [`MonteCarloModel`] — generic path pricing loop
//!
//! Model-specific simulators and estimators live in the submodules. Every
//! run draws from one Mersenne-Twister stream seeded by
//! [`McSettings::seed`], so results are reproducible.

pub mod cir;
pub mod gbm;
pub mod heston;
pub mod levy;
pub mod longstaff_schwartz;
pub mod poisson;

use std::fmt;

use fv_core::{ensure, errors::Result, DiscountFactor, Real, Time};
use fv_instruments::Payoff;
use fv_math::{MersenneTwisterUniformRng, Statistics};
use fv_processes::StochasticProcess1D;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Reflection rates above this level are reported with a warning.
pub const REFLECTION_WARNING_RATE: Real = 0.01;

// ─── Settings ─────────────────────────────────────────────────────────────────

/// Size and seed of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct McSettings {
    /// Number of simulated paths `N`.
    pub paths: usize,
    /// Number of time steps per path `n`.
    pub steps: usize,
    /// RNG seed.
    pub seed: u64,
}

impl Default for McSettings {
    fn default() -> Self {
        Self {
            paths: 10_000,
            steps: 500,
            seed: 42,
        }
    }
}

impl McSettings {
    /// Create validated settings.
    pub fn new(paths: usize, steps: usize, seed: u64) -> Result<Self> {
        let settings = Self { paths, steps, seed };
        settings.validate()?;
        Ok(settings)
    }

    /// Check that paths and steps are positive.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.paths > 0, "number of paths must be positive");
        ensure!(self.steps > 0, "number of time steps must be positive");
        Ok(())
    }

    /// A fresh generator for this run.
    pub fn rng(&self) -> MersenneTwisterUniformRng {
        MersenneTwisterUniformRng::new(self.seed)
    }
}

// ─── Estimate ─────────────────────────────────────────────────────────────────

/// Result of a Monte Carlo estimator.
///
/// `variance` is the population variance of the discounted samples and
/// `std_error = √(variance / samples)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McEstimate {
    /// Discounted sample mean.
    pub value: Real,
    /// Variance of the discounted samples.
    pub variance: Real,
    /// Standard error of `value`.
    pub std_error: Real,
    /// Number of samples averaged.
    pub samples: usize,
}

impl McEstimate {
    /// Build an estimate from undiscounted sample statistics.
    pub fn from_statistics(stats: &Statistics, discount: DiscountFactor) -> Result<Self> {
        let samples = stats.samples();
        ensure!(samples > 0, "cannot form an estimate from zero samples");
        let variance = stats.variance() * discount * discount;
        Ok(Self {
            value: stats.mean() * discount,
            variance,
            std_error: (variance / samples as Real).sqrt(),
            samples,
        })
    }

    /// A deterministic value with no sampling error.
    pub fn exact(value: Real) -> Self {
        Self {
            value,
            variance: 0.0,
            std_error: 0.0,
            samples: 1,
        }
    }

    /// Symmetric confidence interval `value ± z · std_error`.
    pub fn confidence_interval(&self, z: Real) -> (Real, Real) {
        (self.value - z * self.std_error, self.value + z * self.std_error)
    }
}

impl fmt::Display for McEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6} (s.e. {:.2e}, var {:.4e}, n = {})",
            self.value, self.std_error, self.variance, self.samples
        )
    }
}

// ─── Time grid ────────────────────────────────────────────────────────────────

/// A uniform grid of `steps + 1` time points from 0 to `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<Time>,
    dt: Time,
}

impl TimeGrid {
    /// Uniform grid on `[0, end]` with `steps` intervals.
    pub fn uniform(end: Time, steps: usize) -> Result<Self> {
        ensure!(steps > 0, "steps must be positive");
        ensure!(end > 0.0 && end.is_finite(), "grid end must be positive, got {end}");
        let dt = end / steps as Real;
        let times = fv_math::linspace(0.0, end, steps + 1);
        Ok(Self { times, dt })
    }

    /// Number of intervals.
    pub fn steps(&self) -> usize {
        self.times.len() - 1
    }

    /// Step size.
    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Final time.
    pub fn end(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    /// All time points.
    pub fn times(&self) -> &[Time] {
        &self.times
    }
}

// ─── Paths ────────────────────────────────────────────────────────────────────

/// A single sample path: a sequence of time-value pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Time points (including t=0).
    pub times: Vec<Time>,
    /// Process values at each time point.
    pub values: Vec<Real>,
}

impl Path {
    /// A path on `grid` with the given values.
    pub fn new(grid: &TimeGrid, values: Vec<Real>) -> Result<Self> {
        ensure!(
            values.len() == grid.times().len(),
            "path has {} values for {} time points",
            values.len(),
            grid.times().len()
        );
        Ok(Self {
            times: grid.times().to_vec(),
            values,
        })
    }

    /// Number of time steps (= len − 1).
    pub fn steps(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    /// The final value.
    pub fn back(&self) -> Real {
        self.values.last().copied().unwrap_or(Real::NAN)
    }

    /// The initial value.
    pub fn front(&self) -> Real {
        self.values.first().copied().unwrap_or(Real::NAN)
    }

    /// Length of the path (number of points including initial).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the path is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Several paths sharing one time grid, e.g. spot and variance.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPath {
    paths: Vec<Path>,
}

impl MultiPath {
    /// Bundle paths that share their time points.
    pub fn new(paths: Vec<Path>) -> Result<Self> {
        ensure!(!paths.is_empty(), "a multi-path needs at least one asset");
        let times = &paths[0].times;
        ensure!(
            paths.iter().all(|p| &p.times == times),
            "all components of a multi-path must share one time grid"
        );
        Ok(Self { paths })
    }

    /// Number of components.
    pub fn asset_count(&self) -> usize {
        self.paths.len()
    }

    /// Component `i`.
    pub fn asset(&self, i: usize) -> Option<&Path> {
        self.paths.get(i)
    }

    /// All components.
    pub fn assets(&self) -> &[Path] {
        &self.paths
    }
}

/// Paths of a reflected square-root variance together with how often the
/// raw Euler step went negative.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectedPaths<P> {
    /// Simulated paths.
    pub paths: Vec<P>,
    /// Number of reflected steps over all paths.
    pub reflections: usize,
    /// `reflections / (steps · paths)`.
    pub reflection_rate: Real,
}

pub(crate) fn reflection_rate(reflections: usize, settings: &McSettings) -> Real {
    let rate = reflections as Real / (settings.steps * settings.paths) as Real;
    if rate > REFLECTION_WARNING_RATE {
        warn!(rate, reflections, "variance reflected on a large share of steps");
    }
    rate
}

/// Pointwise mean over a set of paths on the same grid.
///
/// Used to compare simulated paths against the analytic expectation, e.g.
/// `S₀ e^{(r−q)t}` for geometric Brownian motion.
pub fn path_mean(paths: &[Path]) -> Result<Vec<Real>> {
    ensure!(!paths.is_empty(), "no paths to average");
    let len = paths[0].len();
    ensure!(
        paths.iter().all(|p| p.len() == len),
        "paths must have equal length"
    );
    let mut stats = vec![Statistics::new(); len];
    for path in paths {
        for (s, &v) in stats.iter_mut().zip(&path.values) {
            s.add(v);
        }
    }
    Ok(stats.iter().map(Statistics::mean).collect())
}

// ─── Path generation ──────────────────────────────────────────────────────────

/// Generates Euler sample paths of a 1-D stochastic process.
pub struct PathGenerator<'a> {
    process: &'a dyn StochasticProcess1D,
    grid: TimeGrid,
    rng: MersenneTwisterUniformRng,
}

impl<'a> PathGenerator<'a> {
    /// Create a generator over `[0, maturity]` with `steps` intervals.
    pub fn new(
        process: &'a dyn StochasticProcess1D,
        maturity: Time,
        steps: usize,
        seed: u64,
    ) -> Result<Self> {
        Ok(Self {
            process,
            grid: TimeGrid::uniform(maturity, steps)?,
            rng: MersenneTwisterUniformRng::new(seed),
        })
    }

    /// The time grid of generated paths.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Generate one sample path.
    pub fn next_path(&mut self) -> Path {
        let dt = self.grid.dt();
        let mut values = Vec::with_capacity(self.grid.times().len());
        let mut x = self.process.x0();
        values.push(x);
        for &t in &self.grid.times()[..self.grid.steps()] {
            let dw = self.rng.next_gaussian();
            x = self.process.evolve_1d(t, x, dt, dw);
            values.push(x);
        }
        Path {
            times: self.grid.times().to_vec(),
            values,
        }
    }
}

// ─── Path pricing ─────────────────────────────────────────────────────────────

/// Undiscounted value of a single path.
pub trait PathPricer {
    /// Evaluate the payoff on `path`.
    fn value(&self, path: &Path) -> Real;
}

/// Payoff of the terminal value.
#[derive(Debug)]
pub struct EuropeanPathPricer<'a> {
    payoff: &'a dyn Payoff,
}

impl<'a> EuropeanPathPricer<'a> {
    /// Wrap a payoff.
    pub fn new(payoff: &'a dyn Payoff) -> Self {
        Self { payoff }
    }
}

impl PathPricer for EuropeanPathPricer<'_> {
    fn value(&self, path: &Path) -> Real {
        self.payoff.value(path.back())
    }
}

/// Runs a [`PathGenerator`] through a [`PathPricer`] and accumulates the
/// sample statistics.
pub struct MonteCarloModel<'a> {
    process: &'a dyn StochasticProcess1D,
    maturity: Time,
    settings: McSettings,
}

impl<'a> MonteCarloModel<'a> {
    /// Create a model for `process` up to `maturity`.
    pub fn new(
        process: &'a dyn StochasticProcess1D,
        maturity: Time,
        settings: McSettings,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            process,
            maturity,
            settings,
        })
    }

    /// Simulate all paths and collect undiscounted path values.
    pub fn simulate(&self, pricer: &dyn PathPricer) -> Result<Statistics> {
        let mut generator = PathGenerator::new(
            self.process,
            self.maturity,
            self.settings.steps,
            self.settings.seed,
        )?;
        let mut stats = Statistics::new();
        for _ in 0..self.settings.paths {
            stats.add(pricer.value(&generator.next_path()));
        }
        Ok(stats)
    }

    /// Simulate and return the paths themselves.
    pub fn paths(&self) -> Result<Vec<Path>> {
        let mut generator = PathGenerator::new(
            self.process,
            self.maturity,
            self.settings.steps,
            self.settings.seed,
        )?;
        Ok((0..self.settings.paths).map(|_| generator.next_path()).collect())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use fv_instruments::{OptionType, PlainVanillaPayoff};
    use fv_processes::BlackScholesMertonProcess;

    fn process() -> BlackScholesMertonProcess {
        BlackScholesMertonProcess::new(100.0, 0.05, 0.0, 0.2).unwrap()
    }

    #[test]
    fn settings_reject_zero_paths() {
        assert!(McSettings::new(0, 10, 1).is_err());
        assert!(McSettings::new(10, 0, 1).is_err());
        assert!(McSettings::new(10, 10, 1).is_ok());
    }

    #[test]
    fn estimate_from_statistics() {
        let stats: Statistics = [1.0, 2.0, 3.0, 4.0].into_iter().collect();
        let est = McEstimate::from_statistics(&stats, 0.5).unwrap();
        assert_abs_diff_eq!(est.value, 1.25, epsilon = 1e-15);
        // population variance 1.25, scaled by 0.25
        assert_abs_diff_eq!(est.variance, 0.3125, epsilon = 1e-15);
        assert_abs_diff_eq!(est.std_error, (0.3125_f64 / 4.0).sqrt(), epsilon = 1e-15);
        assert_eq!(est.samples, 4);
        assert!(McEstimate::from_statistics(&Statistics::new(), 1.0).is_err());
    }

    #[test]
    fn time_grid_uniform() {
        let g = TimeGrid::uniform(1.0, 4).unwrap();
        assert_eq!(g.steps(), 4);
        assert_eq!(g.times().len(), 5);
        assert_abs_diff_eq!(g.dt(), 0.25);
        assert_eq!(g.end(), 1.0);
        assert!(TimeGrid::uniform(0.0, 4).is_err());
    }

    #[test]
    fn path_generator_produces_positive_gbm() {
        let p = process();
        let mut gen = PathGenerator::new(&p, 1.0, 252, 12345).unwrap();
        for _ in 0..100 {
            let path = gen.next_path();
            assert_eq!(path.len(), 253);
            assert_abs_diff_eq!(path.front(), 100.0);
            assert!(path.values.iter().all(|&v| v > 0.0));
        }
    }

    #[test]
    fn euler_model_prices_call() {
        let p = process();
        let payoff = PlainVanillaPayoff::new(OptionType::Call, 100.0);
        let model = MonteCarloModel::new(&p, 1.0, McSettings::new(20_000, 50, 7).unwrap()).unwrap();
        let stats = model.simulate(&EuropeanPathPricer::new(&payoff)).unwrap();
        let est = McEstimate::from_statistics(&stats, (-0.05_f64).exp()).unwrap();
        // closed form 10.4506
        assert!(
            (est.value - 10.4506).abs() < 4.0 * est.std_error + 0.05,
            "MC call = {est}"
        );
    }

    #[test]
    fn path_mean_tracks_forward() {
        let p = process();
        let model = MonteCarloModel::new(&p, 1.0, McSettings::new(20_000, 10, 3).unwrap()).unwrap();
        let paths = model.paths().unwrap();
        let mean = path_mean(&paths).unwrap();
        assert_abs_diff_eq!(mean[0], 100.0);
        assert_abs_diff_eq!(mean[10], p.forward(1.0), epsilon = 0.6);
    }

    #[test]
    fn multipath_requires_shared_grid() {
        let g1 = TimeGrid::uniform(1.0, 2).unwrap();
        let g2 = TimeGrid::uniform(2.0, 2).unwrap();
        let a = Path::new(&g1, vec![1.0, 2.0, 3.0]).unwrap();
        let b = Path::new(&g2, vec![1.0, 2.0, 3.0]).unwrap();
        assert!(MultiPath::new(vec![a.clone(), b]).is_err());
        let mp = MultiPath::new(vec![a.clone(), a]).unwrap();
        assert_eq!(mp.asset_count(), 2);
        assert!(mp.asset(2).is_none());
        assert!(Path::new(&g1, vec![1.0]).is_err());
    }
}
