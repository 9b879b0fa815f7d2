//! Random number generators.
//!
//! All simulation code draws from a single [`MersenneTwisterUniformRng`]
//! stream so that a run is fully determined by its seed. Non-uniform
//! variates come either from the inverse cumulative normal (Gaussians) or
//! from `rand_distr` samplers driven by the same stream (gamma, Poisson,
//! Bernoulli).

use fv_core::{ensure, errors::Result, Real};
use rand::RngCore;
use rand_distr::{Bernoulli, Distribution, Gamma, Poisson};
use rand_mt::Mt64;

use crate::distributions::normal::acklam_inverse;

/// A uniform pseudo-random number generator based on the Mersenne Twister
/// MT19937-64 algorithm.
#[derive(Clone)]
pub struct MersenneTwisterUniformRng {
    rng: Mt64,
}

impl std::fmt::Debug for MersenneTwisterUniformRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MersenneTwisterUniformRng").finish_non_exhaustive()
    }
}

impl MersenneTwisterUniformRng {
    /// Create a new generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mt64::new(seed),
        }
    }

    /// Generate the next uniform deviate in `[0, 1)`.
    pub fn next_real(&mut self) -> Real {
        // 53 random bits mapped onto [0, 1)
        (self.rng.next_u64() >> 11) as Real * (1.0 / (1u64 << 53) as Real)
    }

    /// Generate the next uniform deviate in the open interval `(0, 1)`.
    pub fn next_open_real(&mut self) -> Real {
        loop {
            let u = self.next_real();
            if u > 0.0 {
                return u;
            }
        }
    }

    /// Generate the next standard-normal deviate by inverting the normal
    /// CDF at an open uniform.
    pub fn next_gaussian(&mut self) -> Real {
        acklam_inverse(self.next_open_real())
    }

    /// Fill `out` with independent standard-normal deviates.
    pub fn fill_gaussian(&mut self, out: &mut [Real]) {
        for x in out.iter_mut() {
            *x = self.next_gaussian();
        }
    }
}

impl RngCore for MersenneTwisterUniformRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

// ── Gamma ─────────────────────────────────────────────────────────────────────

/// Gamma variates with fixed shape `k` and scale `θ` (mean `kθ`).
#[derive(Debug, Clone, Copy)]
pub struct GammaSampler {
    dist: Gamma<Real>,
    shape: Real,
    scale: Real,
}

impl GammaSampler {
    /// Build a sampler for Gamma(shape, scale).
    ///
    /// # Errors
    /// Both parameters must be strictly positive and finite.
    pub fn new(shape: Real, scale: Real) -> Result<Self> {
        ensure!(
            shape > 0.0 && shape.is_finite(),
            "gamma shape must be positive, got {shape}"
        );
        ensure!(
            scale > 0.0 && scale.is_finite(),
            "gamma scale must be positive, got {scale}"
        );
        let dist = Gamma::new(shape, scale).map_err(|e| {
            fv_core::Error::InvalidArgument(format!("gamma({shape}, {scale}): {e}"))
        })?;
        Ok(Self { dist, shape, scale })
    }

    /// Shape parameter.
    pub fn shape(&self) -> Real {
        self.shape
    }

    /// Scale parameter.
    pub fn scale(&self) -> Real {
        self.scale
    }

    /// Draw one variate.
    pub fn sample(&self, rng: &mut MersenneTwisterUniformRng) -> Real {
        self.dist.sample(rng)
    }
}

// ── Poisson ───────────────────────────────────────────────────────────────────

/// Poisson-distributed counts with mean `λ`. A zero mean always yields 0.
#[derive(Debug, Clone, Copy)]
pub struct PoissonSampler {
    dist: Option<Poisson<Real>>,
}

impl PoissonSampler {
    /// Build a sampler with mean `lambda ≥ 0`.
    pub fn new(lambda: Real) -> Result<Self> {
        ensure!(
            lambda >= 0.0 && lambda.is_finite(),
            "Poisson mean must be non-negative, got {lambda}"
        );
        if lambda == 0.0 {
            return Ok(Self { dist: None });
        }
        let dist = Poisson::new(lambda)
            .map_err(|e| fv_core::Error::InvalidArgument(format!("poisson({lambda}): {e}")))?;
        Ok(Self { dist: Some(dist) })
    }

    /// Draw one count.
    pub fn sample(&self, rng: &mut MersenneTwisterUniformRng) -> u64 {
        match &self.dist {
            Some(d) => d.sample(rng) as u64,
            None => 0,
        }
    }
}

// ── Bernoulli ─────────────────────────────────────────────────────────────────

/// Bernoulli trials with success probability `p`.
#[derive(Debug, Clone, Copy)]
pub struct BernoulliSampler {
    dist: Bernoulli,
}

impl BernoulliSampler {
    /// Build a sampler with success probability `p ∈ [0, 1]`.
    pub fn new(p: Real) -> Result<Self> {
        ensure!((0.0..=1.0).contains(&p), "probability must be in [0, 1], got {p}");
        let dist = Bernoulli::new(p)
            .map_err(|e| fv_core::Error::InvalidArgument(format!("bernoulli({p}): {e}")))?;
        Ok(Self { dist })
    }

    /// Draw one trial.
    pub fn sample(&self, rng: &mut MersenneTwisterUniformRng) -> bool {
        self.dist.sample(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::Statistics;

    #[test]
    fn mt_range() {
        let mut rng = MersenneTwisterUniformRng::new(42);
        for _ in 0..1_000 {
            let x = rng.next_real();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = MersenneTwisterUniformRng::new(7);
        let mut b = MersenneTwisterUniformRng::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_gaussian().to_bits(), b.next_gaussian().to_bits());
        }
    }

    #[test]
    fn gaussian_moments() {
        let mut rng = MersenneTwisterUniformRng::new(42);
        let mut s = Statistics::new();
        for _ in 0..50_000 {
            s.add(rng.next_gaussian());
        }
        assert!(s.mean().abs() < 0.02, "mean {}", s.mean());
        assert!((s.variance() - 1.0).abs() < 0.03, "variance {}", s.variance());
    }

    #[test]
    fn gamma_moments() {
        let mut rng = MersenneTwisterUniformRng::new(1);
        let g = GammaSampler::new(2.5, 0.4).unwrap();
        let mut s = Statistics::new();
        for _ in 0..50_000 {
            s.add(g.sample(&mut rng));
        }
        // mean kθ = 1.0, variance kθ² = 0.4
        assert!((s.mean() - 1.0).abs() < 0.02, "mean {}", s.mean());
        assert!((s.variance() - 0.4).abs() < 0.02, "variance {}", s.variance());
    }

    #[test]
    fn gamma_rejects_bad_shape() {
        assert!(GammaSampler::new(0.0, 1.0).is_err());
        assert!(GammaSampler::new(1.0, -1.0).is_err());
    }

    #[test]
    fn poisson_mean_and_zero_intensity() {
        let mut rng = MersenneTwisterUniformRng::new(3);
        let p = PoissonSampler::new(4.0).unwrap();
        let mean = (0..20_000).map(|_| p.sample(&mut rng) as Real).sum::<Real>() / 20_000.0;
        assert!((mean - 4.0).abs() < 0.06, "mean {mean}");

        let zero = PoissonSampler::new(0.0).unwrap();
        assert_eq!(zero.sample(&mut rng), 0);
    }

    #[test]
    fn bernoulli_bounds() {
        assert!(BernoulliSampler::new(1.5).is_err());
        let mut rng = MersenneTwisterUniformRng::new(3);
        let always = BernoulliSampler::new(1.0).unwrap();
        assert!(always.sample(&mut rng));
    }
}
