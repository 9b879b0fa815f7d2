//! Running statistics accumulator.

use fv_core::Real;

/// Incremental statistics accumulator (Welford's update).
///
/// Tracks count, mean, second central moment, min and max of a stream of
/// samples. Empty accumulators report `NaN` moments.
#[derive(Debug, Clone)]
pub struct Statistics {
    count: usize,
    mean: Real,
    m2: Real,
    min: Real,
    max: Real,
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}

impl Statistics {
    /// Create a new empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Add a single sample.
    pub fn add(&mut self, x: Real) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as Real;
        self.m2 += delta * (x - self.mean);
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    /// Number of samples.
    pub fn samples(&self) -> usize {
        self.count
    }

    /// Sample mean.
    pub fn mean(&self) -> Real {
        if self.count == 0 {
            f64::NAN
        } else {
            self.mean
        }
    }

    /// Population variance `Σ(x − x̄)² / N`.
    pub fn variance(&self) -> Real {
        if self.count == 0 {
            f64::NAN
        } else {
            self.m2 / self.count as Real
        }
    }

    /// Unbiased (Bessel-corrected) variance `Σ(x − x̄)² / (N − 1)`.
    pub fn sample_variance(&self) -> Real {
        if self.count < 2 {
            f64::NAN
        } else {
            self.m2 / (self.count - 1) as Real
        }
    }

    /// Population standard deviation.
    pub fn std_dev(&self) -> Real {
        self.variance().sqrt()
    }

    /// Standard error of the mean, `√(variance / N)`.
    pub fn error_estimate(&self) -> Real {
        (self.variance() / self.count as Real).sqrt()
    }

    /// Minimum sample value.
    pub fn minimum(&self) -> Real {
        self.min
    }

    /// Maximum sample value.
    pub fn maximum(&self) -> Real {
        self.max
    }

    /// Reset the accumulator to its initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Extend<Real> for Statistics {
    fn extend<I: IntoIterator<Item = Real>>(&mut self, iter: I) {
        for x in iter {
            self.add(x);
        }
    }
}

impl FromIterator<Real> for Statistics {
    fn from_iter<I: IntoIterator<Item = Real>>(iter: I) -> Self {
        let mut s = Self::new();
        s.extend(iter);
        s
    }
}
