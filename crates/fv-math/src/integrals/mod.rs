//! Numerical integration.

use fv_core::{
    errors::{Error, Result},
    Real,
};

/// A numerical integrator.
pub trait Integrator {
    /// Integrate `f` on `[a, b]`.
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Result<Real>;
}

// ── Simpson ───────────────────────────────────────────────────────────────────

/// Composite Simpson's rule with successive interval halving.
///
/// Each refinement reuses the function values of the previous level, so a
/// level with `2n` panels costs `n` new evaluations. Iteration stops when
/// two successive estimates differ by less than the absolute accuracy.
#[derive(Debug, Clone)]
pub struct SimpsonIntegral {
    absolute_accuracy: Real,
    max_evaluations: usize,
}

impl SimpsonIntegral {
    /// Create a new Simpson integrator.
    pub fn new(absolute_accuracy: Real, max_evaluations: usize) -> Self {
        Self {
            absolute_accuracy,
            max_evaluations,
        }
    }

    /// Target absolute accuracy.
    pub fn absolute_accuracy(&self) -> Real {
        self.absolute_accuracy
    }

    /// Refine until two successive estimates agree to the absolute accuracy
    /// or the evaluation budget runs out, returning the last estimate either
    /// way.
    pub fn estimate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> QuadratureEstimate {
        if a == b {
            return QuadratureEstimate {
                value: 0.0,
                change: 0.0,
                evaluations: 0,
                converged: true,
            };
        }
        let mut n = 1usize;
        let mut h = b - a;
        // trapezoid estimate on n panels
        let mut trap = 0.5 * h * (f(a) + f(b));
        let mut evaluations = 2usize;
        let mut old_simpson = f64::NAN;

        loop {
            // refine: add the midpoints of the current n panels
            let mid_sum: Real = (0..n).map(|i| f(a + (i as Real + 0.5) * h)).sum();
            evaluations += n;
            let new_trap = 0.5 * (trap + h * mid_sum);
            let simpson = (4.0 * new_trap - trap) / 3.0;
            n *= 2;
            h *= 0.5;
            trap = new_trap;

            let change = (simpson - old_simpson).abs();
            let converged = n >= 8 && change < self.absolute_accuracy;
            if converged || evaluations >= self.max_evaluations {
                return QuadratureEstimate {
                    value: simpson,
                    change,
                    evaluations,
                    converged,
                };
            }
            old_simpson = simpson;
        }
    }
}

/// Outcome of [`SimpsonIntegral::estimate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadratureEstimate {
    /// Last Simpson estimate.
    pub value: Real,
    /// Difference between the last two refinement levels.
    pub change: Real,
    /// Integrand evaluations used.
    pub evaluations: usize,
    /// Whether `change` fell below the requested accuracy.
    pub converged: bool,
}

impl Default for SimpsonIntegral {
    fn default() -> Self {
        Self::new(1e-8, 1 << 20)
    }
}

impl Integrator for SimpsonIntegral {
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Result<Real> {
        let est = self.estimate(f, a, b);
        if est.converged {
            Ok(est.value)
        } else {
            Err(Error::Convergence {
                iterations: est.evaluations,
                message: format!("Simpson integral on [{a}, {b}]: last change {:e}", est.change),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn integrates_polynomial_exactly() {
        let s = SimpsonIntegral::new(1e-12, 10_000);
        let v = s.integrate(|x| 3.0 * x * x + 1.0, 0.0, 2.0).unwrap();
        assert_abs_diff_eq!(v, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn integrates_gaussian_density() {
        let s = SimpsonIntegral::default();
        let v = s.integrate(crate::normal_pdf, -10.0, 10.0).unwrap();
        assert_abs_diff_eq!(v, 1.0, epsilon = 1e-8);
    }

    #[test]
    fn reports_non_convergence() {
        let s = SimpsonIntegral::new(1e-14, 64);
        let r = s.integrate(|x| (50.0 * x).sin() * x.exp(), 0.0, 3.0);
        assert!(matches!(r, Err(Error::Convergence { .. })));
    }

    #[test]
    fn estimate_keeps_last_value_when_budget_runs_out() {
        // zero tolerance never converges
        let s = SimpsonIntegral::new(0.0, 64);
        let est = s.estimate(f64::exp, 0.0, 1.0);
        assert!(!est.converged);
        assert!(est.evaluations >= 64);
        assert_abs_diff_eq!(est.value, std::f64::consts::E - 1.0, epsilon = 1e-8);
    }

    #[test]
    fn empty_interval() {
        let s = SimpsonIntegral::default();
        assert_eq!(s.integrate(|x| x, 1.0, 1.0).unwrap(), 0.0);
    }
}
