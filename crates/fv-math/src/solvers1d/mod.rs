//! 1D root finding on a bracket.

use fv_core::{
    errors::{Error, Result},
    Real,
};

const MAX_ITERATIONS: usize = 200;
const DEFAULT_ACCURACY: Real = 1.0e-11;

/// Bisection on `[x_min, x_max]`, halving until the bracket is narrower than
/// `2 · accuracy`. A non-positive `accuracy` falls back to `1e-11`.
///
/// Fails with [`Error::Precondition`] when `f` has the same sign at both
/// ends.
pub fn bisection<F>(f: F, x_min: Real, x_max: Real, accuracy: Real) -> Result<Real>
where
    F: Fn(Real) -> Real,
{
    let tolerance = if accuracy > 0.0 {
        accuracy
    } else {
        DEFAULT_ACCURACY
    };
    let (mut lo, mut hi) = (x_min, x_max);
    let mut f_lo = f(lo);
    let f_hi = f(hi);

    if f_lo * f_hi > 0.0 {
        return Err(Error::Precondition(format!(
            "root not bracketed: f({lo}) = {f_lo}, f({hi}) = {f_hi}"
        )));
    }
    if f_lo == 0.0 {
        return Ok(lo);
    }
    if f_hi == 0.0 {
        return Ok(hi);
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        if f_mid == 0.0 || 0.5 * (hi - lo).abs() < tolerance {
            return Ok(mid);
        }
        if f_mid * f_lo > 0.0 {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Err(Error::Convergence {
        iterations: MAX_ITERATIONS,
        message: "bisection solver".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn bisection_cubic() {
        let root = bisection(|x| x * x * x - x - 2.0, 1.0, 2.0, 1e-12).unwrap();
        assert_abs_diff_eq!(root * root * root - root - 2.0, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn bisection_sqrt2_to_requested_accuracy() {
        let root = bisection(|x| x * x - 2.0, 0.0, 2.0, 1e-12).unwrap();
        assert_abs_diff_eq!(root, std::f64::consts::SQRT_2, epsilon = 1e-11);
    }

    #[test]
    fn unbracketed_root_is_rejected() {
        assert!(matches!(
            bisection(|x| x * x + 1.0, -1.0, 1.0, 1e-8),
            Err(Error::Precondition(_))
        ));
    }

    #[test]
    fn decreasing_function() {
        let root = bisection(|x| 1.0 - x, 0.0, 3.0, 1e-10).unwrap();
        assert_abs_diff_eq!(root, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn root_at_bracket_end_returned_exactly() {
        assert_eq!(bisection(|x| x - 0.5, 0.5, 2.0, 1e-8).unwrap(), 0.5);
    }
}
