//! 1D interpolation.

pub mod cubic;

pub use cubic::{CubicSpline, SplineBoundary};

use fv_core::{ensure, errors::Result, Real};

/// A 1D interpolation function `f: R → R` defined by a set of known points.
pub trait Interpolation1D: std::fmt::Debug {
    /// Evaluate the interpolation at `x`. Points outside the node range are
    /// extrapolated from the outermost segment.
    fn value(&self, x: Real) -> Real;

    /// Lower bound of the interpolation domain.
    fn x_min(&self) -> Real;

    /// Upper bound of the interpolation domain.
    fn x_max(&self) -> Real;

    /// Return `true` if `x` is within the interpolation range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

/// Check that the nodes are usable: equal lengths, at least `min_points`
/// points, finite and strictly increasing abscissae.
pub(crate) fn check_nodes(xs: &[Real], ys: &[Real], min_points: usize) -> Result<()> {
    ensure!(
        xs.len() >= min_points,
        "need at least {min_points} points for interpolation, got {}",
        xs.len()
    );
    ensure!(
        xs.len() == ys.len(),
        "xs and ys must have the same length ({} vs {})",
        xs.len(),
        ys.len()
    );
    ensure!(
        xs.windows(2).all(|w| w[1] > w[0]),
        "abscissae must be strictly increasing"
    );
    ensure!(
        ys.iter().all(|y| y.is_finite()),
        "ordinates must be finite"
    );
    Ok(())
}

/// Binary search: index `i` with `xs[i] <= x < xs[i+1]`, clamped to the
/// first and last segments.
pub(crate) fn locate(xs: &[Real], x: Real) -> usize {
    let n = xs.len();
    if x <= xs[0] {
        return 0;
    }
    if x >= xs[n - 1] {
        return n - 2;
    }
    xs.partition_point(|&xi| xi <= x) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_finds_segment() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(locate(&xs, -1.0), 0);
        assert_eq!(locate(&xs, 1.0), 1);
        assert_eq!(locate(&xs, 2.5), 2);
        assert_eq!(locate(&xs, 3.0), 2);
    }

    #[test]
    fn rejects_unsorted_nodes() {
        assert!(CubicSpline::new(&[0.0, 2.0, 1.0, 3.0], &[0.0, 1.0, 2.0, 3.0]).is_err());
        assert!(CubicSpline::new(&[0.0], &[0.0]).is_err());
        assert!(check_nodes(&[0.0, 1.0], &[0.0, Real::NAN], 2).is_err());
    }
}
