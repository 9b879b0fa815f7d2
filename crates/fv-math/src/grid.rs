//! Uniform grids.

use fv_core::Real;

/// `n` evenly spaced points from `start` to `end` inclusive.
///
/// `n == 1` yields `[start]`; `n == 0` yields an empty vector.
pub fn linspace(start: Real, end: Real, n: usize) -> Vec<Real> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as Real;
            let mut v: Vec<Real> = (0..n).map(|i| start + i as Real * step).collect();
            v[n - 1] = end;
            v
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_exact() {
        let v = linspace(-1.0, 1.0, 1001);
        assert_eq!(v.len(), 1001);
        assert_eq!(v[0], -1.0);
        assert_eq!(v[1000], 1.0);
        assert!((v[500]).abs() < 1e-15);
    }

    #[test]
    fn degenerate_sizes() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(2.0, 5.0, 1), vec![2.0]);
    }
}
