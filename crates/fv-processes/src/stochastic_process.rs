//! Base trait for one-factor diffusions.
//!
//! A process `dX = μ(t,X) dt + σ(t,X) dW` is described by its drift `μ`
//! and diffusion `σ`; `evolve_1d` advances the state by one Euler step given
//! a standard-normal shock.

use fv_core::{Real, Time};

/// A one-dimensional diffusion `dX = μ(t,X) dt + σ(t,X) dW`.
pub trait StochasticProcess1D: std::fmt::Debug + Send + Sync {
    /// Initial value of the process.
    fn x0(&self) -> Real;

    /// Drift `μ(t, x)`.
    fn drift_1d(&self, t: Time, x: Real) -> Real;

    /// Diffusion `σ(t, x)`.
    fn diffusion_1d(&self, t: Time, x: Real) -> Real;

    /// Expected value `E[x(t+Δt) | x(t) = x]` to first order.
    fn expectation_1d(&self, t: Time, x: Real, dt: Time) -> Real {
        x + self.drift_1d(t, x) * dt
    }

    /// Standard deviation `σ(t,x) · √Δt`.
    fn std_deviation_1d(&self, t: Time, x: Real, dt: Time) -> Real {
        self.diffusion_1d(t, x) * dt.sqrt()
    }

    /// Euler step: `E + σ·√Δt · dw`.
    fn evolve_1d(&self, t: Time, x: Real, dt: Time, dw: Real) -> Real {
        self.expectation_1d(t, x, dt) + self.std_deviation_1d(t, x, dt) * dw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// dX = 0.05·dt + 0.20·dW
    #[derive(Debug)]
    struct ConstantProcess;

    impl StochasticProcess1D for ConstantProcess {
        fn x0(&self) -> Real {
            100.0
        }

        fn drift_1d(&self, _t: Time, _x: Real) -> Real {
            0.05
        }

        fn diffusion_1d(&self, _t: Time, _x: Real) -> Real {
            0.20
        }
    }

    #[test]
    fn euler_step_combines_drift_and_shock() {
        let p = ConstantProcess;
        // 100 + 0.05·0.25 + 0.20·0.5
        assert_abs_diff_eq!(p.evolve_1d(0.0, 100.0, 0.25, 1.0), 100.1125, epsilon = 1e-12);
    }

    #[test]
    fn std_deviation_scales_with_root_dt() {
        let p = ConstantProcess;
        assert_abs_diff_eq!(p.std_deviation_1d(0.0, 100.0, 0.04), 0.04, epsilon = 1e-15);
        assert_abs_diff_eq!(p.expectation_1d(0.0, 100.0, 0.5), 100.025, epsilon = 1e-12);
    }
}
