//! Least-squares Monte Carlo (Longstaff-Schwartz) for American options
//! under Black-Scholes-Merton.
//!
//! Spot paths are stepped with the exact lognormal map. Walking backward
//! from expiry, the discounted realised cash flows of in-the-money paths
//! are regressed on `{1, x, x²}` with `x = S/K`, and a path exercises when
//! its intrinsic value exceeds the fitted continuation value.

use fv_core::{ensure, errors::Result, Real, Time};
use fv_instruments::StrikedPayoff;
use fv_math::{linear_least_squares::LinearLeastSquaresRegression, Statistics};
use fv_processes::BlackScholesMertonProcess;
use tracing::debug;

use super::{McEstimate, McSettings};

type Basis = fn(Real) -> Real;

fn constant(_: Real) -> Real {
    1.0
}

fn linear(x: Real) -> Real {
    x
}

fn quadratic(x: Real) -> Real {
    x * x
}

const BASIS: [Basis; 3] = [constant, linear, quadratic];

/// Price an American option by least-squares Monte Carlo.
///
/// Exercise is allowed at each of the `settings.steps` grid dates after 0;
/// immediate exercise at 0 is taken when it beats the estimate.
pub fn longstaff_schwartz(
    process: &BlackScholesMertonProcess,
    payoff: &dyn StrikedPayoff,
    maturity: Time,
    settings: McSettings,
) -> Result<McEstimate> {
    settings.validate()?;
    ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
    let strike = payoff.strike();
    ensure!(strike > 0.0, "strike must be positive, got {strike}");

    let steps = settings.steps;
    let dt = maturity / steps as Real;
    let step_discount = process.discount(dt);

    // spots[p][i] at t = (i + 1)·dt
    let mut rng = settings.rng();
    let spots: Vec<Vec<Real>> = (0..settings.paths)
        .map(|_| {
            let mut s = process.s0();
            (0..steps)
                .map(|_| {
                    s = process.evolve_exact(s, dt, rng.next_gaussian());
                    s
                })
                .collect()
        })
        .collect();

    // realised cash flow of each path, valued at the current step
    let mut cash: Vec<Real> = spots.iter().map(|p| payoff.value(p[steps - 1])).collect();

    for i in (0..steps - 1).rev() {
        for c in cash.iter_mut() {
            *c *= step_discount;
        }

        let itm: Vec<usize> = (0..settings.paths)
            .filter(|&p| payoff.value(spots[p][i]) > 0.0)
            .collect();
        if itm.len() < BASIS.len() {
            continue;
        }
        let x: Vec<Real> = itm.iter().map(|&p| spots[p][i] / strike).collect();
        let y: Vec<Real> = itm.iter().map(|&p| cash[p]).collect();
        let regression = LinearLeastSquaresRegression::new(&x, &y, &BASIS)?;

        for (&p, &xp) in itm.iter().zip(&x) {
            let exercise = payoff.value(spots[p][i]);
            if exercise > regression.predict(xp, &BASIS) {
                cash[p] = exercise;
            }
        }
    }

    let stats: Statistics = cash.iter().copied().collect();
    let estimate = McEstimate::from_statistics(&stats, step_discount)?;
    let intrinsic = payoff.value(process.s0());
    debug!(paths = settings.paths, steps, %estimate, intrinsic, "longstaff-schwartz");
    if intrinsic > estimate.value {
        return Ok(McEstimate::exact(intrinsic));
    }
    Ok(estimate)
}
