//! Black-Scholes implied volatility by bisection.

use fv_core::{ensure, errors::Result, Real, Time};
use fv_instruments::OptionType;
use fv_math::{linspace, solvers1d::bisection};
use tracing::debug;

use crate::analytic_european_engine::black_scholes_merton;

/// Default volatility search interval.
pub const DEFAULT_VOLATILITY_BRACKET: (Real, Real) = (0.01, 1.5);

/// Default number of points of [`price_curve_over_volatility`].
pub const DEFAULT_CURVE_POINTS: usize = 128;

fn check_bracket(bracket: (Real, Real)) -> Result<()> {
    ensure!(
        bracket.0 > 0.0 && bracket.1 > bracket.0,
        "volatility bracket must satisfy 0 < lo < hi, got {bracket:?}"
    );
    Ok(())
}

/// Volatility `σ` in `bracket` with `BSM(σ) = target`.
///
/// # Errors
/// Fails when `target` is not bracketed by the prices at the ends of
/// `bracket`.
#[allow(clippy::too_many_arguments)]
pub fn implied_volatility(
    option_type: OptionType,
    target: Real,
    spot: Real,
    strike: Real,
    risk_free_rate: Real,
    dividend_yield: Real,
    maturity: Time,
    bracket: (Real, Real),
    accuracy: Real,
) -> Result<Real> {
    check_bracket(bracket)?;
    ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
    ensure!(target.is_finite() && target >= 0.0, "target price must be non-negative");

    let objective = |sigma: Real| {
        black_scholes_merton(option_type, spot, strike, risk_free_rate, dividend_yield, sigma, maturity)
            .price
            - target
    };
    let sigma = bisection(objective, bracket.0, bracket.1, accuracy)?;
    debug!(%option_type, target, sigma, "implied volatility");
    Ok(sigma)
}

/// BSM prices at `points` volatilities spread evenly over `bracket`,
/// as `(σ, price)` pairs.
#[allow(clippy::too_many_arguments)]
pub fn price_curve_over_volatility(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Real,
    dividend_yield: Real,
    maturity: Time,
    bracket: (Real, Real),
    points: usize,
) -> Result<Vec<(Real, Real)>> {
    check_bracket(bracket)?;
    ensure!(points >= 2, "need at least two points, got {points}");
    Ok(linspace(bracket.0, bracket.1, points)
        .into_iter()
        .map(|sigma| {
            let price = black_scholes_merton(
                option_type,
                spot,
                strike,
                risk_free_rate,
                dividend_yield,
                sigma,
                maturity,
            )
            .price;
            (sigma, price)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use fv_core::Error;

    #[test]
    fn recovers_reference_volatility() {
        // T=3, r=6%, q=2%, S0=100, K=70, V0=36.691
        let sigma = implied_volatility(
            OptionType::Call,
            36.691,
            100.0,
            70.0,
            0.06,
            0.02,
            3.0,
            DEFAULT_VOLATILITY_BRACKET,
            1e-10,
        )
        .unwrap();
        let repriced = black_scholes_merton(OptionType::Call, 100.0, 70.0, 0.06, 0.02, sigma, 3.0);
        assert_abs_diff_eq!(repriced.price, 36.691, epsilon = 1e-6);
        assert!((sigma - 0.2).abs() < 1e-3, "σ = {sigma}");
    }

    #[test]
    fn unbracketed_target_is_an_error() {
        // a call can't be worth more than the discounted spot
        let err = implied_volatility(
            OptionType::Call,
            150.0,
            100.0,
            100.0,
            0.05,
            0.0,
            1.0,
            DEFAULT_VOLATILITY_BRACKET,
            1e-8,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }

    #[test]
    fn price_curve_is_increasing() {
        let curve = price_curve_over_volatility(
            OptionType::Put,
            100.0,
            110.0,
            0.05,
            0.0,
            1.0,
            DEFAULT_VOLATILITY_BRACKET,
            DEFAULT_CURVE_POINTS,
        )
        .unwrap();
        assert_eq!(curve.len(), DEFAULT_CURVE_POINTS);
        assert_abs_diff_eq!(curve[0].0, 0.01);
        assert_abs_diff_eq!(curve[DEFAULT_CURVE_POINTS - 1].0, 1.5);
        assert!(curve.windows(2).all(|w| w[1].1 >= w[0].1));
    }

    proptest::proptest! {
        #[test]
        fn round_trips_through_price(sigma in 0.1f64..1.0, k in 80.0f64..125.0) {
            let price = black_scholes_merton(OptionType::Call, 100.0, k, 0.03, 0.01, sigma, 1.0).price;
            let implied = implied_volatility(
                OptionType::Call, price, 100.0, k, 0.03, 0.01, 1.0, DEFAULT_VOLATILITY_BRACKET, 1e-12,
            ).unwrap();
            proptest::prop_assert!((implied - sigma).abs() < 1e-6);
        }
    }
}
