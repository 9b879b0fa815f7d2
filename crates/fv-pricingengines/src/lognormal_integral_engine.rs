//! European pricing by direct integration against the lognormal density.
//!
//! `V = e^{−rT} ∫ payoff(eˣ) p(x) dx` with `x = ln S_T ~ N(m, s²)`,
//! `m = ln S₀ + (r − q − σ²/2)T`, `s = σ√T`. The integral runs over
//! `m ± 10s` and is split at `ln K` where the payoff has its kink. A piece
//! that misses the quadrature tolerance is logged and its last estimate kept.

use fv_core::{ensure, errors::Result, Real, Time};
use fv_instruments::{PricingEngine, PricingResults, StrikedPayoff, VanillaOptionArguments};
use fv_math::integrals::SimpsonIntegral;
use fv_math::normal_pdf;
use fv_processes::BlackScholesMertonProcess;
use tracing::warn;

use crate::analytic_european_engine::require_european;

/// Half-width of the integration window in standard deviations.
const WINDOW: Real = 10.0;

/// Price a European payoff by quadrature over the terminal log price.
pub fn lognormal_integral_price(
    process: &BlackScholesMertonProcess,
    payoff: &dyn StrikedPayoff,
    maturity: Time,
) -> Result<Real> {
    integrate_lognormal(process, payoff, maturity, &SimpsonIntegral::new(1e-10, 1 << 20))
}

fn integrate_lognormal(
    process: &BlackScholesMertonProcess,
    payoff: &dyn StrikedPayoff,
    maturity: Time,
    integrator: &SimpsonIntegral,
) -> Result<Real> {
    ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
    let sigma = process.volatility();
    ensure!(sigma > 0.0, "lognormal density needs positive volatility");

    let s = sigma * maturity.sqrt();
    let m = process.s0().ln()
        + (process.risk_free_rate() - process.dividend_yield() - 0.5 * sigma * sigma) * maturity;
    let integrand = |x: Real| payoff.value(x.exp()) * normal_pdf((x - m) / s) / s;

    let (lo, hi) = (m - WINDOW * s, m + WINDOW * s);
    let kink = payoff.strike().ln();
    let pieces: Vec<(Real, Real)> = if kink > lo && kink < hi {
        vec![(lo, kink), (kink, hi)]
    } else {
        vec![(lo, hi)]
    };

    let mut total = 0.0;
    for (a, b) in pieces {
        let est = integrator.estimate(integrand, a, b);
        if !est.converged {
            warn!(
                a,
                b,
                change = est.change,
                evaluations = est.evaluations,
                "lognormal integral did not converge"
            );
        }
        total += est.value;
    }
    Ok(process.discount(maturity) * total)
}

/// Engine wrapping [`lognormal_integral_price`].
#[derive(Debug, Clone)]
pub struct LognormalIntegralEngine {
    process: BlackScholesMertonProcess,
}

impl LognormalIntegralEngine {
    /// Create the engine.
    pub fn new(process: BlackScholesMertonProcess) -> Self {
        Self { process }
    }
}

impl PricingEngine<VanillaOptionArguments> for LognormalIntegralEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        require_european(args, "lognormal integral engine")?;
        let price = lognormal_integral_price(&self.process, args.payoff.as_ref(), args.maturity())?;
        Ok(PricingResults::from_npv(price))
    }
}
