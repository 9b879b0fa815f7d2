//! Recombining binomial trees for option pricing.
//!
//! | Variant | Type | Reference |
//! |---|---|---|
//! | [`BinomialTree::cox_ross_rubinstein`] | Equal jumps | Cox, Ross & Rubinstein (1979) |
//! | [`BinomialTree::jarrow_rudd`] | Equal probabilities | Jarrow & Rudd (1983) |
//! | [`BinomialTree::tian`] | Third-moment matching | Tian (1993) |

use fv_core::{ensure, errors::Result, DiscountFactor, Real, Time};
use fv_processes::BlackScholesMertonProcess;

/// A recombining binomial tree for geometric Brownian motion.
///
/// The tree has `steps + 1` time layers, with layer `i` having `i + 1` nodes.
/// Node `(i, j)` is the state after `j` up-moves and `i − j` down-moves:
/// `S₀ uʲ d^{i−j}`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinomialTree {
    x0: Real,
    dt: Time,
    steps: usize,
    up: Real,
    down: Real,
    pu: Real,
    discount: DiscountFactor,
}

impl BinomialTree {
    // ── Named constructors ───────────────────────────────────────────────

    /// Cox-Ross-Rubinstein tree: `u = e^{σ√Δt}`, `d = 1/u`,
    /// `p = (e^{(r−q)Δt} − d)/(u − d)`.
    pub fn cox_ross_rubinstein(
        process: &BlackScholesMertonProcess,
        end: Time,
        steps: usize,
    ) -> Result<Self> {
        let dt = step_size(end, steps)?;
        let up = (process.volatility() * dt.sqrt()).exp();
        let down = 1.0 / up;
        let growth = ((process.risk_free_rate() - process.dividend_yield()) * dt).exp();
        Self::build(process, dt, steps, up, down, (growth - down) / (up - down))
    }

    /// Jarrow-Rudd tree: equal probabilities, drift carried by the nodes.
    ///
    /// `u, d = exp((r − q − σ²/2)Δt ± σ√Δt)`, `p = ½`.
    pub fn jarrow_rudd(process: &BlackScholesMertonProcess, end: Time, steps: usize) -> Result<Self> {
        let dt = step_size(end, steps)?;
        let sigma = process.volatility();
        let drift = (process.risk_free_rate() - process.dividend_yield() - 0.5 * sigma * sigma) * dt;
        let jump = sigma * dt.sqrt();
        Self::build(process, dt, steps, (drift + jump).exp(), (drift - jump).exp(), 0.5)
    }

    /// Tian tree: matches the first three moments of the lognormal step.
    pub fn tian(process: &BlackScholesMertonProcess, end: Time, steps: usize) -> Result<Self> {
        let dt = step_size(end, steps)?;
        let sigma = process.volatility();
        let q = (sigma * sigma * dt).exp(); // exp(σ²Δt)
        let r_m = ((process.risk_free_rate() - process.dividend_yield()) * dt).exp();
        let root = (q * q + 2.0 * q - 3.0).sqrt();
        let up = 0.5 * r_m * q * (q + 1.0 + root);
        let down = 0.5 * r_m * q * (q + 1.0 - root);
        Self::build(process, dt, steps, up, down, (r_m - down) / (up - down))
    }

    fn build(
        process: &BlackScholesMertonProcess,
        dt: Time,
        steps: usize,
        up: Real,
        down: Real,
        pu: Real,
    ) -> Result<Self> {
        ensure!(
            up > down,
            "degenerate tree: up factor {up} must exceed down factor {down} (volatility is zero?)"
        );
        ensure!(
            (0.0..=1.0).contains(&pu),
            "invalid branch probability {pu} (try more steps)"
        );
        Ok(Self {
            x0: process.s0(),
            dt,
            steps,
            up,
            down,
            pu,
            discount: process.discount(dt),
        })
    }

    // ── Accessors ────────────────────────────────────────────────────────

    /// Number of time steps.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Time increment per step.
    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Initial underlying value (spot price).
    pub fn x0(&self) -> Real {
        self.x0
    }

    /// Up factor `u`.
    pub fn up(&self) -> Real {
        self.up
    }

    /// Down factor `d`.
    pub fn down(&self) -> Real {
        self.down
    }

    /// Probability of the up branch.
    pub fn probability_up(&self) -> Real {
        self.pu
    }

    /// One-step discount factor `e^{−rΔt}`.
    pub fn discount(&self) -> DiscountFactor {
        self.discount
    }

    /// Number of nodes at time step `i` (always `i + 1` for a binomial tree).
    pub fn size(&self, i: usize) -> usize {
        i + 1
    }

    /// Underlying value at node `(i, j)`.
    pub fn underlying(&self, i: usize, j: usize) -> Real {
        self.x0 * self.up.powi(j as i32) * self.down.powi((i - j) as i32)
    }

    /// All node values of layer `i`, lowest first.
    pub fn layer(&self, i: usize) -> Vec<Real> {
        let ratio = self.up / self.down;
        let mut s = self.x0 * self.down.powi(i as i32);
        (0..self.size(i))
            .map(|_| {
                let v = s;
                s *= ratio;
                v
            })
            .collect()
    }
}

fn step_size(end: Time, steps: usize) -> Result<Time> {
    ensure!(steps > 0, "tree needs at least one step");
    ensure!(end > 0.0 && end.is_finite(), "tree horizon must be positive, got {end}");
    Ok(end / steps as Real)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{price_american, price_european};
    use fv_instruments::OptionType;
    use fv_pricingengines::analytic_european_engine::black_scholes_merton;

    fn process() -> BlackScholesMertonProcess {
        BlackScholesMertonProcess::new(100.0, 0.05, 0.02, 0.20).unwrap()
    }

    fn bs_call_reference() -> Real {
        black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.05, 0.02, 0.20, 1.0).price
    }

    fn call_payoff(s: Real) -> Real {
        (s - 100.0).max(0.0)
    }

    #[test]
    fn crr_european_call_converges_to_bs() {
        let tree = BinomialTree::cox_ross_rubinstein(&process(), 1.0, 1_000).unwrap();
        let price = price_european(&tree, &call_payoff);
        let bs = bs_call_reference();
        assert!((price - bs).abs() < 0.02, "CRR = {price:.4}, BS = {bs:.4}");
    }

    #[test]
    fn jr_european_call_converges_to_bs() {
        let tree = BinomialTree::jarrow_rudd(&process(), 1.0, 1_000).unwrap();
        let price = price_european(&tree, &call_payoff);
        let bs = bs_call_reference();
        assert!((price - bs).abs() < 0.02, "JR = {price:.4}, BS = {bs:.4}");
    }

    #[test]
    fn tian_european_call_converges_to_bs() {
        let tree = BinomialTree::tian(&process(), 1.0, 1_000).unwrap();
        let price = price_european(&tree, &call_payoff);
        let bs = bs_call_reference();
        assert!((price - bs).abs() < 0.02, "Tian = {price:.4}, BS = {bs:.4}");
    }

    #[test]
    fn crr_nodes_recombine() {
        let tree = BinomialTree::cox_ross_rubinstein(&process(), 1.0, 10).unwrap();
        approx::assert_abs_diff_eq!(tree.underlying(2, 1), 100.0, epsilon = 1e-12);
        let layer = tree.layer(6);
        assert_eq!(layer.len(), 7);
        for (j, s) in layer.iter().enumerate() {
            approx::assert_abs_diff_eq!(*s, tree.underlying(6, j), epsilon = 1e-10);
        }
    }

    #[test]
    fn american_put_geq_european_put() {
        let tree = BinomialTree::cox_ross_rubinstein(&process(), 1.0, 500).unwrap();
        let put = |s: Real| (100.0 - s).max(0.0);
        let eu = price_european(&tree, &put);
        let am = price_american(&tree, &put);
        assert!(am >= eu, "American {am:.4} < European {eu:.4}");
    }

    #[test]
    fn invalid_probability_is_rejected() {
        // drift far larger than the jump size on one step
        let p = BlackScholesMertonProcess::new(100.0, 0.5, 0.0, 0.01).unwrap();
        assert!(BinomialTree::cox_ross_rubinstein(&p, 1.0, 1).is_err());
        assert!(BinomialTree::cox_ross_rubinstein(&process(), 1.0, 0).is_err());
        assert!(BinomialTree::cox_ross_rubinstein(&p.with_volatility(0.0).unwrap(), 1.0, 4).is_err());
    }
}
