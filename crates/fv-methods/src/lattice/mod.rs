//! Lattice methods for option pricing.
//!
//! * [`BinomialTree`] — recombining binomial tree (CRR, Jarrow-Rudd, Tian)
//! * [`price_european`] / [`price_american`] — backward-induction pricing

pub mod binomial_tree;

pub use binomial_tree::BinomialTree;

use fv_core::Real;

// ─── Backward-induction pricing ───────────────────────────────────────────────

/// Price a European option by backward induction on a binomial tree.
///
/// `payoff` maps the underlying at expiry to the option value, e.g.
/// `|s| (s - K).max(0.0)`. Each step discounts with `tree.discount()`.
pub fn price_european(tree: &BinomialTree, payoff: &dyn Fn(Real) -> Real) -> Real {
    roll_back(tree, payoff, false)
}

/// Price an American option by backward induction on a binomial tree.
///
/// Same as European pricing, but every node takes
/// `max(hold, exercise)`.
pub fn price_american(tree: &BinomialTree, payoff: &dyn Fn(Real) -> Real) -> Real {
    roll_back(tree, payoff, true)
}

fn roll_back(tree: &BinomialTree, payoff: &dyn Fn(Real) -> Real, early_exercise: bool) -> Real {
    let n = tree.steps();
    let pu = tree.probability_up();
    let pd = 1.0 - pu;
    let discount = tree.discount();

    let mut values: Vec<Real> = tree.layer(n).into_iter().map(payoff).collect();

    for i in (0..n).rev() {
        // node j of layer i leads to j (down) and j + 1 (up)
        for j in 0..tree.size(i) {
            values[j] = discount * (pu * values[j + 1] + pd * values[j]);
        }
        values.truncate(tree.size(i));
        if early_exercise {
            for (v, s) in values.iter_mut().zip(tree.layer(i)) {
                *v = v.max(payoff(s));
            }
        }
    }

    values[0]
}
