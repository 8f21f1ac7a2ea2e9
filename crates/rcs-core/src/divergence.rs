//! Directed Kullback–Leibler divergence.

use crate::distribution::Distribution;

/// Floor applied to every probability before the ratio and the logarithm.
pub const EPSILON: f64 = 1e-12;

/// `KL(p ‖ q) = Σ p(k)·ln(p(k)/q(k))` over the support of `p`.
///
/// Probabilities below [`EPSILON`] are raised to it, and a token of `p` that
/// is missing from `q` is treated as having probability [`EPSILON`]. The
/// result is clamped at 0 so rounding never reports a negative divergence
/// for near-identical inputs.
#[must_use]
pub fn kl(p: &Distribution, q: &Distribution) -> f64 {
    let sum: f64 = p
        .iter()
        .map(|(token, pv)| {
            let pv = pv.max(EPSILON);
            let qv = q.get(token).unwrap_or(EPSILON).max(EPSILON);
            pv * (pv / qv).ln()
        })
        .sum();
    sum.max(0.0)
}
