//! Energy → bounded coherence score.

use crate::energy::Scorer;
use crate::weights::Weights;

/// Map incoherence energy to `1 − min(1, ℰ)`.
///
/// Energy of 0 is a perfect score of 1; any energy of 1 or more saturates
/// to 0. This is a clipping transform, not a calibrated probability.
#[must_use]
pub fn normalize(energy: f64) -> f64 {
    1.0 - energy.min(1.0)
}

/// Rose Coherence Score of `(intent, understanding, action)` with the default
/// smoothing constant. Always in `[0, 1]` for nonnegative weights.
#[must_use]
pub fn score(intent: &str, understanding: &str, action: &str, weights: Weights) -> f64 {
    Scorer::default().score(intent, understanding, action, weights)
}
