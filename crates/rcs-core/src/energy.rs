//! Incoherence energy: the weighted cyclic sum of three directed divergences.
//!
//! ```text
//! ℰ = α·KL(P_I ‖ P_U) + β·KL(P_U ‖ P_A) + γ·KL(P_A ‖ P_I)
//! ```
//!
//! The pairing is cyclic and directed. The first term penalizes
//! drift from intent to understanding, the second drift from understanding
//! to action, and the third closes the loop so an action that faithfully
//! follows a wrong understanding is still penalized against the intent.

use serde::Serialize;

use crate::distribution::{DEFAULT_SMOOTHING, Distribution, Vocabulary};
use crate::divergence::kl;
use crate::score::normalize;
use crate::weights::Weights;

/// The three raw divergences of one call, plus the weighted energy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EnergyBreakdown {
    /// `KL(P_I ‖ P_U)`.
    pub intent_understanding: f64,
    /// `KL(P_U ‖ P_A)`.
    pub understanding_action: f64,
    /// `KL(P_A ‖ P_I)`.
    pub action_intent: f64,
    /// Weights the energy was computed with.
    pub weights: Weights,
    /// `ℰ`.
    pub energy: f64,
}

impl EnergyBreakdown {
    /// The coherence score for this energy.
    #[must_use]
    pub fn score(&self) -> f64 {
        normalize(self.energy)
    }
}

/// Scoring with an explicit smoothing constant.
///
/// The free functions [`energy`], [`breakdown`] and [`crate::score`] use
/// [`DEFAULT_SMOOTHING`]; use a `Scorer` when the constant is configured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scorer {
    smoothing: f64,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING)
    }
}

impl Scorer {
    /// `smoothing` must be positive and finite. With zero, a channel with
    /// no tokens has no mass and its probabilities are undefined.
    #[must_use]
    pub const fn new(smoothing: f64) -> Self {
        Self { smoothing }
    }

    #[must_use]
    pub const fn smoothing(&self) -> f64 {
        self.smoothing
    }

    /// Compute the three divergences and the energy for `(I, U, A)`.
    #[must_use]
    pub fn breakdown(
        &self,
        intent: &str,
        understanding: &str,
        action: &str,
        weights: Weights,
    ) -> EnergyBreakdown {
        let mut vocab = Vocabulary::from_texts([intent, understanding, action]);
        let p_i = Distribution::build(intent, &mut vocab, self.smoothing);
        let p_u = Distribution::build(understanding, &mut vocab, self.smoothing);
        let p_a = Distribution::build(action, &mut vocab, self.smoothing);

        let intent_understanding = kl(&p_i, &p_u);
        let understanding_action = kl(&p_u, &p_a);
        let action_intent = kl(&p_a, &p_i);

        #[allow(clippy::suboptimal_flops)]
        let energy = weights.alpha * intent_understanding
            + weights.beta * understanding_action
            + weights.gamma * action_intent;

        EnergyBreakdown {
            intent_understanding,
            understanding_action,
            action_intent,
            weights,
            energy,
        }
    }

    /// Incoherence energy `ℰ`.
    #[must_use]
    pub fn energy(
        &self,
        intent: &str,
        understanding: &str,
        action: &str,
        weights: Weights,
    ) -> f64 {
        self.breakdown(intent, understanding, action, weights).energy
    }

    /// Coherence score `1 − min(1, ℰ)`.
    #[must_use]
    pub fn score(
        &self,
        intent: &str,
        understanding: &str,
        action: &str,
        weights: Weights,
    ) -> f64 {
        normalize(self.energy(intent, understanding, action, weights))
    }
}

/// Incoherence energy `ℰ` with the default smoothing constant.
#[must_use]
pub fn energy(intent: &str, understanding: &str, action: &str, weights: Weights) -> f64 {
    Scorer::default().energy(intent, understanding, action, weights)
}

/// Per-term divergences and energy with the default smoothing constant.
#[must_use]
pub fn breakdown(
    intent: &str,
    understanding: &str,
    action: &str,
    weights: Weights,
) -> EnergyBreakdown {
    Scorer::default().breakdown(intent, understanding, action, weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    const I: &str = "Sort a list of numbers ascending";
    const U: &str = "You want ascending sort";
    const A: &str = "Here is code that sorts ascending";

    #[test]
    fn identical_channels_have_zero_energy() {
        let text = "fix the login bug";
        let e = energy(text, text, text, Weights::default());
        assert_eq!(e, 0.0);
    }

    #[test]
    fn reference_example_energy() {
        let e = energy(I, U, A, Weights::default());
        assert!((e - 0.274_866_023_950_248_8).abs() < 1e-9, "energy = {e}");
    }

    #[test]
    fn energy_is_the_weighted_sum_of_the_breakdown() {
        let w = Weights::new(0.7, 1.3, 0.2);
        let b = breakdown(I, U, A, w);
        let expected = 0.7 * b.intent_understanding
            + 1.3 * b.understanding_action
            + 0.2 * b.action_intent;
        assert!((b.energy - expected).abs() < 1e-12);
        assert_eq!(b.weights, w);
    }

    #[test]
    fn zero_weights_give_zero_energy() {
        let e = energy(I, U, A, Weights::new(0.0, 0.0, 0.0));
        assert_eq!(e, 0.0);
    }

    #[test]
    fn each_term_uses_its_own_direction() {
        // Only the action differs: I→U is zero, the other two are not.
        let b = breakdown(
            "build the parser",
            "build the parser",
            "deleted everything",
            Weights::default(),
        );
        assert_eq!(b.intent_understanding, 0.0);
        assert!(b.understanding_action > 0.0);
        assert!(b.action_intent > 0.0);
    }

    #[test]
    fn closing_term_penalizes_action_following_wrong_understanding() {
        // U and A agree with each other but not with I.
        let b = breakdown("write a poem", "compute taxes", "compute taxes", Weights::default());
        assert_eq!(b.understanding_action, 0.0);
        assert!(b.action_intent > 0.0);
    }

    #[test]
    fn larger_smoothing_flattens_distributions() {
        let sharp = Scorer::new(0.1).energy(I, U, A, Weights::default());
        let flat = Scorer::new(10.0).energy(I, U, A, Weights::default());
        assert!(flat < sharp);
    }

    #[test]
    fn breakdown_score_matches_scorer() {
        let scorer = Scorer::default();
        let b = scorer.breakdown(I, U, A, Weights::default());
        assert_eq!(b.score(), scorer.score(I, U, A, Weights::default()));
    }
}
