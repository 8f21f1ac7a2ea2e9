//! Weights of the three energy terms.

use serde::{Deserialize, Serialize};

/// `α`, `β`, `γ` weights of `KL(I‖U)`, `KL(U‖A)`, `KL(A‖I)`.
///
/// Values are taken as given. Negative weights produce a well-defined but
/// meaningless energy; constraining them is the caller's job.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    /// Intent → understanding.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Understanding → action.
    #[serde(default = "default_beta")]
    pub beta: f64,
    /// Action → intent.
    #[serde(default = "default_gamma")]
    pub gamma: f64,
}

impl Weights {
    #[must_use]
    pub const fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }

    /// Replace each weight that `overrides` sets.
    #[must_use]
    pub fn with_overrides(self, overrides: WeightOverrides) -> Self {
        Self {
            alpha: overrides.alpha.unwrap_or(self.alpha),
            beta: overrides.beta.unwrap_or(self.beta),
            gamma: overrides.gamma.unwrap_or(self.gamma),
        }
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            beta: default_beta(),
            gamma: default_gamma(),
        }
    }
}

const fn default_alpha() -> f64 {
    1.0
}

const fn default_beta() -> f64 {
    0.5
}

const fn default_gamma() -> f64 {
    0.5
}

/// Partial weights, e.g. per-task overrides or command-line flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
}

impl WeightOverrides {
    /// `true` when no weight is overridden.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.alpha.is_none() && self.beta.is_none() && self.gamma.is_none()
    }
}
