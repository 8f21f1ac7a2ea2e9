//! Coherence scoring engine for rcs.
//!
//! Computes the Rose Coherence Score (RCS) from three short texts: the
//! original *intent* `I`, the agent's stated *understanding* `U`, and the
//! *action* `A` it produced. The pipeline is small and
//! auditable:
//!
//! 1. [`tokenize`]: lowercase alphanumeric word tokens.
//! 2. [`distribution`]: add-`smoothing` unigram distributions over a
//!    vocabulary shared by all three channels.
//! 3. [`divergence`]: directed Kullback–Leibler divergence with an epsilon
//!    clamp.
//! 4. [`energy`]: `ℰ = α·KL(I‖U) + β·KL(U‖A) + γ·KL(A‖I)`.
//! 5. [`score`]: `RCS = 1 − min(1, ℰ)`.
//!
//! Every function here is pure: no I/O, no shared state, no error paths.
//! Calls are safe to make concurrently from any number of threads.
//!
//! ```
//! use rcs_core::{Weights, score};
//!
//! let s = score(
//!     "Sort a list of numbers ascending",
//!     "You want ascending sort",
//!     "Here is code that sorts ascending",
//!     Weights::default(),
//! );
//! assert!(s > 0.0 && s < 1.0);
//! ```

pub mod distribution;
pub mod divergence;
pub mod energy;
pub mod score;
pub mod tokenize;
pub mod weights;

pub use distribution::{DEFAULT_SMOOTHING, Distribution, Vocabulary};
pub use divergence::{EPSILON, kl};
pub use energy::{EnergyBreakdown, Scorer, breakdown, energy};
pub use score::{normalize, score};
pub use tokenize::{token_counts, tokenize};
pub use weights::{WeightOverrides, Weights};
