//! Text-generation backends.
//!
//! An [`Adapter`] turns a task's `prompt` and `intent` into the agent's
//! stated understanding `U` and its action `A`, which the scoring engine
//! then compares against the intent. Adapters are selected by name through
//! an [`AdapterRegistry`]; there is no dynamic loading.
//!
//! # Module layout
//!
//! - [`echo`]: trivial baseline, for smoke tests.
//! - [`command`]: runs an external program per task (JSON over stdio).
//! - [`registry`]: name → factory lookup table.
//! - [`options`]: [`AdapterOptions`] and their precedence rules.
//! - [`error`]: [`AdapterConfigError`] and [`BackendError`].

pub mod command;
pub mod echo;
pub mod error;
pub mod options;
pub mod registry;

use serde::{Deserialize, Serialize};

pub use command::CommandAdapter;
pub use echo::EchoAdapter;
pub use error::{AdapterConfigError, BackendError};
pub use options::AdapterOptions;
pub use registry::AdapterRegistry;

/// What an adapter produced for one task.
///
/// Missing fields deserialize to the empty string, which the scoring engine
/// accepts like any other text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inference {
    /// The agent's restatement of the intent (`U`).
    #[serde(default)]
    pub understanding: String,
    /// The agent's output for the task (`A`).
    #[serde(default)]
    pub action: String,
}

/// Capability interface of a text-generation backend.
///
/// The driver calls [`configure`](Adapter::configure) exactly once, then
/// [`infer`](Adapter::infer) once per task. The trait is object-safe so the
/// registry can hand out `Box<dyn Adapter>`.
pub trait Adapter {
    /// Name the adapter is registered under.
    fn name(&self) -> &str;

    /// One-time setup.
    ///
    /// # Errors
    /// Returns [`AdapterConfigError`] when the options are unusable, e.g. a
    /// required credential is missing.
    fn configure(&mut self, options: &AdapterOptions) -> Result<(), AdapterConfigError>;

    /// Produce the understanding and action for one task.
    ///
    /// # Errors
    /// Returns [`BackendError`] when the backend fails or answers in an
    /// unexpected format.
    fn infer(&self, prompt: &str, intent: &str) -> Result<Inference, BackendError>;
}
