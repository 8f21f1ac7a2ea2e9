//! Driver error type.
//!
//! [`RcsError`] covers everything that can stop a benchmark run: picking and
//! configuring an adapter, loading tasks and configuration, a backend
//! failing on a task, and writing results. The scoring engine itself never
//! fails and has no variant here.
//!
//! Messages are meant to be read by whoever launched the run: each says what
//! went wrong and, where there is one, how to fix it.

use std::path::PathBuf;

use thiserror::Error;

use crate::adapter::{AdapterConfigError, BackendError};
use crate::config::ConfigError;
use crate::task::TaskFileError;

/// Unified error for benchmark runs.
#[derive(Debug, Error)]
pub enum RcsError {
    /// No adapter is registered under the requested name.
    #[error(
        "unknown adapter '{name}'.\n  Available: {}\n  To fix: pick one of the above, or declare it under [adapters.{name}] in rcs.toml.",
        .available.join(", ")
    )]
    UnknownAdapter {
        /// The requested name.
        name: String,
        /// Registered names.
        available: Vec<String>,
    },

    /// The adapter rejected its options.
    #[error(transparent)]
    AdapterConfig(#[from] AdapterConfigError),

    /// The adapter failed while producing output for a task.
    #[error("task {task}: {source}")]
    Backend {
        /// Label of the task being processed (its id, or its position).
        task: String,
        /// What the backend reported.
        #[source]
        source: BackendError,
    },

    /// The task file could not be loaded.
    #[error(transparent)]
    Tasks(#[from] TaskFileError),

    /// The configuration file could not be loaded.
    #[error("{0}\n  To fix: edit the config file and correct the issue.")]
    Config(#[from] ConfigError),

    /// The result file could not be written.
    #[error("could not write results to '{}': {source}\n  To fix: check that the results directory is writable.", .path.display())]
    WriteResults {
        /// File or directory being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The run report could not be encoded.
    #[error("could not encode results: {0}")]
    Encode(#[from] serde_json::Error),
}
