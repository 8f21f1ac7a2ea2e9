//! Benchmark tasks.
//!
//! A task file is a JSON array of records:
//!
//! ```json
//! [
//!   {
//!     "id": 1,
//!     "intent": "Sort a list of numbers ascending",
//!     "prompt": "Write a function that sorts [3, 1, 2] ascending.",
//!     "reference_action": "sorted([3, 1, 2])",
//!     "beta": 0.25
//!   }
//! ]
//! ```
//!
//! `id`, `reference_action` and the `alpha`/`beta`/`gamma` overrides are
//! optional. Unknown fields are ignored so task files can carry extra
//! annotations.

use std::fmt;
use std::path::{Path, PathBuf};

use rcs_core::{WeightOverrides, Weights};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A task identifier, as written in the task file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One benchmark task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: Option<TaskId>,
    /// What the agent is supposed to achieve (`I`).
    pub intent: String,
    /// What the adapter is actually asked to do.
    pub prompt: String,
    /// Known-good action, kept for reference in the results only.
    #[serde(default)]
    pub reference_action: String,
    /// Per-task weight overrides.
    #[serde(flatten)]
    pub weights: WeightOverrides,
}

impl Task {
    /// Effective weights: this task's overrides on top of `defaults`.
    #[must_use]
    pub fn weights(&self, defaults: Weights) -> Weights {
        defaults.with_overrides(self.weights)
    }

    /// Human-readable label: the id when present, else the 1-based position.
    #[must_use]
    pub fn label(&self, index: usize) -> String {
        self.id
            .as_ref()
            .map_or_else(|| format!("#{}", index + 1), ToString::to_string)
    }
}

/// A task file could not be loaded.
#[derive(Debug, Error)]
pub enum TaskFileError {
    #[error("could not read task file '{}': {source}\n  To fix: check the path passed to --tasks.", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid task file '{}' at line {line}, column {column}: {message}\n  To fix: the file must be a JSON array of objects with `intent` and `prompt` strings.", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
}

/// Read and parse a task file.
///
/// # Errors
/// Returns [`TaskFileError`] when the file cannot be read or is not a valid
/// task array.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>, TaskFileError> {
    let contents = std::fs::read_to_string(path).map_err(|source| TaskFileError::Read {
        path: path.to_owned(),
        source,
    })?;
    let tasks = parse_tasks(&contents).map_err(|e| TaskFileError::Parse {
        path: path.to_owned(),
        line: e.line(),
        column: e.column(),
        message: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), count = tasks.len(), "loaded tasks");
    Ok(tasks)
}

/// Parse tasks from a JSON string.
///
/// # Errors
/// Returns the `serde_json` error, which carries line and column.
pub fn parse_tasks(json: &str) -> Result<Vec<Task>, serde_json::Error> {
    serde_json::from_str(json)
}
