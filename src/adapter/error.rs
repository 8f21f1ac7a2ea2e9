//! Error types for adapter operations.
//!
//! [`AdapterConfigError`] is returned by
//! [`Adapter::configure`](super::Adapter::configure) and [`BackendError`] by
//! [`Adapter::infer`](super::Adapter::infer). Messages end with a short
//! "To fix" hint so whoever runs the benchmark can act on them directly.

use thiserror::Error;

/// One-time setup of an adapter failed.
#[derive(Debug, Error)]
pub enum AdapterConfigError {
    /// The adapter needs a credential and none was resolved.
    #[error("adapter '{adapter}' requires an API key.\n  To fix: pass --api-key or set RCS_API_KEY.")]
    MissingCredential {
        /// Adapter name.
        adapter: String,
    },

    /// The adapter was declared without a program to run.
    #[error("adapter '{adapter}' has no command to run.\n  To fix: set `command` under [adapters.{adapter}] in rcs.toml.")]
    EmptyCommand {
        /// Adapter name.
        adapter: String,
    },

    /// An option was present but unusable.
    #[error("adapter '{adapter}': invalid option `{option}`: {reason}")]
    InvalidOption {
        /// Adapter name.
        adapter: String,
        /// Option key.
        option: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// A backend failed while producing an inference.
#[derive(Debug, Error)]
pub enum BackendError {
    /// `infer` was called before a successful `configure`.
    #[error("adapter '{adapter}' used before configure()")]
    NotConfigured {
        /// Adapter name.
        adapter: String,
    },

    /// The backend process could not be started or talked to.
    #[error("failed to run `{program}`: {source}\n  To fix: check that the program exists and is executable.")]
    Spawn {
        /// Program that was executed.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The backend exited unsuccessfully.
    #[error("`{program}` exited with {status}{}", stderr_suffix(.stderr))]
    Exited {
        /// Program that was executed.
        program: String,
        /// Exit status description (`code 2`, `signal`).
        status: String,
        /// Captured stderr (trimmed, may be empty).
        stderr: String,
    },

    /// The backend answered, but not in the expected format.
    #[error("`{program}` returned malformed output: {detail}\n  To fix: print a JSON object with `understanding` and `action` string fields.")]
    Protocol {
        /// Program that was executed.
        program: String,
        /// Parse failure detail.
        detail: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n  stderr: {stderr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::options::API_KEY_ENV;

    #[test]
    fn missing_credential_names_adapter_and_env() {
        let err = AdapterConfigError::MissingCredential {
            adapter: "local-llm".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("local-llm"));
        assert!(msg.contains("--api-key"));
        assert!(msg.contains(API_KEY_ENV));
    }

    #[test]
    fn empty_command_points_at_config() {
        let msg = AdapterConfigError::EmptyCommand {
            adapter: "x".to_owned(),
        }
        .to_string();
        assert!(msg.contains("[adapters.x]"));
    }

    #[test]
    fn exited_includes_stderr_when_present() {
        let err = BackendError::Exited {
            program: "python3".to_owned(),
            status: "code 2".to_owned(),
            stderr: "Traceback".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("code 2"));
        assert!(msg.contains("stderr: Traceback"));
    }

    #[test]
    fn exited_omits_empty_stderr() {
        let err = BackendError::Exited {
            program: "false".to_owned(),
            status: "code 1".to_owned(),
            stderr: String::new(),
        };
        assert!(!err.to_string().contains("stderr:"));
    }

    #[test]
    fn spawn_error_has_source() {
        let err = BackendError::Spawn {
            program: "nope".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("executable"));
    }
}
