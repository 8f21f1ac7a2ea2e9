//! Benchmark configuration (`rcs.toml`).
//!
//! Defines the typed configuration for run defaults, scoring parameters,
//! adapter options, and externally declared adapters.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use rcs_core::{DEFAULT_SMOOTHING, Weights};
use serde::Deserialize;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "rcs.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level benchmark configuration.
///
/// Parsed from `rcs.toml`. Missing fields use sensible defaults.
/// Missing file → all defaults (no error).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RcsConfig {
    /// Run defaults (task file, adapter, results directory).
    #[serde(default)]
    pub run: RunConfig,

    /// Scoring weights and smoothing.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Options handed to whichever adapter is selected.
    #[serde(default)]
    pub adapter: AdapterSection,

    /// External-process adapters, keyed by the name they register under.
    #[serde(default)]
    pub adapters: BTreeMap<String, CommandAdapterConfig>,
}

// ---------------------------------------------------------------------------
// RunConfig
// ---------------------------------------------------------------------------

/// Defaults for `rcs run`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Task file (default: `"tasks/sample_tasks.json"`).
    #[serde(default = "default_tasks")]
    pub tasks: PathBuf,

    /// Adapter name (default: `"echo"`).
    #[serde(default = "default_adapter")]
    pub adapter: String,

    /// Directory result files are written to (default: `"results"`).
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// What to do when an adapter fails on a task.
    #[serde(default)]
    pub on_error: OnError,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tasks: default_tasks(),
            adapter: default_adapter(),
            results_dir: default_results_dir(),
            on_error: OnError::default(),
        }
    }
}

fn default_tasks() -> PathBuf {
    PathBuf::from("tasks/sample_tasks.json")
}

fn default_adapter() -> String {
    "echo".to_owned()
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

/// Failure policy for adapter errors during a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OnError {
    /// Stop the run at the first failing task.
    #[default]
    Abort,
    /// Record the failure, leave the task out of the average, and continue.
    Skip,
}

impl fmt::Display for OnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

// ---------------------------------------------------------------------------
// ScoringConfig
// ---------------------------------------------------------------------------

/// Run-wide scoring defaults. Per-task weights override these.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_beta")]
    pub beta: f64,
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    /// Laplace add-constant.
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            beta: default_beta(),
            gamma: default_gamma(),
            smoothing: default_smoothing(),
        }
    }
}

impl ScoringConfig {
    /// The configured weights.
    #[must_use]
    pub const fn weights(&self) -> Weights {
        Weights::new(self.alpha, self.beta, self.gamma)
    }
}

fn default_alpha() -> f64 {
    Weights::default().alpha
}

fn default_beta() -> f64 {
    Weights::default().beta
}

fn default_gamma() -> f64 {
    Weights::default().gamma
}

const fn default_smoothing() -> f64 {
    DEFAULT_SMOOTHING
}

// ---------------------------------------------------------------------------
// Adapter sections
// ---------------------------------------------------------------------------

/// `[adapter]`: lowest-precedence adapter options.
///
/// The api key is not configurable here; it comes from the
/// command line or the environment only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterSection {
    /// Model name forwarded to the adapter.
    pub model: Option<String>,

    /// Free-form adapter parameters.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// `[adapters.<name>]`: an adapter backed by an external process.
///
/// ```toml
/// [adapters.local-llm]
/// command = ["python3", "scripts/local_llm.py"]
/// requires_api_key = false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandAdapterConfig {
    /// Program and arguments. Must be non-empty.
    pub command: Vec<String>,

    /// Fail at configure time when no api key was resolved.
    #[serde(default)]
    pub requires_api_key: bool,

    /// Working directory for the process (default: inherited).
    pub cwd: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading an `rcs.toml` file.
#[derive(Debug)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl RcsConfig {
    /// Load configuration from a TOML file.
    ///
    /// - If the file does not exist, returns all defaults (not an error).
    /// - If the file exists but contains invalid TOML or unknown fields,
    ///   returns a [`ConfigError`] with line-level detail.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML, unknown fields, or an external
    /// adapter declared with an empty command.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })?;

        if let Some((name, _)) = config.adapters.iter().find(|(_, a)| a.command.is_empty()) {
            return Err(ConfigError {
                path: None,
                message: format!("adapter '{name}' has an empty `command`"),
            });
        }
        check_smoothing(config.scoring.smoothing).map_err(|reason| ConfigError {
            path: None,
            message: format!("[scoring] smoothing: {reason}"),
        })?;

        Ok(config)
    }
}

/// Smoothing must be positive and finite, otherwise an empty channel has
/// zero total mass and its probabilities are undefined.
///
/// # Errors
/// Returns the reason the value is rejected.
pub fn check_smoothing(value: f64) -> Result<f64, String> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("must be a positive finite number, got {value}"))
    }
}

/// `clap` value parser for `--smoothing`.
///
/// # Errors
/// Returns a message for unparsable or out-of-range values.
pub fn parse_smoothing(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("invalid number '{raw}': {e}"))?;
    check_smoothing(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
