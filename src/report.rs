//! Run results: per-task records, the run-wide report, and result files.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rcs_core::EnergyBreakdown;
use serde::{Deserialize, Serialize};

use crate::adapter::Inference;
use crate::error::RcsError;
use crate::task::{Task, TaskId};

/// Round to four decimals, the precision results are reported at.
///
/// The exact binary value is rounded to the nearest 4-decimal number, ties
/// to even, and the closest `f64` to that decimal is returned.
#[must_use]
pub fn round4(value: f64) -> f64 {
    format!("{value:.4}").parse().unwrap_or(value)
}

/// Outcome of scoring one task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: Option<TaskId>,
    /// Coherence score, rounded to 4 decimals.
    pub rcs: f64,
    /// Incoherence energy, rounded to 4 decimals.
    pub energy: f64,
    pub intent: String,
    pub understanding: String,
    pub action: String,
    pub reference_action: String,
}

/// A task left out of the run because its adapter call failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTask {
    pub task_id: Option<TaskId>,
    pub error: String,
}

/// A scored task together with its unrounded score.
///
/// The run average is taken over unrounded scores, so the runner keeps
/// both until the report is assembled.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredTask {
    pub result: TaskResult,
    pub score: f64,
}

impl ScoredTask {
    #[must_use]
    pub fn new(task: &Task, inference: Inference, breakdown: &EnergyBreakdown) -> Self {
        let score = breakdown.score();
        Self {
            result: TaskResult {
                task_id: task.id.clone(),
                rcs: round4(score),
                energy: round4(breakdown.energy),
                intent: task.intent.clone(),
                understanding: inference.understanding,
                action: inference.action,
                reference_action: task.reference_action.clone(),
            },
            score,
        }
    }
}

/// Aggregate result of a benchmark run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Name of the adapter the run used.
    pub model: String,
    /// Mean score over scored tasks, rounded to 4 decimals. 0.0 when none.
    pub average_rcs: f64,
    pub results: Vec<TaskResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedTask>,
}

impl RunReport {
    /// Build a report from scored and skipped tasks.
    #[must_use]
    pub fn from_results(
        model: impl Into<String>,
        scored: Vec<ScoredTask>,
        skipped: Vec<SkippedTask>,
    ) -> Self {
        let average = if scored.is_empty() {
            0.0
        } else {
            let sum: f64 = scored.iter().map(|s| s.score).sum();
            #[allow(clippy::cast_precision_loss)]
            let count = scored.len() as f64;
            sum / count
        };
        Self {
            model: model.into(),
            average_rcs: round4(average),
            results: scored.into_iter().map(|s| s.result).collect(),
            skipped,
        }
    }

    /// File name for this report at time `at`:
    /// `rcs_<model>_<YYYYMMDD-HHMMSS>.json`.
    #[must_use]
    pub fn file_name(&self, at: DateTime<Utc>) -> String {
        format!(
            "rcs_{}_{}.json",
            sanitize_model(&self.model),
            at.format("%Y%m%d-%H%M%S")
        )
    }

    /// Pretty JSON, non-ASCII kept verbatim.
    ///
    /// # Errors
    /// Returns [`RcsError::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<String, RcsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report into `dir`, creating it if missing.
    ///
    /// # Errors
    /// Returns [`RcsError::WriteResults`] when the directory or file cannot
    /// be written.
    pub fn write(&self, dir: &Path) -> Result<PathBuf, RcsError> {
        self.write_at(dir, Utc::now())
    }

    /// [`write`](Self::write) with an explicit timestamp.
    ///
    /// # Errors
    /// Same as [`write`](Self::write).
    pub fn write_at(&self, dir: &Path, at: DateTime<Utc>) -> Result<PathBuf, RcsError> {
        std::fs::create_dir_all(dir).map_err(|source| RcsError::WriteResults {
            path: dir.to_owned(),
            source,
        })?;
        let path = dir.join(self.file_name(at));
        let mut json = self.to_json()?;
        json.push('\n');
        std::fs::write(&path, json).map_err(|source| RcsError::WriteResults {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "results written");
        Ok(path)
    }

    /// Human summary printed at the end of `rcs run`.
    #[must_use]
    pub fn summary(&self, saved: Option<&Path>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Model: {}", self.model);
        let _ = writeln!(out, "Tasks scored: {}", self.results.len());
        if !self.skipped.is_empty() {
            let _ = writeln!(out, "Tasks skipped: {}", self.skipped.len());
            for skipped in &self.skipped {
                let id = skipped
                    .task_id
                    .as_ref()
                    .map_or_else(|| "-".to_owned(), ToString::to_string);
                let first_line = skipped.error.lines().next().unwrap_or_default();
                let _ = writeln!(out, "  {id}: {first_line}");
            }
        }
        let _ = writeln!(out, "Average RCS: {:.4}", self.average_rcs);
        if let Some(path) = saved {
            let _ = writeln!(out, "Saved: {}", path.display());
        }
        out
    }
}

fn sanitize_model(model: &str) -> String {
    let cleaned: String = model
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '-' } else { c })
        .collect();
    if cleaned.is_empty() {
        "unnamed".to_owned()
    } else {
        cleaned
    }
}
