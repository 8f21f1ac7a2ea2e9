//! The benchmark loop.
//!
//! For each task in order: ask the adapter for an understanding and an
//! action, score the triple, record the result. Adapter failures follow the
//! configured [`OnError`] policy.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rcs_core::{Scorer, Weights};
use tracing::instrument;

use crate::adapter::Adapter;
use crate::config::{OnError, ScoringConfig};
use crate::error::RcsError;
use crate::report::{RunReport, ScoredTask, SkippedTask};
use crate::task::Task;

const PROGRESS_TEMPLATE: &str = "{prefix} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}";

/// Settings for one run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunOptions {
    /// Weights for tasks that carry no overrides.
    pub weights: Weights,
    /// Laplace add-constant.
    pub smoothing: f64,
    pub on_error: OnError,
    /// Hide the progress bar.
    pub quiet: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_scoring(&ScoringConfig::default())
    }
}

impl RunOptions {
    #[must_use]
    pub const fn from_scoring(scoring: &ScoringConfig) -> Self {
        Self {
            weights: scoring.weights(),
            smoothing: scoring.smoothing,
            on_error: OnError::Abort,
            quiet: false,
        }
    }
}

fn progress_bar(len: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    // indicatif draws nothing when stderr is not a terminal.
    let bar = ProgressBar::with_draw_target(
        Some(u64::try_from(len).unwrap_or(u64::MAX)),
        ProgressDrawTarget::stderr(),
    );
    bar.set_style(
        ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    bar.set_prefix("RCS");
    bar
}

/// Run every task through `adapter` and score the outputs.
///
/// The adapter must already be configured.
///
/// # Errors
/// Returns [`RcsError::Backend`] for the first failing task when the
/// policy is [`OnError::Abort`]. With [`OnError::Skip`] failures are
/// recorded in the report and the run always succeeds.
#[instrument(skip_all, fields(adapter = adapter.name(), tasks = tasks.len(), on_error = %options.on_error))]
pub fn run(
    tasks: &[Task],
    adapter: &dyn Adapter,
    options: &RunOptions,
) -> Result<RunReport, RcsError> {
    let scorer = Scorer::new(options.smoothing);
    let bar = progress_bar(tasks.len(), options.quiet);
    let mut scored = Vec::with_capacity(tasks.len());
    let mut skipped = Vec::new();

    for (index, task) in tasks.iter().enumerate() {
        let label = task.label(index);
        bar.set_message(label.clone());

        let inference = match adapter.infer(&task.prompt, &task.intent) {
            Ok(inference) => inference,
            Err(source) => {
                let err = RcsError::Backend {
                    task: label.clone(),
                    source,
                };
                match options.on_error {
                    OnError::Abort => {
                        bar.abandon();
                        return Err(err);
                    }
                    OnError::Skip => {
                        tracing::warn!(task = %label, error = %err, "task skipped");
                        skipped.push(SkippedTask {
                            task_id: task.id.clone(),
                            error: err.to_string(),
                        });
                        bar.inc(1);
                        continue;
                    }
                }
            }
        };

        let breakdown = scorer.breakdown(
            &task.intent,
            &inference.understanding,
            &inference.action,
            task.weights(options.weights),
        );
        let result = ScoredTask::new(task, inference, &breakdown);
        tracing::debug!(
            task = %label,
            energy = breakdown.energy,
            score = result.score,
            "task scored"
        );
        scored.push(result);
        bar.inc(1);
    }

    bar.finish_and_clear();
    let report = RunReport::from_results(adapter.name(), scored, skipped);
    tracing::info!(
        average_rcs = report.average_rcs,
        scored = report.results.len(),
        skipped = report.skipped.len(),
        "run complete"
    );
    Ok(report)
}
