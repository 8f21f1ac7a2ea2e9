//! Rose Coherence Score benchmark driver.
//!
//! The primary interface is the `rcs` binary. The library exposes the
//! driver pieces (adapters, task loading, the run loop, reports) so other
//! programs can register their own adapters and drive runs directly. The
//! scoring engine itself lives in [`rcs_core`], re-exported as [`core`].

pub mod adapter;
pub mod config;
pub mod error;
pub mod format;
pub mod report;
pub mod run;
pub mod task;
pub mod telemetry;

pub use rcs_core as core;

pub use adapter::{Adapter, AdapterOptions, AdapterRegistry, Inference};
pub use config::{OnError, RcsConfig};
pub use error::RcsError;
pub use report::{RunReport, TaskResult};
pub use run::{RunOptions, run};
pub use task::{Task, TaskId, load_tasks};
