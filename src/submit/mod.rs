// src/submit/mod.rs

//! Dependency-ordered submission of a task graph.
//!
//! - [`identity`] allocates the run id shared by every task of a run.
//! - [`gate`] is the per-task completion signal dependents wait on.
//! - [`definition`] stamps run id and dependencies into task definitions.
//! - [`scheduler`] walks the graph and drives the queue client.

pub mod definition;
pub mod gate;
pub mod identity;
pub mod scheduler;

pub use gate::{gate, DependencyGate, GateResolver};
pub use identity::{new_run_id, new_task_id, RunId};
pub use scheduler::{
    RunFailure, RunReport, SchedulerOptions, SubmissionScheduler, DEFAULT_CONCURRENCY,
    DEFAULT_SUBMIT_TIMEOUT,
};
