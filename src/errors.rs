// src/errors.rs

//! Crate-wide error types.
//!
//! [`TaskgraphError`] covers everything that can stop a submission run,
//! from a malformed config file to a rejected task. [`SubmissionError`] is
//! the narrower taxonomy of a single create-task call; it is `Clone` so one
//! failure can be broadcast to every dependent waiting on the same gate.

use std::time::Duration;

use thiserror::Error;

use crate::types::TaskId;

#[derive(Error, Debug)]
pub enum TaskgraphError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid task graph: {0}")]
    InvalidGraph(String),

    #[error("Cycle detected in task graph: {0}")]
    CycleDetected(String),

    #[error("Task '{task_id}' has an invalid definition: {reason}")]
    InvalidDefinition { task_id: TaskId, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to create task {task_id} ({label}): {source}")]
    Submission {
        task_id: TaskId,
        label: String,
        #[source]
        source: SubmissionError,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Why a single create-task call did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// Connection refused, DNS failure, broken pipe, ...
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The queue answered with a non-success status.
    #[error("queue rejected task with status {status}: {message}")]
    RemoteRejected { status: u16, message: String },

    /// The call did not finish before its deadline.
    #[error("submission timed out after {after:?}")]
    Timeout { after: Duration },

    /// The worker owning this submission went away without reporting.
    #[error("submission worker exited without reporting an outcome")]
    Abandoned,
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskgraphError>;
