use std::fmt;

use crate::errors::SubmissionError;

/// Canonical task identifier type used throughout the crate.
///
/// Task ids are opaque to the scheduler; the queue decides what a valid id
/// looks like.
pub type TaskId = String;

/// Terminal state of one task's submission attempt.
///
/// A task is "pending" for as long as its gate is unresolved; once one of
/// these values is recorded it never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The queue accepted the task definition.
    Submitted,
    /// The create-task call itself failed.
    Failed(SubmissionError),
    /// Never sent: an in-graph dependency did not get submitted.
    DependencyFailed { dependency: TaskId },
}

impl SubmissionOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmissionOutcome::Submitted)
    }
}

impl fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionOutcome::Submitted => write!(f, "submitted"),
            SubmissionOutcome::Failed(err) => write!(f, "failed: {err}"),
            SubmissionOutcome::DependencyFailed { dependency } => {
                write!(f, "skipped: dependency {dependency} was not submitted")
            }
        }
    }
}

/// Lifecycle of one submission run.
///
/// `Running` while tasks are being dispatched in postorder, `Draining` while
/// the remaining gates are awaited, then one of the two terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Draining,
    Completed,
    Aborted,
}
