// src/submit/gate.rs

//! Per-task completion signal.
//!
//! A gate is a single-writer, multi-reader handle built on
//! `tokio::sync::watch`: the [`GateResolver`] is moved into whichever worker
//! owns the task, and any number of [`DependencyGate`] clones wait for the
//! one outcome it records.

use tokio::sync::watch;

use crate::errors::SubmissionError;
use crate::types::SubmissionOutcome;

/// Write side of a gate. Consumed by [`GateResolver::resolve`], so an
/// outcome can be recorded at most once.
#[derive(Debug)]
pub struct GateResolver {
    tx: watch::Sender<Option<SubmissionOutcome>>,
}

/// Read side of a gate. Cheap to clone; every clone sees the same outcome.
#[derive(Debug, Clone)]
pub struct DependencyGate {
    rx: watch::Receiver<Option<SubmissionOutcome>>,
}

/// Create an unresolved gate.
pub fn gate() -> (GateResolver, DependencyGate) {
    let (tx, rx) = watch::channel(None);
    (GateResolver { tx }, DependencyGate { rx })
}

impl GateResolver {
    /// Record the terminal outcome and wake every waiter.
    pub fn resolve(self, outcome: SubmissionOutcome) {
        // `send_replace` stores the value even when nobody is listening yet.
        self.tx.send_replace(Some(outcome));
    }
}

impl DependencyGate {
    /// Wait until the gate is resolved and return its outcome.
    ///
    /// A resolver dropped without resolving yields
    /// `Failed(SubmissionError::Abandoned)` rather than waiting forever.
    pub async fn wait(&self) -> SubmissionOutcome {
        let mut rx = self.rx.clone();
        match rx.wait_for(Option::is_some).await {
            Ok(value) => (*value)
                .clone()
                .unwrap_or(SubmissionOutcome::Failed(SubmissionError::Abandoned)),
            Err(_) => SubmissionOutcome::Failed(SubmissionError::Abandoned),
        }
    }

    /// The outcome if already resolved, without waiting.
    pub fn outcome(&self) -> Option<SubmissionOutcome> {
        (*self.rx.borrow()).clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.rx.borrow().is_some()
    }
}
