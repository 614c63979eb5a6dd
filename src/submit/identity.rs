// src/submit/identity.rs

//! Identifier allocation for submission runs.

use std::fmt;

use uuid::Uuid;

use crate::types::TaskId;

/// Correlation id shared by every task created in one submission run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunId(String);

impl RunId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fresh, collision-resistant run id (128 random bits).
pub fn new_run_id() -> RunId {
    RunId(Uuid::new_v4().simple().to_string())
}

/// A fresh task id, for callers that allocate ids lazily.
pub fn new_task_id() -> TaskId {
    Uuid::new_v4().simple().to_string()
}
