// src/dag/task.rs

//! A single node of a task graph.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::TaskId;

/// One unit of work to be created on the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskNode {
    /// Id under which the task will be created.
    pub task_id: TaskId,

    /// Human-readable label, used in logs and errors.
    pub label: String,

    /// Free-form string attributes (used for filtering upstream).
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    /// Named dependencies: edge name -> task id.
    ///
    /// Ids may point at other nodes of the same graph or at tasks that
    /// already exist on the queue.
    #[serde(default)]
    pub dependencies: BTreeMap<String, TaskId>,

    /// The task definition as understood by the queue. Must be a JSON object.
    pub definition: Value,
}

impl TaskNode {
    pub fn new(task_id: impl Into<TaskId>, label: impl Into<String>, definition: Value) -> Self {
        Self {
            task_id: task_id.into(),
            label: label.into(),
            attributes: BTreeMap::new(),
            dependencies: BTreeMap::new(),
            definition,
        }
    }

    /// The set of task ids this node depends on, regardless of edge names.
    pub fn dependency_ids(&self) -> BTreeSet<&str> {
        self.dependencies.values().map(|s| s.as_str()).collect()
    }

    /// Task ids already listed in the definition's `dependencies` array.
    ///
    /// Entries that are not strings are ignored here; definition validation
    /// reports them.
    pub fn declared_dependency_ids(&self) -> BTreeSet<&str> {
        self.definition
            .get("dependencies")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}
