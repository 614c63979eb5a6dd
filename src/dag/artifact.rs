// src/dag/artifact.rs

//! Loading task graphs from the JSON artifacts written by graph generation.
//!
//! `task-graph.json` is an object keyed by graph key:
//!
//! ```json
//! {
//!   "build-linux": {
//!     "label": "build-linux",
//!     "attributes": {"kind": "build"},
//!     "dependencies": {"docker-image": "image-builder"},
//!     "task": {"payload": {}}
//!   }
//! }
//! ```
//!
//! Keys (and dependency values) are either task ids directly, or labels
//! that `label-to-taskid.json` translates into task ids.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::dag::task::TaskNode;
use crate::dag::task_graph::TaskGraph;
use crate::errors::{Result, TaskgraphError};
use crate::types::TaskId;

/// One entry of `task-graph.json`.
#[derive(Debug, Clone, Deserialize)]
struct TaskEntry {
    label: String,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    task: Value,
    #[serde(default)]
    task_id: Option<TaskId>,
}

/// Read `task-graph.json` (and optionally `label-to-taskid.json`) from disk.
pub fn load_task_graph(
    task_graph_path: impl AsRef<Path>,
    label_to_taskid_path: Option<&Path>,
) -> Result<TaskGraph> {
    let task_graph_path = task_graph_path.as_ref();
    let contents = fs::read_to_string(task_graph_path)?;

    let label_to_taskid = match label_to_taskid_path {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            Some(serde_json::from_str::<BTreeMap<String, TaskId>>(&raw)?)
        }
        None => None,
    };

    let graph = task_graph_from_json(&contents, label_to_taskid.as_ref())?;
    debug!(
        path = %task_graph_path.display(),
        tasks = graph.len(),
        "loaded task graph artifact"
    );
    Ok(graph)
}

/// Parse the contents of `task-graph.json`.
///
/// The task id of each entry is, in order of preference: the mapping from
/// `label_to_taskid` for its key, the entry's own `task_id`, or the key
/// itself. Dependency values that do not resolve to a graph key or a mapped
/// label are kept verbatim as external task ids.
pub fn task_graph_from_json(
    contents: &str,
    label_to_taskid: Option<&BTreeMap<String, TaskId>>,
) -> Result<TaskGraph> {
    let entries: BTreeMap<String, TaskEntry> = serde_json::from_str(contents)?;

    let mut key_to_id: BTreeMap<&str, TaskId> = BTreeMap::new();
    for (key, entry) in entries.iter() {
        let id = match label_to_taskid {
            Some(mapping) => mapping.get(key).cloned().ok_or_else(|| {
                TaskgraphError::InvalidGraph(format!(
                    "no task id for '{}' in label-to-taskid mapping",
                    key
                ))
            })?,
            None => entry.task_id.clone().unwrap_or_else(|| key.clone()),
        };
        key_to_id.insert(key.as_str(), id);
    }

    let resolve = |reference: &str| -> TaskId {
        key_to_id
            .get(reference)
            .cloned()
            .or_else(|| label_to_taskid.and_then(|m| m.get(reference).cloned()))
            .unwrap_or_else(|| reference.to_string())
    };

    let mut nodes = Vec::with_capacity(entries.len());
    for (key, entry) in entries.iter() {
        let task_id = resolve(key);
        let dependencies = entry
            .dependencies
            .iter()
            .map(|(name, reference)| (name.clone(), resolve(reference)))
            .collect();

        nodes.push(TaskNode {
            task_id,
            label: entry.label.clone(),
            attributes: entry.attributes.clone(),
            dependencies,
            definition: entry.task.clone(),
        });
    }

    TaskGraph::new(nodes)
}
