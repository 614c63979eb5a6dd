// src/submit/definition.rs

//! Final shaping of a task definition before it is sent to the queue.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::dag::TaskNode;
use crate::errors::{Result, TaskgraphError};
use crate::submit::identity::RunId;

/// Definition field listing the task ids the queue must wait for.
pub const DEPENDENCIES_FIELD: &str = "dependencies";
/// Definition field carrying the run id.
pub const TASK_GROUP_FIELD: &str = "taskGroupId";

/// Check that a node's definition can be stamped: it must be a JSON object
/// and any existing `dependencies` must be a list of strings.
pub fn validate_definition(node: &TaskNode) -> Result<()> {
    let object = node.definition.as_object().ok_or_else(|| invalid(node, "definition must be a JSON object"))?;
    existing_dependencies(node, object)?;
    Ok(())
}

/// Dependency ids the queue will see for `node`.
///
/// This is the union of the node's graph dependencies and anything already
/// listed in the definition. A node with no dependencies at all gets the
/// gating id, when there is one.
pub fn effective_dependencies(node: &TaskNode, gating_id: Option<&str>) -> Result<Vec<String>> {
    let object = node.definition.as_object().ok_or_else(|| invalid(node, "definition must be a JSON object"))?;

    let mut deps: BTreeSet<String> = existing_dependencies(node, object)?;
    deps.extend(node.dependency_ids().into_iter().map(str::to_string));

    if deps.is_empty() {
        if let Some(gating) = gating_id {
            deps.insert(gating.to_string());
        }
    }

    Ok(deps.into_iter().collect())
}

/// Produce the definition to send: a copy of the node's definition with the
/// effective dependency list and the run id filled in.
pub fn prepare_definition(node: &TaskNode, run_id: &RunId, gating_id: Option<&str>) -> Result<Value> {
    let deps = effective_dependencies(node, gating_id)?;

    let mut definition = node.definition.clone();
    let object = definition
        .as_object_mut()
        .ok_or_else(|| invalid(node, "definition must be a JSON object"))?;

    object.insert(
        DEPENDENCIES_FIELD.to_string(),
        Value::Array(deps.into_iter().map(Value::String).collect()),
    );
    object.insert(
        TASK_GROUP_FIELD.to_string(),
        Value::String(run_id.as_str().to_string()),
    );

    Ok(definition)
}

fn existing_dependencies(node: &TaskNode, object: &Map<String, Value>) -> Result<BTreeSet<String>> {
    match object.get(DEPENDENCIES_FIELD) {
        None | Some(Value::Null) => Ok(BTreeSet::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(node, "`dependencies` entries must be strings"))
            })
            .collect(),
        Some(_) => Err(invalid(node, "`dependencies` must be a list of task ids")),
    }
}

fn invalid(node: &TaskNode, reason: &str) -> TaskgraphError {
    TaskgraphError::InvalidDefinition {
        task_id: node.task_id.clone(),
        reason: reason.to_string(),
    }
}
