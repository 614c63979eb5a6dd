// src/dag/task_graph.rs

use std::collections::BTreeMap;

use crate::dag::graph::Graph;
use crate::dag::task::TaskNode;
use crate::errors::{Result, TaskgraphError};
use crate::types::TaskId;

/// Edge name for dependencies declared inside a task definition.
const DECLARED_EDGE: &str = "dependencies";

/// Task nodes indexed by task id, together with the dependency graph
/// between them.
///
/// A `TaskGraph` is read-only once built; the scheduler borrows it for the
/// duration of one submission run.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskGraph {
    tasks: BTreeMap<TaskId, TaskNode>,
    graph: Graph,
}

impl TaskGraph {
    /// Build a task graph from its nodes.
    ///
    /// Dependencies on ids that are part of the graph become graph edges;
    /// any other dependency id is treated as a pre-existing external task.
    /// Ids listed in a definition's own `dependencies` array count too, under
    /// the edge name `dependencies`.
    pub fn new(nodes: impl IntoIterator<Item = TaskNode>) -> Result<Self> {
        let mut tasks = BTreeMap::new();

        for node in nodes {
            if tasks.contains_key(&node.task_id) {
                return Err(TaskgraphError::InvalidGraph(format!(
                    "duplicate task id '{}'",
                    node.task_id
                )));
            }
            tasks.insert(node.task_id.clone(), node);
        }

        let mut edges: Vec<(TaskId, TaskId, String)> = Vec::new();
        for node in tasks.values() {
            for (name, dep) in node.dependencies.iter() {
                if tasks.contains_key(dep) {
                    edges.push((node.task_id.clone(), dep.clone(), name.clone()));
                }
            }
            let named = node.dependency_ids();
            for dep in node.declared_dependency_ids() {
                if tasks.contains_key(dep) && !named.contains(dep) {
                    edges.push((node.task_id.clone(), dep.to_string(), DECLARED_EDGE.to_string()));
                }
            }
        }

        let graph = Graph::new(tasks.keys().cloned(), edges)?;

        Ok(Self { tasks, graph })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn get(&self, task_id: &str) -> Option<&TaskNode> {
        self.tasks.get(task_id)
    }

    /// Iterate over tasks in task-id order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskNode> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Dependency ids of `task_id` that are not part of this graph, whether
    /// named on the node or declared in its definition.
    pub fn external_dependencies_of(&self, task_id: &str) -> Vec<&str> {
        self.tasks
            .get(task_id)
            .map(|node| {
                let mut ids = node.dependency_ids();
                ids.extend(node.declared_dependency_ids());
                ids.into_iter()
                    .filter(|dep| !self.tasks.contains_key(*dep))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up a task by its label.
    pub fn find_by_label(&self, label: &str) -> Option<&TaskNode> {
        self.tasks.values().find(|node| node.label == label)
    }
}
