#![allow(dead_code)]

use serde_json::{json, Value};
use taskgraph::dag::{TaskGraph, TaskNode};

/// Builder for `TaskGraph` to simplify test setup.
pub struct TaskGraphBuilder {
    nodes: Vec<TaskNode>,
}

impl TaskGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn with_task(mut self, node: TaskNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn build(self) -> TaskGraph {
        TaskGraph::new(self.nodes).expect("Failed to build valid task graph from builder")
    }
}

impl Default for TaskGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskNode`.
///
/// Defaults: label equal to the task id, definition `{"payload": "hello world"}`.
pub struct TaskNodeBuilder {
    node: TaskNode,
}

impl TaskNodeBuilder {
    pub fn new(task_id: &str) -> Self {
        Self {
            node: TaskNode::new(task_id, task_id, json!({ "payload": "hello world" })),
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.node.label = label.to_string();
        self
    }

    /// Depend on `dep`, using the dependency id as the edge name.
    pub fn after(mut self, dep: &str) -> Self {
        self.node
            .dependencies
            .insert(dep.to_string(), dep.to_string());
        self
    }

    pub fn named_dependency(mut self, name: &str, dep: &str) -> Self {
        self.node
            .dependencies
            .insert(name.to_string(), dep.to_string());
        self
    }

    pub fn attribute(mut self, key: &str, value: &str) -> Self {
        self.node
            .attributes
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn definition(mut self, definition: Value) -> Self {
        self.node.definition = definition;
        self
    }

    pub fn build(self) -> TaskNode {
        self.node
    }
}

/// `{A: [], B: [A], C: [A], D: [B, C]}`
pub fn diamond_graph() -> TaskGraph {
    TaskGraphBuilder::new()
        .with_task(TaskNodeBuilder::new("A").build())
        .with_task(TaskNodeBuilder::new("B").after("A").build())
        .with_task(TaskNodeBuilder::new("C").after("A").build())
        .with_task(TaskNodeBuilder::new("D").after("B").after("C").build())
        .build()
}
