// src/dag/mod.rs

//! Task graph representation.
//!
//! - [`graph`] holds the bare dependency graph and its postorder traversal.
//! - [`task`] defines a single task node.
//! - [`task_graph`] combines nodes and graph into the read-only structure
//!   the submission scheduler consumes.
//! - [`artifact`] loads a task graph from its JSON artifacts.

pub mod artifact;
pub mod graph;
pub mod task;
pub mod task_graph;

pub use artifact::{load_task_graph, task_graph_from_json};
pub use graph::{Edge, Graph};
pub use task::TaskNode;
pub use task_graph::TaskGraph;
