// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{Result, TaskgraphError};
use crate::types::TaskId;

/// A named dependency edge: `dependent` cannot be submitted before `dependency`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub dependent: TaskId,
    pub dependency: TaskId,
    pub name: String,
}

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct GraphNode {
    /// Direct dependencies: tasks that must be submitted before this one.
    deps: Vec<TaskId>,
    /// Direct dependents: tasks that depend on this one.
    dependents: Vec<TaskId>,
}

/// Immutable dependency graph keyed by task id.
///
/// Only edges between ids that are part of the graph are represented here;
/// references to pre-existing external tasks live on the task nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: BTreeMap<TaskId, GraphNode>,
    edges: BTreeSet<Edge>,
}

impl Graph {
    /// Build a graph from node ids and `(dependent, dependency, name)` edges.
    ///
    /// Every edge endpoint must be one of the given nodes. Acyclicity is not
    /// checked here; [`Graph::postorder`] reports cycles.
    pub fn new(
        nodes: impl IntoIterator<Item = TaskId>,
        edges: impl IntoIterator<Item = (TaskId, TaskId, String)>,
    ) -> Result<Self> {
        let mut graph = Graph::default();

        for id in nodes {
            graph.nodes.entry(id).or_default();
        }

        for (dependent, dependency, name) in edges {
            for endpoint in [&dependent, &dependency] {
                if !graph.nodes.contains_key(endpoint) {
                    return Err(TaskgraphError::InvalidGraph(format!(
                        "edge '{}' from '{}' to '{}' references unknown node '{}'",
                        name, dependent, dependency, endpoint
                    )));
                }
            }

            let edge = Edge {
                dependent,
                dependency,
                name,
            };
            if graph.edges.contains(&edge) {
                continue;
            }

            // Two differently-named edges between the same pair still count
            // as one ordering constraint.
            if let Some(node) = graph.nodes.get_mut(&edge.dependent) {
                if !node.deps.contains(&edge.dependency) {
                    node.deps.push(edge.dependency.clone());
                }
            }
            if let Some(node) = graph.nodes.get_mut(&edge.dependency) {
                if !node.dependents.contains(&edge.dependent) {
                    node.dependents.push(edge.dependent.clone());
                }
            }

            graph.edges.insert(edge);
        }

        Ok(graph)
    }

    /// All node ids, in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Immediate in-graph dependencies of a node.
    pub fn dependencies_of(&self, id: &str) -> &[TaskId] {
        self.nodes
            .get(id)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a node.
    pub fn dependents_of(&self, id: &str) -> &[TaskId] {
        self.nodes
            .get(id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Every node that depends on `root`, directly or transitively.
    ///
    /// `root` itself is not included.
    pub fn transitive_dependents(&self, root: &str) -> BTreeSet<TaskId> {
        let mut stack: Vec<&str> = self.dependents_of(root).iter().map(|s| s.as_str()).collect();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut out = BTreeSet::new();

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            out.insert(id.to_string());
            stack.extend(self.dependents_of(id).iter().map(|s| s.as_str()));
        }

        out
    }

    /// Node ids ordered so that every node comes after all of its
    /// dependencies, each exactly once.
    ///
    /// Fails with [`TaskgraphError::CycleDetected`] when no such order exists.
    pub fn postorder(&self) -> Result<Vec<TaskId>> {
        // Edge direction: dependency -> dependent, so a topological order of
        // this graph is a postorder of the dependency relation.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for id in self.nodes.keys() {
            graph.add_node(id.as_str());
        }

        for edge in self.edges.iter() {
            if edge.dependent == edge.dependency {
                return Err(TaskgraphError::CycleDetected(format!(
                    "task '{}' depends on itself",
                    edge.dependent
                )));
            }
            graph.add_edge(edge.dependency.as_str(), edge.dependent.as_str(), ());
        }

        match toposort(&graph, None) {
            Ok(order) => Ok(order.into_iter().map(|id| id.to_string()).collect()),
            Err(cycle) => Err(TaskgraphError::CycleDetected(format!(
                "cycle detected in task graph involving task '{}'",
                cycle.node_id()
            ))),
        }
    }
}
