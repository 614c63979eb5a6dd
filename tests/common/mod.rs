#![allow(dead_code)]

use taskgraph::dag::TaskGraph;
use taskgraph_test_utils::fake_queue::{FakeQueueClient, QueueEvent};

pub use taskgraph_test_utils::init_tracing;

/// Assert that every call the queue received came after all of the task's
/// in-graph dependencies were successfully created.
pub fn assert_dependencies_created_first(graph: &TaskGraph, queue: &FakeQueueClient) {
    let events = queue.events();

    for (start_idx, event) in events.iter().enumerate() {
        let QueueEvent::Started(task) = event else {
            continue;
        };

        for dep in graph.graph().dependencies_of(task) {
            let created_idx = events
                .iter()
                .position(|e| *e == QueueEvent::Created(dep.clone()));
            match created_idx {
                Some(idx) => assert!(
                    idx < start_idx,
                    "task {task} was sent before its dependency {dep} was created: {events:?}"
                ),
                None => panic!("task {task} was sent but its dependency {dep} never was: {events:?}"),
            }
        }
    }
}

/// The `dependencies` array of a definition sent to the fake queue.
pub fn sent_dependencies(queue: &FakeQueueClient, task_id: &str) -> Vec<String> {
    let definition = queue
        .definition(task_id)
        .unwrap_or_else(|| panic!("no definition sent for {task_id}"));
    definition["dependencies"]
        .as_array()
        .unwrap_or_else(|| panic!("definition of {task_id} has no dependencies array"))
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}
