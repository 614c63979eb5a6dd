// tests/property/scheduler.rs

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use proptest::prelude::*;
use taskgraph::dag::TaskGraph;
use taskgraph::submit::{SchedulerOptions, SubmissionScheduler};
use taskgraph::types::{RunState, SubmissionOutcome};
use taskgraph_test_utils::builders::{TaskGraphBuilder, TaskNodeBuilder};
use taskgraph_test_utils::fake_queue::{FakeQueueClient, QueueEvent};

// Acyclic by construction: task N may only depend on tasks 0..N-1.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = TaskGraph> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
        .prop_map(|raw_deps| {
            let mut builder = TaskGraphBuilder::new();
            for (i, potential_deps) in raw_deps.into_iter().enumerate() {
                let mut node = TaskNodeBuilder::new(&format!("task_{i}"));
                if i > 0 {
                    let deps: BTreeSet<usize> = potential_deps.into_iter().map(|d| d % i).collect();
                    for dep in deps {
                        node = node.after(&format!("task_{dep}"));
                    }
                }
                builder = builder.with_task(node.build());
            }
            builder.build()
        })
    })
}

fn run_blocking(graph: &TaskGraph, queue: FakeQueueClient, concurrency: usize) -> taskgraph::submit::RunReport {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();

    let scheduler = SubmissionScheduler::new(
        Arc::new(queue),
        SchedulerOptions {
            concurrency,
            ..SchedulerOptions::default()
        },
    );
    runtime.block_on(scheduler.run(graph)).unwrap()
}

proptest! {
    #[test]
    fn failures_only_block_their_descendants(
        graph in dag_strategy(12),
        failing in proptest::collection::vec(0..12usize, 0..4),
        concurrency in 1..4usize,
    ) {
        let failing: HashSet<String> = failing
            .into_iter()
            .map(|i| format!("task_{i}"))
            .filter(|id| graph.get(id).is_some())
            .collect();

        let mut queue = FakeQueueClient::new();
        for id in &failing {
            queue = queue.reject_task(id, 500, "injected failure");
        }

        let report = run_blocking(&graph, queue.clone(), concurrency);
        let events = queue.events();

        // Every call starts only after all of its in-graph dependencies were created.
        for (start_idx, event) in events.iter().enumerate() {
            let QueueEvent::Started(task) = event else { continue };
            for dep in graph.graph().dependencies_of(task) {
                let created = events.iter().position(|e| *e == QueueEvent::Created(dep.clone()));
                prop_assert!(
                    created.is_some_and(|idx| idx < start_idx),
                    "{task} started before {dep} was created: {events:?}"
                );
            }
        }

        let blocked: BTreeSet<String> = failing
            .iter()
            .flat_map(|id| graph.graph().transitive_dependents(id))
            .collect();

        let started: HashSet<String> = queue.started().into_iter().collect();
        for id in graph.graph().nodes() {
            let outcome = report.outcome(id);
            if blocked.contains(id) {
                prop_assert!(!started.contains(id), "{id} descends from a failure but was sent");
                let is_dependency_failed = matches!(outcome, Some(SubmissionOutcome::DependencyFailed { .. }));
                prop_assert!(is_dependency_failed, "{id}: {outcome:?}");
            } else if failing.contains(id) {
                let is_failed = matches!(outcome, Some(SubmissionOutcome::Failed(_)));
                prop_assert!(is_failed, "{id}: {outcome:?}");
            } else {
                prop_assert_eq!(outcome, Some(&SubmissionOutcome::Submitted));
            }
        }

        let expected_state = if failing.is_empty() { RunState::Completed } else { RunState::Aborted };
        prop_assert_eq!(report.state, expected_state);
        prop_assert_eq!(report.failure.is_some(), !failing.is_empty());
        prop_assert!(queue.max_in_flight() <= concurrency);
    }
}
