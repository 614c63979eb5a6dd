// src/submit/scheduler.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::client::QueueClient;
use crate::dag::TaskGraph;
use crate::errors::{Result, SubmissionError, TaskgraphError};
use crate::submit::definition::{prepare_definition, validate_definition};
use crate::submit::gate::{gate, DependencyGate, GateResolver};
use crate::submit::identity::{new_run_id, RunId};
use crate::types::{RunState, SubmissionOutcome, TaskId};

/// Default worker pool size, matching the default HTTP connection pool.
pub const DEFAULT_CONCURRENCY: usize = 10;
/// Default deadline for a single create-task call.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Tunables for one [`SubmissionScheduler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// Maximum number of create-task calls in flight at once.
    pub concurrency: usize,
    /// Id injected as the sole dependency of dependency-free tasks, so the
    /// queue holds them until this task (usually the decision task) is done.
    pub gating_id: Option<TaskId>,
    /// Per-call deadline; `None` waits forever.
    pub submit_timeout: Option<Duration>,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            gating_id: None,
            submit_timeout: Some(DEFAULT_SUBMIT_TIMEOUT),
        }
    }
}

/// The failure surfaced for an aborted run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    pub task_id: TaskId,
    pub label: String,
    pub error: SubmissionError,
}

/// Everything the scheduler learned during one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: RunId,
    pub state: RunState,
    /// Dispatch order (the graph's postorder).
    pub order: Vec<TaskId>,
    pub outcomes: BTreeMap<TaskId, SubmissionOutcome>,
    /// First failure observed while draining, if the run aborted.
    pub failure: Option<RunFailure>,
}

impl RunReport {
    pub fn outcome(&self, task_id: &str) -> Option<&SubmissionOutcome> {
        self.outcomes.get(task_id)
    }

    /// Ids of tasks the queue accepted, in dispatch order.
    pub fn submitted(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|id| self.outcomes.get(*id).is_some_and(SubmissionOutcome::is_submitted))
            .map(|id| id.as_str())
            .collect()
    }

    /// Turn an aborted run into its surfaced error.
    pub fn into_result(self) -> Result<RunReport> {
        if self.state != RunState::Aborted {
            return Ok(self);
        }
        match self.failure {
            Some(RunFailure {
                task_id,
                label,
                error,
            }) => Err(TaskgraphError::Submission {
                task_id,
                label,
                source: error,
            }),
            None => Err(TaskgraphError::InvalidGraph(format!(
                "run {} aborted without a recorded failure",
                self.run_id
            ))),
        }
    }
}

/// Submits every task of a [`TaskGraph`] to a [`QueueClient`], never
/// creating a task before all of its in-graph dependencies were created.
///
/// Dispatch happens on the caller's task in postorder; the create-task calls
/// themselves run on spawned workers bounded by a semaphore of
/// `concurrency` permits.
pub struct SubmissionScheduler<C: QueueClient + 'static> {
    client: Arc<C>,
    options: SchedulerOptions,
}

impl<C: QueueClient + 'static> SubmissionScheduler<C> {
    pub fn new(client: Arc<C>, options: SchedulerOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    /// Submit the whole graph; an aborted run becomes an error naming the
    /// failed task.
    pub async fn submit(&self, graph: &TaskGraph) -> Result<RunReport> {
        self.run(graph).await?.into_result()
    }

    /// Submit the whole graph and report every task's outcome.
    ///
    /// Returns `Err` only for problems found before anything is sent (cycles,
    /// malformed definitions, bad options). Submission failures are recorded
    /// in the report with `state == RunState::Aborted`.
    pub async fn run(&self, graph: &TaskGraph) -> Result<RunReport> {
        if self.options.concurrency == 0 {
            return Err(TaskgraphError::ConfigError(
                "submission concurrency must be >= 1 (got 0)".to_string(),
            ));
        }

        let order = graph.graph().postorder()?;
        for node in graph.tasks() {
            validate_definition(node)?;
        }

        let run_id = new_run_id();
        let gating_id = self.options.gating_id.as_deref();

        let mut definitions: HashMap<&str, Value> = HashMap::with_capacity(order.len());
        let mut resolvers: HashMap<&str, GateResolver> = HashMap::with_capacity(order.len());
        let mut gates: HashMap<&str, DependencyGate> = HashMap::with_capacity(order.len());

        for id in order.iter() {
            let node = lookup(graph, id)?;
            definitions.insert(id.as_str(), prepare_definition(node, &run_id, gating_id)?);
            let (resolver, reader) = gate();
            resolvers.insert(id.as_str(), resolver);
            gates.insert(id.as_str(), reader);
        }

        let gates = gates;
        let pool = Arc::new(Semaphore::new(self.options.concurrency));
        let mut workers = JoinSet::new();

        let mut state = RunState::Running;
        info!(
            run_id = %run_id,
            tasks = order.len(),
            concurrency = self.options.concurrency,
            gating_id = ?gating_id,
            ?state,
            "submitting task graph"
        );

        for id in order.iter() {
            let node = lookup(graph, id)?;
            let (Some(resolver), Some(definition)) =
                (resolvers.remove(id.as_str()), definitions.remove(id.as_str()))
            else {
                return Err(TaskgraphError::InvalidGraph(format!(
                    "task '{}' appears twice in the traversal order",
                    id
                )));
            };

            if let Some(dependency) = first_unsubmitted_dependency(graph, &gates, id).await {
                debug!(
                    task = %id,
                    label = %node.label,
                    dependency = %dependency,
                    "dependency was not submitted; skipping task"
                );
                resolver.resolve(SubmissionOutcome::DependencyFailed { dependency });
                continue;
            }

            let client = Arc::clone(&self.client);
            let pool = Arc::clone(&pool);
            let task_id = id.clone();
            let label = node.label.clone();
            let deadline = self.options.submit_timeout;

            workers.spawn(async move {
                let outcome =
                    submit_one(client.as_ref(), &pool, &task_id, &label, &definition, deadline).await;
                resolver.resolve(outcome);
            });
        }

        state = RunState::Draining;
        debug!(run_id = %run_id, ?state, "all tasks dispatched; waiting for outstanding submissions");

        let mut outcomes = BTreeMap::new();
        let mut failure: Option<RunFailure> = None;

        for id in order.iter() {
            let outcome = match gates.get(id.as_str()) {
                Some(reader) => reader.wait().await,
                None => SubmissionOutcome::Failed(SubmissionError::Abandoned),
            };

            if failure.is_none() {
                if let SubmissionOutcome::Failed(err) = &outcome {
                    failure = Some(RunFailure {
                        task_id: id.clone(),
                        label: lookup(graph, id)?.label.clone(),
                        error: err.clone(),
                    });
                }
            }

            outcomes.insert(id.clone(), outcome);
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                warn!(run_id = %run_id, error = %e, "submission worker did not finish cleanly");
            }
        }

        let all_submitted = outcomes.values().all(SubmissionOutcome::is_submitted);
        state = if all_submitted {
            RunState::Completed
        } else {
            RunState::Aborted
        };

        if let Some(f) = failure.as_ref() {
            error!(
                run_id = %run_id,
                task = %f.task_id,
                label = %f.label,
                error = %f.error,
                ?state,
                "task graph submission aborted"
            );
        } else {
            info!(run_id = %run_id, tasks = order.len(), ?state, "task graph submitted");
        }

        Ok(RunReport {
            run_id,
            state,
            order,
            outcomes,
            failure,
        })
    }
}

fn lookup<'g>(graph: &'g TaskGraph, id: &str) -> Result<&'g crate::dag::TaskNode> {
    graph
        .get(id)
        .ok_or_else(|| TaskgraphError::InvalidGraph(format!("graph node '{}' has no task", id)))
}

/// Wait for every in-graph dependency of `id` and return the first one that
/// did not end up submitted.
///
/// Dependencies outside the graph are left to the queue.
async fn first_unsubmitted_dependency(
    graph: &TaskGraph,
    gates: &HashMap<&str, DependencyGate>,
    id: &str,
) -> Option<TaskId> {
    for dep in graph.graph().dependencies_of(id) {
        let Some(reader) = gates.get(dep.as_str()) else {
            continue;
        };
        if !reader.wait().await.is_submitted() {
            return Some(dep.clone());
        }
    }
    None
}

/// One pooled create-task call, turned into an outcome.
async fn submit_one<C: QueueClient + ?Sized>(
    client: &C,
    pool: &Semaphore,
    task_id: &str,
    label: &str,
    definition: &Value,
    deadline: Option<Duration>,
) -> SubmissionOutcome {
    let Ok(_permit) = pool.acquire().await else {
        return SubmissionOutcome::Failed(SubmissionError::Abandoned);
    };

    debug!(task = %task_id, label = %label, "creating task");

    let call = client.create_task(task_id, definition);
    let result = match deadline {
        Some(after) => match tokio::time::timeout(after, call).await {
            Ok(result) => result,
            Err(_) => Err(SubmissionError::Timeout { after }),
        },
        None => call.await,
    };

    match result {
        Ok(()) => {
            info!(task = %task_id, label = %label, "created task");
            SubmissionOutcome::Submitted
        }
        Err(err) => {
            error!(task = %task_id, label = %label, error = %err, "failed to create task");
            SubmissionOutcome::Failed(err)
        }
    }
}
