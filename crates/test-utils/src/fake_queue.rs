use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use taskgraph::client::{CreateTaskFuture, QueueClient};
use taskgraph::errors::SubmissionError;

/// Something the fake queue observed, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    /// A create-task call arrived.
    Started(String),
    /// The call returned success.
    Created(String),
    /// The call returned an error.
    Rejected(String),
}

#[derive(Debug, Default)]
struct FakeState {
    events: Vec<QueueEvent>,
    definitions: HashMap<String, Value>,
}

/// A fake queue that:
/// - records every create-task call and its definition
/// - succeeds unless the task was configured to fail
/// - optionally sleeps per task to simulate network latency
#[derive(Debug, Clone, Default)]
pub struct FakeQueueClient {
    state: Arc<Mutex<FakeState>>,
    failures: Arc<HashMap<String, SubmissionError>>,
    delays: Arc<HashMap<String, Duration>>,
    default_delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl FakeQueueClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps this long unless a per-task delay is set.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    pub fn delay_task(mut self, task_id: &str, delay: Duration) -> Self {
        Arc::make_mut(&mut self.delays).insert(task_id.to_string(), delay);
        self
    }

    pub fn fail_task(mut self, task_id: &str, error: SubmissionError) -> Self {
        Arc::make_mut(&mut self.failures).insert(task_id.to_string(), error);
        self
    }

    /// Shorthand for a `RemoteRejected` failure.
    pub fn reject_task(self, task_id: &str, status: u16, message: &str) -> Self {
        self.fail_task(
            task_id,
            SubmissionError::RemoteRejected {
                status,
                message: message.to_string(),
            },
        )
    }

    pub fn events(&self) -> Vec<QueueEvent> {
        self.state.lock().unwrap().events.clone()
    }

    /// Task ids in the order their calls arrived.
    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                QueueEvent::Started(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Task ids in the order the queue accepted them.
    pub fn created(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                QueueEvent::Created(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// The definition sent for `task_id`, if a call was made.
    pub fn definition(&self, task_id: &str) -> Option<Value> {
        self.state.lock().unwrap().definitions.get(task_id).cloned()
    }

    /// Highest number of calls that were in flight at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, event: QueueEvent) {
        self.state.lock().unwrap().events.push(event);
    }
}

impl QueueClient for FakeQueueClient {
    fn create_task<'a>(&'a self, task_id: &'a str, definition: &'a Value) -> CreateTaskFuture<'a> {
        Box::pin(async move {
            {
                let mut state = self.state.lock().unwrap();
                state.events.push(QueueEvent::Started(task_id.to_string()));
                state
                    .definitions
                    .insert(task_id.to_string(), definition.clone());
            }

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = self.delays.get(task_id).copied().or(self.default_delay);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.failures.get(task_id) {
                Some(err) => {
                    self.record(QueueEvent::Rejected(task_id.to_string()));
                    Err(err.clone())
                }
                None => {
                    self.record(QueueEvent::Created(task_id.to_string()));
                    Ok(())
                }
            }
        })
    }
}
