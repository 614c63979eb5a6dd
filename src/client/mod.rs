// src/client/mod.rs

//! Queue client abstraction.
//!
//! The scheduler talks to a `QueueClient` instead of a raw HTTP client.
//! This makes it easy to swap in a fake queue in tests while keeping the
//! production implementation in [`http`].
//!
//! - [`HttpQueueClient`] is the implementation used by `taskgraph`. It issues
//!   one `PUT {root_url}/v1/task/{task_id}` per call.
//! - Tests can provide their own `QueueClient` that, for example, records
//!   which tasks were created and fails selected ones.

pub mod http;

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::errors::SubmissionError;

pub use http::HttpQueueClient;

/// Future returned by [`QueueClient::create_task`].
pub type CreateTaskFuture<'a> =
    Pin<Box<dyn Future<Output = Result<(), SubmissionError>> + Send + 'a>>;

/// Trait abstracting how a single task is created on the remote queue.
///
/// Implementations perform exactly one attempt per call and never retry.
/// Creating the same task id twice is the caller's problem.
pub trait QueueClient: Send + Sync {
    fn create_task<'a>(&'a self, task_id: &'a str, definition: &'a Value) -> CreateTaskFuture<'a>;
}
