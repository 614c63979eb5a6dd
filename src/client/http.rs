// src/client/http.rs

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error};

use crate::client::{CreateTaskFuture, QueueClient};
use crate::errors::{Result, SubmissionError, TaskgraphError};

const USER_AGENT: &str = concat!("taskgraph/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Queue client backed by a shared `reqwest::Client` (one connection pool
/// for every submission of a run).
#[derive(Debug, Clone)]
pub struct HttpQueueClient {
    http: reqwest::Client,
    root_url: String,
}

impl HttpQueueClient {
    /// Create a client for the queue rooted at `root_url`
    /// (e.g. `http://taskcluster/queue`).
    ///
    /// `max_idle_per_host` caps the idle connections kept around; set it to
    /// the submission concurrency so every worker can reuse a connection.
    pub fn new(root_url: &str, max_idle_per_host: usize) -> Result<Self> {
        let parsed = reqwest::Url::parse(root_url).map_err(|e| {
            TaskgraphError::ConfigError(format!("invalid queue root_url '{}': {}", root_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TaskgraphError::ConfigError(format!(
                "queue root_url '{}' must use http or https",
                root_url
            )));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(max_idle_per_host)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            root_url: root_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL used to create `task_id`.
    pub fn task_url(&self, task_id: &str) -> String {
        format!("{}/v1/task/{}", self.root_url, task_id)
    }

    async fn put_task(
        &self,
        task_id: &str,
        definition: &Value,
    ) -> std::result::Result<(), SubmissionError> {
        let url = self.task_url(task_id);
        debug!(task = %task_id, %url, "creating task");

        let response = self
            .http
            .put(&url)
            .json(definition)
            .send()
            .await
            .map_err(|e| {
                // Only the connect phase has a client-side timeout; the
                // per-call deadline is enforced by the scheduler.
                if e.is_connect() && e.is_timeout() {
                    SubmissionError::Timeout {
                        after: CONNECT_TIMEOUT,
                    }
                } else {
                    SubmissionError::Transport {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // Prefer the queue's own error message, then the raw body, then the
        // status reason.
        let message = match response.text().await {
            Ok(body) if !body.trim().is_empty() => rejection_message(&body),
            Ok(_) => status_reason(status),
            Err(e) => {
                debug!(task = %task_id, error = %e, "could not read rejection body");
                status_reason(status)
            }
        };
        error!(task = %task_id, status = status.as_u16(), "{}", message);

        Err(SubmissionError::RemoteRejected {
            status: status.as_u16(),
            message,
        })
    }
}

impl QueueClient for HttpQueueClient {
    fn create_task<'a>(&'a self, task_id: &'a str, definition: &'a Value) -> CreateTaskFuture<'a> {
        Box::pin(self.put_task(task_id, definition))
    }
}

fn rejection_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn status_reason(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}
