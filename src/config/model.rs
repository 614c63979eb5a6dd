// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::submit::{SchedulerOptions, DEFAULT_CONCURRENCY};
use crate::types::TaskId;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [queue]
/// root_url = "http://taskcluster/queue"
/// concurrency = 10
/// timeout = "30s"
///
/// [decision]
/// task_id_env = "TASK_ID"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Queue endpoint and submission limits from `[queue]`.
    #[serde(default)]
    pub queue: QueueSection,

    /// Where to find the gating (decision) task id, from `[decision]`.
    #[serde(default)]
    pub decision: DecisionSection,
}

/// `[queue]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueSection {
    /// Base URL of the queue service; tasks are created under
    /// `{root_url}/v1/task/{task_id}`.
    #[serde(default = "default_root_url")]
    pub root_url: String,

    /// Maximum number of create-task calls in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Deadline for one create-task call (e.g. `"30s"`, `"500ms"`).
    /// `"0s"` disables the deadline.
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

fn default_root_url() -> String {
    "http://taskcluster/queue".to_string()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_timeout() -> String {
    "30s".to_string()
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
            concurrency: default_concurrency(),
            timeout: default_timeout(),
        }
    }
}

/// `[decision]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionSection {
    /// Environment variable holding the id of the task running this
    /// submission. When set, dependency-free tasks wait on it.
    #[serde(default = "default_task_id_env")]
    pub task_id_env: String,
}

fn default_task_id_env() -> String {
    "TASK_ID".to_string()
}

impl Default for DecisionSection {
    fn default() -> Self {
        Self {
            task_id_env: default_task_id_env(),
        }
    }
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub queue: QueueSection,
    pub decision: DecisionSection,
    submit_timeout: Option<Duration>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        queue: QueueSection,
        decision: DecisionSection,
        submit_timeout: Option<Duration>,
    ) -> Self {
        Self {
            queue,
            decision,
            submit_timeout,
        }
    }

    /// Parsed `[queue].timeout`; `None` when disabled.
    pub fn submit_timeout(&self) -> Option<Duration> {
        self.submit_timeout
    }

    /// The gating task id from the configured environment variable, if set
    /// and non-empty.
    pub fn gating_id_from_env(&self) -> Option<TaskId> {
        std::env::var(&self.decision.task_id_env)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Scheduler options for this config and the given gating id.
    pub fn scheduler_options(&self, gating_id: Option<TaskId>) -> SchedulerOptions {
        SchedulerOptions {
            concurrency: self.queue.concurrency,
            gating_id,
            submit_timeout: self.submit_timeout,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            QueueSection::default(),
            DecisionSection::default(),
            Some(crate::submit::DEFAULT_SUBMIT_TIMEOUT),
        )
    }
}
