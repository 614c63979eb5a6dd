// src/logging.rs

//! Subscriber setup for the `taskgraph` binary.
//!
//! `--log-level` sets one level for everything. Without it, `TASKGRAPH_LOG`
//! is read as an `EnvFilter` directive, so `TASKGRAPH_LOG=taskgraph=debug,reqwest=warn`
//! works as well as a bare level. An unset or unparsable value means `info`.
//!
//! Output goes to stderr; stdout carries the dry-run plan.

use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;
use crate::errors::{Result, TaskgraphError};

pub const LOG_ENV_VAR: &str = "TASKGRAPH_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    fmt()
        .with_env_filter(build_filter(cli_level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| TaskgraphError::Other(anyhow::anyhow!(e)))
}

fn build_filter(cli_level: Option<LogLevel>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level.as_directive());
    }

    match std::env::var(LOG_ENV_VAR) {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(directives.trim()).unwrap_or_else(|_| EnvFilter::new("info"))
        }
        _ => EnvFilter::new("info"),
    }
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
