// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `taskgraph`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskgraph",
    version,
    about = "Create every task of a task graph on the queue, dependencies first.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the task graph artifact (`task-graph.json`).
    #[arg(long, value_name = "PATH")]
    pub task_graph: PathBuf,

    /// Path to `label-to-taskid.json`, when the task graph is keyed by label.
    #[arg(long, value_name = "PATH")]
    pub label_to_taskid: Option<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Taskgraph.toml` in the current working directory, if it
    /// exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Task id that dependency-free tasks should wait on.
    ///
    /// Overrides the environment variable named in `[decision].task_id_env`.
    #[arg(long, value_name = "ID", conflicts_with = "no_gating")]
    pub gating_task_id: Option<String>,

    /// Never inject a gating dependency, even if one is available.
    #[arg(long)]
    pub no_gating: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKGRAPH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate the graph, print the submission plan, but don't
    /// create any tasks.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
