// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod dag;
pub mod errors;
pub mod logging;
pub mod submit;
pub mod types;

use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::client::HttpQueueClient;
use crate::config::{load_or_default, ConfigFile};
use crate::dag::{load_task_graph, TaskGraph};
use crate::errors::Result;
use crate::submit::definition::effective_dependencies;
use crate::submit::{SchedulerOptions, SubmissionScheduler};
use crate::types::TaskId;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - task graph artifact loading
/// - gating id resolution (CLI flag or environment)
/// - the HTTP queue client and the submission scheduler
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref())?;
    let graph = load_task_graph(&args.task_graph, args.label_to_taskid.as_deref())?;

    let gating_id = resolve_gating_id(&args, &cfg);
    let options = cfg.scheduler_options(gating_id);

    if args.dry_run {
        print_dry_run(&graph, &options)?;
        return Ok(());
    }

    let client = HttpQueueClient::new(&cfg.queue.root_url, cfg.queue.concurrency)?;
    let scheduler = SubmissionScheduler::new(Arc::new(client), options);

    let report = scheduler.submit(&graph).await?;
    info!(
        run_id = %report.run_id,
        submitted = report.submitted().len(),
        "all tasks created"
    );
    Ok(())
}

/// `--gating-task-id` wins over the environment; `--no-gating` disables both.
fn resolve_gating_id(args: &CliArgs, cfg: &ConfigFile) -> Option<TaskId> {
    if args.no_gating {
        return None;
    }
    args.gating_task_id
        .clone()
        .or_else(|| cfg.gating_id_from_env())
}

/// Simple dry-run output: tasks in submission order with the dependencies
/// the queue would see.
fn print_dry_run(graph: &TaskGraph, options: &SchedulerOptions) -> Result<()> {
    let order = graph.graph().postorder()?;

    println!("taskgraph dry-run");
    println!("  concurrency = {}", options.concurrency);
    println!("  submit_timeout = {:?}", options.submit_timeout);
    println!("  gating_id = {}", options.gating_id.as_deref().unwrap_or("<none>"));
    println!();

    println!("tasks ({}), in submission order:", order.len());
    for id in order.iter() {
        let Some(node) = graph.get(id) else {
            continue;
        };
        let deps = effective_dependencies(node, options.gating_id.as_deref())?;
        println!("  - {id} ({})", node.label);
        if !deps.is_empty() {
            println!("      dependencies: {:?}", deps);
        }
        let external = graph.external_dependencies_of(id);
        if !external.is_empty() {
            println!("      external: {:?}", external);
        }
    }

    debug!("dry-run complete (no tasks created)");
    Ok(())
}
