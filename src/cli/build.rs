//! Build commands: `clean`, the single-task commands, `build` and the
//! initial build of `dev`.

use crate::{
    config::SiteConfig,
    log,
    task::{BuildContext, BuildSummary, Task, TaskGraph, run_graph},
    utils::plural_count,
};
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;

use super::Commands;

/// Task graph of a build command; `None` for commands that do not build.
pub fn graph_for(command: &Commands, config: &SiteConfig) -> Option<TaskGraph> {
    let hashing = config.build.hash;
    let graph = match command {
        Commands::Clean => TaskGraph::single(Task::Clean),
        Commands::Html { .. } => TaskGraph::single(Task::Html),
        Commands::Css { .. } => TaskGraph::single(Task::Css),
        Commands::Js { .. } => TaskGraph::single(Task::Js),
        Commands::Images => TaskGraph::single(Task::Images),
        Commands::Fonts => TaskGraph::single(Task::Fonts),
        Commands::Build { .. } => TaskGraph::build(hashing),
        Commands::Dev { .. } => TaskGraph::dev(hashing, config.serve.watch),
        Commands::Auth { .. } => return None,
    };
    Some(graph)
}

/// Run a one-shot build command.
pub fn run_build(config: Arc<SiteConfig>, graph: &TaskGraph) -> Result<()> {
    let mut ctx = BuildContext::new(config)?;
    build_with(&mut ctx, graph)?;
    Ok(())
}

/// Run `graph` in `ctx` and log the outcome.
pub fn build_with(ctx: &mut BuildContext, graph: &TaskGraph) -> Result<BuildSummary> {
    let started = Instant::now();
    let summary = run_graph(ctx, graph)?;
    log_summary(&summary, started);
    Ok(summary)
}

fn log_summary(summary: &BuildSummary, started: Instant) {
    if summary.reports.is_empty() {
        return;
    }
    let skipped = summary.skipped();
    let elapsed = started.elapsed();
    if skipped > 0 {
        log!(
            "build";
            "{} written, {} skipped in {:.2?}",
            plural_count(summary.written(), "file"),
            plural_count(skipped, "file"),
            elapsed
        );
    } else {
        log!("build"; "{} written in {:.2?}", plural_count(summary.written(), "file"), elapsed);
    }
}
