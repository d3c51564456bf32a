//! Source watching for `dev`.
//!
//! ```text
//! notify ─► Debouncer (300 ms, dedup per path) ─► owning tasks ─► rerun graph
//! ```
//!
//! Reruns happen one after another on the watcher thread; a change arriving
//! during a rerun is picked up by the next one.

mod debouncer;

use crate::{
    core::{begin_update, end_update, is_shutdown},
    debug, log,
    logger::{status_error, status_success},
    task::{BuildContext, BuildSummary, Task, TaskGraph, run_graph},
    utils::path::normalize_path,
};
use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use debouncer::{ChangeKind, Debouncer};
use notify::{RecursiveMode, Watcher};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Longest wait between shutdown checks.
const POLL: Duration = Duration::from_millis(200);

/// Watch the source tree and rerun tasks until `shutdown` fires.
pub fn run(ctx: &mut BuildContext, shutdown: &Receiver<()>) -> Result<()> {
    let src = ctx.config().build.src.clone();
    let (tx, events) = channel::unbounded();
    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        let _ = tx.send(event);
    })
    .context("Failed to create file watcher")?;
    watcher
        .watch(&src, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", src.display()))?;
    log!("watch"; "{}", ctx.config().root_relative(&src));

    let mut debouncer = Debouncer::new();
    while !is_shutdown() && shutdown.try_recv().is_err() {
        match events.recv_timeout(debouncer.wait_time(Instant::now(), POLL)) {
            Ok(Ok(event)) => {
                if let Some(kind) = ChangeKind::from_event(&event.kind) {
                    let paths: Vec<PathBuf> = event.paths.iter().map(|p| normalize_path(p)).collect();
                    debouncer.add(kind, &paths, Instant::now());
                }
            }
            Ok(Err(e)) => log!("watch"; "notify error: {e}"),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(changes) = debouncer.take_if_ready(Instant::now()) {
            rebuild(ctx, &changes);
        }
    }
    Ok(())
}

/// Tasks whose source owns one of `changes`, in task order.
fn owning_tasks(ctx: &BuildContext, changes: &[(PathBuf, ChangeKind)]) -> Vec<Task> {
    let mut tasks: Vec<Task> = Task::TRANSFORMS
        .into_iter()
        .filter(|task| {
            task.asset_kind().is_some_and(|kind| {
                let source = ctx.config().task_source(kind);
                changes.iter().any(|(path, _)| source.matches(path))
            })
        })
        .collect();
    tasks.sort();
    tasks
}

fn rebuild(ctx: &mut BuildContext, changes: &[(PathBuf, ChangeKind)]) {
    for (path, kind) in changes {
        debug!("watch"; "{} {}", kind.label(), ctx.config().root_relative(path));
    }

    begin_update();
    let outcome = rerun(ctx, changes);
    end_update();

    let Some((names, result)) = outcome else {
        return;
    };
    match result {
        Ok(summary) if summary.skipped() > 0 => {
            status_error(&format!("{names}: skipped files"), "see warnings above");
        }
        Ok(_) => status_success(&format!("{names}: {}", changed_list(ctx, changes))),
        Err(e) => status_error(&format!("{names} failed"), &format!("{e:#}")),
    }
}

/// Rerun the tasks owning `changes`. `None` when no task owns them.
fn rerun(
    ctx: &mut BuildContext,
    changes: &[(PathBuf, ChangeKind)],
) -> Option<(String, Result<BuildSummary>)> {
    let tasks = owning_tasks(ctx, changes);
    if tasks.is_empty() {
        return None;
    }
    let graph = TaskGraph::rerun(&tasks, ctx.hashing());
    let names = graph
        .phases()
        .into_iter()
        .flatten()
        .map(Task::name)
        .collect::<Vec<_>>()
        .join(", ");
    Some((names, run_graph(ctx, &graph)))
}

fn changed_list(ctx: &BuildContext, changes: &[(PathBuf, ChangeKind)]) -> String {
    changes
        .iter()
        .map(|(path, _)| ctx.config().root_relative(path))
        .collect::<Vec<_>>()
        .join(", ")
}
