//! `lander dev`: build, then serve the output tree with watch and live reload,
//! optionally opening a browser.
//!
//! ```text
//! main thread      build → bind → request loop (rayon pool) ─┐
//! watcher thread          notify → debounce → rerun tasks    ├─ Ctrl+C unblocks both
//! reload thread           WebSocket accept loop              ┘
//! ```

mod lifecycle;
mod path;
mod response;

use crate::{
    config::SiteConfig,
    core::{is_busy, is_shutdown},
    debug, log,
    logger::status_error,
    reload::ReloadHandle,
    task::{BuildContext, Task, TaskGraph},
};
use anyhow::{Context, Result};
use crossbeam::channel;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tiny_http::{Request, Server};

use super::build::build_with;

/// Longest time a request waits for a running rebuild.
const BUSY_WAIT: Duration = Duration::from_secs(10);

/// Worker threads answering requests.
const REQUEST_THREADS: usize = 4;

/// Run the dev graph: initial build, then `watch` and `serve`.
///
/// A failing initial build is reported but does not stop the server, so a
/// source fix picked up by the watcher can recover.
pub fn run_dev(config: Arc<SiteConfig>, graph: &TaskGraph) -> Result<()> {
    let serve = &config.serve;
    let watching = graph.contains(Task::Watch);

    let mut ctx = BuildContext::new(Arc::clone(&config))?;
    let mut ws_port = None;
    if watching {
        let (handle, port) = ReloadHandle::start(serve.interface, serve.reload_port)?;
        debug!("reload"; "ws://{}:{}", serve.interface, port);
        ctx = ctx.with_reload(handle);
        ws_port = Some(port);
    }

    if let Err(e) = build_with(&mut ctx, graph) {
        status_error("initial build failed", &format!("{e:#}"));
    }

    let (server, addr) = lifecycle::bind_with_retry(serve.interface, serve.port)?;
    let server = Arc::new(server);
    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);
    log!("serve"; "http://{}", addr);
    if serve.open {
        lifecycle::open_browser(&lifecycle::browser_url(addr));
    }

    let watcher = watching.then(|| lifecycle::spawn_watcher(ctx, shutdown_rx));

    run_request_loop(&server, &config.build.dist, ws_port)?;
    lifecycle::wait_for_shutdown(watcher);
    Ok(())
}

fn run_request_loop(server: &Server, root: &Path, ws_port: Option<u16>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()
        .context("Failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let root = root.to_path_buf();
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &root, ws_port) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

fn handle_request(request: Request, root: &Path, ws_port: Option<u16>) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    // Serve the finished rebuild, not a half-written tree
    let deadline = Instant::now() + BUSY_WAIT;
    while is_busy() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }

    debug!("serve"; "{} {}", request.method(), request.url());
    match path::resolve_path(request.url(), root) {
        Some(file) => response::respond_file(request, &file, ws_port),
        None => response::respond_not_found(request, root, ws_port),
    }
}
