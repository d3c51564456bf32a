//! Server lifecycle: binding, opening a browser, the watcher thread, shutdown.

use crate::{debug, log, task::BuildContext};
use anyhow::{Result, anyhow};
use crossbeam::channel::Receiver;
use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    thread::{self, JoinHandle},
    time::Duration,
};
use tiny_http::Server;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to `interface`, trying `base_port` and the ports after it.
///
/// Returns the address actually bound.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);
        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                let bound = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, bound));
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Run the watch loop on its own thread until shutdown.
pub fn spawn_watcher(mut ctx: BuildContext, shutdown: Receiver<()>) -> JoinHandle<()> {
    thread::spawn(move || {
        if let Err(e) = crate::watch::run(&mut ctx, &shutdown) {
            log!("watch"; "stopped: {e:#}");
        }
    })
}

/// Wait for the watcher to stop (max 2 seconds).
pub fn wait_for_shutdown(handle: Option<JoinHandle<()>>) {
    let Some(handle) = handle else { return };

    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

/// URL a local browser can reach; wildcard binds map to loopback.
pub fn browser_url(addr: SocketAddr) -> String {
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    format!("http://{}", SocketAddr::new(ip, addr.port()))
}

/// Point the default browser at `url`. Failure only warns.
pub fn open_browser(url: &str) {
    match open::that_detached(url) {
        Ok(()) => debug!("serve"; "opened {} in the browser", url),
        Err(e) => log!("warning"; "could not open a browser: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_bind_skips_taken_port() {
        let (_first, addr) = bind_with_retry(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).unwrap();
        let taken = addr.port();
        assert_ne!(taken, 0);

        let (_second, addr) = bind_with_retry(IpAddr::V4(Ipv4Addr::LOCALHOST), taken).unwrap();
        assert_ne!(addr.port(), taken);
    }

    #[test]
    fn test_browser_url() {
        let local = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000);
        assert_eq!(browser_url(local), "http://127.0.0.1:3000");

        let any = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3001);
        assert_eq!(browser_url(any), "http://127.0.0.1:3001");

        let any6 = SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 3002);
        assert_eq!(browser_url(any6), "http://[::1]:3002");
    }
}
