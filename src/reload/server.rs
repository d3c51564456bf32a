//! WebSocket server for live reload.
//!
//! An acceptor thread performs the handshake and registers clients; the
//! build side broadcasts through a cloneable [`ReloadHandle`].

use std::net::{IpAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::ReloadMessage;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Poll interval of the non-blocking acceptor
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Shared list of connected browsers.
#[derive(Clone, Default)]
pub struct ReloadHandle {
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
}

impl ReloadHandle {
    /// Bind near `base_port` on `interface` and start accepting clients.
    ///
    /// Returns the handle and the port actually bound.
    pub fn start(interface: IpAddr, base_port: u16) -> Result<(Self, u16)> {
        let (listener, actual_port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
        listener.set_nonblocking(true)?;

        let handle = Self::default();
        let clients = Arc::clone(&handle.clients);
        std::thread::spawn(move || accept_loop(&listener, &clients));

        Ok((handle, actual_port))
    }

    /// Send `message` to every client, dropping the ones that are gone.
    ///
    /// Returns the number of clients reached.
    pub fn broadcast(&self, message: ReloadMessage) -> usize {
        let json = message.to_json();
        let mut clients = self.clients.lock();
        clients.retain_mut(|ws| ws.send(Message::Text(json.clone().into())).is_ok());
        crate::debug!("reload"; "sent {} to {} client(s)", json, clients.len());
        clients.len()
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Close every connection.
    pub fn close_all(&self) {
        for mut ws in self.clients.lock().drain(..) {
            let _ = ws.close(None);
            let _ = ws.flush();
        }
    }
}

fn accept_loop(listener: &TcpListener, clients: &Mutex<Vec<WebSocket<TcpStream>>>) {
    while !crate::core::is_shutdown() {
        match listener.accept() {
            Ok((stream, addr)) => {
                // Handshake needs a blocking stream
                let _ = stream.set_nonblocking(false);
                match tungstenite::accept(stream) {
                    Ok(ws) => {
                        crate::debug!("reload"; "client connected: {}", addr);
                        clients.lock().push(ws);
                    }
                    Err(e) => crate::debug!("reload"; "handshake failed: {}", e),
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(ACCEPT_POLL);
            }
            Err(e) => {
                crate::log!("reload"; "accept error: {}", e);
                std::thread::sleep(ACCEPT_POLL);
            }
        }
    }
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind((interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
