//! `[serve]` section configuration.
//!
//! Contains development server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 3000                 # HTTP port number
//! watch = true                # Rebuild on source changes
//! reload_port = 35729         # WebSocket port for live reload
//! open = false                # Open the default browser once listening
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Enable file watcher for rebuild and live reload.
    pub watch: bool,

    /// Preferred WebSocket port; the next free port is used when taken.
    pub reload_port: u16,

    /// Open the served URL in the default browser.
    pub open: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 3000,
            watch: true,
            reload_port: 35729,
            open: false,
        }
    }
}

impl ServeConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == 0 {
            diag.error(FieldPath::new("serve.port"), "port must not be 0");
        }
        if self.reload_port == 0 {
            diag.error(FieldPath::new("serve.reload_port"), "port must not be 0");
        } else if self.reload_port == self.port {
            diag.error_with_hint(
                FieldPath::new("serve.reload_port"),
                "must differ from `serve.port`",
                "the default is 35729",
            );
        }
    }
}
