//! `[identity]` section configuration.
//!
//! Settings for the signup/login flow run by `lander auth`.
//!
//! # Example
//!
//! ```toml
//! [identity]
//! endpoint = "https://api.dating.com/identity"
//! storage_key = "dating_auth_token"
//! redirect = "https://www.dating.com/people/#token={token}"
//! redirect_delay_ms = 2000
//! session_file = ".lander/session.json"   # Relative to the project root, `~` expanded
//! ```

use crate::config::util::is_http_url;
use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Placeholder replaced by the session token in `redirect`.
pub const TOKEN_PLACEHOLDER: &str = "{token}";

/// Identity endpoint and session storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Identity endpoint (GET = login, PUT = register).
    pub endpoint: String,

    /// Key the token is stored under in the session file.
    pub storage_key: String,

    /// Members URL template; `{token}` is substituted.
    pub redirect: String,

    /// Delay between the registration success panel and navigation.
    pub redirect_delay_ms: u64,

    /// Session file location.
    pub session_file: PathBuf,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.dating.com/identity".into(),
            storage_key: "dating_auth_token".into(),
            redirect: "https://www.dating.com/people/#token={token}".into(),
            redirect_delay_ms: 2000,
            session_file: ".lander/session.json".into(),
        }
    }
}

impl IdentityConfig {
    /// Members URL for `token`.
    pub fn redirect_url(&self, token: &str) -> String {
        self.redirect.replace(TOKEN_PLACEHOLDER, token)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !is_http_url(&self.endpoint) {
            diag.error_with_hint(
                FieldPath::new("identity.endpoint"),
                format!("`{}` is not an http(s) URL", self.endpoint),
                "e.g. https://api.dating.com/identity",
            );
        }
        if !self.redirect.contains(TOKEN_PLACEHOLDER) {
            diag.error_with_hint(
                FieldPath::new("identity.redirect"),
                "must contain `{token}`",
                "e.g. https://www.dating.com/people/#token={token}",
            );
        }
        if self.storage_key.trim().is_empty() {
            diag.error(FieldPath::new("identity.storage_key"), "must not be empty");
        }
    }
}
