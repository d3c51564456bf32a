//! Live-reload message protocol.
//!
//! - `reload`: full page reload
//! - `css`: re-fetch stylesheets in place

use serde::Serialize;

/// Message broadcast to browser clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    Reload,
    Css,
}

impl ReloadMessage {
    pub fn to_json(self) -> String {
        serde_json::to_string(&self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        assert_eq!(ReloadMessage::Reload.to_json(), r#"{"type":"reload"}"#);
        assert_eq!(ReloadMessage::Css.to_json(), r#"{"type":"css"}"#);
    }
}
