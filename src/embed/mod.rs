//! Embedded static resources.
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server resources (live-reload client)
//!
//! ```ignore
//! use embed::serve::{LIVE_RELOAD_JS, ReloadVars};
//!
//! let js = LIVE_RELOAD_JS.render(&ReloadVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// Variables for the live-reload client.
    pub struct ReloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for ReloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__LANDER_RELOAD_PORT__", &self.ws_port.to_string())
        }
    }

    /// Live-reload client, minified at compile time by `build.rs`.
    pub const LIVE_RELOAD_JS: Template<ReloadVars> =
        Template::new(include_str!(concat!(env!("OUT_DIR"), "/livereload.min.js")));

    /// Render the inline `<script>` tag injected into served HTML.
    pub fn reload_script_tag(ws_port: u16) -> String {
        format!(
            "<script>{}</script>",
            LIVE_RELOAD_JS.render(&ReloadVars { ws_port })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::serve::*;

    #[test]
    fn test_reload_script_has_port() {
        let tag = reload_script_tag(40000);
        assert!(tag.starts_with("<script>"));
        assert!(tag.ends_with("</script>"));
        assert!(tag.contains("40000"));
        assert!(!tag.contains("__LANDER_RELOAD_PORT__"));
    }
}
