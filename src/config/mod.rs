//! Project configuration management for `lander.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build] and per-task [build.*] overrides
//! │   ├── serve      # [serve]
//! │   └── identity   # [identity]
//! ├── error.rs       # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # Config file lookup, URL and path helpers
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! The config file is optional: without one every section uses its defaults
//! and the project root is the current directory.

mod error;
pub mod section;
mod util;

pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};
pub use section::{BuildConfig, IdentityConfig, ServeConfig, TaskSource};

use crate::asset::AssetKind;
use crate::cli::{Cli, Commands};
use crate::{debug, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::{expand_path, find_config_file};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing lander.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file, whether or not it exists
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file
    #[serde(skip)]
    pub root: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Signup/login settings
    #[serde(default)]
    pub identity: IdentityConfig,
}

impl SiteConfig {
    /// Load configuration for the given CLI invocation.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when no file exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, config_path) = match find_config_file(&cli.config) {
            Some(path) => (Self::from_path(&path)?, path),
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                (Self::default(), cwd.join(&cli.config))
            }
        };

        // Relative-path checks must run before paths become absolute
        let mut diag = ConfigDiagnostics::new();
        config.build.validate_paths(&mut diag);

        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(cwd);
        config.config_path = config_path;
        config.normalize_paths(&root, cli);
        config.apply_command_options(cli.command());

        config.validate(diag)?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Get path relative to the project root, for display
    pub fn root_relative(&self, path: impl AsRef<Path>) -> String {
        crate::utils::path::display_relative(path.as_ref(), &self.root)
    }

    /// Resolved source and output of a transform task.
    pub fn task_source(&self, kind: AssetKind) -> TaskSource {
        self.build.source(kind)
    }

    /// Location of the filename manifest written by hashing builds.
    pub fn manifest_path(&self) -> PathBuf {
        self.build.dist.join("manifest.json")
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, command: &Commands) {
        if let Some(args) = command.build_args() {
            Self::update_option(&mut self.build.hash, args.hash.as_ref());
        }

        if let Commands::Dev {
            interface,
            port,
            watch,
            open,
            ..
        } = command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            Self::update_option(&mut self.serve.watch, watch.as_ref());
            Self::update_option(&mut self.serve.open, open.as_ref());
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Normalize all paths relative to root directory.
    fn normalize_paths(&mut self, root: &Path, cli: &Cli) {
        Self::update_option(&mut self.build.dist, cli.output.as_ref());

        let root = crate::utils::path::normalize_path(root);
        self.config_path = crate::utils::path::normalize_path(&self.config_path);
        self.build.src = crate::utils::path::normalize_path(&root.join(&self.build.src));
        self.build.dist = crate::utils::path::normalize_path(&root.join(&self.build.dist));
        self.identity.session_file = expand_path(&self.identity.session_file, &root);
        self.root = root;
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section, reporting all problems at once.
    fn validate(&self, mut diag: ConfigDiagnostics) -> Result<()> {
        self.build.validate(&self.root, &mut diag);
        self.serve.validate(&mut diag);
        self.identity.validate(&mut diag);

        diag.print_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config content.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Config rooted at `root` with default sections and absolute paths.
#[cfg(test)]
pub fn test_config_at(root: &Path, content: &str) -> SiteConfig {
    let mut config = test_parse_config(content);
    config.config_path = root.join("lander.toml");
    config.build.src = root.join(&config.build.src);
    config.build.dist = root.join(&config.build.dist);
    config.identity.session_file = root.join(&config.identity.session_file);
    config.root = root.to_path_buf();
    config
}

// ============================================================================
// tests
// ============================================================================
