//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! src = "src"                 # Source tree
//! dist = "dist"               # Output tree (removed by `clean`)
//! hash = false                # Fingerprint css/js names and rewrite html references
//! min_suffix = ".min"         # Inserted before the extension of css/js outputs
//! sourcemap = true            # Write `<output>.map` next to css/js outputs
//!
//! [build.targets]             # Browsers for css vendor prefixing
//! chrome = "100"
//! safari = "14.1"
//!
//! [build.js]                  # Per-task overrides, all fields optional
//! source = "scripts"          # Relative to `src`
//! extensions = ["js"]         # Empty list matches every file
//! output = "assets/js"        # Relative to `dist`
//! ```

use crate::asset::AssetKind;
use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Build settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Source tree root.
    pub src: PathBuf,

    /// Output tree root.
    pub dist: PathBuf,

    /// Enable content hashing of stylesheets and scripts.
    pub hash: bool,

    /// Suffix inserted before the extension of minified css/js.
    pub min_suffix: String,

    /// Emit sourcemaps for stylesheets and scripts.
    pub sourcemap: bool,

    /// Browser targets as `name = "major[.minor]"`.
    pub targets: BTreeMap<String, String>,

    pub html: TaskSourceConfig,
    pub css: TaskSourceConfig,
    pub js: TaskSourceConfig,
    pub images: TaskSourceConfig,
    pub fonts: TaskSourceConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            src: "src".into(),
            dist: "dist".into(),
            hash: false,
            min_suffix: ".min".into(),
            sourcemap: true,
            targets: default_targets(),
            html: TaskSourceConfig::default(),
            css: TaskSourceConfig::default(),
            js: TaskSourceConfig::default(),
            images: TaskSourceConfig::default(),
            fonts: TaskSourceConfig::default(),
        }
    }
}

fn default_targets() -> BTreeMap<String, String> {
    [
        ("chrome", "100"),
        ("edge", "100"),
        ("firefox", "100"),
        ("safari", "14"),
        ("ios_saf", "14"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Optional per-task overrides. Missing fields fall back to the kind's defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSourceConfig {
    pub source: Option<PathBuf>,
    pub extensions: Option<Vec<String>>,
    pub output: Option<PathBuf>,
}

/// Resolved input/output of one transform task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSource {
    /// Directory scanned recursively.
    pub dir: PathBuf,
    /// Lowercase extensions without dot; empty matches everything.
    pub extensions: Vec<String>,
    /// Directory outputs are written to.
    pub output: PathBuf,
}

impl TaskSource {
    /// Whether `path` lies under this source and passes the extension filter.
    pub fn matches(&self, path: &Path) -> bool {
        path.starts_with(&self.dir) && self.accepts_extension(path)
    }

    pub fn accepts_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }
}

impl BuildConfig {
    fn overrides(&self, kind: AssetKind) -> &TaskSourceConfig {
        match kind {
            AssetKind::Markup => &self.html,
            AssetKind::Stylesheet => &self.css,
            AssetKind::Script => &self.js,
            AssetKind::Image => &self.images,
            AssetKind::Font => &self.fonts,
        }
    }

    /// Resolve where a kind reads from and writes to.
    ///
    /// `src` and `dist` must already be absolute (see `SiteConfig::load`).
    pub fn source(&self, kind: AssetKind) -> TaskSource {
        let overrides = self.overrides(kind);
        let dir = match &overrides.source {
            Some(source) => self.src.join(source),
            None => self.src.join(kind.default_source()),
        };
        let extensions = match &overrides.extensions {
            Some(exts) => exts
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            None => kind
                .default_extensions()
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
        };
        let output = match &overrides.output {
            Some(output) => self.dist.join(output),
            None => self.dist.join(kind.default_output()),
        };
        TaskSource {
            dir,
            extensions,
            output,
        }
    }

    /// Parsed browser targets, sorted by browser name.
    pub fn browser_targets(&self) -> Result<Vec<(Browser, u32)>, String> {
        self.targets
            .iter()
            .map(|(name, version)| {
                let browser = Browser::from_name(name)
                    .ok_or_else(|| format!("unknown browser `{name}`"))?;
                let version = parse_version(version)
                    .ok_or_else(|| format!("invalid version `{version}` for `{name}`"))?;
                Ok((browser, version))
            })
            .collect()
    }

    /// Check paths before they are made absolute.
    pub fn validate_paths(&self, diag: &mut ConfigDiagnostics) {
        let fields = [
            (AssetKind::Markup, FieldPath::new("build.html.output")),
            (AssetKind::Stylesheet, FieldPath::new("build.css.output")),
            (AssetKind::Script, FieldPath::new("build.js.output")),
            (AssetKind::Image, FieldPath::new("build.images.output")),
            (AssetKind::Font, FieldPath::new("build.fonts.output")),
        ];
        for (kind, field) in fields {
            if let Some(output) = &self.overrides(kind).output
                && !is_plain_relative(output)
            {
                diag.error_with_hint(
                    field,
                    format!("`{}` must stay inside `build.dist`", output.display()),
                    "use a relative path without `..`",
                );
            }
        }
    }

    /// Validate resolved build configuration.
    pub fn validate(&self, root: &Path, diag: &mut ConfigDiagnostics) {
        if self.min_suffix.is_empty() {
            diag.error_with_hint(
                FieldPath::new("build.min_suffix"),
                "must not be empty",
                "the default is \".min\"",
            );
        } else if !self.min_suffix.starts_with('.') {
            diag.error(
                FieldPath::new("build.min_suffix"),
                format!("`{}` must start with `.`", self.min_suffix),
            );
        }

        if let Err(message) = self.browser_targets() {
            diag.error_with_hint(
                FieldPath::new("build.targets"),
                message,
                format!("known browsers: {}", Browser::NAMES.join(", ")),
            );
        }

        if self.dist == root {
            diag.error(
                FieldPath::new("build.dist"),
                "must not be the project root, `clean` would delete it",
            );
        } else if self.src.starts_with(&self.dist) {
            diag.error(
                FieldPath::new("build.dist"),
                "must not contain `build.src`, `clean` would delete sources",
            );
        } else if self.dist.starts_with(&self.src) {
            diag.error(
                FieldPath::new("build.dist"),
                "must not be inside `build.src`, outputs would be picked up as sources",
            );
        }

        if !self.src.is_dir() {
            diag.warn(
                FieldPath::new("build.src"),
                format!("`{}` does not exist", self.src.display()),
            );
        }
    }
}

fn is_plain_relative(path: &Path) -> bool {
    path.is_relative()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Parse `major[.minor]` into the `(major << 16) | (minor << 8)` encoding.
fn parse_version(version: &str) -> Option<u32> {
    let mut parts = version.trim().split('.');
    let major: u16 = parts.next()?.parse().ok()?;
    let minor: u8 = match parts.next() {
        Some(minor) => minor.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some((u32::from(major) << 16) | (u32::from(minor) << 8))
}

/// Browsers accepted in `[build.targets]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Browser {
    Android,
    Chrome,
    Edge,
    Firefox,
    Ie,
    IosSaf,
    Opera,
    Safari,
    Samsung,
}

impl Browser {
    pub const NAMES: [&'static str; 9] = [
        "android", "chrome", "edge", "firefox", "ie", "ios_saf", "opera", "safari", "samsung",
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "android" => Self::Android,
            "chrome" => Self::Chrome,
            "edge" => Self::Edge,
            "firefox" => Self::Firefox,
            "ie" => Self::Ie,
            "ios_saf" | "ios" => Self::IosSaf,
            "opera" => Self::Opera,
            "safari" => Self::Safari,
            "samsung" => Self::Samsung,
            _ => return None,
        })
    }
}
