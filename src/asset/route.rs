//! Asset route: source → output mapping.

use std::path::{Path, PathBuf};

use super::AssetKind;

/// A source file and where its transformed copy lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRoute {
    /// Source file path (absolute)
    pub source: PathBuf,
    /// Path relative to the task's source directory, kept in the output
    pub rel: PathBuf,
    pub kind: AssetKind,
}

impl AssetRoute {
    pub fn new(source: PathBuf, base: &Path, kind: AssetKind) -> Self {
        let rel = source
            .strip_prefix(base)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| source.file_name().map(PathBuf::from).unwrap_or_default());
        Self { source, rel, kind }
    }

    /// Lowercased extension of the source file.
    pub fn extension(&self) -> Option<String> {
        self.source
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}
