//! Filename manifest: logical asset names → fingerprinted output names.
//!
//! Populated by the stylesheet and script tasks, read by the markup task.
//! Keys and values are relative to the owning task's output directory and
//! always use `/` separators.
//!
//! ```ignore
//! let mut manifest = Manifest::new();
//! let file = manifest.add_hash(OutputFile::new("app.min.css", css));
//! // manifest: "app.min.css" → "app.min.1a2b3c4d.css"
//! //           "app.min"     → "app.min.1a2b3c4d.css"
//! ```

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::utils::{hash, path::to_slash};

use super::output::{OutputFile, insert_before_extension};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: FxHashMap<String, String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Insert an entry. A later insert for the same name wins.
    pub fn insert(&mut self, name: impl Into<String>, hashed: impl Into<String>) -> Option<String> {
        self.entries.insert(name.into(), hashed.into())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Merge entries from another manifest, overwriting duplicates.
    pub fn extend(&mut self, other: Manifest) {
        self.entries.extend(other.entries);
    }

    /// Entries sorted by name.
    pub fn sorted(&self) -> BTreeMap<&str, &str> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// Fingerprint `file`, record it under its name with and without
    /// extension, and return the renamed file. A sourcemap travels with it
    /// and is written under the hashed name.
    pub fn add_hash(&mut self, file: OutputFile) -> OutputFile {
        let fingerprint = hash::fingerprint(&file.contents);
        let logical = to_slash(&file.rel);
        let bare = to_slash(&file.rel.with_extension(""));

        let hashed_rel = insert_before_extension(&file.rel, &format!(".{fingerprint}"));
        let hashed = to_slash(&hashed_rel);

        self.insert(logical, hashed.clone());
        self.insert(bare, hashed);

        OutputFile {
            rel: hashed_rel,
            ..file
        }
    }

    /// Load a manifest written by [`Manifest::save`]. Missing file → empty.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let entries: FxHashMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid manifest {}", path.display()))?;
        Ok(Self { entries })
    }

    /// Write as pretty JSON with sorted keys.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.sorted())?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }
}
