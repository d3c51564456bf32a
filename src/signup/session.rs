//! Token persistence.
//!
//! The file store keeps a flat JSON object so several keys can share one
//! file; only the configured key is ever touched. On unix the file is only
//! readable by its owner.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub trait SessionStore {
    fn load(&self) -> Result<Option<String>>;

    fn store(&self, token: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Session token stored under `key` in a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    key: String,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    fn read(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid session file {}", self.path.display()))
    }

    fn write(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        open_private(&self.path)
            .and_then(|mut file| file.write_all(json.as_bytes()))
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

/// Create or truncate `path` with mode `0600`, tightening an existing file.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    File::create(path)
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self
            .read()?
            .get(&self.key)
            .and_then(Value::as_str)
            .map(str::to_owned))
    }

    fn store(&self, token: &str) -> Result<()> {
        let mut entries = self.read()?;
        entries.insert(self.key.clone(), Value::String(token.to_owned()));
        self.write(&entries)
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.read()?;
        if entries.remove(&self.key).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: parking_lot::Mutex<Option<String>>,
}

#[cfg(test)]
impl MemorySessionStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: parking_lot::Mutex::new(Some(token.to_owned())),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().clone()
    }
}

#[cfg(test)]
impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token())
    }

    fn store(&self, token: &str) -> Result<()> {
        *self.token.lock() = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join(".lander/session.json"), "dating_auth_token");

        assert_eq!(store.load().unwrap(), None);
        store.store("abc123").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc123"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let store = FileSessionStore::new(&path, "dating_auth_token");
        store.store("t").unwrap();
        store.clear().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("theme"));
        assert!(!content.contains("dating_auth_token"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let mode = |path: &Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;

        let store = FileSessionStore::new(&path, "dating_auth_token");
        store.store("secret").unwrap();
        assert_eq!(mode(&path), 0o600);

        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        store.store("rotated").unwrap();
        assert_eq!(mode(&path), 0o600);
        assert_eq!(store.load().unwrap().as_deref(), Some("rotated"));
    }

    #[test]
    fn test_file_store_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{").unwrap();
        assert!(FileSessionStore::new(&path, "k").load().is_err());
    }
}
