//! Processed files on their way to the output tree.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// A transformed asset, addressed relative to its task's output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub rel: PathBuf,
    /// Contents without the sourcemap comment; fingerprints are taken from these.
    pub contents: Vec<u8>,
    /// Sourcemap JSON, written as `<rel>.map` next to the file.
    pub source_map: Option<String>,
}

impl OutputFile {
    pub fn new(rel: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            rel: rel.into(),
            contents: contents.into(),
            source_map: None,
        }
    }

    pub fn with_source_map(mut self, map: Option<String>) -> Self {
        self.source_map = map;
        self
    }

    /// Insert `suffix` before the extension: `app.css` + `.min` → `app.min.css`.
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.rel = insert_before_extension(&self.rel, suffix);
        self
    }

    /// Write into `dir`, creating parent directories. Returns the written path.
    ///
    /// With a sourcemap, the map lands next to the file and the file ends
    /// with a comment pointing at it.
    pub fn write_into(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        match &self.source_map {
            Some(map) => {
                let map_path = map_path(&path);
                let map_name = map_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let mut contents = self.contents.clone();
                contents.extend_from_slice(mapping_comment(&self.rel, &map_name).as_bytes());
                fs::write(&path, contents)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                fs::write(&map_path, map)
                    .with_context(|| format!("Failed to write {}", map_path.display()))?;
            }
            None => fs::write(&path, &self.contents)
                .with_context(|| format!("Failed to write {}", path.display()))?,
        }
        Ok(path)
    }
}

/// `dir/app.min.css` → `dir/app.min.css.map`.
pub fn map_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".map");
    PathBuf::from(name)
}

/// Trailing comment linking an output to its map; block syntax for css.
fn mapping_comment(rel: &Path, map_name: &str) -> String {
    let is_css = rel
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("css"));
    if is_css {
        format!("\n/*# sourceMappingURL={map_name} */")
    } else {
        format!("\n//# sourceMappingURL={map_name}")
    }
}

/// `dir/name.ext` → `dir/name<insert>.ext`; without an extension the insert is appended.
pub fn insert_before_extension(path: &Path, insert: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}{insert}.{}", ext.to_string_lossy()),
        None => format!("{stem}{insert}"),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_with_suffix() {
        let file = OutputFile::new("pages/app.css", "a{}").with_suffix(".min");
        assert_eq!(file.rel, PathBuf::from("pages/app.min.css"));
    }

    #[test]
    fn test_insert_without_extension() {
        assert_eq!(
            insert_before_extension(Path::new("LICENSE"), ".min"),
            PathBuf::from("LICENSE.min")
        );
    }

    #[test]
    fn test_write_into_creates_parents() {
        let dir = TempDir::new().unwrap();
        let file = OutputFile::new("nested/deep/app.js", "x");
        let written = file.write_into(dir.path()).unwrap();
        assert_eq!(written, dir.path().join("nested/deep/app.js"));
        assert_eq!(fs::read_to_string(written).unwrap(), "x");
        assert!(!dir.path().join("nested/deep/app.js.map").exists());
    }

    #[test]
    fn test_write_into_with_source_map() {
        let dir = TempDir::new().unwrap();
        let map = r#"{"version":3,"sources":["app.css"],"mappings":"AAAA"}"#;

        let css = OutputFile::new("app.min.css", "a{}").with_source_map(Some(map.to_string()));
        css.write_into(dir.path()).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("app.min.css")).unwrap(),
            "a{}\n/*# sourceMappingURL=app.min.css.map */"
        );
        assert_eq!(fs::read_to_string(dir.path().join("app.min.css.map")).unwrap(), map);

        let js = OutputFile::new("lib/main.min.js", "x()").with_source_map(Some(map.to_string()));
        js.write_into(dir.path()).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("lib/main.min.js")).unwrap(),
            "x()\n//# sourceMappingURL=main.min.js.map"
        );
        assert!(dir.path().join("lib/main.min.js.map").exists());
    }
}
