//! Asset scanning (reads the filesystem, no side effects).

use jwalk::WalkDir;

use crate::config::TaskSource;
use crate::debug;

use super::scss::is_partial;
use super::{AssetKind, AssetRoute};

/// File names never treated as assets.
const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

/// Collect every file under `source.dir` that passes its extension filter.
///
/// Routes are sorted by relative path so builds are deterministic.
/// A missing source directory yields no routes. SCSS partials are left to
/// the stylesheets that import them.
pub fn scan(kind: AssetKind, source: &TaskSource) -> Vec<AssetRoute> {
    if !source.dir.is_dir() {
        debug!("scan"; "{} source `{}` missing, nothing to do", kind, source.dir.display());
        return Vec::new();
    }

    let mut routes: Vec<_> = WalkDir::new(&source.dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(|e| e.path())
        .filter(|path| source.accepts_extension(path))
        .filter(|path| !(kind == AssetKind::Stylesheet && is_partial(path)))
        .map(|path| AssetRoute::new(path, &source.dir, kind))
        .collect();

    routes.sort_by(|a, b| a.rel.cmp(&b.rel));
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn source(dir: PathBuf, exts: &[&str]) -> TaskSource {
        TaskSource {
            dir,
            extensions: exts.iter().map(|e| e.to_string()).collect(),
            output: PathBuf::from("/unused"),
        }
    }

    #[test]
    fn test_scan_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("vendor")).unwrap();
        fs::write(dir.path().join("main.js"), "").unwrap();
        fs::write(dir.path().join("vendor/lib.mjs"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join(".DS_Store"), "").unwrap();

        let routes = scan(AssetKind::Script, &source(dir.path().into(), &["js", "mjs"]));
        let rels: Vec<_> = routes.iter().map(|r| r.rel.clone()).collect();
        assert_eq!(
            rels,
            vec![PathBuf::from("main.js"), PathBuf::from("vendor/lib.mjs")]
        );
    }

    #[test]
    fn test_scan_empty_filter_accepts_all() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.woff2"), "").unwrap();
        fs::write(dir.path().join("b.ttf"), "").unwrap();
        fs::write(dir.path().join("Thumbs.db"), "").unwrap();

        let routes = scan(AssetKind::Font, &source(dir.path().into(), &[]));
        assert_eq!(routes.len(), 2);
        assert!(routes.iter().all(|r| r.kind == AssetKind::Font));
    }

    #[test]
    fn test_scan_skips_scss_partials() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.scss"), "").unwrap();
        fs::write(dir.path().join("_vars.scss"), "").unwrap();
        fs::write(dir.path().join("reset.css"), "").unwrap();

        let routes = scan(AssetKind::Stylesheet, &source(dir.path().into(), &["css", "scss"]));
        let rels: Vec<_> = routes.iter().map(|r| r.rel.clone()).collect();
        assert_eq!(rels, vec![PathBuf::from("app.scss"), PathBuf::from("reset.css")]);
    }

    #[test]
    fn test_scan_missing_dir() {
        let dir = TempDir::new().unwrap();
        let routes = scan(AssetKind::Image, &source(dir.path().join("nope"), &[]));
        assert!(routes.is_empty());
    }
}
