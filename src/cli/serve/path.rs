//! URL to output-tree path resolution.

use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// Resolve a request URL to a file under `root`.
///
/// Directories resolve to their `index.html`. Anything that would leave
/// `root`, including through symlinks, resolves to nothing.
pub fn resolve_path(url: &str, root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let canonical = root.join(&clean).canonicalize().ok()?;
    let root = root.canonicalize().ok()?;
    if !canonical.starts_with(&root) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }
    let index = canonical.join("index.html");
    index.is_file().then_some(index)
}

/// Strip query and fragment, percent-decode, trim slashes.
fn normalize_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    decoded.replace('\\', "/").trim_matches('/').to_string()
}
