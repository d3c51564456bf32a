//! Path normalization utilities.

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Render a relative path with `/` separators regardless of platform.
///
/// Manifest keys and markup references always use forward slashes.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Strip `base` from `path` for display, falling back to the full path.
pub fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .map(to_slash)
        .unwrap_or_else(|_| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        assert!(normalize_path(path).is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        assert!(normalize_path(path).is_absolute());
    }

    #[test]
    fn test_to_slash() {
        let path: PathBuf = ["sub", "app.min.css"].iter().collect();
        assert_eq!(to_slash(&path), "sub/app.min.css");
        assert_eq!(to_slash(Path::new("./app.js")), "app.js");
    }

    #[test]
    fn test_display_relative() {
        let base = Path::new("/site");
        assert_eq!(
            display_relative(Path::new("/site/src/css/app.css"), base),
            "src/css/app.css"
        );
        assert_eq!(display_relative(Path::new("/other/x"), base), "/other/x");
    }
}
