//! SCSS compilation with grass.
//!
//! Runs ahead of [`minify_css`](super::minify::minify_css); plain `.css`
//! sources never pass through here. Partials (`_name.scss`) are only
//! compiled as part of the stylesheets that `@use` or `@import` them.

use std::path::Path;

use super::minify::MinifyError;

/// Whether `path` is an SCSS source.
pub fn is_scss(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("scss"))
}

/// Whether `path` is an SCSS partial, which produces no output of its own.
pub fn is_partial(path: &Path) -> bool {
    is_scss(path)
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with('_'))
}

/// Compile the SCSS file at `path` to expanded CSS.
///
/// Imports resolve relative to the file. `file` labels errors.
pub fn compile_scss(file: &str, path: &Path) -> Result<String, MinifyError> {
    grass::from_path(path, &grass::Options::default()).map_err(|e| MinifyError::Stylesheet {
        file: file.to_string(),
        message: e.to_string(),
    })
}
