//! Per-kind transforms: source file in, output file out.
//!
//! | Kind        | Chain                                              |
//! |-------------|----------------------------------------------------|
//! | markup      | collapse whitespace → rewrite references (hashing) |
//! | stylesheet  | scss compile → prefix + minify → `.min` rename     |
//! | script      | minify + mangle → `.min` rename                    |
//! | image       | re-encode by extension, or copy                    |
//! | font        | copy                                               |
//!
//! Stylesheets and scripts carry their sourcemap when enabled.
//! Fingerprinting happens afterwards, in the task that owns the manifest.

use anyhow::{Context, Result};
use lightningcss::targets::Targets;
use std::fs;

use crate::utils::path::to_slash;

use super::image::{ImageAction, optimize};
use super::markup::collapse_whitespace;
use super::minify::{MinifyError, minify_css, minify_js};
use super::rewrite::update_html_references;
use super::scss::{compile_scss, is_scss};
use super::{AssetKind, AssetRoute, Manifest, OutputFile};

/// Settings shared by every file of a build pass.
#[derive(Debug, Clone, Copy)]
pub struct ProcessOptions<'a> {
    pub min_suffix: &'a str,
    pub source_maps: bool,
    pub targets: Targets,
    /// Manifest used to rewrite markup references; `None` disables rewriting.
    pub rewrite: Option<&'a Manifest>,
}

/// Outcome of processing one file.
#[derive(Debug)]
pub enum Processed {
    Output(OutputFile),
    /// Non-fatal failure: the file produces no output.
    Skipped(MinifyError),
}

/// Run the transform chain for `route`.
///
/// Errors abort the owning task; stylesheet compile errors (SCSS or CSS) are
/// reported as [`Processed::Skipped`] instead.
pub fn process(route: &AssetRoute, options: &ProcessOptions<'_>) -> Result<Processed> {
    let label = to_slash(&route.rel);

    let output = match route.kind {
        AssetKind::Markup => {
            let source = read_text(route)?;
            let collapsed = collapse_whitespace(&source);
            let html = match options.rewrite {
                Some(manifest) => update_html_references(&collapsed, manifest).into_owned(),
                None => collapsed,
            };
            OutputFile::new(&route.rel, html)
        }
        AssetKind::Stylesheet => {
            let (rel, source) = if is_scss(&route.source) {
                match compile_scss(&label, &route.source) {
                    Ok(css) => (route.rel.with_extension("css"), css),
                    Err(e) => return Ok(Processed::Skipped(e)),
                }
            } else {
                (route.rel.clone(), read_text(route)?)
            };
            match minify_css(&label, &source, options.targets, options.source_maps) {
                Ok(css) => OutputFile::new(rel, css.code)
                    .with_suffix(options.min_suffix)
                    .with_source_map(css.map),
                Err(e) => return Ok(Processed::Skipped(e)),
            }
        }
        AssetKind::Script => {
            let source = read_text(route)?;
            let js = minify_js(&label, &source, options.source_maps)?;
            OutputFile::new(&route.rel, js.code)
                .with_suffix(options.min_suffix)
                .with_source_map(js.map)
        }
        AssetKind::Image => {
            let bytes = read_bytes(route)?;
            let action = ImageAction::for_extension(route.extension().as_deref());
            let optimized =
                optimize(action, bytes).with_context(|| format!("Failed to optimize {label}"))?;
            OutputFile::new(&route.rel, optimized)
        }
        AssetKind::Font => OutputFile::new(&route.rel, read_bytes(route)?),
    };

    Ok(Processed::Output(output))
}

fn read_text(route: &AssetRoute) -> Result<String> {
    fs::read_to_string(&route.source)
        .with_context(|| format!("Failed to read {}", route.source.display()))
}

fn read_bytes(route: &AssetRoute) -> Result<Vec<u8>> {
    fs::read(&route.source).with_context(|| format!("Failed to read {}", route.source.display()))
}
