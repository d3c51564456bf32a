//! Stylesheet and script minification.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Stylesheets are
//! vendor-prefixed for the configured browser targets while minifying.
//! Both can emit a version-3 sourcemap with the source text embedded.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use parcel_sourcemap::SourceMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::section::Browser;

#[derive(Debug, Error)]
pub enum MinifyError {
    #[error("stylesheet `{file}`: {message}")]
    Stylesheet { file: String, message: String },

    #[error("script `{file}`: {message}")]
    Script { file: String, message: String },
}

/// Minified code and, when requested, its sourcemap as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minified {
    pub code: String,
    pub map: Option<String>,
}

/// Minify and mangle JavaScript source code.
///
/// `file` labels errors and names the source in the map; `.mjs` files parse
/// as modules, others as scripts.
pub fn minify_js(file: &str, source: &str, source_map: bool) -> Result<Minified, MinifyError> {
    let allocator = Allocator::default();
    let source_type = SourceType::mjs().with_module(file.ends_with(".mjs"));
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        let message = ret
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(MinifyError::Script {
            file: file.to_string(),
            message,
        });
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let output = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            source_map_path: source_map.then(|| PathBuf::from(file)),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program);
    Ok(Minified {
        code: output.code,
        map: output.map.map(|map| map.to_json_string()),
    })
}

/// Convert `[build.targets]` entries to lightningcss targets.
pub fn css_targets(browsers: &[(Browser, u32)]) -> Targets {
    let mut out = Browsers::default();
    for &(browser, version) in browsers {
        let slot = match browser {
            Browser::Android => &mut out.android,
            Browser::Chrome => &mut out.chrome,
            Browser::Edge => &mut out.edge,
            Browser::Firefox => &mut out.firefox,
            Browser::Ie => &mut out.ie,
            Browser::IosSaf => &mut out.ios_saf,
            Browser::Opera => &mut out.opera,
            Browser::Samsung => &mut out.samsung,
            Browser::Safari => &mut out.safari,
        };
        *slot = Some(version);
    }
    Targets::from(out)
}

/// Prefix for `targets` and minify CSS source code.
pub fn minify_css(
    file: &str,
    source: &str,
    targets: Targets,
    source_map: bool,
) -> Result<Minified, MinifyError> {
    let error = |message: String| MinifyError::Stylesheet {
        file: file.to_string(),
        message,
    };

    let mut map = if source_map {
        let mut map = SourceMap::new("/");
        map.add_source(file);
        map.set_source_content(0, source)
            .map_err(|e| error(format!("sourcemap: {e:?}")))?;
        Some(map)
    } else {
        None
    };

    let mut stylesheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: file.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| error(e.to_string()))?;

    stylesheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| error(e.to_string()))?;

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            source_map: map.as_mut(),
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| error(e.to_string()))?;

    let map = match map.as_mut() {
        Some(map) => Some(
            map.to_json(None)
                .map_err(|e| error(format!("sourcemap: {e:?}")))?,
        ),
        None => None,
    };
    Ok(Minified {
        code: result.code,
        map,
    })
}
