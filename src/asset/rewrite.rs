//! Markup reference rewriting for fingerprinted assets.
//!
//! Only two attribute shapes are rewritten: `href="css/<name>"` and
//! `src="js/<name>"`. Absolute paths, image sources and inline style URLs
//! are left alone.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

use super::Manifest;

/// `(prefix)(name)(closing quote)` for each rewritten shape.
static RULES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r#"(href="css/)([^"]+)(")"#).unwrap(),
        Regex::new(r#"(src="js/)([^"]+)(")"#).unwrap(),
    ]
});

/// Replace manifest-known names in the fixed reference shapes.
///
/// Unknown names are left byte-identical. Returns `Cow::Borrowed` when no
/// reference shape occurs at all.
pub fn update_html_references<'a>(markup: &'a str, manifest: &Manifest) -> Cow<'a, str> {
    if manifest.is_empty() {
        return Cow::Borrowed(markup);
    }

    let mut result = Cow::Borrowed(markup);
    for rule in RULES.iter() {
        let replaced = rule.replace_all(&result, |caps: &Captures| {
            match manifest.get(&caps[2]) {
                Some(hashed) => format!("{}{}{}", &caps[1], hashed, &caps[3]),
                None => caps[0].to_string(),
            }
        });
        if let Cow::Owned(updated) = replaced {
            result = Cow::Owned(updated);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> Manifest {
        let mut manifest = Manifest::new();
        manifest.insert("app.css", "app.a1b2c3d4.css");
        manifest.insert("app", "app.a1b2c3d4.css");
        manifest.insert("main.min.js", "main.min.0f0f0f0f.js");
        manifest
    }

    #[test]
    fn test_rewrites_css_href() {
        let html = r#"<link rel="stylesheet" href="css/app.css">"#;
        assert_eq!(
            update_html_references(html, &manifest()),
            r#"<link rel="stylesheet" href="css/app.a1b2c3d4.css">"#
        );
    }

    #[test]
    fn test_rewrites_js_src() {
        let html = r#"<script src="js/main.min.js"></script>"#;
        assert_eq!(
            update_html_references(html, &manifest()),
            r#"<script src="js/main.min.0f0f0f0f.js"></script>"#
        );
    }

    #[test]
    fn test_unknown_name_untouched() {
        let html = r#"<link href="css/other.css"><script src="js/app.js"></script>"#;
        assert_eq!(update_html_references(html, &manifest()), html);
    }

    #[test]
    fn test_other_shapes_never_rewritten() {
        let html = concat!(
            r#"<link href="/css/app.css">"#,
            r#"<img src="css/app.css">"#,
            r#"<div style="background:url(css/app.css)"></div>"#,
            r#"<link href='css/app.css'>"#,
        );
        assert_eq!(update_html_references(html, &manifest()), html);
    }

    #[test]
    fn test_multiple_references() {
        let html = r#"<link href="css/app.css"><link href="css/app"><script src="js/main.min.js"></script>"#;
        let out = update_html_references(html, &manifest());
        assert_eq!(
            out,
            r#"<link href="css/app.a1b2c3d4.css"><link href="css/app.a1b2c3d4.css"><script src="js/main.min.0f0f0f0f.js"></script>"#
        );
    }

    #[test]
    fn test_empty_manifest_is_identity() {
        let html = r#"<link href="css/app.css">"#;
        assert!(matches!(
            update_html_references(html, &Manifest::new()),
            Cow::Borrowed(_)
        ));
    }
}
