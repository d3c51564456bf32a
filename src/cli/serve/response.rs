//! HTTP responses of the dev server.

use crate::embed::serve::reload_script_tag;
use crate::utils::mime::{self, types};
use anyhow::{Context, Result};
use std::{fs, path::Path};
use tiny_http::{Header, Method, Request, Response, StatusCode};

/// Respond with a file from the output tree.
pub fn respond_file(request: Request, path: &Path, ws_port: Option<u16>) -> Result<()> {
    let content_type = mime::from_path(path);
    if request.method() == &Method::Head {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let body = maybe_inject_reload(body, content_type, ws_port);
    send_body(request, 200, content_type, body)
}

/// Respond with `404.html` from the output tree, or a plain 404.
pub fn respond_not_found(request: Request, root: &Path, ws_port: Option<u16>) -> Result<()> {
    let custom = root.join("404.html");
    if request.method() == &Method::Head {
        let content_type = if custom.is_file() { types::HTML } else { types::PLAIN };
        return send_head(request, 404, content_type);
    }

    if let Ok(body) = fs::read(&custom) {
        let body = maybe_inject_reload(body, types::HTML, ws_port);
        return send_body(request, 404, types::HTML, body);
    }
    send_body(request, 404, types::PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 while shutting down.
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec())
}

/// Insert the live-reload client before `</body>` of HTML responses.
fn maybe_inject_reload(body: Vec<u8>, content_type: &str, ws_port: Option<u16>) -> Vec<u8> {
    match ws_port {
        Some(port) if mime::is_html(content_type) => inject_reload(body, port),
        _ => body,
    }
}

fn inject_reload(body: Vec<u8>, ws_port: u16) -> Vec<u8> {
    let html = match String::from_utf8(body) {
        Ok(html) => html,
        Err(e) => return e.into_bytes(),
    };
    let script = reload_script_tag(ws_port);
    let html = match html.rfind("</body>") {
        Some(pos) => format!("{}{script}{}", &html[..pos], &html[pos..]),
        None => html + &script,
    };
    html.into_bytes()
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = Response::empty(StatusCode(status)).with_header(content_type_header(content_type));
    request.respond(response)?;
    Ok(())
}

fn send_body(request: Request, status: u16, content_type: &'static str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(content_type_header(content_type))
        .with_header(no_cache_header());
    request.respond(response)?;
    Ok(())
}

fn content_type_header(value: &'static str) -> Header {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes()).unwrap()
}

fn no_cache_header() -> Header {
    Header::from_bytes(&b"Cache-Control"[..], &b"no-cache"[..]).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_before_body_close() {
        let html = b"<html><body><p>hi</p></body></html>".to_vec();
        let out = String::from_utf8(inject_reload(html, 35729)).unwrap();
        let script = out.find("<script>").unwrap();
        assert!(script > out.find("<p>hi</p>").unwrap());
        assert!(script < out.find("</body>").unwrap());
        assert!(out.contains("35729"));
    }

    #[test]
    fn test_inject_appends_without_body() {
        let out = String::from_utf8(inject_reload(b"<p>x</p>".to_vec(), 1)).unwrap();
        assert!(out.starts_with("<p>x</p><script>"));
    }

    #[test]
    fn test_non_html_untouched() {
        let css = b"a{}".to_vec();
        assert_eq!(maybe_inject_reload(css.clone(), types::CSS, Some(1)), css);
        let html = b"<body></body>".to_vec();
        assert_eq!(maybe_inject_reload(html.clone(), types::HTML, None), html);
    }
}
