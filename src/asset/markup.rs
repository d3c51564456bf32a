//! HTML whitespace collapsing.
//!
//! Runs of whitespace in text collapse to one space; whitespace next to
//! block-level tags is dropped. Contents of `pre`, `textarea`, `script`
//! and `style` pass through untouched, as do tags and comments.

/// Elements whose content is emitted verbatim.
const RAW_TAGS: &[&str] = &["pre", "textarea", "script", "style"];

/// Elements around which whitespace never renders.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "blockquote", "body", "br", "dd", "details",
    "dialog", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "head", "header", "hr", "html", "li", "link", "main", "meta",
    "nav", "noscript", "ol", "option", "p", "script", "section", "select", "source", "style",
    "summary", "table", "tbody", "td", "template", "tfoot", "th", "thead", "title", "tr", "ul",
];

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Tag { raw: &'a str, name: String },
    /// Comments, doctypes and raw element bodies.
    Verbatim(&'a str),
    Text(&'a str),
}

impl Token<'_> {
    /// Whether whitespace adjacent to this token can be dropped.
    fn is_boundary(&self) -> bool {
        match self {
            Token::Tag { name, .. } => BLOCK_TAGS.contains(&name.as_str()),
            Token::Verbatim(raw) => raw.starts_with("<!"),
            Token::Text(_) => false,
        }
    }
}

/// Collapse insignificant whitespace in `html`.
pub fn collapse_whitespace(html: &str) -> String {
    let tokens = tokenize(html);
    let mut out = String::with_capacity(html.len());

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Tag { raw, .. } | Token::Verbatim(raw) => out.push_str(raw),
            Token::Text(text) => {
                let mut collapsed = collapse_runs(text);
                let at_start = i == 0 || tokens[i - 1].is_boundary();
                let at_end = tokens.get(i + 1).is_none_or(Token::is_boundary);
                if at_end {
                    collapsed.truncate(collapsed.trim_end().len());
                }
                let text = if at_start {
                    collapsed.trim_start()
                } else {
                    &collapsed
                };
                out.push_str(text);
            }
        }
    }
    out
}

/// Replace every whitespace run with a single space.
fn collapse_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn tokenize(html: &str) -> Vec<Token<'_>> {
    let bytes = html.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' || !starts_markup(bytes.get(i + 1).copied()) {
            i += 1;
            continue;
        }

        if text_start < i {
            tokens.push(Token::Text(&html[text_start..i]));
        }

        if html[i..].starts_with("<!--") {
            let end = html[i + 4..].find("-->").map_or(html.len(), |p| i + 4 + p + 3);
            tokens.push(Token::Verbatim(&html[i..end]));
            i = end;
        } else if bytes[i + 1] == b'!' || bytes[i + 1] == b'?' {
            let end = html[i..].find('>').map_or(html.len(), |p| i + p + 1);
            tokens.push(Token::Verbatim(&html[i..end]));
            i = end;
        } else {
            let end = tag_end(bytes, i);
            let raw = &html[i..end];
            let name = tag_name(raw);
            let opening = !raw.starts_with("</") && !raw.ends_with("/>");
            let is_raw = opening && RAW_TAGS.contains(&name.as_str());
            tokens.push(Token::Tag { raw, name: name.clone() });
            i = end;

            if is_raw {
                let close = html[i..]
                    .to_ascii_lowercase()
                    .find(&format!("</{name}"))
                    .map_or(html.len(), |p| i + p);
                if i < close {
                    tokens.push(Token::Verbatim(&html[i..close]));
                }
                i = close;
            }
        }
        text_start = i;
    }

    if text_start < html.len() {
        tokens.push(Token::Text(&html[text_start..]));
    }
    tokens
}

/// Whether the byte after `<` opens a tag, comment or declaration.
fn starts_markup(next: Option<u8>) -> bool {
    next.is_some_and(|b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'))
}

/// Index one past the `>` closing the tag at `start`, skipping quoted values.
fn tag_end(bytes: &[u8], start: usize) -> usize {
    let mut quote = None;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => return start + offset + 1,
            _ => {}
        }
    }
    bytes.len()
}

fn tag_name(raw: &str) -> String {
    raw.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}
