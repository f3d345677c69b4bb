//! Part-to-text conversion
//!
//! [`TextConverter`] is the seam for document conversion services. The
//! crate ships [`LocalTextConverter`], which handles plain text and HTML
//! without leaving the process.

use crate::error::{EnvelopeError, Result};

/// Turns raw part content into plain text
pub trait TextConverter {
    fn convert(&self, content: &[u8], content_type: &str) -> Result<String>;
}

/// In-process converter for `text/plain` and `text/html`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTextConverter;

impl TextConverter for LocalTextConverter {
    fn convert(&self, content: &[u8], content_type: &str) -> Result<String> {
        let text = String::from_utf8_lossy(content);
        match content_type {
            "text/plain" => Ok(text.into_owned()),
            "text/html" => Ok(strip_html(&text)),
            other => Err(EnvelopeError::Conversion {
                content_type: other.to_string(),
                details: "no local conversion for this type".into(),
            }),
        }
    }
}

// Closing any of these ends a line of text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "tr", "table", "h1", "h2", "h3", "h4", "h5", "h6",
];

// `&amp;` goes last so an escaped entity is not decoded twice.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

/// Reduce an HTML document to its visible text.
///
/// Script and style contents are dropped, `<br>` and closed block elements
/// become line breaks, and blank lines are removed.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let mut text = String::new();
    let mut hidden_until: Option<&str> = None;
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        if hidden_until.is_none() {
            text.push_str(&rest[..open]);
        }
        let tag_and_rest = &rest[open + 1..];
        let Some(close) = tag_and_rest.find('>') else {
            rest = "";
            break;
        };

        let tag = tag_and_rest[..close].trim().to_ascii_lowercase();
        let (closing, tag) = tag
            .strip_prefix('/')
            .map_or((false, tag.as_str()), |t| (true, t));
        let name = tag
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default();

        match hidden_until {
            Some(hidden) if closing && name == hidden => hidden_until = None,
            Some(_) => {}
            None if !closing && name == "script" => hidden_until = Some("script"),
            None if !closing && name == "style" => hidden_until = Some("style"),
            None if name == "br" || (closing && BLOCK_TAGS.contains(&name)) => text.push('\n'),
            None => {}
        }

        rest = &tag_and_rest[close + 1..];
    }
    if hidden_until.is_none() {
        text.push_str(rest);
    }

    let text = ENTITIES
        .iter()
        .fold(text, |acc, &(entity, plain)| acc.replace(entity, plain));

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
