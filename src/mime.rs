//! Thin adapter over `mailparse`
//!
//! Two collaborators live here: an RFC 2822 reader that only looks at the
//! header block, and the full MIME decoder with a pre-order traversal over
//! the decoded part tree.

use chrono::{DateTime, Utc};
use mailparse::{DispositionType, MailHeader, MailHeaderMap, MailParseError, ParsedMail};
use thiserror::Error;

/// Failures reported by the MIME adapter
#[derive(Error, Debug)]
pub enum MimeError {
    #[error("invalid header block: {0}")]
    Headers(#[source] MailParseError),

    #[error("message has no headers")]
    NoHeaders,

    #[error("malformed header field name: {0:?}")]
    MalformedHeaderName(String),

    #[error("header block is not followed by a blank line")]
    MissingHeaderTerminator,

    #[error("missing Date header")]
    MissingDate,

    #[error("unparsable Date header: {0}")]
    InvalidDate(String),

    #[error("MIME decoding failed: {0}")]
    Decode(#[source] MailParseError),
}

/// An RFC 2822 message whose header block has been read
#[derive(Debug)]
pub struct RawMessage<'a> {
    headers: Vec<MailHeader<'a>>,
}

impl RawMessage<'_> {
    /// First value of the named header, matched case-insensitively
    #[must_use]
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.get_first_value(name)
    }

    /// The Date header as UTC
    pub fn date(&self) -> Result<DateTime<Utc>, MimeError> {
        let value = self.header("Date").ok_or(MimeError::MissingDate)?;
        parse_date(value.trim()).ok_or(MimeError::InvalidDate(value))
    }
}

// Servers do not always get the weekday right, so it is not checked.
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let without_weekday = match value.split_once(',') {
        Some((weekday, rest)) if weekday.trim().chars().all(char::is_alphabetic) => rest.trim(),
        _ => value,
    };
    DateTime::parse_from_rfc2822(without_weekday)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Read the header block of an RFC 2822 message.
///
/// Every field name must be printable ASCII without colons, and the block
/// must end with a blank line.
pub fn read_message(raw: &[u8]) -> Result<RawMessage<'_>, MimeError> {
    let (headers, body_offset) = mailparse::parse_headers(raw).map_err(MimeError::Headers)?;
    if headers.is_empty() {
        return Err(MimeError::NoHeaders);
    }

    if let Some(bad) = headers.iter().map(MailHeader::get_key).find(|k| !is_field_name(k)) {
        return Err(MimeError::MalformedHeaderName(bad));
    }

    let header_block = raw.get(..body_offset).unwrap_or(raw);
    if !(header_block.ends_with(b"\n\n") || header_block.ends_with(b"\r\n\r\n")) {
        return Err(MimeError::MissingHeaderTerminator);
    }

    Ok(RawMessage { headers })
}

fn is_field_name(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_graphic() && b != b':')
}

/// Fully decode a message into its MIME part tree
pub fn decode(raw: &[u8]) -> Result<ParsedMail<'_>, MimeError> {
    mailparse::parse_mail(raw).map_err(MimeError::Decode)
}

/// `root` followed by every part beneath it, in pre-order
pub fn descendants<'m, 'a>(root: &'m ParsedMail<'a>) -> impl Iterator<Item = &'m ParsedMail<'a>> {
    let mut stack = vec![root];
    std::iter::from_fn(move || {
        let next = stack.pop()?;
        stack.extend(next.subparts.iter().rev());
        Some(next)
    })
}

/// Lower-cased MIME type of a part
#[must_use]
pub fn content_type(part: &ParsedMail<'_>) -> String {
    part.ctype.mimetype.to_lowercase()
}

/// File name from the disposition, then the content type, else empty
#[must_use]
pub fn file_name(part: &ParsedMail<'_>) -> String {
    let disposition = part.get_content_disposition();
    disposition
        .params
        .get("filename")
        .or_else(|| part.ctype.params.get("name"))
        .cloned()
        .unwrap_or_default()
}

/// Transfer-decoded content of a part
pub fn content(part: &ParsedMail<'_>) -> Result<Vec<u8>, MimeError> {
    part.get_body_raw().map_err(MimeError::Decode)
}

#[must_use]
pub fn is_container(part: &ParsedMail<'_>) -> bool {
    part.ctype.mimetype.to_lowercase().starts_with("multipart/")
}

#[must_use]
pub fn is_attachment(part: &ParsedMail<'_>) -> bool {
    part.get_content_disposition().disposition == DispositionType::Attachment
}

/// The outer-body view of a decoded message
#[derive(Debug)]
pub struct DecodedBody<'m, 'a> {
    /// First inline text/plain part, charset-decoded
    pub text: String,

    /// First inline text/html part, charset-decoded
    pub html: Option<String>,

    /// Every non-text, non-container part in traversal order
    pub other_parts: Vec<&'m ParsedMail<'a>>,

    /// Every part with an attachment disposition
    pub attachments: Vec<&'m ParsedMail<'a>>,
}

impl<'m, 'a> DecodedBody<'m, 'a> {
    pub fn from_mail(mail: &'m ParsedMail<'a>) -> Result<Self, MimeError> {
        let mut text: Option<String> = None;
        let mut html: Option<String> = None;
        let mut other_parts = Vec::new();
        let mut attachments = Vec::new();

        for part in descendants(mail).filter(|p| !is_container(p)) {
            let mimetype = content_type(part);
            let attachment = is_attachment(part);

            if attachment {
                attachments.push(part);
            }

            if !mimetype.starts_with("text/") {
                other_parts.push(part);
            } else if !attachment && mimetype == "text/plain" && text.is_none() {
                text = Some(part.get_body().map_err(MimeError::Decode)?);
            } else if !attachment && mimetype == "text/html" && html.is_none() {
                html = Some(part.get_body().map_err(MimeError::Decode)?);
            }
        }

        Ok(Self {
            text: text.unwrap_or_default(),
            html,
            other_parts,
            attachments,
        })
    }
}
