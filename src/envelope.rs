//! Journal envelope parser
//!
//! A journal envelope is itself an email. Its text body lists delivery
//! facts known only to the journaling server (such as BCC recipients), and
//! the original message travels as its single non-text attachment.

use crate::convert::{LocalTextConverter, TextConverter, strip_html};
use crate::error::{EnvelopeError, Result, Stage};
use crate::hash::content_hash;
use crate::metadata::extract_metadata;
use crate::mime::{self, DecodedBody, MimeError};
use crate::options::ParseOptions;
use crate::parts::extract_parts;
use crate::types::{Diagnostic, Message, Part};
use std::borrow::Cow;
use tracing::debug;

/// Parse raw journal envelope bytes with default options
pub fn parse_envelope(raw: &[u8]) -> Result<Message> {
    parse_envelope_with(raw, &ParseOptions::default())
}

/// Parse raw journal envelope bytes into a structured [`Message`].
///
/// Fails without a partial result if the envelope cannot be read, has no
/// usable Date header, cannot be decoded, does not hold exactly one wrapped
/// message, or the wrapped message cannot be decoded.
pub fn parse_envelope_with(raw: &[u8], options: &ParseOptions) -> Result<Message> {
    let outer = mime::read_message(raw).map_err(|e| malformed(Stage::ReadOuter, &e))?;
    let journal_timestamp = outer
        .date()
        .map_err(|e| malformed(Stage::ReadTimestamp, &e))?;

    let decoded = mime::decode(raw).map_err(|e| outer_decode_failure(&e))?;
    let body = DecodedBody::from_mail(&decoded).map_err(|e| outer_decode_failure(&e))?;

    let (mut metadata, mut diagnostics) = extract_metadata(&report_text(&body));
    metadata.journal_timestamp = journal_timestamp;

    let wrapped = match body.other_parts.as_slice() {
        [wrapped] => *wrapped,
        other => {
            return Err(EnvelopeError::UnexpectedAttachmentCount { count: other.len() });
        }
    };

    let wrapped_raw = mime::content(wrapped).map_err(|e| wrapped_decode_failure(&e))?;
    let message_hash = content_hash(&wrapped_raw);

    mime::read_message(&wrapped_raw).map_err(|e| wrapped_decode_failure(&e))?;
    let wrapped_mail = mime::decode(&wrapped_raw).map_err(|e| wrapped_decode_failure(&e))?;
    let (parts, part_diagnostics) = extract_parts(&wrapped_mail, options)?;
    diagnostics.extend(part_diagnostics);

    let body = if options.extract_body {
        readable_body(&parts, &mut diagnostics)
    } else {
        None
    };

    debug!(
        "Parsed journal envelope {} with {} parts",
        metadata.message_id.as_deref().unwrap_or("(no message id)"),
        parts.len()
    );

    Ok(Message {
        metadata,
        message_hash,
        body,
        parts,
        diagnostics,
    })
}

/// The envelope's delivery report, taken from its HTML body when it has no plain text
fn report_text<'b>(body: &'b DecodedBody<'_, '_>) -> Cow<'b, str> {
    match body.html.as_deref() {
        Some(html) if body.text.trim().is_empty() => Cow::Owned(strip_html(html)),
        _ => Cow::Borrowed(&body.text),
    }
}

/// Text of the first plain-text part, else the first HTML part
fn readable_body(parts: &[Part], diagnostics: &mut Vec<Diagnostic>) -> Option<String> {
    let source = parts
        .iter()
        .find(|p| p.content_type == "text/plain")
        .or_else(|| parts.iter().find(|p| p.content_type == "text/html"))?;

    match LocalTextConverter.convert(&source.content, &source.content_type) {
        Ok(text) => Some(text),
        Err(e) => {
            diagnostics.push(Diagnostic::BodyConversionFailed {
                reason: e.to_string(),
            });
            None
        }
    }
}

fn malformed(stage: Stage, err: &MimeError) -> EnvelopeError {
    EnvelopeError::MalformedOuterMessage {
        stage,
        details: err.to_string(),
    }
}

fn outer_decode_failure(err: &MimeError) -> EnvelopeError {
    EnvelopeError::OuterBodyDecodeFailure(err.to_string())
}

fn wrapped_decode_failure(err: &MimeError) -> EnvelopeError {
    EnvelopeError::WrappedMessageDecodeFailure {
        depth: 0,
        details: err.to_string(),
    }
}
