//! Envelope body metadata extraction
//!
//! A journal envelope's text body lists delivery facts as `Key: value`
//! lines. Recipient lines may carry several spellings of one recipient,
//! annotated by the journaling server as either distribution-list
//! expansion (`Expanded:`) or forwarding (`Forwarded:`).

use crate::types::{Diagnostic, Metadata};
use regex::Regex;
use tracing::warn;

const HEADER_SEPARATOR: &str = ": ";

const FORWARDED_SEPARATOR: &str = ", Forwarded: ";

// Older servers write " Expanded: ", newer ones ", Expanded: ".
static EXPANDED_SEPARATOR: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r",? Expanded: ").unwrap());

type FieldSetter = fn(&mut Metadata, &str);

/// Recognized envelope keys, matched exactly and case-sensitively
const HEADER_TABLE: &[(&str, FieldSetter)] = &[
    ("Sender", set_sender),
    ("On-Behalf-Of", set_on_behalf_of),
    ("Subject", set_subject),
    ("Message-Id", set_message_id),
    ("Recipient", add_to),
    ("To", add_to),
    ("Cc", add_cc),
    ("Bcc", add_bcc),
];

/// Extract envelope metadata from the envelope's text body.
///
/// Lines that are not `Key: value` pairs are skipped. Keys outside the
/// recognized set are reported as [`Diagnostic::UnhandledMetadataHeader`]
/// and otherwise ignored. The journal timestamp is left at its default;
/// it comes from the envelope headers, not the body.
#[must_use]
pub fn extract_metadata(body: &str) -> (Metadata, Vec<Diagnostic>) {
    let mut metadata = Metadata::default();
    let mut diagnostics = Vec::new();

    for line in body.split(['\r', '\n']) {
        let Some((key, value)) = split_header_line(line) else {
            continue;
        };

        match lookup_setter(key) {
            Some(setter) => setter(&mut metadata, value),
            None => {
                warn!("Unhandled envelope header in journal envelope: {key}");
                diagnostics.push(Diagnostic::UnhandledMetadataHeader {
                    key: key.to_string(),
                });
            }
        }
    }

    (metadata, diagnostics)
}

/// Split a line at its first `": "` into an untrimmed key and value.
///
/// Returns `None` for lines without the separator.
#[must_use]
pub fn split_header_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(HEADER_SEPARATOR)
}

/// Whether `key` is routed to a metadata field
#[must_use]
pub fn is_recognized_key(key: &str) -> bool {
    lookup_setter(key).is_some()
}

/// All keys routed to a metadata field
pub fn recognized_keys() -> impl Iterator<Item = &'static str> {
    HEADER_TABLE.iter().map(|(key, _)| *key)
}

fn lookup_setter(key: &str) -> Option<FieldSetter> {
    HEADER_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, setter)| *setter)
}

/// Split a recipient value into its alternative spellings.
///
/// The Forwarded dialect wins when its separator is present; otherwise the
/// value is split on either spelling of the Expanded separator.
#[must_use]
pub fn split_recipients(value: &str) -> Vec<&str> {
    if value.contains(FORWARDED_SEPARATOR) {
        value.split(FORWARDED_SEPARATOR).collect()
    } else {
        EXPANDED_SEPARATOR.split(value).collect()
    }
}

/// Append lower-cased candidates to `existing`, skipping any already present.
///
/// Candidates are trimmed first and blank ones are dropped. First-seen order
/// is kept.
pub fn normalize_recipients<I, S>(mut existing: Vec<String>, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for candidate in candidates {
        let candidate = candidate.as_ref().trim().to_lowercase();
        if candidate.is_empty() || existing.contains(&candidate) {
            continue;
        }
        existing.push(candidate);
    }
    existing
}

fn merge_recipients(list: &mut Vec<String>, value: &str) {
    *list = normalize_recipients(std::mem::take(list), split_recipients(value));
}

fn set_sender(metadata: &mut Metadata, value: &str) {
    metadata.sender = Some(value.to_lowercase());
}

fn set_on_behalf_of(metadata: &mut Metadata, value: &str) {
    metadata.on_behalf_of = Some(value.to_string());
}

fn set_subject(metadata: &mut Metadata, value: &str) {
    metadata.subject = Some(value.to_string());
}

fn set_message_id(metadata: &mut Metadata, value: &str) {
    let value = value.strip_prefix('<').unwrap_or(value);
    let value = value.strip_suffix('>').unwrap_or(value);
    metadata.message_id = Some(value.to_string());
}

fn add_to(metadata: &mut Metadata, value: &str) {
    merge_recipients(&mut metadata.to, value);
}

fn add_cc(metadata: &mut Metadata, value: &str) {
    merge_recipients(&mut metadata.cc, value);
}

fn add_bcc(metadata: &mut Metadata, value: &str) {
    merge_recipients(&mut metadata.bcc, value);
}
