//! Core types for parsed journal envelopes

use crate::convert::TextConverter;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery facts stated by the journal envelope body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Envelope sender, lower-cased
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,

    /// Mailbox the sender acted for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_behalf_of: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Message-Id without its angle brackets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    /// Primary recipients, lower-cased and unique, in first-seen order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,

    /// CC recipients, lower-cased and unique, in first-seen order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,

    /// BCC recipients, lower-cased and unique, in first-seen order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,

    /// Date of the journal envelope itself
    pub journal_timestamp: DateTime<Utc>,
}

impl Metadata {
    /// Every recipient across To, CC and BCC
    pub fn all_recipients(&self) -> impl Iterator<Item = &str> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
    }
}

/// One leaf content unit of the wrapped message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// File name from the part headers, empty when none was given
    pub file_name: String,

    /// Lower-cased MIME type
    pub content_type: String,

    /// Transfer-decoded content
    #[serde(skip)]
    pub content: Vec<u8>,

    /// Byte length of `content`
    pub size: usize,

    /// Hex SHA-256 of `content`
    pub content_hash: String,
}

impl Part {
    /// Build a part, fingerprinting its content
    #[must_use]
    pub fn new(file_name: String, content_type: String, content: Vec<u8>) -> Self {
        Self {
            content_hash: crate::hash::content_hash(&content),
            size: content.len(),
            file_name,
            content_type,
            content,
        }
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        self.content_type.starts_with("text/")
    }
}

/// A fully parsed journal envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(flatten)]
    pub metadata: Metadata,

    /// Hex SHA-256 of the wrapped message as attached
    pub message_hash: String,

    /// Readable text of the wrapped message, if any part could supply it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Leaf parts in traversal order
    pub parts: Vec<Part>,

    /// Non-fatal observations made while parsing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl Message {
    /// Run a converter over every part, keeping each outcome next to the part index
    pub fn convert_parts(&self, converter: &dyn TextConverter) -> Vec<(usize, Result<String>)> {
        self.parts
            .iter()
            .enumerate()
            .map(|(idx, part)| (idx, converter.convert(&part.content, &part.content_type)))
            .collect()
    }

    /// Look up a part by its content hash
    #[must_use]
    pub fn find_part(&self, content_hash: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.content_hash == content_hash)
    }
}

/// Something worth reporting that did not stop the parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An envelope body line had a key the extractor does not route
    UnhandledMetadataHeader { key: String },

    /// A nested message/rfc822 part was skipped because it could not be decoded
    NestedMessageUndecodable { depth: usize, reason: String },

    /// A leaf was skipped because its transfer encoding could not be decoded
    PartContentUndecodable {
        content_type: String,
        reason: String,
    },

    /// A nested message sat deeper than the configured limit
    NestingTooDeep { depth: usize },

    /// The wrapped message body could not be turned into text
    BodyConversionFailed { reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnhandledMetadataHeader { key } => {
                write!(f, "unhandled envelope header: {key}")
            }
            Self::NestedMessageUndecodable { depth, reason } => {
                write!(f, "skipped nested message at depth {depth}: {reason}")
            }
            Self::PartContentUndecodable {
                content_type,
                reason,
            } => write!(f, "skipped {content_type} part: {reason}"),
            Self::NestingTooDeep { depth } => {
                write!(f, "nested message at depth {depth} exceeds the limit")
            }
            Self::BodyConversionFailed { reason } => {
                write!(f, "body conversion failed: {reason}")
            }
        }
    }
}
