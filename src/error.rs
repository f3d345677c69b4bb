//! Error types for envelope parsing

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Step of the envelope parse in which a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    ReadOuter,
    ReadTimestamp,
    DecodeOuterBody,
    ExtractMetadata,
    LocateWrappedMessage,
    HashWrappedMessage,
    ExtractParts,
    Assemble,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReadOuter => "read outer message",
            Self::ReadTimestamp => "read timestamp",
            Self::DecodeOuterBody => "decode outer body",
            Self::ExtractMetadata => "extract metadata",
            Self::LocateWrappedMessage => "locate wrapped message",
            Self::HashWrappedMessage => "hash wrapped message",
            Self::ExtractParts => "extract parts",
            Self::Assemble => "assemble",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while parsing a journal envelope
#[derive(Error, Debug)]
pub enum EnvelopeError {
    /// The input is not an RFC 2822 message, or its Date header is unusable
    #[error("Malformed outer message ({stage}): {details}")]
    MalformedOuterMessage { stage: Stage, details: String },

    /// The outer message could not be MIME-decoded
    #[error("Failed to decode outer body: {0}")]
    OuterBodyDecodeFailure(String),

    /// The envelope does not carry exactly one wrapped message
    #[error("Expected 1 wrapped message in the envelope, but got {count}")]
    UnexpectedAttachmentCount { count: usize },

    /// The wrapped message, or a message nested inside it, could not be read
    #[error("Failed to decode wrapped message at depth {depth}: {details}")]
    WrappedMessageDecodeFailure { depth: usize, details: String },

    /// Parse options could not be loaded
    #[error("Invalid parse options: {0}")]
    InvalidOptions(String),

    /// A part could not be converted to text
    #[error("Cannot convert {content_type} to text: {details}")]
    Conversion {
        content_type: String,
        details: String,
    },
}

impl EnvelopeError {
    /// The parse step this error aborted, if it came from the envelope parser
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::MalformedOuterMessage { stage, .. } => Some(*stage),
            Self::OuterBodyDecodeFailure(_) => Some(Stage::DecodeOuterBody),
            Self::UnexpectedAttachmentCount { .. } => Some(Stage::LocateWrappedMessage),
            Self::WrappedMessageDecodeFailure { .. } => Some(Stage::ExtractParts),
            Self::InvalidOptions(_) | Self::Conversion { .. } => None,
        }
    }
}

/// Result type for envelope parsing operations
pub type Result<T> = std::result::Result<T, EnvelopeError>;
