// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Journal Envelope Parser
//!
//! Extracts delivery metadata, leaf parts and content fingerprints from
//! journaled email: an envelope message written by a mail server that
//! carries the original message as an attachment and describes its
//! delivery in the envelope body.
//!
//! # Features
//!
//! - Sender, subject, message id and To/CC/BCC lists from the envelope body
//! - Recipient de-duplication across the Expanded and Forwarded dialects
//! - Flattening of nested multipart containers and forwarded messages
//! - SHA-256 fingerprints of the wrapped message and of every part
//! - Non-fatal problems returned as diagnostics next to the result
//!
//! # Example
//!
//! ```no_run
//! use journal_envelope::parse_envelope;
//!
//! let raw = std::fs::read("journal.eml").unwrap();
//! let message = parse_envelope(&raw).unwrap();
//!
//! println!("Sender: {:?}", message.metadata.sender);
//! println!("Bcc: {:?}", message.metadata.bcc);
//! for part in &message.parts {
//!     println!("{} {} {}", part.content_type, part.file_name, part.content_hash);
//! }
//! ```

mod convert;
mod envelope;
mod error;
mod hash;
mod metadata;
pub mod mime;
mod options;
mod parts;
mod types;

pub use convert::{LocalTextConverter, TextConverter, strip_html};
pub use envelope::{parse_envelope, parse_envelope_with};
pub use error::{EnvelopeError, Result, Stage};
pub use hash::{CONTENT_HASH_LEN, content_hash};
pub use metadata::{
    extract_metadata, is_recognized_key, normalize_recipients, recognized_keys,
    split_header_line, split_recipients,
};
pub use options::{CollectorMode, ParseOptions};
pub use parts::extract_parts;
pub use types::*;
