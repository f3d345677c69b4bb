//! Parse options
//!
//! Options can be built in code or loaded from TOML:
//!
//! ```toml
//! max_nesting_depth = 8
//! collector = "pipelined"
//! channel_capacity = 4
//! extract_body = false
//! ```

use crate::error::{EnvelopeError, Result};
use serde::{Deserialize, Serialize};

/// How extracted leaves reach the result list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectorMode {
    /// Hash each leaf as the traversal reaches it
    #[default]
    Sequential,
    /// Hand leaves to a collector thread over a bounded queue
    Pipelined,
}

/// Tuning for [`parse_envelope_with`](crate::parse_envelope_with)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Deepest message/rfc822 re-wrap the part extractor descends into
    pub max_nesting_depth: usize,

    pub collector: CollectorMode,

    /// Bound of the pipelined hand-off queue
    pub channel_capacity: usize,

    /// Fill `Message::body` from the wrapped message's text parts
    pub extract_body: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: 16,
            collector: CollectorMode::Sequential,
            channel_capacity: 8,
            extract_body: true,
        }
    }
}

impl ParseOptions {
    /// Load options from a TOML document, defaulting any missing key
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let options: Self =
            toml::from_str(s).map_err(|e| EnvelopeError::InvalidOptions(e.to_string()))?;
        if options.channel_capacity == 0 {
            return Err(EnvelopeError::InvalidOptions(
                "channel_capacity must be at least 1".into(),
            ));
        }
        Ok(options)
    }

    #[must_use]
    pub const fn pipelined(mut self, channel_capacity: usize) -> Self {
        self.collector = CollectorMode::Pipelined;
        self.channel_capacity = channel_capacity;
        self
    }
}
