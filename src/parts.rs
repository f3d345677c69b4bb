//! Leaf part extraction from a decoded wrapped message
//!
//! The walk visits every node of the decoded tree in pre-order. Multipart
//! containers contribute nothing of their own. A message/rfc822 node holds a
//! complete re-wrapped message (usually a forward): it is read, decoded and
//! walked in its place, so its leaves appear where the wrapper stood.

use crate::error::{EnvelopeError, Result};
use crate::mime;
use crate::options::{CollectorMode, ParseOptions};
use crate::types::{Diagnostic, Part};
use crossbeam_channel::bounded;
use mailparse::ParsedMail;
use tracing::{trace, warn};

const RFC822: &str = "message/rfc822";

/// A leaf found by the walk, tagged with its traversal position
#[derive(Debug)]
struct Leaf {
    index: usize,
    file_name: String,
    content_type: String,
    content: Vec<u8>,
}

impl Leaf {
    fn into_part(self) -> Part {
        Part::new(self.file_name, self.content_type, self.content)
    }
}

/// Flatten the tree under `root` into its leaf parts, in traversal order.
///
/// A nested message that cannot be MIME-decoded is skipped and reported as a
/// diagnostic. A nested message whose header block cannot be read at all
/// fails the whole extraction.
pub fn extract_parts(
    root: &ParsedMail<'_>,
    options: &ParseOptions,
) -> Result<(Vec<Part>, Vec<Diagnostic>)> {
    match options.collector {
        CollectorMode::Sequential => extract_sequential(root, options),
        CollectorMode::Pipelined => extract_pipelined(root, options),
    }
}

fn extract_sequential(
    root: &ParsedMail<'_>,
    options: &ParseOptions,
) -> Result<(Vec<Part>, Vec<Diagnostic>)> {
    let mut parts = Vec::new();
    let mut walker = Walker::new(options.max_nesting_depth, |leaf: Leaf| {
        parts.push(leaf.into_part());
    });
    walker.walk(root, 0)?;
    let diagnostics = walker.finish();

    Ok((parts, diagnostics))
}

fn extract_pipelined(
    root: &ParsedMail<'_>,
    options: &ParseOptions,
) -> Result<(Vec<Part>, Vec<Diagnostic>)> {
    let (leaf_tx, leaf_rx) = bounded::<Leaf>(options.channel_capacity.max(1));

    std::thread::scope(|scope| {
        let collector = scope.spawn(move || {
            let mut indexed: Vec<(usize, Part)> = leaf_rx
                .iter()
                .map(|leaf| (leaf.index, leaf.into_part()))
                .collect();
            indexed.sort_unstable_by_key(|(index, _)| *index);
            indexed.into_iter().map(|(_, part)| part).collect::<Vec<_>>()
        });

        let mut walker = Walker::new(options.max_nesting_depth, move |leaf: Leaf| {
            // The collector only stops once every sender is gone.
            if leaf_tx.send(leaf).is_err() {
                warn!("Part collector hung up before the walk finished");
            }
        });
        let walked = walker.walk(root, 0);
        // Dropping the walker closes the queue.
        let diagnostics = walker.finish();

        let parts = match collector.join() {
            Ok(parts) => parts,
            Err(panic) => std::panic::resume_unwind(panic),
        };
        walked.map(|()| (parts, diagnostics))
    })
}

struct Walker<F> {
    max_depth: usize,
    emit: F,
    next_index: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<F: FnMut(Leaf)> Walker<F> {
    const fn new(max_depth: usize, emit: F) -> Self {
        Self {
            max_depth,
            emit,
            next_index: 0,
            diagnostics: Vec::new(),
        }
    }

    fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn walk(&mut self, root: &ParsedMail<'_>, depth: usize) -> Result<()> {
        for node in mime::descendants(root) {
            let content_type = mime::content_type(node);
            if content_type == RFC822 {
                self.descend(node, depth + 1)?;
            } else if !mime::is_container(node) {
                self.leaf(node, content_type);
            }
        }
        Ok(())
    }

    fn descend(&mut self, node: &ParsedMail<'_>, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            self.observe(Diagnostic::NestingTooDeep { depth });
            return Ok(());
        }

        let raw = match mime::content(node) {
            Ok(raw) => raw,
            Err(e) => {
                self.observe(Diagnostic::NestedMessageUndecodable {
                    depth,
                    reason: e.to_string(),
                });
                return Ok(());
            }
        };

        mime::read_message(&raw).map_err(|e| EnvelopeError::WrappedMessageDecodeFailure {
            depth,
            details: e.to_string(),
        })?;

        match mime::decode(&raw) {
            Ok(nested) => self.walk(&nested, depth),
            Err(e) => {
                self.observe(Diagnostic::NestedMessageUndecodable {
                    depth,
                    reason: e.to_string(),
                });
                Ok(())
            }
        }
    }

    fn leaf(&mut self, node: &ParsedMail<'_>, content_type: String) {
        let content = match mime::content(node) {
            Ok(content) => content,
            Err(e) => {
                self.observe(Diagnostic::PartContentUndecodable {
                    content_type,
                    reason: e.to_string(),
                });
                return;
            }
        };

        let leaf = Leaf {
            index: self.next_index,
            file_name: mime::file_name(node),
            content_type,
            content,
        };
        trace!(
            "Extracted part #{} ({}, {} bytes)",
            leaf.index,
            leaf.content_type,
            leaf.content.len()
        );
        self.next_index += 1;
        (self.emit)(leaf);
    }

    fn observe(&mut self, diagnostic: Diagnostic) {
        warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}
