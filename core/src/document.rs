//! Per-side document state and line hashing.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::config::CompareOptions;
use crate::hashing::{fold_hash, HASH_SEED};
use crate::host::{HostEditor, ViewId};
use crate::myers::Hashed;
use crate::progress::CompareProgress;
use crate::report::EngineError;

/// A half-open `(offset, length)` window over an indexed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Section {
    pub off: usize,
    pub len: usize,
}

/// A hashed buffer line. Equality is by fingerprint only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line {
    pub hash: u64,
    /// 0-based index in the originating buffer.
    pub source_line: usize,
}

impl Hashed for Line {
    fn hash64(&self) -> u64 {
        self.hash
    }
}

/// One side of a compare: the view, the compared window, the add/remove mask
/// the side paints with, and the hashed line vector.
#[derive(Debug)]
pub(crate) struct DocSide {
    pub view: ViewId,
    pub section: Section,
    pub block_diff_mask: u32,
    pub lines: Vec<Line>,
    /// Buffer lines whose hash also occurs on the other side.
    pub non_unique: FxHashSet<usize>,
}

impl DocSide {
    pub fn new(view: ViewId, block_diff_mask: u32) -> DocSide {
        DocSide {
            view,
            section: Section::default(),
            block_diff_mask,
            lines: Vec::new(),
            non_unique: FxHashSet::default(),
        }
    }
}

const CANCEL_POLL_LINES: usize = 500;

/// Hashes the document's lines into `doc.lines`, honoring the ignore options
/// and clamping an overrunning section. Polls for cancellation every
/// [`CANCEL_POLL_LINES`] lines and abandons its output when signaled.
pub(crate) fn scan_lines<H: HostEditor>(
    host: &H,
    doc: &mut DocSide,
    options: &CompareOptions,
    progress: &dyn CompareProgress,
) -> Result<(), EngineError> {
    doc.lines.clear();

    if host.text_length(doc.view)? == 0 {
        return Ok(());
    }
    let line_count = host.line_count(doc.view)?;

    if doc.section.len == 0 || doc.section.off + doc.section.len > line_count {
        doc.section.len = line_count.saturating_sub(doc.section.off);
    }

    progress.set_max_count(doc.section.len / CANCEL_POLL_LINES + 1);
    doc.lines.reserve(doc.section.len);

    for line_num in 0..doc.section.len {
        if line_num % CANCEL_POLL_LINES == 0 && !progress.advance() {
            doc.lines.clear();
            return Err(EngineError::Cancelled);
        }

        let source_line = line_num + doc.section.off;
        let start = host.line_start(doc.view, source_line)?;
        let end = host.line_end(doc.view, source_line)?;

        let mut hash = HASH_SEED;
        if end > start {
            let mut text = host.text(doc.view, start, end)?;
            if options.ignore_case {
                host.to_lower_case(&mut text);
            }
            for &byte in &text {
                if options.ignore_spaces && (byte == b' ' || byte == b'\t') {
                    continue;
                }
                hash = fold_hash(hash, byte);
            }
        }

        if !options.ignore_empty_lines || hash != HASH_SEED {
            doc.lines.push(Line { hash, source_line });
        }
    }

    Ok(())
}
