//! Pane Diff: the diff engine behind a two-pane text comparison tool.
//!
//! Given two text buffers (or selected sub-ranges) the engine produces, in a
//! single pass:
//!
//! - a block-level diff classifying every line as matched, removed, added, or
//!   part of a detected move,
//! - a line mapping for every replace-style removed/added block pair,
//! - intra-line change spans at word or character granularity for each pair
//!   of corresponding lines, and
//! - an alignment table telling the surrounding UI which line numbers should
//!   render level.
//!
//! Buffers are consumed and results painted through the [`HostEditor`]
//! collaborator; the engine never mutates text. [`MemoryHost`] provides a
//! headless host for tests and batch use.
//!
//! # Quick start
//!
//! ```
//! use pane_diff::{compare_views, CompareOptions, CompareResult, MemoryHost, NoProgress};
//!
//! let mut host = MemoryHost::new("a\nb\nc\n", "a\nB\nc\n");
//! let (result, alignment) = compare_views(&mut host, &CompareOptions::default(), &NoProgress);
//!
//! assert_eq!(result, CompareResult::Mismatch);
//! assert!(!alignment.is_empty());
//! ```

mod blocks;
mod config;
mod document;
mod engine;
mod hashing;
mod host;
mod memory;
mod myers;
mod progress;
mod report;
mod tokens;

pub use config::{CompareOptions, ConfigError, LineRange, SelectionPair};
pub use document::Section;
pub use engine::compare_views;
pub use host::{
    HostEditor, HostError, ViewId, MARKER_MASK_ADDED, MARKER_MASK_ADDED_LOCAL,
    MARKER_MASK_CHANGED, MARKER_MASK_CHANGED_LOCAL, MARKER_MASK_MOVED_BEGIN,
    MARKER_MASK_MOVED_END, MARKER_MASK_MOVED_LINE, MARKER_MASK_MOVED_MID, MARKER_MASK_REMOVED,
    MARKER_MASK_REMOVED_LOCAL,
};
pub use memory::MemoryHost;
pub use myers::{diff_sequences, DiffSegment, Hashed, SegmentKind};
pub use progress::{CompareProgress, NoProgress};
pub use report::{AlignmentInfo, AlignmentPair, AlignmentViewData, CompareResult, EngineError};
