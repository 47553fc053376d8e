//! Host-editor collaborator.
//!
//! The engine never touches buffers directly: all text access and all result
//! painting go through [`HostEditor`]. An editor plugin implements this
//! against its component; headless consumers use
//! [`MemoryHost`](crate::MemoryHost).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies one of the two compared panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewId {
    Main,
    Sub,
}

impl ViewId {
    pub fn other(self) -> ViewId {
        match self {
            ViewId::Main => ViewId::Sub,
            ViewId::Sub => ViewId::Main,
        }
    }

    pub fn index(self) -> usize {
        match self {
            ViewId::Main => 0,
            ViewId::Sub => 1,
        }
    }
}

pub const MARKER_MASK_ADDED: u32 = 1 << 0;
pub const MARKER_MASK_REMOVED: u32 = 1 << 1;
pub const MARKER_MASK_ADDED_LOCAL: u32 = 1 << 2;
pub const MARKER_MASK_REMOVED_LOCAL: u32 = 1 << 3;
pub const MARKER_MASK_MOVED_LINE: u32 = 1 << 4;
pub const MARKER_MASK_MOVED_BEGIN: u32 = 1 << 5;
pub const MARKER_MASK_MOVED_MID: u32 = 1 << 6;
pub const MARKER_MASK_MOVED_END: u32 = 1 << 7;
pub const MARKER_MASK_CHANGED: u32 = 1 << 8;
pub const MARKER_MASK_CHANGED_LOCAL: u32 = 1 << 9;

/// Failure reported by a host call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> HostError {
        HostError(message.into())
    }
}

/// Read and paint access to the two compared buffers.
///
/// Byte offsets are absolute within a view's buffer; line indices are
/// 0-based. `line_start`/`line_end` delimit a line excluding its terminator.
pub trait HostEditor {
    /// Total byte length of the buffer.
    fn text_length(&self, view: ViewId) -> Result<usize, HostError>;

    fn line_count(&self, view: ViewId) -> Result<usize, HostError>;

    fn line_start(&self, view: ViewId, line: usize) -> Result<usize, HostError>;

    fn line_end(&self, view: ViewId, line: usize) -> Result<usize, HostError>;

    /// Raw byte slice of `[start, end)`.
    fn text(&self, view: ViewId, start: usize, end: usize) -> Result<Vec<u8>, HostError>;

    /// Adds the marker mask to a line.
    fn marker_add_set(&mut self, view: ViewId, line: usize, mask: u32) -> Result<(), HostError>;

    /// Highlights a changed character span.
    fn mark_text_as_changed(
        &mut self,
        view: ViewId,
        offset: usize,
        len: usize,
    ) -> Result<(), HostError>;

    /// Case folding. Hosts with locale-aware folding override this.
    fn to_lower_case(&self, text: &mut [u8]) {
        text.make_ascii_lowercase();
    }

    /// Best-effort user notification; the engine uses it to surface failures.
    fn show_message(&mut self, _text: &str) {}
}
