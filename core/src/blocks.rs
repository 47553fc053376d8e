//! Line-level block diffs, enriched with move and changed-line data.

use crate::document::Section;
use crate::myers::{DiffSegment, SegmentKind};

/// Intra-line result for one corresponded line of a replace pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChangedLine {
    /// Line index local to its block.
    pub line: usize,
    /// Ordered, non-overlapping column ranges that differ from the partner.
    pub changes: Vec<Section>,
}

impl ChangedLine {
    pub fn new(line: usize) -> ChangedLine {
        ChangedLine {
            line,
            changes: Vec::new(),
        }
    }
}

/// One line-level diff block. `match_block` indexes the paired opposite-kind
/// block of a replace pair; the reference is symmetric by construction.
#[derive(Debug)]
pub(crate) struct BlockDiff {
    pub kind: SegmentKind,
    pub off_a: usize,
    pub off_b: usize,
    pub len: usize,
    pub match_block: Option<usize>,
    /// Block-local sections recognized as moved, in commit order.
    pub moves: Vec<Section>,
    pub changed_lines: Vec<ChangedLine>,
}

impl BlockDiff {
    pub fn from_segments(segments: Vec<DiffSegment>) -> Vec<BlockDiff> {
        segments
            .into_iter()
            .map(|seg| BlockDiff {
                kind: seg.kind,
                off_a: seg.off_a,
                off_b: seg.off_b,
                len: seg.len,
                match_block: None,
                moves: Vec::new(),
                changed_lines: Vec::new(),
            })
            .collect()
    }

    /// Offset of this block in its own side's line vector.
    pub fn off(&self) -> usize {
        match self.kind {
            SegmentKind::Match | SegmentKind::Remove => self.off_a,
            SegmentKind::Insert => self.off_b,
        }
    }

    /// Length of the move covering `line`, or 0 when the line is unmoved.
    pub fn moved_section(&self, line: usize) -> usize {
        for section in &self.moves {
            if line >= section.off && line < section.off + section.len {
                return section.len;
            }
        }
        0
    }

    /// When `line` lies inside a move, returns the first index after it.
    pub fn next_unmoved(&self, line: usize) -> Option<usize> {
        for section in &self.moves {
            if line >= section.off && line < section.off + section.len {
                return Some(section.off + section.len);
            }
        }
        None
    }
}
