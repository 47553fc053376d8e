//! Marker painting and alignment-pair emission.

use crate::blocks::BlockDiff;
use crate::config::CompareOptions;
use crate::document::DocSide;
use crate::host::{
    HostEditor, HostError, ViewId, MARKER_MASK_ADDED, MARKER_MASK_ADDED_LOCAL,
    MARKER_MASK_CHANGED, MARKER_MASK_CHANGED_LOCAL, MARKER_MASK_MOVED_BEGIN,
    MARKER_MASK_MOVED_END, MARKER_MASK_MOVED_LINE, MARKER_MASK_MOVED_MID,
    MARKER_MASK_REMOVED_LOCAL,
};
use crate::myers::SegmentKind;
use crate::progress::CompareProgress;
use crate::report::{AlignmentInfo, AlignmentPair, AlignmentViewData, EngineError};

/// Maps an index into the hashed-line vector to a buffer line for alignment.
/// Indices at or past the end anchor just after the last hashed line.
fn to_alignment_line(doc: &DocSide, line: usize) -> usize {
    if doc.lines.is_empty() {
        return doc.section.off;
    }
    if line < doc.lines.len() {
        doc.lines[line].source_line
    } else {
        doc.lines[doc.lines.len() - 1].source_line + 1
    }
}

/// Marker for an unmoved removed/added line: the side's block mask, or its
/// "local" variant when the line has an equal twin somewhere on the other
/// side.
fn line_marker(doc: &DocSide, buffer_line: usize) -> u32 {
    if !doc.non_unique.contains(&buffer_line) {
        doc.block_diff_mask
    } else if doc.block_diff_mask == MARKER_MASK_ADDED {
        MARKER_MASK_ADDED_LOCAL
    } else {
        MARKER_MASK_REMOVED_LOCAL
    }
}

/// Paints markers for `sec_len` block lines starting at block-local
/// `sec_off`. Unmoved runs get the side's (possibly local) block mask over
/// every buffer line they span; moved runs get the moved-line glyphs.
fn mark_section<H: HostEditor>(
    host: &mut H,
    doc: &DocSide,
    block: &BlockDiff,
    sec_off: usize,
    sec_len: usize,
) -> Result<(), HostError> {
    let end_off = sec_off + sec_len;
    let mut i = sec_off;
    while i < end_off {
        let buffer_line = doc.lines[block.off() + i].source_line;
        let mut moved_len = block.moved_section(i);
        if moved_len > sec_len {
            moved_len = sec_len;
        }

        if moved_len == 0 {
            let mut run_end = i + 1;
            while run_end < end_off && block.moved_section(run_end) == 0 {
                run_end += 1;
            }
            let end_line = doc.lines[block.off() + run_end - 1].source_line + 1;
            for line in buffer_line..end_line {
                host.marker_add_set(doc.view, line, line_marker(doc, line))?;
            }
            i = run_end;
        } else if moved_len == 1 {
            host.marker_add_set(doc.view, buffer_line, MARKER_MASK_MOVED_LINE)?;
            i += 1;
        } else {
            let end_line = doc.lines[block.off() + i + moved_len - 1].source_line;
            host.marker_add_set(doc.view, buffer_line, MARKER_MASK_MOVED_BEGIN)?;
            for line in buffer_line + 1..end_line {
                host.marker_add_set(doc.view, line, MARKER_MASK_MOVED_MID)?;
            }
            host.marker_add_set(doc.view, end_line, MARKER_MASK_MOVED_END)?;
            i += moved_len;
        }
    }
    Ok(())
}

fn mark_changed_line<H: HostEditor>(
    host: &mut H,
    doc: &DocSide,
    block: &BlockDiff,
    changed_idx: usize,
) -> Result<(), HostError> {
    let changed = &block.changed_lines[changed_idx];
    let buffer_line = doc.lines[block.off() + changed.line].source_line;
    let line_pos = host.line_start(doc.view, buffer_line)?;

    for change in &changed.changes {
        host.mark_text_as_changed(doc.view, line_pos + change.off, change.len)?;
    }

    let mask = if doc.non_unique.contains(&buffer_line) {
        MARKER_MASK_CHANGED_LOCAL
    } else {
        MARKER_MASK_CHANGED
    };
    host.marker_add_set(doc.view, buffer_line, mask)
}

fn mark_line_diffs<H: HostEditor>(
    host: &mut H,
    doc1: &DocSide,
    doc2: &DocSide,
    block: &BlockDiff,
    partner: &BlockDiff,
    changed_idx: usize,
) -> Result<(), HostError> {
    mark_changed_line(host, doc1, block, changed_idx)?;
    mark_changed_line(host, doc2, partner, changed_idx)
}

/// Walks the block-diff list, painting markers and emitting one alignment
/// pair per row the UI should lock together.
pub(super) fn mark_all_diffs<H: HostEditor>(
    host: &mut H,
    doc1: &DocSide,
    doc2: &DocSide,
    blocks: &[BlockDiff],
    options: &CompareOptions,
    progress: &dyn CompareProgress,
) -> Result<AlignmentInfo, EngineError> {
    let mut alignment = AlignmentInfo::new();
    progress.set_max_count(blocks.len());

    // Cumulative hashed-line counters per side.
    let mut align_line1 = 0;
    let mut align_line2 = 0;

    let doc1_is_main = doc1.view == ViewId::Main;
    let push_pair =
        |alignment: &mut AlignmentInfo, line1: usize, mask1: u32, line2: usize, mask2: u32| {
            let side1 = AlignmentViewData {
                line: line1,
                diff_mask: mask1,
            };
            let side2 = AlignmentViewData {
                line: line2,
                diff_mask: mask2,
            };
            let (main, sub) = if doc1_is_main {
                (side1, side2)
            } else {
                (side2, side1)
            };
            alignment.push(AlignmentPair { main, sub });
        };

    let mut i = 0;
    while i < blocks.len() {
        let block = &blocks[i];
        match block.kind {
            SegmentKind::Match => {
                push_pair(
                    &mut alignment,
                    to_alignment_line(doc1, align_line1),
                    0,
                    to_alignment_line(doc2, align_line2),
                    0,
                );
                align_line1 += block.len;
                align_line2 += block.len;
            }
            SegmentKind::Insert => {
                mark_section(host, doc2, block, 0, block.len)?;
                push_pair(
                    &mut alignment,
                    to_alignment_line(doc1, align_line1),
                    0,
                    to_alignment_line(doc2, align_line2),
                    doc2.block_diff_mask,
                );
                align_line2 += block.len;
            }
            SegmentKind::Remove => {
                if let Some(partner_idx) = block.match_block {
                    let partner = &blocks[partner_idx];
                    let mut sec1_off = 0;
                    let mut sec2_off = 0;

                    for j in 0..block.changed_lines.len() {
                        let sec1_len = block.changed_lines[j].line - sec1_off;
                        let sec2_len = partner.changed_lines[j].line - sec2_off;

                        // Run of uncorresponded lines before the pair.
                        if sec1_len > 0 || sec2_len > 0 {
                            push_pair(
                                &mut alignment,
                                to_alignment_line(doc1, align_line1),
                                if sec1_len > 0 { doc1.block_diff_mask } else { 0 },
                                to_alignment_line(doc2, align_line2),
                                if sec2_len > 0 { doc2.block_diff_mask } else { 0 },
                            );
                            if sec1_len > 0 {
                                mark_section(host, doc1, block, sec1_off, sec1_len)?;
                                align_line1 += sec1_len;
                            }
                            if sec2_len > 0 {
                                mark_section(host, doc2, partner, sec2_off, sec2_len)?;
                                align_line2 += sec2_len;
                            }
                        }

                        push_pair(
                            &mut alignment,
                            to_alignment_line(doc1, align_line1),
                            MARKER_MASK_CHANGED,
                            to_alignment_line(doc2, align_line2),
                            MARKER_MASK_CHANGED,
                        );
                        mark_line_diffs(host, doc1, doc2, block, partner, j)?;

                        sec1_off = block.changed_lines[j].line + 1;
                        sec2_off = partner.changed_lines[j].line + 1;
                        align_line1 += 1;
                        align_line2 += 1;
                    }

                    // Trailing uncorresponded tail.
                    let sec1_len = block.len - sec1_off;
                    let sec2_len = partner.len - sec2_off;
                    if sec1_len > 0 || sec2_len > 0 {
                        push_pair(
                            &mut alignment,
                            to_alignment_line(doc1, align_line1),
                            if sec1_len > 0 { doc1.block_diff_mask } else { 0 },
                            to_alignment_line(doc2, align_line2),
                            if sec2_len > 0 { doc2.block_diff_mask } else { 0 },
                        );
                        if sec1_len > 0 {
                            mark_section(host, doc1, block, sec1_off, sec1_len)?;
                            align_line1 += sec1_len;
                        }
                        if sec2_len > 0 {
                            mark_section(host, doc2, partner, sec2_off, sec2_len)?;
                            align_line2 += sec2_len;
                        }
                    }

                    // The partner block was consumed alongside this one.
                    i += 1;
                } else {
                    mark_section(host, doc1, block, 0, block.len)?;
                    push_pair(
                        &mut alignment,
                        to_alignment_line(doc1, align_line1),
                        doc1.block_diff_mask,
                        to_alignment_line(doc2, align_line2),
                        0,
                    );
                    align_line1 += block.len;
                }
            }
        }

        if !progress.advance() {
            return Err(EngineError::Cancelled);
        }
        i += 1;
    }

    if let Some(selections) = &options.selections {
        // Anchor the end of each selection so rows after it stay level.
        push_pair(
            &mut alignment,
            to_alignment_line(doc1, align_line1),
            0,
            to_alignment_line(doc2, align_line2),
            0,
        );
        push_pair(
            &mut alignment,
            selections.for_view(doc1.view).last,
            0,
            selections.for_view(doc2.view).last,
            0,
        );
    }

    if !progress.next_phase() {
        return Err(EngineError::Cancelled);
    }

    Ok(alignment)
}
