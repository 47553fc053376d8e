//! Move detection over removed/added block pairs.
//!
//! A region counts as moved only when its best match and the reverse best
//! match from that candidate point at each other. Candidates with two
//! equally long best runs are discarded for the iteration; ambiguous moves
//! never commit. The sweep repeats until a full pass commits nothing.

use crate::blocks::BlockDiff;
use crate::document::{DocSide, Line, Section};
use crate::myers::SegmentKind;
use crate::progress::CompareProgress;
use crate::report::EngineError;

#[derive(Debug, Clone, Copy)]
struct MatchInfo {
    lookup_off: usize,
    match_idx: Option<usize>,
    match_off: usize,
    match_len: usize,
}

impl MatchInfo {
    fn none() -> MatchInfo {
        MatchInfo {
            lookup_off: 0,
            match_idx: None,
            match_off: 0,
            match_len: 0,
        }
    }
}

fn side_lines<'a>(
    doc1: &'a DocSide,
    doc2: &'a DocSide,
    kind: SegmentKind,
) -> Option<(&'a [Line], &'a [Line], SegmentKind)> {
    match kind {
        SegmentKind::Remove => Some((&doc1.lines, &doc2.lines, SegmentKind::Insert)),
        SegmentKind::Insert => Some((&doc2.lines, &doc1.lines, SegmentKind::Remove)),
        SegmentKind::Match => None,
    }
}

/// Scans every opposite-kind block for the longest uncovered run equal to the
/// run around `lookup_off`. Extension stops at covered lines on either side;
/// a tie on run length drops the candidate.
fn find_best_match(
    doc1: &DocSide,
    doc2: &DocSide,
    blocks: &[BlockDiff],
    lookup_idx: usize,
    lookup_off: usize,
) -> MatchInfo {
    let lookup = &blocks[lookup_idx];
    let Some((lookup_lines, match_lines, match_kind)) = side_lines(doc1, doc2, lookup.kind) else {
        return MatchInfo::none();
    };
    let lookup_hash = lookup_lines[lookup.off() + lookup_off].hash;

    let mut best = MatchInfo::none();
    let mut min_match_len = 1;

    for (idx, match_diff) in blocks.iter().enumerate() {
        if match_diff.kind != match_kind || match_diff.len < min_match_len {
            continue;
        }

        let mut match_last_unmoved = 0;
        let mut match_off = 0;
        while match_off < match_diff.len {
            if match_lines[match_diff.off() + match_off].hash != lookup_hash {
                match_off += 1;
                continue;
            }
            if let Some(next) = match_diff.next_unmoved(match_off) {
                match_last_unmoved = next;
                match_off = next;
                continue;
            }

            // Extend backward over equal, uncovered lines.
            let mut lookup_start = lookup_off;
            let mut match_start = match_off;
            while lookup_start > 0
                && match_start > match_last_unmoved
                && lookup_lines[lookup.off() + lookup_start - 1].hash
                    == match_lines[match_diff.off() + match_start - 1].hash
                && lookup.moved_section(lookup_start - 1) == 0
            {
                lookup_start -= 1;
                match_start -= 1;
            }

            // Extend forward.
            let mut lookup_end = lookup_off + 1;
            let mut match_end = match_off + 1;
            while lookup_end < lookup.len
                && match_end < match_diff.len
                && lookup_lines[lookup.off() + lookup_end].hash
                    == match_lines[match_diff.off() + match_end].hash
                && lookup.moved_section(lookup_end) == 0
                && match_diff.moved_section(match_end) == 0
            {
                lookup_end += 1;
                match_end += 1;
            }

            let match_len = lookup_end - lookup_start;
            if best.match_len < match_len {
                best = MatchInfo {
                    lookup_off: lookup_start,
                    match_idx: Some(idx),
                    match_off: match_start,
                    match_len,
                };
                min_match_len = match_len;
            } else if best.match_len == match_len {
                best.match_idx = None;
            }

            match_off += 1;
        }
    }

    best
}

/// Confirms a candidate by searching back from the matched side. A reverse
/// best match into the original block commits the move on both blocks; a
/// reverse match elsewhere hands the resolution over to that pair instead.
fn resolve_match(
    doc1: &DocSide,
    doc2: &DocSide,
    blocks: &mut [BlockDiff],
    lookup_idx: usize,
    lookup_off: usize,
    info: &mut MatchInfo,
) -> bool {
    let Some(match_idx) = info.match_idx else {
        return false;
    };

    let match_off = info.match_off + (lookup_off - info.lookup_off);
    let mut reverse = find_best_match(doc1, doc2, blocks, match_idx, match_off);

    if reverse.match_idx == Some(lookup_idx) {
        blocks[lookup_idx].moves.push(Section {
            off: info.lookup_off,
            len: info.match_len,
        });
        blocks[match_idx].moves.push(Section {
            off: info.match_off,
            len: info.match_len,
        });
        true
    } else if reverse.match_idx.is_some() {
        let committed = resolve_match(doc1, doc2, blocks, match_idx, match_off, &mut reverse);
        info.match_len = 0;
        committed
    } else {
        false
    }
}

/// Sweeps all removed blocks, committing mutually-best matches as moves,
/// until a sweep produces nothing new. Every committing sweep covers at
/// least one previously uncovered line, which bounds the iteration count by
/// the total line count; exceeding the bound is a broken invariant.
pub(super) fn find_moves(
    doc1: &DocSide,
    doc2: &DocSide,
    blocks: &mut [BlockDiff],
    progress: &dyn CompareProgress,
) -> Result<(), EngineError> {
    let max_sweeps = doc1.lines.len() + doc2.lines.len() + 1;
    let mut sweeps = 0;

    let mut repeat = true;
    while repeat {
        repeat = false;
        sweeps += 1;
        if sweeps > max_sweeps {
            return Err(EngineError::Logic("move detection did not converge"));
        }

        for lookup_idx in 0..blocks.len() {
            if blocks[lookup_idx].kind != SegmentKind::Remove {
                continue;
            }
            if !progress.advance() {
                return Err(EngineError::Cancelled);
            }

            let mut lookup_off = 0;
            while lookup_off < blocks[lookup_idx].len {
                if let Some(next) = blocks[lookup_idx].next_unmoved(lookup_off) {
                    lookup_off = next;
                    continue;
                }

                let mut info = find_best_match(doc1, doc2, blocks, lookup_idx, lookup_off);
                if resolve_match(doc1, doc2, blocks, lookup_idx, lookup_off, &mut info) {
                    repeat = true;
                    if info.match_len > 0 {
                        lookup_off = info.lookup_off + info.match_len;
                    }
                    // A zero-length result means the commit landed on another
                    // pair; re-examine the same line against the new coverage.
                    continue;
                }

                lookup_off += 1;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MARKER_MASK_ADDED, MARKER_MASK_REMOVED, ViewId};
    use crate::progress::NoProgress;

    fn doc(view: ViewId, mask: u32, hashes: &[u64]) -> DocSide {
        let mut doc = DocSide::new(view, mask);
        doc.lines = hashes
            .iter()
            .enumerate()
            .map(|(i, &hash)| Line {
                hash,
                source_line: i,
            })
            .collect();
        doc
    }

    fn block(kind: SegmentKind, off: usize, len: usize) -> BlockDiff {
        let mut blocks = BlockDiff::from_segments(vec![crate::myers::DiffSegment {
            kind,
            off_a: off,
            off_b: off,
            len,
        }]);
        blocks.pop().unwrap()
    }

    #[test]
    fn mutual_best_match_commits_on_both_blocks() {
        // doc1: [x]; doc2: [y, x] — x removed from side 1 reappears in the
        // inserted block.
        let doc1 = doc(ViewId::Main, MARKER_MASK_REMOVED, &[10]);
        let doc2 = doc(ViewId::Sub, MARKER_MASK_ADDED, &[20, 10]);
        let mut blocks = vec![
            block(SegmentKind::Remove, 0, 1),
            block(SegmentKind::Insert, 0, 2),
        ];

        find_moves(&doc1, &doc2, &mut blocks, &NoProgress).unwrap();

        assert_eq!(blocks[0].moves, vec![Section { off: 0, len: 1 }]);
        assert_eq!(blocks[1].moves, vec![Section { off: 1, len: 1 }]);
    }

    #[test]
    fn longest_run_wins_over_shorter_one() {
        // Removed block [a, b, c]; one inserted block holds [a], another
        // [a, b, c]. The three-line run must win.
        let doc1 = doc(ViewId::Main, MARKER_MASK_REMOVED, &[1, 2, 3]);
        let doc2 = doc(ViewId::Sub, MARKER_MASK_ADDED, &[1, 9, 1, 2, 3]);
        let mut blocks = vec![
            block(SegmentKind::Remove, 0, 3),
            block(SegmentKind::Insert, 0, 2),
            block(SegmentKind::Insert, 2, 3),
        ];

        find_moves(&doc1, &doc2, &mut blocks, &NoProgress).unwrap();

        assert_eq!(blocks[0].moves, vec![Section { off: 0, len: 3 }]);
        assert!(blocks[1].moves.is_empty());
        assert_eq!(blocks[2].moves, vec![Section { off: 0, len: 3 }]);
    }

    #[test]
    fn equal_length_candidates_are_dropped() {
        // The removed line matches two single-line runs of equal length, so
        // no move may commit.
        let doc1 = doc(ViewId::Main, MARKER_MASK_REMOVED, &[5]);
        let doc2 = doc(ViewId::Sub, MARKER_MASK_ADDED, &[5, 9, 5]);
        let mut blocks = vec![
            block(SegmentKind::Remove, 0, 1),
            block(SegmentKind::Insert, 0, 3),
        ];

        find_moves(&doc1, &doc2, &mut blocks, &NoProgress).unwrap();

        assert!(blocks[0].moves.is_empty());
        assert!(blocks[1].moves.is_empty());
    }

    #[test]
    fn committed_moves_have_equal_lengths_and_stay_in_bounds() {
        let doc1 = doc(ViewId::Main, MARKER_MASK_REMOVED, &[1, 2, 3, 4]);
        let doc2 = doc(ViewId::Sub, MARKER_MASK_ADDED, &[3, 4, 1, 2]);
        let mut blocks = vec![
            block(SegmentKind::Remove, 0, 4),
            block(SegmentKind::Insert, 0, 4),
        ];

        find_moves(&doc1, &doc2, &mut blocks, &NoProgress).unwrap();

        assert_eq!(blocks[0].moves.len(), blocks[1].moves.len());
        for (left, right) in blocks[0].moves.iter().zip(&blocks[1].moves) {
            assert_eq!(left.len, right.len);
            assert!(left.off + left.len <= blocks[0].len);
            assert!(right.off + right.len <= blocks[1].len);
        }
        let covered: usize = blocks[0].moves.iter().map(|m| m.len).sum();
        assert_eq!(covered, 4);
    }

    #[test]
    fn terminates_on_fully_repetitive_input() {
        let doc1 = doc(ViewId::Main, MARKER_MASK_REMOVED, &[7; 20]);
        let doc2 = doc(ViewId::Sub, MARKER_MASK_ADDED, &[7; 20]);
        let mut blocks = vec![
            block(SegmentKind::Remove, 0, 20),
            block(SegmentKind::Insert, 0, 20),
        ];

        find_moves(&doc1, &doc2, &mut blocks, &NoProgress).unwrap();
    }
}
