//! Replace-pair comparison: line mapping selection and intra-line diffs.
//!
//! A pure greedy walk of the convergence-ordered candidates can pick a
//! high-scoring pair that blocks a better global monotone arrangement, so
//! every start position in the ordered list is tried and the arrangement with
//! the highest monotone score wins (earliest on ties).

use std::collections::BTreeMap;

use crate::blocks::{BlockDiff, ChangedLine};
use crate::config::CompareOptions;
use crate::document::{DocSide, Section};
use crate::host::{HostEditor, HostError, ViewId};
use crate::myers::{diff_sequences, DiffSegment, SegmentKind};
use crate::report::EngineError;
use crate::tokens::{self, Char, Word};

/// Mapping of block-local line `i` on side 1 to `(convergence, j)` on side 2.
type LineMappings = BTreeMap<usize, (f32, usize)>;

/// Compares the two blocks of a replace pair, identifying which lines are
/// edits of each other and recording their intra-line differences.
pub(super) fn compare_blocks<H: HostEditor>(
    host: &mut H,
    doc1: &DocSide,
    doc2: &DocSide,
    blocks: &mut [BlockDiff],
    idx1: usize,
    idx2: usize,
    options: &CompareOptions,
) -> Result<(), EngineError> {
    let chunk1 = block_chars(host, doc1, &blocks[idx1], options)?;
    let chunk2 = block_chars(host, doc2, &blocks[idx2], options)?;

    let candidates = collect_candidates(&chunk1, &chunk2, &blocks[idx1], &blocks[idx2], options);
    let best = select_mappings(&candidates, chunk1.len(), chunk2.len());

    if !best.is_empty() {
        compare_lines(host, doc1, doc2, blocks, idx1, idx2, &best, options)?;
    }

    Ok(())
}

fn block_chars<H: HostEditor>(
    host: &H,
    doc: &DocSide,
    block: &BlockDiff,
    options: &CompareOptions,
) -> Result<Vec<Vec<Char>>, HostError> {
    let mut chunk = Vec::with_capacity(block.len);
    for i in 0..block.len {
        let source_line = doc.lines[block.off() + i].source_line;
        let start = host.line_start(doc.view, source_line)?;
        let end = host.line_end(doc.view, source_line)?;
        chunk.push(tokens::section_chars(host, doc.view, start, end, options)?);
    }
    Ok(chunk)
}

/// Scores every uncovered line pair at character granularity, keeping pairs
/// whose convergence reaches the threshold. Zero-length lines never enter the
/// comparison.
fn collect_candidates(
    chunk1: &[Vec<Char>],
    chunk2: &[Vec<Char>],
    block1: &BlockDiff,
    block2: &BlockDiff,
    options: &CompareOptions,
) -> Vec<(f32, usize, usize)> {
    let threshold = options.match_percent_threshold as usize;
    let mut candidates = Vec::new();

    let mut line1 = 0;
    while line1 < chunk1.len() {
        if chunk1[line1].is_empty() {
            line1 += 1;
            continue;
        }
        if let Some(next) = block1.next_unmoved(line1) {
            line1 = next;
            continue;
        }

        let mut line2 = 0;
        while line2 < chunk2.len() {
            if chunk2[line2].is_empty() {
                line2 += 1;
                continue;
            }
            if let Some(next) = block2.next_unmoved(line2) {
                line2 = next;
                continue;
            }

            let min_size = chunk1[line1].len().min(chunk2[line2].len());
            let max_size = chunk1[line1].len().max(chunk2[line2].len());

            // Cheap length gate before running the kernel.
            if (min_size * 100) / max_size >= threshold {
                let (segments, _) = diff_sequences(&chunk1[line1], &chunk2[line2]);
                let matched: usize = segments
                    .iter()
                    .filter(|seg| seg.kind == SegmentKind::Match)
                    .map(|seg| seg.len)
                    .sum();
                let convergence = matched as f32 * 100.0 / max_size as f32;
                if convergence >= threshold as f32 {
                    candidates.push((convergence, line1, line2));
                }
            }

            line2 += 1;
        }
        line1 += 1;
    }

    candidates.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });
    candidates
}

/// Tries each start position in the ordered candidate list, greedily claiming
/// pairs until one side's lines are exhausted, and scores the result counting
/// only pairs whose `j` stays strictly increasing in `i` order.
fn select_mappings(
    candidates: &[(f32, usize, usize)],
    lines_count1: usize,
    lines_count2: usize,
) -> LineMappings {
    let mut best_mappings = LineMappings::new();
    let mut best_convergence: Option<f32> = None;

    for start in 0..candidates.len() {
        let mut mappings = LineMappings::new();
        let mut mapped1 = vec![false; lines_count1];
        let mut mapped2 = vec![false; lines_count2];
        let mut mapped_count1 = 0;
        let mut mapped_count2 = 0;

        for &(convergence, line1, line2) in &candidates[start..] {
            if mapped1[line1] || mapped2[line2] {
                continue;
            }
            mappings.insert(line1, (convergence, line2));

            mapped_count1 += 1;
            if mapped_count1 == lines_count1 {
                break;
            }
            mapped_count2 += 1;
            if mapped_count2 == lines_count2 {
                break;
            }

            mapped1[line1] = true;
            mapped2[line2] = true;
        }

        let mut total = 0.0f32;
        let mut last_line2: Option<usize> = None;
        for (_, &(convergence, line2)) in &mappings {
            if last_line2.map_or(true, |prev| line2 > prev) {
                total += convergence;
                last_line2 = Some(line2);
            }
        }

        if best_convergence.map_or(true, |best| best < total) {
            best_convergence = Some(total);
            best_mappings = mappings;
        }
    }

    best_mappings
}

/// Diffs each corresponded line pair at word granularity, optionally refining
/// removed/inserted word runs to character spans.
fn compare_lines<H: HostEditor>(
    host: &mut H,
    doc1: &DocSide,
    doc2: &DocSide,
    blocks: &mut [BlockDiff],
    idx1: usize,
    idx2: usize,
    mappings: &LineMappings,
    options: &CompareOptions,
) -> Result<(), EngineError> {
    let threshold = options.match_percent_threshold as usize;
    let mut last_line2: Option<usize> = None;

    for (&mapped_line1, &(_, mapped_line2)) in mappings {
        // Side-1 lines come in ascending order; a pair only corresponds when
        // side 2 advances too.
        if last_line2.map_or(false, |prev| mapped_line2 <= prev) {
            continue;
        }
        last_line2 = Some(mapped_line2);

        let words1 = tokens::line_words(
            host,
            doc1.view,
            doc1.lines[blocks[idx1].off() + mapped_line1].source_line,
            options,
        )?;
        let words2 = tokens::line_words(
            host,
            doc2.view,
            doc2.lines[blocks[idx2].off() + mapped_line2].source_line,
            options,
        )?;

        let (segments, swapped) = diff_sequences(&words1, &words2);

        // Rebind sides when the kernel swapped.
        let (w1, w2, d1, d2, b1, b2, line1, line2) = if swapped {
            (&words2, &words1, doc2, doc1, idx2, idx1, mapped_line2, mapped_line1)
        } else {
            (&words1, &words2, doc1, doc2, idx1, idx2, mapped_line1, mapped_line2)
        };

        let mut changed1 = ChangedLine::new(line1);
        let mut changed2 = ChangedLine::new(line2);

        let line_off1 =
            host.line_start(d1.view, d1.lines[blocks[b1].off() + line1].source_line)?;
        let line_off2 =
            host.line_start(d2.view, d2.lines[blocks[b2].off() + line2].source_line)?;

        let line_len1: usize = w1.iter().map(|w| w.len).sum();
        let line_len2: usize = w2.iter().map(|w| w.len).sum();
        let mut total_match_len = 0;

        let mut i = 0;
        while i < segments.len() {
            let seg = segments[i];
            match seg.kind {
                SegmentKind::Match => {
                    total_match_len += w1[seg.off_a..seg.off_a + seg.len]
                        .iter()
                        .map(|w| w.len)
                        .sum::<usize>();
                }
                SegmentKind::Insert => {
                    changed2.changes.push(word_span(w2, seg.off_b, seg.len));
                }
                SegmentKind::Remove => {
                    if options.char_precision
                        && i + 1 < segments.len()
                        && segments[i + 1].kind == SegmentKind::Insert
                    {
                        if let Some(extra) = refine_changed_words(
                            host,
                            options,
                            &seg,
                            &segments[i + 1],
                            w1,
                            w2,
                            d1.view,
                            d2.view,
                            line_off1,
                            line_off2,
                            &mut changed1,
                            &mut changed2,
                        )? {
                            total_match_len += extra;
                            i += 2;
                            continue;
                        }
                        // No sub-word similarity at all: when this pair is the
                        // only word-level change, the lines are not edits of
                        // each other.
                        if segments.len() == 2 {
                            break;
                        }
                    }
                    changed1.changes.push(word_span(w1, seg.off_a, seg.len));
                }
            }
            i += 1;
        }

        // The per-pair gate ran at char granularity; reconsidered at word
        // granularity the edits may be too sparse to call this an edit.
        if (total_match_len * 100) / line_len1.max(line_len2) >= threshold {
            blocks[b1].changed_lines.push(changed1);
            blocks[b2].changed_lines.push(changed2);
        }
    }

    Ok(())
}

fn word_span(words: &[Word], off: usize, len: usize) -> Section {
    let first = &words[off];
    let last = &words[off + len - 1];
    Section {
        off: first.pos,
        len: last.pos + last.len - first.pos,
    }
}

/// Character-level refinement of a removed/inserted word-run pair.
///
/// Returns the matched character count when the coarse word changes were
/// replaced (fine spans or prefix/suffix narrowing), or `None` when the two
/// runs share nothing and the word-level spans stand.
#[allow(clippy::too_many_arguments)]
fn refine_changed_words<H: HostEditor>(
    host: &H,
    options: &CompareOptions,
    removed: &DiffSegment,
    inserted: &DiffSegment,
    w1: &[Word],
    w2: &[Word],
    view1: ViewId,
    view2: ViewId,
    line_off1: usize,
    line_off2: usize,
    changed1: &mut ChangedLine,
    changed2: &mut ChangedLine,
) -> Result<Option<usize>, EngineError> {
    let span1 = word_span(w1, removed.off_a, removed.len);
    let span2 = word_span(w2, inserted.off_b, inserted.len);
    let (off1, end1) = (span1.off, span1.off + span1.len);
    let (off2, end2) = (span2.off, span2.off + span2.len);

    let sec1 = tokens::section_chars(host, view1, line_off1 + off1, line_off1 + end1, options)?;
    let sec2 = tokens::section_chars(host, view2, line_off2 + off2, line_off2 + end2, options)?;

    let (segments, swapped) = diff_sequences(&sec1, &sec2);

    let (s1, s2, o1, e1, o2, e2, cl1, cl2) = if swapped {
        (&sec2, &sec1, off2, end2, off1, end1, changed2, changed1)
    } else {
        (&sec1, &sec2, off1, end1, off2, end2, changed1, changed2)
    };

    let match_len: usize = segments
        .iter()
        .filter(|seg| seg.kind == SegmentKind::Match)
        .map(|seg| seg.len)
        .sum();
    let match_sections = segments
        .iter()
        .filter(|seg| seg.kind == SegmentKind::Match)
        .count();

    if match_sections == 0 {
        return Ok(None);
    }

    // Are similarities a considerable portion of the pair?
    if match_len * 100 / s1.len() >= options.match_percent_threshold as usize {
        for seg in &segments {
            match seg.kind {
                SegmentKind::Remove => {
                    let first = &s1[seg.off_a];
                    let last = &s1[seg.off_a + seg.len - 1];
                    cl1.changes.push(Section {
                        off: first.pos + o1,
                        len: last.pos + 1 - first.pos,
                    });
                }
                SegmentKind::Insert => {
                    let first = &s2[seg.off_b];
                    let last = &s2[seg.off_b + seg.len - 1];
                    cl2.changes.push(Section {
                        off: first.pos + o2,
                        len: last.pos + 1 - first.pos,
                    });
                }
                SegmentKind::Match => {}
            }
        }
        return Ok(Some(match_len));
    }

    // Below threshold: narrow the change to the smallest central span by
    // matching the leading and trailing characters only.
    let mut start_match = 0;
    while start_match < s1.len()
        && start_match < s2.len()
        && s1[start_match].ch == s2[start_match].ch
    {
        start_match += 1;
    }

    let mut end_match = 0;
    while s2.len() > start_match + end_match + 1
        && end_match < s1.len()
        && s1[s1.len() - end_match - 1].ch == s2[s2.len() - end_match - 1].ch
    {
        end_match += 1;
    }

    if start_match == 0 && end_match == 0 {
        return Ok(None);
    }

    push_central_change(cl1, s1, o1, e1, start_match, end_match);
    push_central_change(cl2, s2, o2, e2, start_match, end_match);

    Ok(Some(start_match + end_match))
}

fn push_central_change(
    changed: &mut ChangedLine,
    chars: &[Char],
    section_off: usize,
    section_end: usize,
    start_match: usize,
    end_match: usize,
) {
    let mut off = section_off;
    if start_match > 0 {
        off += chars[start_match - 1].pos + 1;
    }
    let end = if end_match > 0 {
        chars[chars.len() - end_match - 1].pos + 1 + section_off
    } else {
        section_end
    };
    if end > off {
        changed.changes.push(Section {
            off,
            len: end - off,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_mappings_prefers_monotone_arrangements() {
        // Greedy from the top would claim (0 -> 1) first and leave only a
        // crossing pair; a later start yields two monotone pairs instead.
        let candidates: Vec<(f32, usize, usize)> = vec![(90.0, 0, 1), (80.0, 0, 0), (80.0, 1, 1)];
        let sorted = {
            let mut c = candidates;
            c.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
            c
        };
        let best = select_mappings(&sorted, 2, 2);
        assert_eq!(best.len(), 2);
        assert_eq!(best.get(&0), Some(&(80.0, 0)));
        assert_eq!(best.get(&1), Some(&(80.0, 1)));
    }

    #[test]
    fn select_mappings_keeps_a_zero_score_candidate() {
        let candidates = vec![(0.0, 0, 0)];
        let best = select_mappings(&candidates, 1, 1);
        assert_eq!(best.get(&0), Some(&(0.0, 0)));
    }

    #[test]
    fn select_mappings_ties_keep_the_earliest_start() {
        // Start 0 claims both crossing pairs (score 50 after the monotone
        // filter); start 1 claims a single pair with the same score. The
        // earlier arrangement must win.
        let candidates = vec![(50.0, 0, 1), (50.0, 1, 0)];
        let best = select_mappings(&candidates, 2, 2);
        assert_eq!(best.len(), 2);
        assert_eq!(best.get(&0), Some(&(50.0, 1)));
    }
}
