//! Compare orchestration.
//!
//! [`compare_views`] is the only entry point. A run is single-threaded and
//! synchronous; all scratch state lives on the stack of `run_compare` /
//! `run_find_unique`, so abandoning a run (cancellation, host failure,
//! panic) releases everything. The progress collaborator is finished on
//! every exit path.
//!
//! ## Module structure
//!
//! - `moves`: iterative mutually-best move detection
//! - `block_compare`: replace-pair line mapping and intra-line diffs
//! - `markers`: marker painting and alignment emission

mod block_compare;
mod markers;
mod moves;

use std::panic::{catch_unwind, AssertUnwindSafe};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::blocks::BlockDiff;
use crate::config::CompareOptions;
use crate::document::{scan_lines, DocSide, Section};
use crate::host::{HostEditor, ViewId, MARKER_MASK_ADDED, MARKER_MASK_REMOVED};
use crate::myers::{diff_sequences, SegmentKind};
use crate::progress::CompareProgress;
use crate::report::{AlignmentInfo, AlignmentPair, AlignmentViewData, CompareResult, EngineError};

/// Ensures the progress collaborator sees `finish` on every exit path,
/// including unwinding.
struct ProgressFinishGuard<'a>(&'a dyn CompareProgress);

impl Drop for ProgressFinishGuard<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Compares the two views and paints the results through the host.
///
/// Returns the run outcome together with the alignment table. Failures never
/// propagate to the caller: host errors, broken invariants, and panics are
/// reported through [`HostEditor::show_message`] and collapse to
/// [`CompareResult::Error`]; cancellation yields
/// [`CompareResult::Cancelled`]. The alignment table is empty in both cases.
pub fn compare_views<H: HostEditor>(
    host: &mut H,
    options: &CompareOptions,
    progress: &dyn CompareProgress,
) -> (CompareResult, AlignmentInfo) {
    if let Err(err) = options.validate() {
        host.show_message(&format!("Compare failed: {err}"));
        return (CompareResult::Error, AlignmentInfo::new());
    }

    let outcome = {
        let host = &mut *host;
        catch_unwind(AssertUnwindSafe(move || {
            progress.begin();
            let _guard = ProgressFinishGuard(progress);
            if options.find_unique_mode {
                run_find_unique(host, options, progress)
            } else {
                run_compare(host, options, progress)
            }
        }))
    };

    match outcome {
        Ok(Ok(done)) => done,
        Ok(Err(EngineError::Cancelled)) => (CompareResult::Cancelled, AlignmentInfo::new()),
        Ok(Err(err)) => {
            host.show_message(&format!("Compare failed: {err}"));
            (CompareResult::Error, AlignmentInfo::new())
        }
        Err(_) => {
            host.show_message("Compare failed: internal error");
            (CompareResult::Error, AlignmentInfo::new())
        }
    }
}

/// Builds the two sides with their sections and add/remove masks.
fn doc_sides(options: &CompareOptions) -> (DocSide, DocSide) {
    let (main_mask, sub_mask) = if options.old_file_view == ViewId::Main {
        (MARKER_MASK_REMOVED, MARKER_MASK_ADDED)
    } else {
        (MARKER_MASK_ADDED, MARKER_MASK_REMOVED)
    };

    let mut doc1 = DocSide::new(ViewId::Main, main_mask);
    let mut doc2 = DocSide::new(ViewId::Sub, sub_mask);

    if let Some(selections) = &options.selections {
        doc1.section = Section {
            off: selections.main.first,
            len: selections.main.last - selections.main.first + 1,
        };
        doc2.section = Section {
            off: selections.sub.first,
            len: selections.sub.last - selections.sub.first + 1,
        };
    }

    (doc1, doc2)
}

/// Records which lines have an equal twin on the other side. Such lines get
/// the softer "local" marker variants later.
fn find_non_unique_lines(doc1: &mut DocSide, doc2: &mut DocSide) {
    let mut doc1_lines: FxHashMap<u64, Vec<usize>> = FxHashMap::default();
    for line in &doc1.lines {
        doc1_lines.entry(line.hash).or_default().push(line.source_line);
    }

    for line in &doc2.lines {
        if let Some(twins) = doc1_lines.get(&line.hash) {
            doc2.non_unique.insert(line.source_line);
            for &twin in twins {
                doc1.non_unique.insert(twin);
            }
        }
    }
}

fn run_compare<H: HostEditor>(
    host: &mut H,
    options: &CompareOptions,
    progress: &dyn CompareProgress,
) -> Result<(CompareResult, AlignmentInfo), EngineError> {
    let (mut doc1, mut doc2) = doc_sides(options);

    scan_lines(host, &mut doc1, options, progress)?;
    if !progress.next_phase() {
        return Err(EngineError::Cancelled);
    }

    scan_lines(host, &mut doc2, options, progress)?;
    if !progress.next_phase() {
        return Err(EngineError::Cancelled);
    }

    let (segments, swapped) = diff_sequences(&doc1.lines, &doc2.lines);
    if swapped {
        std::mem::swap(&mut doc1, &mut doc2);
    }

    let mut blocks = BlockDiff::from_segments(segments);

    if blocks.is_empty() || (blocks.len() == 1 && blocks[0].kind == SegmentKind::Match) {
        return Ok((CompareResult::Match, AlignmentInfo::new()));
    }

    find_non_unique_lines(&mut doc1, &mut doc2);

    if options.detect_moves {
        moves::find_moves(&doc1, &doc2, &mut blocks, progress)?;
    }

    if !progress.next_phase() {
        return Err(EngineError::Cancelled);
    }

    progress.set_max_count(blocks.len() - 1);

    for i in 1..blocks.len() {
        // A removed block immediately followed by an added one is a replace
        // pair: its lines are candidate edits rather than unrelated churn.
        if blocks[i].kind == SegmentKind::Insert && blocks[i - 1].kind == SegmentKind::Remove {
            blocks[i - 1].match_block = Some(i);
            blocks[i].match_block = Some(i - 1);
            block_compare::compare_blocks(host, &doc1, &doc2, &mut blocks, i - 1, i, options)?;
        }
        if !progress.advance() {
            return Err(EngineError::Cancelled);
        }
    }

    if !progress.next_phase() {
        return Err(EngineError::Cancelled);
    }

    let alignment = markers::mark_all_diffs(host, &doc1, &doc2, &blocks, options, progress)?;

    Ok((CompareResult::Mismatch, alignment))
}

/// Unique-lines mode: no diff, just mark lines whose fingerprint is absent on
/// the other side.
fn run_find_unique<H: HostEditor>(
    host: &mut H,
    options: &CompareOptions,
    progress: &dyn CompareProgress,
) -> Result<(CompareResult, AlignmentInfo), EngineError> {
    let (mut doc1, mut doc2) = doc_sides(options);

    scan_lines(host, &mut doc1, options, progress)?;
    if !progress.next_phase() {
        return Err(EngineError::Cancelled);
    }

    scan_lines(host, &mut doc2, options, progress)?;
    if !progress.next_phase() {
        return Err(EngineError::Cancelled);
    }

    let doc1_hashes: FxHashSet<u64> = doc1.lines.iter().map(|line| line.hash).collect();
    if !progress.next_phase() {
        return Err(EngineError::Cancelled);
    }

    let doc2_hashes: FxHashSet<u64> = doc2.lines.iter().map(|line| line.hash).collect();
    if !progress.next_phase() {
        return Err(EngineError::Cancelled);
    }

    let mut doc1_unique = 0;
    for line in &doc1.lines {
        if !doc2_hashes.contains(&line.hash) {
            host.marker_add_set(doc1.view, line.source_line, doc1.block_diff_mask)?;
            doc1_unique += 1;
        }
    }

    let doc2_has_unique = doc2
        .lines
        .iter()
        .any(|line| !doc1_hashes.contains(&line.hash));

    if doc1_unique == 0 && !doc2_has_unique {
        return Ok((CompareResult::Match, AlignmentInfo::new()));
    }

    for line in &doc2.lines {
        if !doc1_hashes.contains(&line.hash) {
            host.marker_add_set(doc2.view, line.source_line, doc2.block_diff_mask)?;
        }
    }

    let alignment = vec![AlignmentPair {
        main: AlignmentViewData {
            line: doc1.section.off,
            diff_mask: 0,
        },
        sub: AlignmentViewData {
            line: doc2.section.off,
            diff_mask: 0,
        },
    }];

    Ok((CompareResult::Mismatch, alignment))
}
