//! End-to-end scenarios exercising the full compare pipeline through the
//! in-memory host.

use pane_diff::{
    compare_views, CompareOptions, CompareResult, LineRange, MemoryHost, NoProgress,
    SelectionPair, ViewId, MARKER_MASK_ADDED, MARKER_MASK_CHANGED, MARKER_MASK_MOVED_LINE,
    MARKER_MASK_REMOVED,
};

fn compare(main: &str, sub: &str, options: &CompareOptions) -> (CompareResult, MemoryHost) {
    let mut host = MemoryHost::new(main, sub);
    let (result, _alignment) = compare_views(&mut host, options, &NoProgress);
    (result, host)
}

fn marker_lines(host: &MemoryHost, view: ViewId) -> Vec<(usize, u32)> {
    host.markers(view).iter().map(|(&l, &m)| (l, m)).collect()
}

#[test]
fn single_changed_line_yields_a_replace_pair_with_char_spans() {
    let mut host = MemoryHost::new("x\ny\nz\n", "x\nY\nz\n");
    let (result, alignment) = compare_views(&mut host, &CompareOptions::default(), &NoProgress);

    assert_eq!(result, CompareResult::Mismatch);

    assert_eq!(
        marker_lines(&host, ViewId::Main),
        vec![(1, MARKER_MASK_CHANGED)]
    );
    assert_eq!(
        marker_lines(&host, ViewId::Sub),
        vec![(1, MARKER_MASK_CHANGED)]
    );

    // The whole one-column line differs: columns 0..1 on each side. Line "y"
    // starts at byte 2 in both buffers.
    assert_eq!(host.changed_spans(ViewId::Main), &[(2, 1)]);
    assert_eq!(host.changed_spans(ViewId::Sub), &[(2, 1)]);

    assert_eq!(alignment.len(), 3);
    assert_eq!(alignment[0].main.line, 0);
    assert_eq!(alignment[0].main.diff_mask, 0);
    assert_eq!(alignment[0].sub.line, 0);
    assert_eq!(alignment[1].main.line, 1);
    assert_eq!(alignment[1].main.diff_mask, MARKER_MASK_CHANGED);
    assert_eq!(alignment[1].sub.diff_mask, MARKER_MASK_CHANGED);
    assert_eq!(alignment[2].main.line, 2);
    assert_eq!(alignment[2].sub.line, 2);
}

#[test]
fn rotated_lines_are_detected_as_a_move() {
    let options = CompareOptions {
        detect_moves: true,
        ..CompareOptions::default()
    };
    let (result, host) = compare("a\nb\nc\n", "c\na\nb\n", &options);

    assert_eq!(result, CompareResult::Mismatch);
    assert_eq!(
        marker_lines(&host, ViewId::Main),
        vec![(2, MARKER_MASK_MOVED_LINE)]
    );
    assert_eq!(
        marker_lines(&host, ViewId::Sub),
        vec![(0, MARKER_MASK_MOVED_LINE)]
    );
}

#[test]
fn case_and_space_folding_makes_the_buffers_match() {
    let options = CompareOptions {
        ignore_case: true,
        ignore_spaces: true,
        ..CompareOptions::default()
    };
    let mut host = MemoryHost::new("hello world\n", "hello  WORLD\n");
    let (result, alignment) = compare_views(&mut host, &options, &NoProgress);

    assert_eq!(result, CompareResult::Match);
    assert!(host.markers(ViewId::Main).is_empty());
    assert!(host.markers(ViewId::Sub).is_empty());
    assert!(alignment.is_empty());
}

#[test]
fn char_precision_narrows_the_change_to_the_digit() {
    let options = CompareOptions {
        char_precision: true,
        match_percent_threshold: 50,
        ..CompareOptions::default()
    };
    let mut host = MemoryHost::new("int x = 1;\n", "int x = 2;\n");
    let (result, alignment) = compare_views(&mut host, &options, &NoProgress);

    assert_eq!(result, CompareResult::Mismatch);
    assert_eq!(
        marker_lines(&host, ViewId::Main),
        vec![(0, MARKER_MASK_CHANGED)]
    );
    assert_eq!(
        marker_lines(&host, ViewId::Sub),
        vec![(0, MARKER_MASK_CHANGED)]
    );

    // Exactly the digit differs, at column 8.
    assert_eq!(host.changed_spans(ViewId::Main), &[(8, 1)]);
    assert_eq!(host.changed_spans(ViewId::Sub), &[(8, 1)]);

    assert_eq!(alignment.len(), 1);
    assert_eq!(alignment[0].main.diff_mask, MARKER_MASK_CHANGED);
    assert_eq!(alignment[0].sub.diff_mask, MARKER_MASK_CHANGED);
}

#[test]
fn dissimilar_blocks_produce_no_line_mapping() {
    let options = CompareOptions {
        match_percent_threshold: 70,
        ..CompareOptions::default()
    };
    let (result, host) = compare("foo\nbar\n", "baz\nqux\n", &options);

    assert_eq!(result, CompareResult::Mismatch);
    assert_eq!(
        marker_lines(&host, ViewId::Main),
        vec![(0, MARKER_MASK_REMOVED), (1, MARKER_MASK_REMOVED)]
    );
    assert_eq!(
        marker_lines(&host, ViewId::Sub),
        vec![(0, MARKER_MASK_ADDED), (1, MARKER_MASK_ADDED)]
    );
    assert!(host.changed_spans(ViewId::Main).is_empty());
    assert!(host.changed_spans(ViewId::Sub).is_empty());
}

#[test]
fn unique_mode_marks_only_unpaired_hashes() {
    let options = CompareOptions {
        find_unique_mode: true,
        ..CompareOptions::default()
    };
    let mut host = MemoryHost::new("one\ntwo\nthree\n", "two\nfour\n");
    let (result, alignment) = compare_views(&mut host, &options, &NoProgress);

    assert_eq!(result, CompareResult::Mismatch);
    assert_eq!(
        marker_lines(&host, ViewId::Main),
        vec![(0, MARKER_MASK_REMOVED), (2, MARKER_MASK_REMOVED)]
    );
    assert_eq!(
        marker_lines(&host, ViewId::Sub),
        vec![(1, MARKER_MASK_ADDED)]
    );

    assert_eq!(alignment.len(), 1);
    assert_eq!(alignment[0].main.line, 0);
    assert_eq!(alignment[0].sub.line, 0);
    assert_eq!(alignment[0].main.diff_mask, 0);
}

#[test]
fn unique_mode_with_identical_hash_sets_matches() {
    let options = CompareOptions {
        find_unique_mode: true,
        ..CompareOptions::default()
    };
    let (result, host) = compare("a\nb\n", "b\na\na\n", &options);

    assert_eq!(result, CompareResult::Match);
    assert!(host.markers(ViewId::Main).is_empty());
    assert!(host.markers(ViewId::Sub).is_empty());
}

#[test]
fn both_sides_empty_match() {
    let mut host = MemoryHost::new("", "");
    let (result, alignment) = compare_views(&mut host, &CompareOptions::default(), &NoProgress);
    assert_eq!(result, CompareResult::Match);
    assert!(alignment.is_empty());
}

#[test]
fn one_empty_side_becomes_a_single_removed_block() {
    let mut host = MemoryHost::new("a\nb\n", "");
    let (result, alignment) = compare_views(&mut host, &CompareOptions::default(), &NoProgress);

    assert_eq!(result, CompareResult::Mismatch);
    assert_eq!(
        marker_lines(&host, ViewId::Main),
        vec![(0, MARKER_MASK_REMOVED), (1, MARKER_MASK_REMOVED)]
    );
    assert!(host.markers(ViewId::Sub).is_empty());

    assert_eq!(alignment.len(), 1);
    assert_eq!(alignment[0].main.diff_mask, MARKER_MASK_REMOVED);
    assert_eq!(alignment[0].sub.diff_mask, 0);
}

#[test]
fn overrunning_selection_is_clamped_not_rejected() {
    let options = CompareOptions {
        selections: Some(SelectionPair {
            main: LineRange { first: 1, last: 99 },
            sub: LineRange { first: 0, last: 1 },
        }),
        ..CompareOptions::default()
    };
    let (result, _host) = compare("a\nb\nc\n", "b\nc\n", &options);
    assert_eq!(result, CompareResult::Match);
}

#[test]
fn selection_compare_appends_end_anchors() {
    let options = CompareOptions {
        selections: Some(SelectionPair {
            main: LineRange { first: 0, last: 2 },
            sub: LineRange { first: 0, last: 2 },
        }),
        ..CompareOptions::default()
    };
    let mut host = MemoryHost::new("a\nX\nc\n", "a\nY\nc\n");
    let (result, alignment) = compare_views(&mut host, &options, &NoProgress);

    assert_eq!(result, CompareResult::Mismatch);
    // Three content rows plus the two trailing anchors.
    assert_eq!(alignment.len(), 5);
    let tail = &alignment[alignment.len() - 1];
    assert_eq!(tail.main.line, 2);
    assert_eq!(tail.sub.line, 2);
    assert_eq!(tail.main.diff_mask, 0);
    assert_eq!(tail.sub.diff_mask, 0);
}

#[test]
fn zero_length_lines_never_reach_the_word_comparators() {
    // Two empty lines versus one non-empty line: the replace pair has no
    // comparable content and must fall back to plain remove/add markers.
    let (result, host) = compare("\n\n", "x\n", &CompareOptions::default());

    assert_eq!(result, CompareResult::Mismatch);
    assert_eq!(
        marker_lines(&host, ViewId::Main),
        vec![(0, MARKER_MASK_REMOVED), (1, MARKER_MASK_REMOVED)]
    );
    assert_eq!(
        marker_lines(&host, ViewId::Sub),
        vec![(0, MARKER_MASK_ADDED)]
    );
    assert!(host.changed_spans(ViewId::Main).is_empty());
}

#[test]
fn old_file_view_governs_mask_assignment() {
    let options = CompareOptions {
        old_file_view: ViewId::Sub,
        ..CompareOptions::default()
    };
    let (result, host) = compare("a\nb\n", "", &options);

    assert_eq!(result, CompareResult::Mismatch);
    // With the old side on the sub view, surviving main-view lines count as
    // added.
    assert_eq!(
        marker_lines(&host, ViewId::Main),
        vec![(0, MARKER_MASK_ADDED), (1, MARKER_MASK_ADDED)]
    );
}
