use std::io::Write;

use anyhow::Result;
use pane_diff::{
    AlignmentInfo, CompareResult, MemoryHost, ViewId, MARKER_MASK_ADDED,
    MARKER_MASK_ADDED_LOCAL, MARKER_MASK_CHANGED, MARKER_MASK_CHANGED_LOCAL,
    MARKER_MASK_MOVED_BEGIN, MARKER_MASK_MOVED_END, MARKER_MASK_MOVED_LINE,
    MARKER_MASK_MOVED_MID, MARKER_MASK_REMOVED, MARKER_MASK_REMOVED_LOCAL,
};
use serde::Serialize;

const MARKER_NAMES: &[(u32, &str)] = &[
    (MARKER_MASK_ADDED, "added"),
    (MARKER_MASK_REMOVED, "removed"),
    (MARKER_MASK_ADDED_LOCAL, "added (non-unique)"),
    (MARKER_MASK_REMOVED_LOCAL, "removed (non-unique)"),
    (MARKER_MASK_MOVED_LINE, "moved"),
    (MARKER_MASK_MOVED_BEGIN, "moved begin"),
    (MARKER_MASK_MOVED_MID, "moved"),
    (MARKER_MASK_MOVED_END, "moved end"),
    (MARKER_MASK_CHANGED, "changed"),
    (MARKER_MASK_CHANGED_LOCAL, "changed (non-unique)"),
];

fn describe_mask(mask: u32) -> String {
    let names: Vec<&str> = MARKER_NAMES
        .iter()
        .filter(|(bit, _)| mask & bit != 0)
        .map(|&(_, name)| name)
        .collect();
    if names.is_empty() {
        format!("mask {mask:#x}")
    } else {
        names.join("+")
    }
}

pub fn write_text_report<W: Write>(
    w: &mut W,
    host: &MemoryHost,
    old_path: &str,
    new_path: &str,
    result: CompareResult,
    quiet: bool,
) -> Result<()> {
    match result {
        CompareResult::Match => {
            writeln!(w, "Files match.")?;
            return Ok(());
        }
        CompareResult::Cancelled => {
            writeln!(w, "Compare cancelled.")?;
            return Ok(());
        }
        CompareResult::Error => {
            writeln!(w, "Compare failed.")?;
            return Ok(());
        }
        CompareResult::Mismatch => {}
    }

    if quiet {
        writeln!(w, "Files differ.")?;
        return Ok(());
    }

    for (view, path) in [(ViewId::Main, old_path), (ViewId::Sub, new_path)] {
        let markers = host.markers(view);
        if markers.is_empty() {
            continue;
        }
        writeln!(w, "{}:", path)?;
        for (&line, &mask) in markers {
            let text = host.line_text(view, line).unwrap_or("");
            writeln!(
                w,
                "  {:>6}  {:<22} {}",
                line + 1,
                describe_mask(mask),
                text
            )?;
        }
        writeln!(w)?;
    }

    writeln!(w, "Files differ.")?;
    Ok(())
}

#[derive(Serialize)]
struct MarkerEntry {
    line: usize,
    mask: u32,
    kind: String,
}

#[derive(Serialize)]
struct SpanEntry {
    offset: usize,
    len: usize,
}

#[derive(Serialize)]
struct ViewReport {
    view: ViewId,
    markers: Vec<MarkerEntry>,
    changed_spans: Vec<SpanEntry>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    result: CompareResult,
    views: Vec<ViewReport>,
    alignment: &'a AlignmentInfo,
}

pub fn write_json_report<W: Write>(
    w: &mut W,
    host: &MemoryHost,
    result: CompareResult,
    alignment: &AlignmentInfo,
) -> Result<()> {
    let views = [ViewId::Main, ViewId::Sub]
        .into_iter()
        .map(|view| ViewReport {
            view,
            markers: host
                .markers(view)
                .iter()
                .map(|(&line, &mask)| MarkerEntry {
                    line,
                    mask,
                    kind: describe_mask(mask),
                })
                .collect(),
            changed_spans: host
                .changed_spans(view)
                .iter()
                .map(|&(offset, len)| SpanEntry { offset, len })
                .collect(),
        })
        .collect();

    let report = JsonReport {
        result,
        views,
        alignment,
    };
    serde_json::to_writer_pretty(&mut *w, &report)?;
    writeln!(w)?;
    Ok(())
}
