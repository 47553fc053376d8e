//! In-memory host implementation.
//!
//! Backs the CLI and the test suites: two text buffers with a precomputed
//! line index, recording every marker and changed-text span the engine
//! paints. Lines are split on `\n`; a CR before the terminator is excluded
//! from the line like the terminator itself.

use std::collections::BTreeMap;

use crate::host::{HostEditor, HostError, ViewId};

#[derive(Debug, Default)]
struct ViewBuffer {
    text: Vec<u8>,
    /// (start, end) byte range per line, terminator excluded.
    lines: Vec<(usize, usize)>,
    markers: BTreeMap<usize, u32>,
    changed_spans: Vec<(usize, usize)>,
}

impl ViewBuffer {
    fn new(text: &str) -> ViewBuffer {
        let bytes = text.as_bytes().to_vec();
        let mut lines = Vec::new();
        let mut start = 0;
        for (i, &byte) in bytes.iter().enumerate() {
            if byte == b'\n' {
                let mut end = i;
                if end > start && bytes[end - 1] == b'\r' {
                    end -= 1;
                }
                lines.push((start, end));
                start = i + 1;
            }
        }
        if start < bytes.len() {
            lines.push((start, bytes.len()));
        }
        ViewBuffer {
            text: bytes,
            lines,
            markers: BTreeMap::new(),
            changed_spans: Vec::new(),
        }
    }

    fn line(&self, line: usize) -> Result<(usize, usize), HostError> {
        self.lines
            .get(line)
            .copied()
            .ok_or_else(|| HostError::new(format!("line {line} out of range")))
    }
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    views: [ViewBuffer; 2],
    messages: Vec<String>,
}

impl MemoryHost {
    pub fn new(main_text: &str, sub_text: &str) -> MemoryHost {
        MemoryHost {
            views: [ViewBuffer::new(main_text), ViewBuffer::new(sub_text)],
            messages: Vec::new(),
        }
    }

    fn view(&self, view: ViewId) -> &ViewBuffer {
        &self.views[view.index()]
    }

    /// Line markers painted so far, by line index.
    pub fn markers(&self, view: ViewId) -> &BTreeMap<usize, u32> {
        &self.view(view).markers
    }

    /// Changed-text spans painted so far, as (byte offset, length).
    pub fn changed_spans(&self, view: ViewId) -> &[(usize, usize)] {
        &self.view(view).changed_spans
    }

    /// Messages surfaced through [`HostEditor::show_message`].
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn line_text(&self, view: ViewId, line: usize) -> Option<&str> {
        let buffer = self.view(view);
        let (start, end) = buffer.lines.get(line).copied()?;
        std::str::from_utf8(&buffer.text[start..end]).ok()
    }

    pub fn clear_results(&mut self) {
        for buffer in &mut self.views {
            buffer.markers.clear();
            buffer.changed_spans.clear();
        }
        self.messages.clear();
    }
}

impl HostEditor for MemoryHost {
    fn text_length(&self, view: ViewId) -> Result<usize, HostError> {
        Ok(self.view(view).text.len())
    }

    fn line_count(&self, view: ViewId) -> Result<usize, HostError> {
        Ok(self.view(view).lines.len())
    }

    fn line_start(&self, view: ViewId, line: usize) -> Result<usize, HostError> {
        Ok(self.view(view).line(line)?.0)
    }

    fn line_end(&self, view: ViewId, line: usize) -> Result<usize, HostError> {
        Ok(self.view(view).line(line)?.1)
    }

    fn text(&self, view: ViewId, start: usize, end: usize) -> Result<Vec<u8>, HostError> {
        let buffer = self.view(view);
        if start > end || end > buffer.text.len() {
            return Err(HostError::new(format!(
                "text range {start}..{end} out of bounds (len {})",
                buffer.text.len()
            )));
        }
        Ok(buffer.text[start..end].to_vec())
    }

    fn marker_add_set(&mut self, view: ViewId, line: usize, mask: u32) -> Result<(), HostError> {
        let buffer = &mut self.views[view.index()];
        if line >= buffer.lines.len() {
            return Err(HostError::new(format!("marker line {line} out of range")));
        }
        *buffer.markers.entry(line).or_insert(0) |= mask;
        Ok(())
    }

    fn mark_text_as_changed(
        &mut self,
        view: ViewId,
        offset: usize,
        len: usize,
    ) -> Result<(), HostError> {
        let buffer = &mut self.views[view.index()];
        if offset + len > buffer.text.len() {
            return Err(HostError::new(format!(
                "changed span {offset}+{len} out of bounds"
            )));
        }
        buffer.changed_spans.push((offset, len));
        Ok(())
    }

    fn show_message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }
}
