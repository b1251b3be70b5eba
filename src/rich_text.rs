// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-paragraph container owning per-paragraph buffers and layouts
//! (§4.F). Generalized from `parley_flow`'s block/flow container down to
//! a flat paragraph sequence: paragraph offsets are prefix-summed and
//! only dirty paragraphs are re-laid.

use alloc::vec::Vec;
use core::ops::Range;

use crate::attributes::{compose_paragraph_spans, Attribute, AttributeKind, AttributeSet, BaseDirection};
use crate::font::FontProvider;
use crate::layout::{build_layout, Layout, LayoutParams};
use crate::shape::ShaperCache;
use crate::text_buffer::TextBuffer;

/// The codepoint stored as the final element of every paragraph but the
/// last, per §3 "Paragraph separator".
pub const PARAGRAPH_SEPARATOR: char = '\u{2029}';

/// One paragraph: a text buffer plus a paragraph-level attribute set and
/// its cached layout (§3 "Paragraph").
pub struct Paragraph {
    buffer: TextBuffer,
    attributes: AttributeSet,
    layout: Layout,
    dirty: bool,
}

impl Paragraph {
    pub fn new(buffer: TextBuffer, attributes: AttributeSet) -> Self {
        Self {
            buffer,
            attributes,
            layout: Layout::default(),
            dirty: true,
        }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn set_attributes(&mut self, attributes: AttributeSet) {
        self.attributes = attributes;
        self.dirty = true;
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// `true` iff this paragraph ends with the paragraph separator, i.e.
    /// it is not the final paragraph of its rich text (§3 invariant).
    pub fn ends_with_separator(&self) -> bool {
        self.buffer.text().last() == Some(&PARAGRAPH_SEPARATOR)
    }
}

/// Ordered sequence of paragraphs with prefix-summed vertical offsets
/// (§4.F "rich layout").
pub struct RichText {
    paragraphs: Vec<Paragraph>,
    base_direction: BaseDirection,
}

impl RichText {
    pub fn new(base_direction: BaseDirection) -> Self {
        Self {
            paragraphs: alloc::vec![Paragraph::new(TextBuffer::new(), AttributeSet::new())],
            base_direction,
        }
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Total codepoint length across all paragraphs.
    pub fn len(&self) -> u32 {
        self.paragraphs.iter().map(|p| p.buffer.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-paragraph start offset in the flattened global codepoint
    /// space, one more entry than `paragraph_count()` (the last entry is
    /// the total length).
    pub fn paragraph_offsets(&self) -> Vec<u32> {
        let mut offsets = Vec::with_capacity(self.paragraphs.len() + 1);
        let mut acc = 0;
        for p in &self.paragraphs {
            offsets.push(acc);
            acc += p.buffer.len();
        }
        offsets.push(acc);
        offsets
    }

    /// Per-paragraph vertical start offset, prefix-summing each
    /// paragraph's laid-out height; entries for paragraphs that have not
    /// yet been laid out read as zero height until `relayout` runs
    /// (§4.F "`paragraph_offsets_y`").
    pub fn paragraph_offsets_y(&self) -> Vec<f32> {
        let mut offsets = Vec::with_capacity(self.paragraphs.len() + 1);
        let mut acc = 0.0;
        for p in &self.paragraphs {
            offsets.push(acc);
            acc += p.layout.height;
        }
        offsets.push(acc);
        offsets
    }

    fn paragraph_index_for(&self, global_offset: u32) -> (usize, u32) {
        let mut acc = 0;
        for (i, p) in self.paragraphs.iter().enumerate() {
            let end = acc + p.buffer.len();
            if global_offset < end || i == self.paragraphs.len() - 1 {
                return (i, global_offset - acc);
            }
            acc = end;
        }
        (self.paragraphs.len() - 1, 0)
    }

    /// Replaces global range `[start, end)` with `incoming`'s codepoints
    /// and spans, splitting/merging paragraphs at separator codepoints as
    /// needed (§4.F).
    pub fn replace(&mut self, range: Range<u32>, incoming: &TextBuffer) {
        let (start_para, start_local) = self.paragraph_index_for(range.start);
        let (end_para, end_local) = self.paragraph_index_for(range.end);

        if start_para == end_para {
            self.paragraphs[start_para]
                .buffer
                .replace(start_local..end_local, incoming);
            self.paragraphs[start_para].dirty = true;
        } else {
            // Remove the tail of the first touched paragraph and the head
            // of the last, splice `incoming` across the join, then remove
            // every paragraph strictly between them.
            let first_len = self.paragraphs[start_para].buffer.len();
            self.paragraphs[start_para]
                .buffer
                .replace(start_local..first_len, incoming);
            self.paragraphs[start_para].dirty = true;

            let end_len = self.paragraphs[end_para].buffer.len();
            let mut tail = self.paragraphs[end_para].buffer.clone();
            tail.remove(0..end_local.min(end_len));
            self.paragraphs[end_para].buffer = tail;
            self.paragraphs[end_para].dirty = true;

            self.paragraphs.drain(start_para + 1..end_para);
        }

        self.resplit_at_separators();
    }

    /// Splits any paragraph containing an internal paragraph separator,
    /// and merges a paragraph lacking a trailing separator into its
    /// successor, restoring the "every paragraph but the last ends with
    /// exactly one separator" invariant (§3).
    fn resplit_at_separators(&mut self) {
        let mut i = 0;
        while i < self.paragraphs.len() {
            let text = self.paragraphs[i].buffer.text();
            if let Some(sep_pos) = text
                .iter()
                .take(text.len().saturating_sub(1))
                .position(|&c| c == PARAGRAPH_SEPARATOR)
            {
                let split_at = sep_pos as u32 + 1;
                let attrs = self.paragraphs[i].attributes.clone();
                let mut tail = self.paragraphs[i].buffer.clone();
                let total = tail.len();
                tail.remove(0..split_at);
                self.paragraphs[i].buffer.remove(split_at..total);
                self.paragraphs[i].dirty = true;
                self.paragraphs
                    .insert(i + 1, Paragraph::new(tail, attrs));
                continue; // re-check the (now shorter) paragraph `i`.
            }
            i += 1;
        }

        i = 0;
        while i + 1 < self.paragraphs.len() {
            if !self.paragraphs[i].ends_with_separator() {
                let next = self.paragraphs.remove(i + 1);
                self.paragraphs[i].buffer.replace(
                    self.paragraphs[i].buffer.len()..self.paragraphs[i].buffer.len(),
                    &next.buffer,
                );
                self.paragraphs[i].dirty = true;
                continue;
            }
            i += 1;
        }
    }

    /// Re-lays every paragraph marked dirty; others are reused as-is
    /// (§4.F "only paragraphs whose text or attributes changed ... are
    /// re-laid").
    pub fn relayout(&mut self, params: &LayoutParams, provider: &dyn FontProvider, shaper_cache: &mut ShaperCache) {
        for p in &mut self.paragraphs {
            if !p.dirty {
                continue;
            }
            let spans = compose_paragraph_spans(&p.attributes, p.buffer.spans(), p.buffer.len());
            p.layout = build_layout(
                p.buffer.text(),
                &spans,
                params,
                self.base_direction,
                provider,
                shaper_cache,
            );
            p.dirty = false;
        }
    }

    /// Per-paragraph `(paragraph index, local sub-range)` pairs covering
    /// the overlap of global `range` with each paragraph, used to fan an
    /// editor-level attribute operation out across paragraph buffers.
    fn paragraph_local_ranges(&self, range: &Range<u32>) -> Vec<(usize, Range<u32>)> {
        let mut out = Vec::new();
        let mut acc = 0u32;
        for (i, p) in self.paragraphs.iter().enumerate() {
            let para_start = acc;
            let para_end = acc + p.buffer.len();
            let start = range.start.max(para_start);
            let end = range.end.min(para_end);
            if start < end || (range.start == range.end && range.start >= para_start && range.start <= para_end) {
                out.push((i, (start - para_start)..(end - para_start)));
            }
            acc = para_end;
        }
        out
    }

    /// Sets `attr` uniformly over every codepoint in global `range`,
    /// across however many paragraphs it spans (§4.I "set_attribute").
    pub fn add_attribute(&mut self, range: Range<u32>, attr: Attribute) {
        for (i, local) in self.paragraph_local_ranges(&range) {
            self.paragraphs[i].buffer.add_attribute(local, attr.clone());
            self.paragraphs[i].dirty = true;
        }
    }

    /// Clears every span of `kind` overlapping global `range` (§4.I
    /// "clear_attribute").
    pub fn clear_attribute(&mut self, range: Range<u32>, kind: AttributeKind) {
        for (i, local) in self.paragraph_local_ranges(&range) {
            self.paragraphs[i].buffer.clear_attribute(local, kind);
            self.paragraphs[i].dirty = true;
        }
    }

    /// `true` iff every codepoint in global `range` carries a span equal
    /// to `attr` (§4.I "has_attribute").
    pub fn has_attribute(&self, range: Range<u32>, attr: &Attribute) -> bool {
        if range.is_empty() {
            return false;
        }
        self.paragraph_local_ranges(&range)
            .into_iter()
            .all(|(i, local)| !local.is_empty() && self.paragraphs[i].buffer.has_attribute(local, attr))
    }

    /// Sets `attr` as the paragraph-level attribute (overriding any
    /// same-kind attribute) for every paragraph global `range` touches
    /// (§4.I "set_paragraph_attribute").
    pub fn set_paragraph_attribute(&mut self, range: Range<u32>, attr: Attribute) {
        for (i, _) in self.paragraph_local_ranges(&range) {
            let mut set = self.paragraphs[i].attributes.clone();
            set.push(crate::attributes::AttributeRef::Inline(attr.clone()));
            self.paragraphs[i].set_attributes(set);
        }
    }

    /// The codepoints covered by global `range`, used by the editor's
    /// undo recorder to capture what a mutation removed.
    pub fn chars_in_range(&self, range: Range<u32>) -> Vec<char> {
        let mut out = Vec::new();
        for (i, local) in self.paragraph_local_ranges(&range) {
            out.extend_from_slice(&self.paragraphs[i].buffer.text()[local.start as usize..local.end as usize]);
        }
        out
    }

    /// `get_text_utf8_in_range` (§6 "Persisted state"): serializes the
    /// global codepoint range `[range.start, range.end)` to UTF-8.
    pub fn text_utf8_in_range(&self, range: Range<u32>) -> alloc::string::String {
        let mut out = alloc::string::String::new();
        let mut acc = 0u32;
        for p in &self.paragraphs {
            let para_start = acc;
            let para_end = acc + p.buffer.len();
            let start = range.start.max(para_start);
            let end = range.end.min(para_end);
            if start < end {
                for &c in &p.buffer.text()[(start - para_start) as usize..(end - para_start) as usize] {
                    out.push(c);
                }
            }
            acc = para_end;
        }
        out
    }
}
