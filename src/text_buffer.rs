// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Codepoint buffer with sorted, edit-preserving attribute spans (§4.B).
//!
//! Mutation preserves spans outside the touched range; a span that
//! straddles the touched range splits into a left and right remainder,
//! leaving a gap for whatever spans the caller attaches to the inserted
//! content. Adjacent spans of identical kind/value/payload are merged
//! after every mutation, generalizing the split/insert/merge algorithm in
//! `parley::resolve::range::RangedStyleBuilder` from one effective style
//! per codepoint to independent per-kind span lists that may overlap
//! arbitrarily across kinds.

use alloc::vec::Vec;
use core::ops::Range;

use smallvec::SmallVec;

use crate::attributes::{Attribute, AttributeKind, AttributeSpan};

/// A codepoint sequence plus its attribute spans.
#[derive(Clone, Debug, Default)]
pub struct TextBuffer {
    text: Vec<char>,
    spans: Vec<AttributeSpan>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_chars(text: Vec<char>) -> Self {
        Self { text, spans: Vec::new() }
    }

    pub fn len(&self) -> u32 {
        self.text.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn text(&self) -> &[char] {
        &self.text
    }

    pub fn spans(&self) -> &[AttributeSpan] {
        &self.spans
    }

    fn clamp_range(&self, range: Range<u32>) -> Range<u32> {
        let len = self.len();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        start..end
    }

    /// Appends `text` at the end of the buffer, attaching `spans` whose
    /// ranges are relative to `text` (i.e. `0..text.len()`).
    pub fn append_range(&mut self, text: &[char], spans: impl IntoIterator<Item = AttributeSpan>) {
        let base = self.len();
        self.text.extend_from_slice(text);
        for mut span in spans {
            span.range = (span.range.start + base)..(span.range.end + base);
            self.spans.push(span);
        }
        self.merge_adjacent();
    }

    /// Replaces `range` with the codepoints of `incoming`, splicing its
    /// spans in at the insertion point and remapping all existing spans
    /// through the edit.
    pub fn replace(&mut self, range: Range<u32>, incoming: &TextBuffer) {
        let range = self.clamp_range(range);
        self.splice(range, &incoming.text, incoming.spans.iter().cloned());
    }

    /// Replaces `range` with plain UTF-8 text carrying a single uniform
    /// attribute set (one span per attribute, spanning the whole of the
    /// inserted text).
    pub fn replace_utf8(&mut self, range: Range<u32>, text: &str, attrs: &[Attribute]) {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len() as u32;
        let spans = attrs
            .iter()
            .cloned()
            .map(|a| AttributeSpan::new(0..len, a));
        let range = self.clamp_range(range);
        self.splice(range, &chars, spans);
    }

    /// Replaces `range` with raw UTF-32 scalar values. Invalid scalar
    /// values are clamped to `U+FFFD` rather than erroring (§4.B failure
    /// mode: clamp, don't error).
    pub fn replace_utf32(&mut self, range: Range<u32>, codepoints: &[u32], attrs: &[Attribute]) {
        let chars: Vec<char> = codepoints
            .iter()
            .map(|&cp| char::from_u32(cp).unwrap_or('\u{FFFD}'))
            .collect();
        let len = chars.len() as u32;
        let spans = attrs
            .iter()
            .cloned()
            .map(|a| AttributeSpan::new(0..len, a));
        let range = self.clamp_range(range);
        self.splice(range, &chars, spans);
    }

    pub fn remove(&mut self, range: Range<u32>) {
        let range = self.clamp_range(range);
        self.splice(range, &[], core::iter::empty());
    }

    fn splice(
        &mut self,
        range: Range<u32>,
        inserted_text: &[char],
        inserted_spans: impl IntoIterator<Item = AttributeSpan>,
    ) {
        let pos = range.start;
        let removed = range.end - range.start;
        let inserted = inserted_text.len() as u32;

        self.text.splice(
            range.start as usize..range.end as usize,
            inserted_text.iter().copied(),
        );

        let mut remapped = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            for (s, e) in map_span(span.range.start, span.range.end, pos, removed, inserted) {
                remapped.push(AttributeSpan {
                    range: s..e,
                    value: span.value.clone(),
                    payload: span.payload.clone(),
                });
            }
        }
        for mut span in inserted_spans {
            span.range = (span.range.start + pos)..(span.range.end + pos);
            remapped.push(span);
        }
        remapped.sort_by_key(|s| s.range.start);
        self.spans = remapped;
        self.merge_adjacent();
    }

    /// Sets `attr` uniformly over `range`, clearing any overlapping span of
    /// the same kind first (§4.B).
    pub fn add_attribute(&mut self, range: Range<u32>, attr: Attribute) {
        let range = self.clamp_range(range);
        if range.start == range.end {
            return;
        }
        self.clear_attribute(range.clone(), attr.kind());
        self.spans.push(AttributeSpan::new(range, attr));
        self.spans.sort_by_key(|s| s.range.start);
        self.merge_adjacent();
    }

    /// Removes every span of `kind` that overlaps `range`, splitting spans
    /// that only partially overlap (§4.B).
    pub fn clear_attribute(&mut self, range: Range<u32>, kind: AttributeKind) {
        let range = self.clamp_range(range);
        let mut result = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            if span.value.kind() != kind || span.range.end <= range.start || span.range.start >= range.end {
                result.push(span);
                continue;
            }
            if span.range.start < range.start {
                result.push(AttributeSpan {
                    range: span.range.start..range.start,
                    value: span.value.clone(),
                    payload: span.payload.clone(),
                });
            }
            if span.range.end > range.end {
                result.push(AttributeSpan {
                    range: range.end..span.range.end,
                    value: span.value,
                    payload: span.payload,
                });
            }
        }
        result.sort_by_key(|s| s.range.start);
        self.spans = result;
    }

    /// `true` iff every codepoint in `range` is covered by a span with a
    /// value equal to `attr`.
    pub fn has_attribute(&self, range: Range<u32>, attr: &Attribute) -> bool {
        let range = self.clamp_range(range);
        if range.start == range.end {
            return false;
        }
        let kind = attr.kind();
        let mut cursor = range.start;
        let mut matching: Vec<&AttributeSpan> =
            self.spans.iter().filter(|s| s.value.kind() == kind).collect();
        matching.sort_by_key(|s| s.range.start);
        for span in matching {
            if span.range.start > cursor {
                break;
            }
            if span.range.start <= cursor && span.range.end > cursor && span.value == *attr {
                cursor = span.range.end;
                if cursor >= range.end {
                    return true;
                }
            }
        }
        false
    }

    /// Invokes `callback` once per maximal run where the active span set
    /// is constant, in ascending order (§4.B, boundary-sweep algorithm
    /// generalized from `attributed_text::AttributeSegments`).
    pub fn iterate_attribute_runs(&self, mut callback: impl FnMut(Range<u32>, &[AttributeSpan])) {
        if self.spans.is_empty() {
            callback(0..self.len(), &[]);
            return;
        }
        let mut boundaries: Vec<u32> = Vec::with_capacity(self.spans.len() * 2 + 2);
        boundaries.push(0);
        boundaries.push(self.len());
        for span in &self.spans {
            boundaries.push(span.range.start);
            boundaries.push(span.range.end);
        }
        boundaries.sort_unstable();
        boundaries.dedup();

        let mut active: SmallVec<[&AttributeSpan; 8]> = SmallVec::new();
        for window in boundaries.windows(2) {
            let (start, end) = (window[0], window[1]);
            if start >= end {
                continue;
            }
            active.retain(|s| s.range.end > start);
            for span in &self.spans {
                if span.range.start <= start
                    && span.range.end > start
                    && !active.iter().any(|a| core::ptr::eq(*a, span))
                {
                    active.push(span);
                }
            }
            let slice: Vec<AttributeSpan> = active.iter().map(|s| (*s).clone()).collect();
            callback(start..end, &slice);
        }
    }

    fn merge_adjacent(&mut self) {
        if self.spans.len() < 2 {
            return;
        }
        self.spans.sort_by_key(|s| s.range.start);
        let mut write = 0;
        for read in 1..self.spans.len() {
            let merges = self.spans[write].range.end >= self.spans[read].range.start
                && self.spans[write].mergeable_with(&self.spans[read]);
            if merges {
                let end = self.spans[read].range.end;
                self.spans[write].range.end = self.spans[write].range.end.max(end);
            } else {
                write += 1;
                self.spans.swap(write, read);
            }
        }
        self.spans.truncate(write + 1);
    }
}

/// Maps a span's `[s, e)` through an edit at `pos` that removes `removed`
/// codepoints and inserts `inserted` codepoints. A span strictly
/// containing the edited range splits into a left and right remainder;
/// a span strictly inside the edited range is dropped.
fn map_span(s: u32, e: u32, pos: u32, removed: u32, inserted: u32) -> SmallVec<[(u32, u32); 2]> {
    let removed_end = pos + removed;
    let delta = inserted as i64 - removed as i64;
    let shift = |x: u32| (x as i64 + delta) as u32;

    let mut out = SmallVec::new();
    if e <= pos {
        out.push((s, e));
    } else if s >= removed_end {
        out.push((shift(s), shift(e)));
    } else {
        if s < pos {
            out.push((s, pos));
        }
        if e > removed_end {
            out.push((pos + inserted, shift(e)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attribute;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn insert_in_the_middle_of_a_styled_word() {
        let mut buf = TextBuffer::from_chars(chars("Hello"));
        buf.add_attribute(0..5, Attribute::FontSize(15.0));
        buf.replace_utf8(0..4, "Turb", &[Attribute::FontSize(30.0)]);
        let text: String = buf.text().iter().collect();
        assert_eq!(text, "Turbo");
        assert_eq!(buf.spans().len(), 2);
        assert_eq!(buf.spans()[0].range, 0..4);
        assert_eq!(buf.spans()[0].value, Attribute::FontSize(30.0));
        assert_eq!(buf.spans()[1].range, 4..5);
        assert_eq!(buf.spans()[1].value, Attribute::FontSize(15.0));
    }

    #[test]
    fn removal_merges_straddled_span() {
        let mut buf = TextBuffer::from_chars(chars("Hello world"));
        buf.add_attribute(0..11, Attribute::FontWeight(700.0));
        buf.remove(5..6);
        assert_eq!(buf.spans().len(), 1);
        assert_eq!(buf.spans()[0].range, 0..10);
    }

    #[test]
    fn add_attribute_then_has_attribute() {
        let mut buf = TextBuffer::from_chars(chars("abcdef"));
        let attr = Attribute::FontWeight(700.0);
        buf.add_attribute(1..4, attr.clone());
        assert!(buf.has_attribute(1..4, &attr));
        assert!(!buf.has_attribute(0..4, &attr));
    }

    #[test]
    fn clear_attribute_removes_every_span_of_kind() {
        let mut buf = TextBuffer::from_chars(chars("abcdef"));
        buf.add_attribute(0..6, Attribute::FontWeight(700.0));
        buf.clear_attribute(0..6, AttributeKind::FontWeight);
        assert!(buf
            .spans()
            .iter()
            .all(|s| s.value.kind() != AttributeKind::FontWeight));
    }

    #[test]
    fn toggle_attribute_twice_is_identity() {
        let mut buf = TextBuffer::from_chars(chars("abcdef"));
        let attr = Attribute::FontWeight(700.0);
        let before = buf.clone();
        // toggle on
        buf.add_attribute(0..6, attr.clone());
        // toggle off (simulating `toggle_attribute`'s "clear if uniformly set")
        buf.clear_attribute(0..6, attr.kind());
        assert_eq!(buf.text(), before.text());
        assert_eq!(buf.spans(), before.spans());
    }

    #[test]
    fn mutation_length_invariant() {
        let mut buf = TextBuffer::from_chars(chars("Hello world"));
        let before_len = buf.len();
        buf.replace_utf8(0..5, "Hi", &[]);
        assert_eq!(buf.len(), before_len - 5 + 2);
    }
}
