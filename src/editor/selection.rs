// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection and text position types (§4.I "Selection"). Grounded on
//! `parley::editing::selection::Selection` and `Cursor`'s affinity
//! handling, generalized to this core's global (cross-paragraph)
//! codepoint offsets.

use core::ops::Range;

/// Disambiguates caret placement at bidi boundaries and line wraps
/// (§4.I "Selection").
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Affinity {
    None,
    Trailing,
    Leading,
    StartOfLine,
    EndOfLine,
}

/// A single caret position: a codepoint offset plus disambiguating
/// affinity (§4.I "a text position is `{codepoint offset, affinity}`").
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextPosition {
    pub offset: u32,
    pub affinity: Affinity,
}

impl TextPosition {
    pub fn new(offset: u32, affinity: Affinity) -> Self {
        Self { offset, affinity }
    }
}

/// An anchor/focus pair spanning a (possibly collapsed) range (§4.I
/// "Selection").
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Selection {
    pub anchor: TextPosition,
    pub focus: TextPosition,
}

impl Selection {
    pub fn collapsed(pos: TextPosition) -> Self {
        Self { anchor: pos, focus: pos }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor.offset == self.focus.offset
    }

    /// The underlying codepoint range, normalized so `start <= end`
    /// regardless of which end is the anchor.
    pub fn range(&self) -> Range<u32> {
        self.anchor.offset.min(self.focus.offset)..self.anchor.offset.max(self.focus.offset)
    }

    #[must_use]
    pub fn collapse_to_focus(&self) -> Self {
        Self::collapsed(self.focus)
    }

    /// Applies the "rebase after splice" rule for a `replace(range,
    /// incoming)` mutation: endpoints before the range are unchanged,
    /// endpoints after shift by `inserted_len - (range.end -
    /// range.start)`, endpoints inside collapse to the end of the
    /// inserted text (§4.I "Text mutation").
    #[must_use]
    pub fn rebase(&self, range: Range<u32>, inserted_len: u32) -> Self {
        let delta = inserted_len as i64 - (range.end - range.start) as i64;
        let map = |p: TextPosition| -> TextPosition {
            if p.offset <= range.start {
                p
            } else if p.offset >= range.end {
                TextPosition::new((p.offset as i64 + delta).max(0) as u32, p.affinity)
            } else {
                TextPosition::new(range.start + inserted_len, Affinity::Trailing)
            }
        };
        Self { anchor: map(self.anchor), focus: map(self.focus) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_before_range_is_unchanged() {
        let sel = Selection::collapsed(TextPosition::new(2, Affinity::Leading));
        let rebased = sel.rebase(5..8, 2);
        assert_eq!(rebased.focus.offset, 2);
    }

    #[test]
    fn endpoint_after_range_shifts_by_length_delta() {
        let sel = Selection::collapsed(TextPosition::new(10, Affinity::Leading));
        let rebased = sel.rebase(5..8, 2); // removed 3, inserted 2: delta -1
        assert_eq!(rebased.focus.offset, 9);
    }

    #[test]
    fn endpoint_inside_range_collapses_to_end_of_insertion() {
        let sel = Selection::collapsed(TextPosition::new(6, Affinity::Leading));
        let rebased = sel.rebase(5..8, 4);
        assert_eq!(rebased.focus.offset, 9);
        assert_eq!(rebased.focus.affinity, Affinity::Trailing);
    }
}
