// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-codepoint Unicode properties: script, bidi class/level, grapheme/
//! word/line-break opportunities, emoji flag (§4.C).
//!
//! A pure function of its input: given the same codepoints and paragraph
//! base direction, [`scan`] always produces the same [`TextProperties`];
//! no global state is consulted or mutated. Grounded on the modern,
//! icu-based analysis pass in `parley::analysis` (as opposed to the
//! legacy swash-based `parley::context::analyze_text`/`parley::bidi`,
//! which the teacher workspace itself has superseded).

mod bidi;
mod segment;

pub use bidi::{reorder_visual, resolve_bidi, BidiRun};
pub use segment::{grapheme_boundaries, line_breaks, word_boundaries, LineBreak};

use alloc::vec::Vec;

use icu_properties::props::{Emoji, EmojiPresentation, Script};
use icu_properties::{CodePointMapData, CodePointSetData};

use crate::attributes::{BaseDirection, TextWrap};

/// Per-codepoint flags packed into one byte, matching the `flags` field of
/// `text_properties[]` (§3 "Layout").
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CodepointFlags(u8);

impl CodepointFlags {
    pub const GRAPHEME_BREAK: u8 = 1 << 0;
    pub const WORD_BREAK: u8 = 1 << 1;
    pub const LINE_BREAK_ALLOW: u8 = 1 << 2;
    pub const LINE_BREAK_MUST: u8 = 1 << 3;
    pub const EMOJI: u8 = 1 << 4;

    pub fn set(&mut self, bit: u8) {
        self.0 |= bit;
    }

    pub fn has(self, bit: u8) -> bool {
        self.0 & bit != 0
    }
}

/// One entry of `text_properties[]`: script id, bidi embedding level, and
/// packed break/emoji flags for a single codepoint.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CodepointProperties {
    pub script: u16,
    pub bidi_level: u8,
    pub flags: CodepointFlags,
}

/// The result of scanning a paragraph's codepoints (§4.C step "Scan").
#[derive(Clone, Debug, Default)]
pub struct TextProperties {
    pub per_codepoint: Vec<CodepointProperties>,
    pub bidi_runs: Vec<BidiRun>,
    pub base_level: u8,
}

/// Scans `text` and produces per-codepoint properties plus bidi runs.
/// Pure: depends only on `text`, `base_direction`, and `wrap`.
pub fn scan(text: &[char], base_direction: BaseDirection, wrap: TextWrap) -> TextProperties {
    let len = text.len();
    let mut per_codepoint = alloc::vec![CodepointProperties::default(); len];

    let script_map = CodePointMapData::<Script>::new();
    let emoji_set = CodePointSetData::new::<Emoji>();
    let emoji_presentation_set = CodePointSetData::new::<EmojiPresentation>();

    for (i, &c) in text.iter().enumerate() {
        per_codepoint[i].script = script_map.as_borrowed().get(c).to_icu4c_value();
        if emoji_set.as_borrowed().contains(c) || emoji_presentation_set.as_borrowed().contains(c) {
            per_codepoint[i].flags.set(CodepointFlags::EMOJI);
        }
    }

    for b in grapheme_boundaries(text) {
        if (b as usize) < len {
            per_codepoint[b as usize].flags.set(CodepointFlags::GRAPHEME_BREAK);
        }
    }
    for b in word_boundaries(text) {
        if (b as usize) < len {
            per_codepoint[b as usize].flags.set(CodepointFlags::WORD_BREAK);
        }
    }
    for lb in line_breaks(text, wrap) {
        if (lb.offset as usize) < len {
            let bit = if lb.mandatory {
                CodepointFlags::LINE_BREAK_MUST
            } else {
                CodepointFlags::LINE_BREAK_ALLOW
            };
            per_codepoint[lb.offset as usize].flags.set(bit);
        }
    }

    let (bidi_runs, base_level) = resolve_bidi(text, base_direction);
    for run in &bidi_runs {
        for i in run.range.start as usize..run.range.end as usize {
            per_codepoint[i].bidi_level = run.level;
        }
    }

    TextProperties {
        per_codepoint,
        bidi_runs,
        base_level,
    }
}
