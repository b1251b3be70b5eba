// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grapheme/word/line segmentation, delegating to `icu_segmenter`.
//! Grounded on `parley::analysis::AnalysisDataSources`'s
//! `grapheme_segmenter()`/`word_segmenter()`/`line_segmenter()` methods.

use alloc::string::String;
use alloc::vec::Vec;

use icu_segmenter::{GraphemeClusterSegmenter, LineSegmenter, WordSegmenter};

use crate::attributes::TextWrap;

/// One opportunity to break a line, with whether the break is mandatory
/// (a hard break, e.g. after a paragraph separator) or merely allowed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineBreak {
    pub offset: u32,
    pub mandatory: bool,
}

fn char_offsets_to_utf16(text: &[char]) -> (String, Vec<u32>) {
    let mut s = String::with_capacity(text.len());
    let mut char_offset_at_utf16 = Vec::with_capacity(text.len() + 1);
    let mut utf16_len = 0u32;
    for (i, &c) in text.iter().enumerate() {
        char_offset_at_utf16.push(i as u32);
        s.push(c);
        utf16_len += c.len_utf16() as u32;
        let _ = utf16_len;
    }
    char_offset_at_utf16.push(text.len() as u32);
    (s, char_offset_at_utf16)
}

/// Returns codepoint offsets at which a grapheme cluster boundary falls.
pub fn grapheme_boundaries(text: &[char]) -> Vec<u32> {
    let (s, _) = char_offsets_to_utf16(text);
    let segmenter = GraphemeClusterSegmenter::new();
    utf8_breaks_to_char_offsets(text, &s, segmenter.segment_str(&s).collect())
}

/// Returns codepoint offsets at which a word boundary falls.
pub fn word_boundaries(text: &[char]) -> Vec<u32> {
    let (s, _) = char_offsets_to_utf16(text);
    let segmenter = WordSegmenter::new_auto();
    utf8_breaks_to_char_offsets(text, &s, segmenter.segment_str(&s).collect())
}

/// Returns the line break opportunities for `text`, with the word-break
/// strength switched per `wrap` (mirroring
/// `AnalysisDataSources::line_segmenter`'s `Normal`/`BreakAll`/`KeepAll`
/// branches).
pub fn line_breaks(text: &[char], wrap: TextWrap) -> Vec<LineBreak> {
    let (s, _) = char_offsets_to_utf16(text);
    let options = match wrap {
        TextWrap::None => icu_segmenter::options::LineBreakOptions::default(),
        TextWrap::Word => icu_segmenter::options::LineBreakOptions::default(),
        TextWrap::WordChar => {
            let mut o = icu_segmenter::options::LineBreakOptions::default();
            o.strictness = Some(icu_segmenter::options::LineBreakStrictness::Anywhere);
            o
        }
    };
    let segmenter = LineSegmenter::new_auto(options);
    let byte_breaks: Vec<usize> = segmenter.segment_str(&s).collect();
    let char_offsets = utf8_breaks_to_char_offsets(text, &s, byte_breaks);

    char_offsets
        .into_iter()
        .map(|offset| {
            let mandatory = offset as usize == text.len()
                || matches!(text.get(offset.saturating_sub(1) as usize), Some('\n') | Some('\u{2029}'));
            LineBreak { offset, mandatory }
        })
        .collect()
}

fn utf8_breaks_to_char_offsets(text: &[char], s: &str, byte_breaks: Vec<usize>) -> Vec<u32> {
    // Map UTF-8 byte offsets (as produced by `icu_segmenter`'s `&str`
    // entry points) back to codepoint offsets into `text`.
    let mut byte_to_char = alloc::vec![0u32; s.len() + 1];
    let mut acc = 0usize;
    for (i, c) in text.iter().enumerate() {
        byte_to_char[acc] = i as u32;
        acc += c.len_utf8();
    }
    byte_to_char[acc] = text.len() as u32;

    byte_breaks
        .into_iter()
        .map(|b| byte_to_char.get(b).copied().unwrap_or(text.len() as u32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_word_boundaries_split_on_space() {
        let text: Vec<char> = "foo bar".chars().collect();
        let boundaries = word_boundaries(&text);
        assert!(boundaries.contains(&3));
        assert!(boundaries.contains(&4));
    }

    #[test]
    fn grapheme_boundaries_cover_every_ascii_char() {
        let text: Vec<char> = "abc".chars().collect();
        let boundaries = grapheme_boundaries(&text);
        assert_eq!(boundaries, vec![0, 1, 2, 3]);
    }
}
