// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bidirectional algorithm wrapper (UAX#9), delegating to the
//! `unicode-bidi` crate. Grounded on the conceptual shape of the
//! teacher's legacy `parley::bidi::BidiResolver` (base level, per-
//! codepoint levels, run extraction) but backed by `unicode-bidi`'s
//! `BidiInfo` rather than a hand-rolled resolver, since the teacher
//! workspace's active `parley` crate itself depends on `unicode-bidi`.

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use unicode_bidi::{BidiInfo, Level};

use crate::attributes::BaseDirection;

/// A maximal run of codepoints sharing one bidi embedding level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BidiRun {
    pub range: Range<u32>,
    pub level: u8,
}

impl BidiRun {
    pub fn is_rtl(&self) -> bool {
        self.level % 2 == 1
    }
}

/// Resolves bidi embedding levels for `text` under `base_direction`,
/// returning the run list and the paragraph's base level.
pub fn resolve_bidi(text: &[char], base_direction: BaseDirection) -> (Vec<BidiRun>, u8) {
    if text.is_empty() {
        return (Vec::new(), base_level_for(base_direction, text));
    }

    let as_string: String = text.iter().collect();
    let default_level = match base_direction {
        BaseDirection::Ltr => Some(Level::ltr()),
        BaseDirection::Rtl => Some(Level::rtl()),
        BaseDirection::Auto => None,
    };
    let info = BidiInfo::new(&as_string, default_level);
    let base_level = info
        .paragraphs
        .first()
        .map_or(0, |p| p.level.number());

    // `unicode-bidi` works over UTF-8 byte offsets; this crate's offsets are
    // codepoint offsets, so walk `levels` (one entry per byte) converted to
    // one entry per `char` by tracking each character's UTF-8 width.
    let mut runs = Vec::new();
    let mut byte_offset = 0usize;
    let mut run_start = 0u32;
    let mut run_level = None;
    for (i, c) in text.iter().enumerate() {
        let level = info.levels.get(byte_offset).copied().unwrap_or(Level::ltr());
        match run_level {
            None => run_level = Some(level),
            Some(current) if current == level => {}
            Some(current) => {
                runs.push(BidiRun {
                    range: run_start..i as u32,
                    level: current.number(),
                });
                run_start = i as u32;
                run_level = Some(level);
            }
        }
        byte_offset += c.len_utf8();
    }
    if let Some(level) = run_level {
        runs.push(BidiRun {
            range: run_start..text.len() as u32,
            level: level.number(),
        });
    }

    (runs, base_level)
}

fn base_level_for(base_direction: BaseDirection, _text: &[char]) -> u8 {
    match base_direction {
        BaseDirection::Ltr | BaseDirection::Auto => 0,
        BaseDirection::Rtl => 1,
    }
}

/// Reorders a sequence of visual-order run indices per UBA rule L2, given
/// each run's embedding level in logical order.
pub fn reorder_visual(levels: &[u8]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..levels.len()).collect();
    if levels.is_empty() {
        return order;
    }
    let max_level = *levels.iter().max().unwrap();
    let min_odd = levels.iter().filter(|&&l| l % 2 == 1).min().copied().unwrap_or(max_level + 1);
    let mut level = max_level;
    while level >= min_odd && level > 0 {
        let mut i = 0;
        while i < order.len() {
            if levels[order[i]] >= level {
                let start = i;
                while i < order.len() && levels[order[i]] >= level {
                    i += 1;
                }
                order[start..i].reverse();
            } else {
                i += 1;
            }
        }
        if level == 0 {
            break;
        }
        level -= 1;
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ltr_only_text_is_a_single_run() {
        let text: Vec<char> = "hello".chars().collect();
        let (runs, base_level) = resolve_bidi(&text, BaseDirection::Ltr);
        assert_eq!(base_level, 0);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].range, 0..5);
        assert!(!runs[0].is_rtl());
    }

    #[test]
    fn visual_reorder_reverses_single_rtl_run() {
        let order = reorder_visual(&[0, 1, 1, 1, 0]);
        assert_eq!(order, vec![0, 3, 2, 1, 4]);
    }
}
