// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy line breaker: accumulate advance widths; at `layout_width`,
//! commit the last viable break (§4.E step 4). Grounded on
//! `parley::layout::line::greedy`'s accumulate-then-commit algorithm.

use alloc::vec::Vec;
use core::ops::Range;

use crate::attributes::TextWrap;
use crate::unicode::LineBreak;

/// A candidate place to end a line: either a soft break (line may end
/// here if needed) or a mandatory break (line must end here).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BreakOpportunity {
    pub offset: u32,
    pub mandatory: bool,
}

/// Greedily partitions `[0, len)` into line ranges, given each
/// codepoint's advance width and the set of line-break opportunities.
/// `layout_width` of `f32::INFINITY` disables wrapping entirely (still
/// honoring mandatory breaks). `wrap == TextWrap::None` suppresses every
/// soft break opportunity up front, so a line only ends at a mandatory
/// break regardless of `layout_width` (§4.E step 4).
pub fn break_lines(
    len: u32,
    advances: &[f32],
    breaks: &[LineBreak],
    layout_width: f32,
    wrap: TextWrap,
) -> Vec<Range<u32>> {
    if len == 0 {
        return alloc::vec![0..0];
    }

    let mut opportunities: Vec<BreakOpportunity> = breaks
        .iter()
        .filter(|b| b.mandatory || wrap != TextWrap::None)
        .map(|b| BreakOpportunity {
            offset: b.offset,
            mandatory: b.mandatory,
        })
        .collect();
    opportunities.sort_by_key(|b| b.offset);
    if opportunities.last().map(|b| b.offset) != Some(len) {
        opportunities.push(BreakOpportunity {
            offset: len,
            mandatory: true,
        });
    }

    let mut lines = Vec::new();
    let mut line_start = 0u32;
    let mut advance = 0.0f32;
    let mut last_soft_break: Option<u32> = None;

    for opp in &opportunities {
        let segment_advance: f32 = advances
            [line_start as usize..opp.offset as usize]
            .iter()
            .sum();
        let candidate_advance = advance + segment_advance;

        if opp.mandatory {
            lines.push(line_start..opp.offset);
            line_start = opp.offset;
            advance = 0.0;
            last_soft_break = None;
            continue;
        }

        if candidate_advance > layout_width && last_soft_break.is_some() {
            let break_at = last_soft_break.unwrap();
            lines.push(line_start..break_at);
            line_start = break_at;
            advance = advances[line_start as usize..opp.offset as usize].iter().sum();
            last_soft_break = Some(opp.offset);
        } else {
            advance = candidate_advance;
            last_soft_break = Some(opp.offset);
        }
    }

    if line_start < len {
        lines.push(line_start..len);
    }
    if lines.is_empty() {
        lines.push(0..len);
    }
    lines
}
