// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Caret iterator: walks a line's clusters producing caret stops with
//! dual leading/trailing pairs at bidi direction flips (§4.J). Grounded
//! on `parley::editing::cursor::Cursor`'s visual-order caret walk.

use alloc::vec::Vec;

use crate::layout::Layout;

use super::selection::Affinity;

/// "Skribidi" mode inserts an extra leading/trailing stop pair at every
/// direction flip so the caret can be explicitly placed on either side
/// of a bidi boundary; "Simple" mode advances one grapheme regardless of
/// direction (§4.I "Caret movement").
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CaretMode {
    Skribidi,
    Simple,
}

/// One side of a caret stop: the logical offset, affinity, and writing
/// direction of the text immediately on that side (§4.J).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CaretSide {
    pub offset: u32,
    pub affinity: Affinity,
    pub rtl: bool,
}

/// A place the caret may stop, at visual `x` with `advance` width to the
/// next stop; `left`/`right` describe the logical text on each visual
/// side (§4.J).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CaretStop {
    pub x: f32,
    pub advance: f32,
    pub left: CaretSide,
    pub right: CaretSide,
}

fn rtl_for_offset(layout: &Layout, offset: u32) -> bool {
    layout
        .runs
        .iter()
        .find(|r| r.text_range.start <= offset && offset < r.text_range.end)
        .map(|r| r.rtl)
        .unwrap_or(false)
}

/// Produces the caret stops for `layout.lines[line_index]`, in visual
/// (left-to-right on screen) order, including `SOL`/`EOL` stops at the
/// ends (§4.J).
pub fn caret_stops(layout: &Layout, line_index: usize, mode: CaretMode) -> Vec<CaretStop> {
    let Some(line) = layout.lines.get(line_index) else {
        return Vec::new();
    };

    let start_idx = layout.clusters.partition_point(|c| c.text_offset < line.text_range.start);
    let end_idx = layout.clusters.partition_point(|c| c.text_offset < line.text_range.end);
    let clusters = &layout.clusters[start_idx..end_idx];

    let mut stops = Vec::with_capacity(clusters.len() + 2);
    let mut x = line.bounds.x;
    let sol_rtl = rtl_for_offset(layout, line.text_range.start);

    stops.push(CaretStop {
        x,
        advance: 0.0,
        left: CaretSide { offset: line.text_range.start, affinity: Affinity::StartOfLine, rtl: sol_rtl },
        right: CaretSide { offset: line.text_range.start, affinity: Affinity::StartOfLine, rtl: sol_rtl },
    });

    let mut prev_rtl: Option<bool> = None;
    for cluster in clusters {
        let width: f32 = layout.glyphs
            [cluster.glyph_offset as usize..(cluster.glyph_offset + cluster.glyph_count) as usize]
            .iter()
            .map(|g| g.advance_x)
            .sum();
        let rtl = rtl_for_offset(layout, cluster.text_offset);

        if mode == CaretMode::Skribidi {
            if let Some(prev) = prev_rtl {
                if prev != rtl {
                    stops.push(CaretStop {
                        x,
                        advance: 0.0,
                        left: CaretSide { offset: cluster.text_offset, affinity: Affinity::Trailing, rtl: prev },
                        right: CaretSide { offset: cluster.text_offset, affinity: Affinity::Leading, rtl },
                    });
                }
            }
        }

        stops.push(CaretStop {
            x,
            advance: width,
            left: CaretSide { offset: cluster.text_offset, affinity: Affinity::Leading, rtl },
            right: CaretSide {
                offset: cluster.text_offset + cluster.text_count,
                affinity: Affinity::Trailing,
                rtl,
            },
        });

        x += width;
        prev_rtl = Some(rtl);
    }

    let eol_rtl = prev_rtl.unwrap_or(sol_rtl);
    stops.push(CaretStop {
        x,
        advance: 0.0,
        left: CaretSide { offset: line.text_range.end, affinity: Affinity::EndOfLine, rtl: eol_rtl },
        right: CaretSide { offset: line.text_range.end, affinity: Affinity::EndOfLine, rtl: eol_rtl },
    });

    stops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::BaseDirection;
    use crate::font::{FontHandle, FontMetrics, GlyphBounds, FontProvider};
    use crate::layout::LayoutParams;
    use crate::shape::ShaperCache;

    struct FixedFont;
    impl FontProvider for FixedFont {
        fn match_font(&self, _: &str, _: f32, _: crate::attributes::FontStyle, _: f32, _: u16, _: bool) -> Option<FontHandle> {
            Some(FontHandle(1))
        }
        fn metrics(&self, _: FontHandle, _: f32) -> FontMetrics {
            FontMetrics {
                units_per_em: 1000,
                ascender: 800.0,
                descender: -200.0,
                cap_height: 700.0,
                x_height: 500.0,
                underline_offset: -100.0,
                underline_thickness: 50.0,
            }
        }
        fn glyph_bounds(&self, _: FontHandle, _: u16, size: f32) -> GlyphBounds {
            GlyphBounds { x_min: 0.0, y_min: 0.0, x_max: size * 0.6, y_max: size }
        }
        fn nominal_glyph(&self, _: FontHandle, c: char) -> u16 {
            c as u16
        }
        fn fallback_chain(&self, _: u16, _: bool) -> Vec<FontHandle> {
            Vec::new()
        }
    }

    #[test]
    fn stops_have_non_decreasing_x() {
        let text: Vec<char> = "hello".chars().collect();
        let mut shaper = ShaperCache::new();
        let layout = crate::layout::build_layout(
            &text,
            &[],
            &LayoutParams::default(),
            BaseDirection::Ltr,
            &FixedFont,
            &mut shaper,
        );
        let stops = caret_stops(&layout, 0, CaretMode::Skribidi);
        for window in stops.windows(2) {
            assert!(window[1].x >= window[0].x);
        }
        assert_eq!(stops.first().unwrap().left.affinity, Affinity::StartOfLine);
        assert_eq!(stops.last().unwrap().left.affinity, Affinity::EndOfLine);
    }
}
