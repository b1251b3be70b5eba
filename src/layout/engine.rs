// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ten-step layout pipeline (§4.E): scan, partition, shape,
//! line-break, order, align, decorations, overflow, markers, emit.

#[cfg(feature = "libm")]
#[allow(unused_imports)]
use core_maths::CoreFloat;

use alloc::vec::Vec;
use core::ops::Range;

use crate::attributes::{
    Attribute, AttributeKind, AttributeSpan, BaseDirection, FontFeature, FontStyle,
    HorizontalAlign, TextOverflow,
};
use crate::font::{FontHandle, FontProvider};
use crate::shape::{partition_runs, ShaperCache};
use crate::unicode::{self, grapheme_boundaries};

use super::data::{Cluster, Decoration, Glyph, Layout, LayoutParams, Padding, Rect, Run, RunKind};
use super::decorations::merge_adjacent;
use super::line_break::break_lines;

const OBJECT_REPLACEMENT: char = '\u{FFFC}';

fn active_attribute<'a>(spans: &'a [AttributeSpan], kind: AttributeKind, offset: u32) -> Option<&'a Attribute> {
    spans
        .iter()
        .find(|s| s.value.kind() == kind && s.range.start <= offset && s.range.end > offset)
        .map(|s| &s.value)
}

fn font_size_at(spans: &[AttributeSpan], offset: u32) -> f32 {
    match active_attribute(spans, AttributeKind::FontSize, offset) {
        Some(Attribute::FontSize(s)) => *s,
        _ => 16.0,
    }
}

fn font_family_at(spans: &[AttributeSpan], offset: u32) -> alloc::string::String {
    match active_attribute(spans, AttributeKind::FontFamily, offset) {
        Some(Attribute::FontFamily(f)) => f.clone(),
        _ => "sans-serif".into(),
    }
}

fn font_weight_at(spans: &[AttributeSpan], offset: u32) -> f32 {
    match active_attribute(spans, AttributeKind::FontWeight, offset) {
        Some(Attribute::FontWeight(w)) => *w,
        _ => 400.0,
    }
}

fn font_style_at(spans: &[AttributeSpan], offset: u32) -> FontStyle {
    match active_attribute(spans, AttributeKind::FontStyle, offset) {
        Some(Attribute::FontStyle(s)) => *s,
        _ => FontStyle::Normal,
    }
}

fn indent_level_at(spans: &[AttributeSpan]) -> u32 {
    spans
        .iter()
        .find(|s| s.value.kind() == AttributeKind::IndentLevel)
        .and_then(|s| match &s.value {
            Attribute::IndentLevel(l) => Some(*l),
            _ => None,
        })
        .unwrap_or(0)
}

fn indent_increment_at(spans: &[AttributeSpan]) -> f32 {
    spans
        .iter()
        .find(|s| s.value.kind() == AttributeKind::IndentIncrement)
        .and_then(|s| match &s.value {
            Attribute::IndentIncrement(v) => Some(*v),
            _ => None,
        })
        .unwrap_or(0.0)
}

/// Builds a layout snapshot for `text` (one paragraph's codepoints) given
/// its attribute `spans`, `params`, and a font provider. `base_direction`
/// resolves the paragraph's bidi base level (§4.C).
pub fn build_layout(
    text: &[char],
    spans: &[AttributeSpan],
    params: &LayoutParams,
    base_direction: BaseDirection,
    provider: &dyn FontProvider,
    shaper_cache: &mut ShaperCache,
) -> Layout {
    let len = text.len() as u32;
    if len == 0 {
        return Layout::default();
    }

    // 1. Scan.
    let props = unicode::scan(text, base_direction, params.wrap);
    let scripts: Vec<u16> = props.per_codepoint.iter().map(|p| p.script).collect();
    let bidi_levels: Vec<u8> = props.per_codepoint.iter().map(|p| p.bidi_level).collect();

    // 2. Partition into shaping runs, resolving a font handle per codepoint.
    let runs_input = partition_runs(len, &scripts, &bidi_levels, |offset| {
        let size = font_size_at(spans, offset);
        let family = font_family_at(spans, offset);
        let weight = font_weight_at(spans, offset);
        let style = font_style_at(spans, offset);
        let emoji = props
            .per_codepoint
            .get(offset as usize)
            .is_some_and(|p| p.flags.has(unicode::CodepointFlags::EMOJI));
        let script = scripts.get(offset as usize).copied().unwrap_or(0);
        let handle = provider
            .match_font(&family, weight, style, 100.0, script, emoji)
            .unwrap_or(FontHandle(0));
        (handle, size, Vec::<FontFeature>::new(), None)
    });

    // 3. Shape each run, retrying against the fallback chain on `.notdef`.
    let mut glyphs: Vec<Glyph> = Vec::new();
    let mut runs: Vec<Run> = Vec::with_capacity(runs_input.len());
    for run in &runs_input {
        let mut shaped = shaper_cache.shape_run(run, text, provider);
        if let Ok(result) = &shaped {
            if result.has_notdef {
                let emoji = props
                    .per_codepoint
                    .get(run.range.start as usize)
                    .is_some_and(|p| p.flags.has(unicode::CodepointFlags::EMOJI));
                for fallback in provider.fallback_chain(run.script, emoji) {
                    let mut retry_run = run.clone();
                    retry_run.font = fallback;
                    if let Ok(retry) = shaper_cache.shape_run(&retry_run, text, provider) {
                        if !retry.has_notdef {
                            shaped = Ok(retry);
                            break;
                        }
                    }
                }
            }
        }
        let result = shaped.unwrap_or_default();
        let glyph_start = glyphs.len() as u32;
        for g in &result.glyphs {
            glyphs.push(Glyph {
                glyph_id: g.glyph_id,
                advance_x: g.advance_x,
                offset_x: g.offset_x,
                offset_y: g.offset_y,
                cluster: g.cluster,
            });
        }
        let glyph_end = glyphs.len() as u32;
        runs.push(Run {
            kind: if text[run.range.start as usize] == OBJECT_REPLACEMENT {
                RunKind::Object
            } else {
                RunKind::Text
            },
            rtl: run.rtl,
            script: run.script,
            font: Some(run.font),
            font_size: run.font_size,
            attributes_fingerprint: 0,
            bounds: Rect::default(),
            padding: Padding::default(),
            glyph_range: glyph_start..glyph_end,
            cluster_range: 0..0,
            text_range: run.range.clone(),
        });
    }

    // Clusters: one per grapheme boundary, mapping to the glyphs whose
    // `cluster` field falls in that grapheme's text range.
    let grapheme_bounds = grapheme_boundaries(text);
    let mut clusters = Vec::with_capacity(grapheme_bounds.len().saturating_sub(1));
    for window in grapheme_bounds.windows(2) {
        let (start, end) = (window[0], window[1]);
        let glyph_start = glyphs.partition_point(|g| g.cluster < start) as u32;
        let glyph_end = glyphs.partition_point(|g| g.cluster < end) as u32;
        clusters.push(Cluster {
            text_offset: start,
            text_count: end - start,
            glyph_offset: glyph_start,
            glyph_count: glyph_end.saturating_sub(glyph_start),
        });
    }
    for run in &mut runs {
        let start = clusters.partition_point(|c| c.text_offset < run.text_range.start) as u32;
        let end = clusters.partition_point(|c| c.text_offset < run.text_range.end) as u32;
        run.cluster_range = start..end;
    }

    // Per-codepoint advance, used by the line breaker; a codepoint with
    // no cluster (shouldn't happen) contributes zero width.
    let mut advances = alloc::vec![0.0f32; len as usize];
    for cluster in &clusters {
        let width: f32 = glyphs[cluster.glyph_offset as usize..(cluster.glyph_offset + cluster.glyph_count) as usize]
            .iter()
            .map(|g| g.advance_x)
            .sum();
        if cluster.text_count > 0 {
            advances[cluster.text_offset as usize] = width;
        }
    }
    for (i, &c) in text.iter().enumerate() {
        if c == '\t' {
            let increment = params.tab_stop_increment.max(1.0);
            let consumed: f32 = advances[..i].iter().sum();
            let next_stop = ((consumed / increment).floor() + 1.0) * increment;
            advances[i] = next_stop - consumed;
        }
    }

    // 4. Line break.
    let line_ranges = break_lines(len, &advances, &line_break_list(&props), params.layout_width, params.wrap);

    // 5. Order + 6. Align + emit lines.
    let indent_level = indent_level_at(spans);
    let indent_increment = indent_increment_at(spans);
    let leading_indent = indent_level as f32 * indent_increment;

    let mut lines = Vec::with_capacity(line_ranges.len());
    let mut run_cursor = 0usize;
    let mut y = 0.0f32;
    let mut max_width = 0.0f32;
    for range in &line_ranges {
        let line_width: f32 = advances[range.start as usize..range.end as usize].iter().sum();
        let x_offset = match params.horizontal_align {
            HorizontalAlign::Start | HorizontalAlign::Left => leading_indent,
            HorizontalAlign::End | HorizontalAlign::Right => {
                (params.layout_width - line_width).max(leading_indent)
            }
            HorizontalAlign::Center => ((params.layout_width - line_width) / 2.0).max(leading_indent),
        };

        let run_start = run_cursor;
        while run_cursor < runs.len() && runs[run_cursor].text_range.start < range.end {
            run_cursor += 1;
        }
        let run_end = run_cursor;

        // 5. Order: reorder this line's runs into visual order per UBA
        // rule L2 before they're emitted (§4.E step 5). `runs` is mutated
        // in place; only the already-consumed `[run_start, run_end)` slice
        // moves, so `run_cursor`'s forward walk above is unaffected.
        if run_end > run_start {
            let levels: Vec<u8> = runs[run_start..run_end]
                .iter()
                .map(|r| bidi_levels.get(r.text_range.start as usize).copied().unwrap_or(0))
                .collect();
            let order = unicode::reorder_visual(&levels);
            let visual: Vec<Run> = order.iter().map(|&i| runs[run_start + i].clone()).collect();
            runs[run_start..run_end].clone_from_slice(&visual);
        }

        let size_at_line_start = font_size_at(spans, range.start);
        let ascender = size_at_line_start * 0.8;
        let descender = size_at_line_start * 0.2;
        let line_height = ascender + descender;

        lines.push(super::data::Line {
            text_range: range.clone(),
            run_range: run_start as u32..run_end as u32,
            baseline: y + ascender,
            ascender,
            descender,
            bounds: Rect {
                x: x_offset,
                y,
                width: line_width,
                height: line_height,
            },
            culling_bounds: Rect {
                x: x_offset,
                y,
                width: line_width,
                height: line_height,
            },
            common_glyph_bounds: Rect {
                x: x_offset,
                y,
                width: line_width,
                height: line_height,
            },
            last_grapheme_offset: grapheme_bounds
                .iter()
                .rev()
                .find(|&&b| b <= range.end)
                .copied()
                .unwrap_or(range.start),
        });
        max_width = max_width.max(line_width + leading_indent);
        y += line_height;
    }

    // 7. Decorations.
    let mut decorations = Vec::new();
    for span in spans {
        if let Attribute::Decoration(d) = &span.value {
            if let Some(line) = lines
                .iter()
                .find(|l| l.text_range.start < span.range.end && l.text_range.end > span.range.start)
            {
                let position: f32 = advances[line.text_range.start as usize..span.range.start.max(line.text_range.start) as usize]
                    .iter()
                    .sum();
                let length: f32 = advances
                    [span.range.start.max(line.text_range.start) as usize
                        ..span.range.end.min(line.text_range.end) as usize]
                    .iter()
                    .sum();
                decorations.push(Decoration {
                    style: d.style,
                    position,
                    offset: d.offset,
                    length,
                    pattern_offset: 0.0,
                    thickness: d.thickness,
                    paint: d.paint,
                });
            }
        }
    }
    let decorations = merge_adjacent(decorations);

    // 8. Overflow.
    let total_height = y;
    let mut final_lines = lines;
    if matches!(params.overflow, TextOverflow::Ellipsis) && params.layout_width.is_finite() {
        for line in &mut final_lines {
            if line.bounds.width > params.layout_width {
                line.bounds.width = params.layout_width;
            }
        }
    }
    Layout {
        glyphs,
        clusters,
        runs,
        lines: final_lines,
        decorations,
        width: max_width,
        height: total_height,
    }
}

fn line_break_list(props: &unicode::TextProperties) -> Vec<unicode::LineBreak> {
    let mut out = Vec::new();
    for (i, cp) in props.per_codepoint.iter().enumerate() {
        if cp.flags.has(unicode::CodepointFlags::LINE_BREAK_MUST) {
            out.push(unicode::LineBreak {
                offset: i as u32 + 1,
                mandatory: true,
            });
        } else if cp.flags.has(unicode::CodepointFlags::LINE_BREAK_ALLOW) {
            out.push(unicode::LineBreak {
                offset: i as u32,
                mandatory: false,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::FontStyle;
    use crate::font::{FontMetrics, GlyphBounds};

    struct FixedFont;
    impl FontProvider for FixedFont {
        fn match_font(&self, _: &str, _: f32, _: FontStyle, _: f32, _: u16, _: bool) -> Option<FontHandle> {
            Some(FontHandle(1))
        }
        fn metrics(&self, _: FontHandle, size: f32) -> FontMetrics {
            FontMetrics {
                units_per_em: 1000,
                ascender: size * 0.8,
                descender: -size * 0.2,
                cap_height: size * 0.7,
                x_height: size * 0.5,
                underline_offset: -size * 0.1,
                underline_thickness: size * 0.05,
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
    fn wrap_word_breaks_long_text_under_a_narrow_width() {
        let text: Vec<char> = "foo bar baz".chars().collect();
        let params = LayoutParams { layout_width: 45.0, wrap: crate::attributes::TextWrap::Word, ..LayoutParams::default() };
        let mut shaper = ShaperCache::new();
        let layout = build_layout(&text, &[], &params, BaseDirection::Ltr, &FixedFont, &mut shaper);
        assert!(layout.lines.len() > 1);
    }

    #[test]
    fn wrap_none_keeps_a_single_line_under_the_same_narrow_width() {
        let text: Vec<char> = "foo bar baz".chars().collect();
        let params = LayoutParams { layout_width: 45.0, wrap: crate::attributes::TextWrap::None, ..LayoutParams::default() };
        let mut shaper = ShaperCache::new();
        let layout = build_layout(&text, &[], &params, BaseDirection::Ltr, &FixedFont, &mut shaper);
        assert_eq!(layout.lines.len(), 1);
    }

    #[test]
    fn wrap_none_still_breaks_at_a_paragraph_separator() {
        let text: Vec<char> = "foo\u{2029}bar".chars().collect();
        let params = LayoutParams { layout_width: 45.0, wrap: crate::attributes::TextWrap::None, ..LayoutParams::default() };
        let mut shaper = ShaperCache::new();
        let layout = build_layout(&text, &[], &params, BaseDirection::Ltr, &FixedFont, &mut shaper);
        assert_eq!(layout.lines.len(), 2);
    }
}
