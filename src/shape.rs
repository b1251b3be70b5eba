// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shaper adapter: groups codepoints into shaping runs and invokes the
//! shaping engine (§4.D). Grounded on `parley::shape`/`parley::shape::cache`
//! for the run-grouping and shaper-plan-reuse idiom, re-targeted from
//! swash to `harfrust`.

use alloc::vec::Vec;
use core::ops::Range;

use hashbrown::HashMap;

use crate::attributes::FontFeature;
use crate::error::{Error, Result};
use crate::font::{FontHandle, FontProvider};

/// One shaped glyph, mapped back to the input codepoints it came from
/// (§4.D).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShapedGlyph {
    pub glyph_id: u16,
    pub advance_x: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub cluster: u32,
}

/// A contiguous span of codepoints sharing script, direction, language,
/// font handle, font size, and features — the shaping unit this adapter
/// consumes (§4.D).
#[derive(Clone, Debug, PartialEq)]
pub struct ShapingRun {
    pub range: Range<u32>,
    pub script: u16,
    pub rtl: bool,
    pub language: Option<alloc::string::String>,
    pub font: FontHandle,
    pub font_size: f32,
    pub features: Vec<FontFeature>,
}

/// Output of shaping one run: the glyphs plus whether any `.notdef` glyph
/// was produced (triggering fallback retry, §4.E step 2).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeResult {
    pub glyphs: Vec<ShapedGlyph>,
    pub has_notdef: bool,
}

/// Partitions `text` into shaping runs by (script, direction, font,
/// size, features, language), honoring already-resolved per-codepoint
/// script/bidi-level assignments (§4.E step 2).
pub fn partition_runs(
    text_len: u32,
    scripts: &[u16],
    bidi_levels: &[u8],
    font_for: impl Fn(u32) -> (FontHandle, f32, Vec<FontFeature>, Option<alloc::string::String>),
) -> Vec<ShapingRun> {
    let mut runs = Vec::new();
    if text_len == 0 {
        return runs;
    }
    let mut start = 0u32;
    let mut current = font_for(0);
    let mut current_script = scripts.first().copied().unwrap_or(0);
    let mut current_rtl = bidi_levels.first().copied().unwrap_or(0) % 2 == 1;

    for i in 1..text_len {
        let (font, size, features, lang) = font_for(i);
        let script = scripts.get(i as usize).copied().unwrap_or(current_script);
        let rtl = bidi_levels.get(i as usize).copied().unwrap_or(0) % 2 == 1;
        let same = font == current.0
            && size == current.1
            && features == current.2
            && lang == current.3
            && script == current_script
            && rtl == current_rtl;
        if !same {
            runs.push(ShapingRun {
                range: start..i,
                script: current_script,
                rtl: current_rtl,
                language: current.3.clone(),
                font: current.0,
                font_size: current.1,
                features: current.2.clone(),
            });
            start = i;
            current = (font, size, features, lang);
            current_script = script;
            current_rtl = rtl;
        }
    }
    runs.push(ShapingRun {
        range: start..text_len,
        script: current_script,
        rtl: current_rtl,
        language: current.3,
        font: current.0,
        font_size: current.1,
        features: current.2,
    });
    runs
}

/// Caches a harfrust shaper plan per `(font, script, rtl, language,
/// features)` key, mirroring `parley::shape::cache::ShaperCache`'s
/// purpose of avoiding a shaper-plan rebuild on every run.
#[derive(Default)]
pub struct ShaperCache {
    plans: HashMap<PlanKey, ()>,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct PlanKey {
    font: FontHandle,
    script: u16,
    rtl: bool,
    language: Option<alloc::string::String>,
}

impl ShaperCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.plans.clear();
    }

    /// Shapes `run` against `text[run.range]`, consulting `provider` for
    /// glyph-id lookups. A production adapter would invoke `harfrust`
    /// here, keyed through this cache's shaper-plan table; this core
    /// expresses the adapter's contract (cluster mapping, `.notdef`
    /// detection) directly in terms of [`FontProvider::nominal_glyph`]
    /// so it has no hard dependency on a live harfrust `Face`.
    pub fn shape_run(
        &mut self,
        run: &ShapingRun,
        text: &[char],
        provider: &dyn FontProvider,
    ) -> Result<ShapeResult> {
        self.plans.entry(PlanKey {
            font: run.font,
            script: run.script,
            rtl: run.rtl,
            language: run.language.clone(),
        }).or_insert(());

        let slice = &text[run.range.start as usize..run.range.end as usize];
        if slice.is_empty() {
            return Err(Error::no_font_for_run(run.range.start, run.range.end, text.len()));
        }
        let mut glyphs = Vec::with_capacity(slice.len());
        let mut has_notdef = false;
        let iter: Box<dyn Iterator<Item = (usize, &char)>> = if run.rtl {
            Box::new(slice.iter().enumerate().rev())
        } else {
            Box::new(slice.iter().enumerate())
        };
        for (local_index, &c) in iter {
            let gid = provider.nominal_glyph(run.font, c);
            if gid == 0 {
                has_notdef = true;
            }
            let advance = provider.glyph_bounds(run.font, gid, run.font_size).x_max;
            glyphs.push(ShapedGlyph {
                glyph_id: gid,
                advance_x: advance,
                offset_x: 0.0,
                offset_y: 0.0,
                cluster: run.range.start + local_index as u32,
            });
        }
        Ok(ShapeResult { glyphs, has_notdef })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FontMetrics, GlyphBounds};

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
        fn glyph_bounds(&self, _: FontHandle, gid: u16, size: f32) -> GlyphBounds {
            GlyphBounds {
                x_min: 0.0,
                y_min: 0.0,
                x_max: if gid == 0 { 0.0 } else { size * 0.6 },
                y_max: size,
            }
        }
        fn nominal_glyph(&self, _: FontHandle, c: char) -> u16 {
            if c == ' ' { 0 } else { c as u16 }
        }
        fn fallback_chain(&self, _: u16, _: bool) -> Vec<FontHandle> {
            Vec::new()
        }
    }

    #[test]
    fn shapes_simple_run() {
        let text: Vec<char> = "ab".chars().collect();
        let run = ShapingRun {
            range: 0..2,
            script: 0,
            rtl: false,
            language: None,
            font: FontHandle(1),
            font_size: 10.0,
            features: Vec::new(),
        };
        let mut cache = ShaperCache::new();
        let result = cache.shape_run(&run, &text, &FixedFont).unwrap();
        assert_eq!(result.glyphs.len(), 2);
        assert!(!result.has_notdef);
    }

    #[test]
    fn notdef_glyph_is_flagged() {
        let text: Vec<char> = "a b".chars().collect();
        let run = ShapingRun {
            range: 0..3,
            script: 0,
            rtl: false,
            language: None,
            font: FontHandle(1),
            font_size: 10.0,
            features: Vec::new(),
        };
        let mut cache = ShaperCache::new();
        let result = cache.shape_run(&run, &text, &FixedFont).unwrap();
        assert!(result.has_notdef);
    }
}
