// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A fixed-metrics `FontProvider` test double shared across the
//! integration suites, matching `parley_tests`' fake-font-per-test-module
//! convention rather than loading a real font file.

use wordform::attributes::FontStyle;
use wordform::font::{FontHandle, FontMetrics, FontProvider, GlyphBounds};

pub struct FixedFont;

impl FontProvider for FixedFont {
    fn match_font(&self, _family: &str, _weight: f32, _style: FontStyle, _stretch: f32, _script: u16, _emoji: bool) -> Option<FontHandle> {
        Some(FontHandle(1))
    }

    fn metrics(&self, _handle: FontHandle, size: f32) -> FontMetrics {
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

    fn glyph_bounds(&self, _handle: FontHandle, _gid: u16, size: f32) -> GlyphBounds {
        GlyphBounds { x_min: 0.0, y_min: 0.0, x_max: size * 0.6, y_max: size }
    }

    fn nominal_glyph(&self, _handle: FontHandle, c: char) -> u16 {
        c as u16
    }

    fn fallback_chain(&self, _script: u16, _emoji: bool) -> Vec<FontHandle> {
        Vec::new()
    }
}
