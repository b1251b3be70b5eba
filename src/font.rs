// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font and icon provider contracts (§6). This crate never parses a font
//! file itself; callers supply an implementation that resolves families
//! to opaque handles and answers metrics/glyph queries, matching the
//! "dynamic dispatch over font/icon providers" design note (§9).

use alloc::string::String;

use crate::attributes::{BaselineKind, FontStyle};

/// Opaque handle to a font resolved by a [`FontProvider`]. Layout
/// snapshots store this handle, never a pointer (§3 "Ownership and
/// lifetime").
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontHandle(pub u32);

/// Opaque handle to an icon resolved by an [`IconProvider`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IconHandle(pub u32);

/// Font metrics, queried once per shaping run (§6).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FontMetrics {
    pub units_per_em: u16,
    pub ascender: f32,
    pub descender: f32,
    pub cap_height: f32,
    pub x_height: f32,
    pub underline_offset: f32,
    pub underline_thickness: f32,
}

impl FontMetrics {
    pub fn baseline(&self, kind: BaselineKind) -> f32 {
        match kind {
            BaselineKind::Alphabetic => 0.0,
            BaselineKind::Ideographic => self.descender,
            BaselineKind::Hanging => self.ascender * 0.8,
            BaselineKind::Central => (self.ascender + self.descender) * 0.5,
        }
    }
}

/// The glyph-ids-and-metrics half of the font contract (§6 "Font provider
/// contract"). Implementations typically wrap a `skrifa::FontRef`.
pub trait FontProvider {
    /// Matches a family/weight/style/stretch request against the
    /// provider's font set, scoped by the requested script and whether
    /// the emoji flag is set (affects emoji-family fallback), returning
    /// the best handle or `None` if nothing matches at all.
    fn match_font(
        &self,
        family: &str,
        weight: f32,
        style: FontStyle,
        stretch: f32,
        script: u16,
        emoji: bool,
    ) -> Option<FontHandle>;

    /// Font-wide metrics for `handle`, scaled to `size`.
    fn metrics(&self, handle: FontHandle, size: f32) -> FontMetrics;

    /// The bounding box of glyph `gid` in `handle` at `size`.
    fn glyph_bounds(&self, handle: FontHandle, gid: u16, size: f32) -> GlyphBounds;

    /// The nominal glyph id for `codepoint`, or `0` (`.notdef`) when the
    /// font has no mapping (§4.D ".notdef triggers").
    fn nominal_glyph(&self, handle: FontHandle, codepoint: char) -> u16;

    /// The fallback chain to retry when a run contains `.notdef` glyphs,
    /// in priority order, ending with an emoji-family fallback when
    /// `emoji` is set (§4.E step 2).
    fn fallback_chain(&self, script: u16, emoji: bool) -> alloc::vec::Vec<FontHandle>;
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GlyphBounds {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

/// Pixel alpha mode requested for icon rasterization.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AlphaMode {
    Alpha,
    Color,
}

/// The icon half of the external provider contract (§6 "Icon provider
/// contract").
pub trait IconProvider {
    fn find(&self, name: &str) -> Option<IconHandle>;
    fn proportional_size(&self, handle: IconHandle, w: f32, h: f32) -> (f32, f32);
    fn rasterize(&self, handle: IconHandle, w: u32, h: u32, mode: AlphaMode) -> alloc::vec::Vec<u8>;
    fn is_color(&self, handle: IconHandle) -> bool;
}

/// A resolved font family name plus an arbitrary fallback-chain
/// identifier, used by callers constructing attribute values; kept
/// separate from [`FontHandle`] since family names are resolved lazily
/// against whichever [`FontProvider`] the layout engine is given.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontFamilyName(pub String);
