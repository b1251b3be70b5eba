// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout output shapes, matching §3 "Layout" field-for-field. Grounded
//! on `parley::layout::{data::LayoutData, run::RunData, cluster::ClusterData,
//! glyph::Glyph}`.

use alloc::vec::Vec;
use core::ops::Range;

use crate::attributes::{DecorationStyle, HorizontalAlign, PaintRef, TextOverflow, TextWrap, VerticalAlign};
use crate::font::FontHandle;

/// One shaped glyph (§3 "Layout: `glyphs[]`").
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Glyph {
    pub glyph_id: u16,
    pub advance_x: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub cluster: u32,
}

/// Grapheme-level mapping between text and glyphs (§3 "Layout: `clusters[]`").
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cluster {
    pub text_offset: u32,
    pub text_count: u32,
    pub glyph_offset: u32,
    pub glyph_count: u32,
}

/// Content kind carried by a run: most runs are shaped text; a run may
/// instead represent a single inline object/icon replacement (§3 "Content
/// run").
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunKind {
    Text,
    Object,
    Icon,
}

/// One shaping run placed in the layout (§3 "Layout: `runs[]`").
#[derive(Clone, Debug, PartialEq)]
pub struct Run {
    pub kind: RunKind,
    pub rtl: bool,
    pub script: u16,
    pub font: Option<FontHandle>,
    pub font_size: f32,
    pub attributes_fingerprint: u64,
    pub bounds: Rect,
    pub padding: Padding,
    pub glyph_range: Range<u32>,
    pub cluster_range: Range<u32>,
    pub text_range: Range<u32>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Padding {
    pub start: f32,
    pub end: f32,
}

/// One laid-out line (§3 "Layout: `lines[]`").
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub text_range: Range<u32>,
    pub run_range: Range<u32>,
    pub baseline: f32,
    pub ascender: f32,
    pub descender: f32,
    pub bounds: Rect,
    pub culling_bounds: Rect,
    pub common_glyph_bounds: Rect,
    pub last_grapheme_offset: u32,
}

/// A decoration record (§3 "Layout: `decorations[]]`", §4.E step 7).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Decoration {
    pub style: DecorationStyle,
    pub position: f32,
    pub offset: f32,
    pub length: f32,
    pub pattern_offset: f32,
    pub thickness: f32,
    pub paint: PaintRef,
}

/// Immutable parameters a layout is built from; part of the layout
/// cache's fingerprint alongside the text and attribute hash (§4.H).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutParams {
    pub layout_width: f32,
    pub wrap: TextWrap,
    pub overflow: TextOverflow,
    pub horizontal_align: HorizontalAlign,
    pub vertical_align: VerticalAlign,
    pub tab_stop_increment: f32,
    pub quantize: bool,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            layout_width: f32::INFINITY,
            wrap: TextWrap::Word,
            overflow: TextOverflow::None,
            horizontal_align: HorizontalAlign::Start,
            vertical_align: VerticalAlign::Top,
            tab_stop_increment: 48.0,
            quantize: false,
        }
    }
}

/// The immutable layout snapshot produced per paragraph (§3 "Layout").
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    pub glyphs: Vec<Glyph>,
    pub clusters: Vec<Cluster>,
    pub runs: Vec<Run>,
    pub lines: Vec<Line>,
    pub decorations: Vec<Decoration>,
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
