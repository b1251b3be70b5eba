// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed attribute values, attribute spans, named collections, and the
//! back-to-front resolution rule used by the text buffer and layout engine.
//!
//! Mirrors the shape of `parley::style::StyleProperty` (a closed,
//! exhaustively-matched attribute-kind enum) generalized to the larger set
//! of kinds this core needs, plus the named/shared-collection model from
//! `attributed_text`.

mod collection;
mod set;

pub use collection::{AttributeCollection, CollectionId};
pub use set::{AttributeRef, AttributeSet};

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

/// Horizontal alignment of a line within its layout box.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HorizontalAlign {
    Start,
    Center,
    End,
    Left,
    Right,
}

/// Vertical alignment of the whole layout within its box.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
    Baseline(BaselineKind),
}

/// Baseline kinds queried from a [`crate::font::FontProvider`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BaselineKind {
    Alphabetic,
    Ideographic,
    Hanging,
    Central,
}

/// Wrapping policy consulted by the line breaker (§4.E).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextWrap {
    None,
    Word,
    WordChar,
}

/// Overflow policy applied once content exceeds the layout width/height.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextOverflow {
    None,
    Clip,
    Ellipsis,
    Scroll,
}

/// Base paragraph direction; `Auto` resolves from the first strong
/// character per UAX#9 P2/P3.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BaseDirection {
    Ltr,
    Rtl,
    Auto,
}

/// Sub/superscript scaling applied to font size and baseline shift.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FontSizeScaling {
    None,
    Super,
    Sub,
}

/// Font style/slant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Normal,
    Italic,
    Oblique,
}

/// A single OpenType feature tag + value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontFeature {
    pub tag: [u8; 4],
    pub value: u16,
}

/// Line height, either relative to font metrics or an absolute length.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LineHeight {
    MetricsRelative(f32),
    Absolute(f32),
}

/// Which of the four decoration lines an attribute describes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    Underline,
    Overline,
    Through,
    BottomLine,
}

/// A decoration attribute value (§4.E step 7).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Decoration {
    pub kind: DecorationKind,
    pub style: DecorationStyle,
    pub thickness: f32,
    pub offset: f32,
    pub paint: PaintRef,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DecorationStyle {
    Solid,
    Dashed,
    Dotted,
    Wavy,
}

/// Opaque reference to a paint; this crate never interprets the payload,
/// it only carries it through to the layout/decoration/atlas records for
/// an external renderer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PaintRef(pub u64);

/// Discriminator for which visual "slot" a [`Attribute::PaintColor`]
/// targets, and in which interaction state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PaintTag {
    pub slot: PaintSlot,
    pub state: PaintState,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PaintSlot {
    Fill,
    TextBackground,
    ParagraphBackground,
    IndentDecoration,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PaintState {
    Normal,
    Selected,
    Disabled,
}

/// A list marker: either a literal codepoint bullet or a numeric counter.
#[derive(Clone, Debug, PartialEq)]
pub enum ListMarker {
    Codepoint(char),
    Counter {
        kind: CounterKind,
        gap: f32,
        pad: f32,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CounterKind {
    Decimal,
    LowerLatin,
    UpperLatin,
    LowerRoman,
}

/// Symmetric box padding, in logical pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Padding {
    pub start: f32,
    pub end: f32,
}

/// A single typed attribute value. One variant per kind named in the data
/// model; this is the "tagged union" the design notes call for in place
/// of ad hoc overloaded constructors.
#[derive(Clone, Debug, PartialEq)]
pub enum Attribute {
    FontFamily(String),
    FontSize(f32),
    FontSizeScaling(FontSizeScaling),
    FontWeight(f32),
    FontStyle(FontStyle),
    FontStretch(f32),
    FontFeature(FontFeature),
    Language(String),
    LetterSpacing(f32),
    WordSpacing(f32),
    LineHeight(LineHeight),
    Fill(PaintRef),
    Decoration(Decoration),
    BaselineAlign(BaselineKind),
    BaselineShift(f32),
    HorizontalAlign(HorizontalAlign),
    VerticalAlign(VerticalAlign),
    VerticalTrim(bool),
    TextWrap(TextWrap),
    TextOverflow(TextOverflow),
    TextBaseDirection(BaseDirection),
    TabStopIncrement(f32),
    IndentIncrement(f32),
    IndentLevel(u32),
    IndentDecoration(Decoration),
    ListMarker(ListMarker),
    ParagraphPadding(Padding),
    VerticalPadding(Padding),
    HorizontalPadding(Padding),
    InlinePadding(Padding),
    CaretPadding(Padding),
    PaintColor(PaintTag, PaintRef),
    GroupTag(String),
}

impl Attribute {
    /// The attribute kind discriminant, used to detect "same kind" spans
    /// for merge/overlap/clear purposes without comparing full values.
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::FontFamily(_) => AttributeKind::FontFamily,
            Self::FontSize(_) => AttributeKind::FontSize,
            Self::FontSizeScaling(_) => AttributeKind::FontSizeScaling,
            Self::FontWeight(_) => AttributeKind::FontWeight,
            Self::FontStyle(_) => AttributeKind::FontStyle,
            Self::FontStretch(_) => AttributeKind::FontStretch,
            Self::FontFeature(_) => AttributeKind::FontFeature,
            Self::Language(_) => AttributeKind::Language,
            Self::LetterSpacing(_) => AttributeKind::LetterSpacing,
            Self::WordSpacing(_) => AttributeKind::WordSpacing,
            Self::LineHeight(_) => AttributeKind::LineHeight,
            Self::Fill(_) => AttributeKind::Fill,
            Self::Decoration(_) => AttributeKind::Decoration,
            Self::BaselineAlign(_) => AttributeKind::BaselineAlign,
            Self::BaselineShift(_) => AttributeKind::BaselineShift,
            Self::HorizontalAlign(_) => AttributeKind::HorizontalAlign,
            Self::VerticalAlign(_) => AttributeKind::VerticalAlign,
            Self::VerticalTrim(_) => AttributeKind::VerticalTrim,
            Self::TextWrap(_) => AttributeKind::TextWrap,
            Self::TextOverflow(_) => AttributeKind::TextOverflow,
            Self::TextBaseDirection(_) => AttributeKind::TextBaseDirection,
            Self::TabStopIncrement(_) => AttributeKind::TabStopIncrement,
            Self::IndentIncrement(_) => AttributeKind::IndentIncrement,
            Self::IndentLevel(_) => AttributeKind::IndentLevel,
            Self::IndentDecoration(_) => AttributeKind::IndentDecoration,
            Self::ListMarker(_) => AttributeKind::ListMarker,
            Self::ParagraphPadding(_) => AttributeKind::ParagraphPadding,
            Self::VerticalPadding(_) => AttributeKind::VerticalPadding,
            Self::HorizontalPadding(_) => AttributeKind::HorizontalPadding,
            Self::InlinePadding(_) => AttributeKind::InlinePadding,
            Self::CaretPadding(_) => AttributeKind::CaretPadding,
            Self::PaintColor(tag, _) => AttributeKind::PaintColor(*tag),
            Self::GroupTag(_) => AttributeKind::GroupTag,
        }
    }

    /// Feeds this value's bytes into a fingerprint accumulator. Order of
    /// fields is fixed and documented per variant; this is deliberately
    /// not `core::hash::Hash`-derived so float fields hash by bit pattern
    /// rather than failing to implement `Hash` at all.
    pub(crate) fn stable_hash(&self, h: &mut Fnv1a) {
        h.write_u8(self.kind().discriminant());
        match self {
            Self::FontFamily(s) | Self::Language(s) | Self::GroupTag(s) => h.write_bytes(s.as_bytes()),
            Self::FontSize(v)
            | Self::FontWeight(v)
            | Self::FontStretch(v)
            | Self::LetterSpacing(v)
            | Self::WordSpacing(v)
            | Self::BaselineShift(v)
            | Self::TabStopIncrement(v)
            | Self::IndentIncrement(v) => h.write_u32(v.to_bits()),
            Self::FontSizeScaling(v) => h.write_u8(*v as u8),
            Self::FontStyle(v) => h.write_u8(*v as u8),
            Self::FontFeature(f) => {
                h.write_bytes(&f.tag);
                h.write_u16(f.value);
            }
            Self::LineHeight(LineHeight::MetricsRelative(v)) => {
                h.write_u8(0);
                h.write_u32(v.to_bits());
            }
            Self::LineHeight(LineHeight::Absolute(v)) => {
                h.write_u8(1);
                h.write_u32(v.to_bits());
            }
            Self::Fill(p) => h.write_u64(p.0),
            Self::Decoration(d) | Self::IndentDecoration(d) => {
                h.write_u8(d.kind as u8);
                h.write_u8(d.style as u8);
                h.write_u32(d.thickness.to_bits());
                h.write_u32(d.offset.to_bits());
                h.write_u64(d.paint.0);
            }
            Self::BaselineAlign(v) => h.write_u8(*v as u8),
            Self::HorizontalAlign(v) => h.write_u8(*v as u8),
            Self::VerticalAlign(VerticalAlign::Baseline(v)) => {
                h.write_u8(3);
                h.write_u8(*v as u8);
            }
            Self::VerticalAlign(v) => h.write_u8(match v {
                VerticalAlign::Top => 0,
                VerticalAlign::Center => 1,
                VerticalAlign::Bottom => 2,
                VerticalAlign::Baseline(_) => unreachable!(),
            }),
            Self::VerticalTrim(v) => h.write_u8(*v as u8),
            Self::TextWrap(v) => h.write_u8(*v as u8),
            Self::TextOverflow(v) => h.write_u8(*v as u8),
            Self::TextBaseDirection(v) => h.write_u8(*v as u8),
            Self::IndentLevel(v) => h.write_u32(*v),
            Self::ListMarker(ListMarker::Codepoint(c)) => {
                h.write_u8(0);
                h.write_u32(*c as u32);
            }
            Self::ListMarker(ListMarker::Counter { kind, gap, pad }) => {
                h.write_u8(1);
                h.write_u8(*kind as u8);
                h.write_u32(gap.to_bits());
                h.write_u32(pad.to_bits());
            }
            Self::ParagraphPadding(p)
            | Self::VerticalPadding(p)
            | Self::HorizontalPadding(p)
            | Self::InlinePadding(p)
            | Self::CaretPadding(p) => {
                h.write_u32(p.start.to_bits());
                h.write_u32(p.end.to_bits());
            }
            Self::PaintColor(tag, paint) => {
                h.write_u8(tag.slot as u8);
                h.write_u8(tag.state as u8);
                h.write_u64(paint.0);
            }
        }
    }
}

/// Discriminant for [`Attribute::kind`]. `PaintColor` additionally carries
/// its [`PaintTag`] so two `paint-color` attributes targeting different
/// slots/states are treated as different kinds for overlap purposes,
/// matching "last matching `paint-tag` wins" (§4.A).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    FontFamily,
    FontSize,
    FontSizeScaling,
    FontWeight,
    FontStyle,
    FontStretch,
    FontFeature,
    Language,
    LetterSpacing,
    WordSpacing,
    LineHeight,
    Fill,
    Decoration,
    BaselineAlign,
    BaselineShift,
    HorizontalAlign,
    VerticalAlign,
    VerticalTrim,
    TextWrap,
    TextOverflow,
    TextBaseDirection,
    TabStopIncrement,
    IndentIncrement,
    IndentLevel,
    IndentDecoration,
    ListMarker,
    ParagraphPadding,
    VerticalPadding,
    HorizontalPadding,
    InlinePadding,
    CaretPadding,
    PaintColor(PaintTag),
    GroupTag,
}

impl AttributeKind {
    fn discriminant(self) -> u8 {
        match self {
            Self::FontFamily => 0,
            Self::FontSize => 1,
            Self::FontSizeScaling => 2,
            Self::FontWeight => 3,
            Self::FontStyle => 4,
            Self::FontStretch => 5,
            Self::FontFeature => 6,
            Self::Language => 7,
            Self::LetterSpacing => 8,
            Self::WordSpacing => 9,
            Self::LineHeight => 10,
            Self::Fill => 11,
            Self::Decoration => 12,
            Self::BaselineAlign => 13,
            Self::BaselineShift => 14,
            Self::HorizontalAlign => 15,
            Self::VerticalAlign => 16,
            Self::VerticalTrim => 17,
            Self::TextWrap => 18,
            Self::TextOverflow => 19,
            Self::TextBaseDirection => 20,
            Self::TabStopIncrement => 21,
            Self::IndentIncrement => 22,
            Self::IndentLevel => 23,
            Self::IndentDecoration => 24,
            Self::ListMarker => 25,
            Self::ParagraphPadding => 26,
            Self::VerticalPadding => 27,
            Self::HorizontalPadding => 28,
            Self::InlinePadding => 29,
            Self::CaretPadding => 30,
            Self::PaintColor(_) => 31,
            Self::GroupTag => 32,
        }
    }
}

/// A half-open codepoint range carrying exactly one attribute value plus
/// an optional opaque payload (§3 "Attribute span").
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeSpan {
    pub range: Range<u32>,
    pub value: Attribute,
    pub payload: Option<Vec<u8>>,
}

impl AttributeSpan {
    pub fn new(range: Range<u32>, value: Attribute) -> Self {
        Self {
            range,
            value,
            payload: None,
        }
    }

    pub fn with_payload(range: Range<u32>, value: Attribute, payload: Vec<u8>) -> Self {
        Self {
            range,
            value,
            payload: Some(payload),
        }
    }

    /// Two spans are mergeable when adjacent or overlapping and carry an
    /// identical kind, value, and payload (§3).
    pub(crate) fn mergeable_with(&self, other: &Self) -> bool {
        self.value == other.value && self.payload == other.payload
    }
}

/// Composes a paragraph-level [`AttributeSet`] (defaults) with a buffer's
/// per-codepoint `spans` (overrides) into the flat span list the layout
/// engine scans (§3 "paragraph defaults + span values, with span values
/// overriding", §4.A). Buffer spans are listed first so the engine's
/// first-match lookups see the override before the paragraph-wide
/// default. Named references are skipped: resolving them needs an
/// `AttributeCollection` lookup that isn't available at layout time.
pub fn compose_paragraph_spans(attributes: &AttributeSet, buffer_spans: &[AttributeSpan], len: u32) -> Vec<AttributeSpan> {
    let mut spans = Vec::with_capacity(buffer_spans.len() + attributes.entries().len());
    spans.extend_from_slice(buffer_spans);
    for entry in attributes.entries() {
        if let AttributeRef::Inline(value) = entry {
            spans.push(AttributeSpan::new(0..len, value.clone()));
        }
    }
    spans
}

/// Minimal, dependency-free FNV-1a accumulator used for the order-
/// dependent stable fingerprint hash §4.A calls for. Not a general-purpose
/// hasher: it exists solely to turn an `Attribute`/`AttributeSet` into a
/// stable 64-bit value across process runs, which a random-seeded
/// `HashMap` hasher cannot provide.
#[derive(Copy, Clone, Debug)]
pub struct Fnv1a(u64);

impl Default for Fnv1a {
    fn default() -> Self {
        Self(0xcbf2_9ce4_8422_2325)
    }
}

impl Fnv1a {
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, v: u8) {
        self.0 ^= u64::from(v);
        self.0 = self.0.wrapping_mul(Self::PRIME);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write_u8(b);
        }
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}
