// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turns a paragraph (codepoints + attribute spans) and layout parameters
//! into an immutable layout snapshot: lines, runs, glyphs, decorations,
//! caret-ready geometry (§4.E). Grounded on `parley::layout::{data, run,
//! cluster, glyph}` for the output shapes and
//! `parley::layout::line::greedy` for the line-breaking algorithm.

mod data;
mod decorations;
mod engine;
mod line_break;

pub use data::{
    Cluster, Decoration as LayoutDecoration, Glyph, Layout, LayoutParams, Line, Run, RunKind,
};
pub use engine::build_layout;
pub use line_break::BreakOpportunity;
