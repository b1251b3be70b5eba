// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection/caret state machine, input handling, IME composition, undo,
//! and rule-driven key dispatch over a [`RichText`] (§4.I). Grounded on
//! `parley::editing::editor::Editor`, generalized from per-layout byte
//! offsets to this crate's global (cross-paragraph) codepoint offsets.

pub mod caret;
pub mod ime;
pub mod rules;
pub mod selection;
pub mod undo;

pub use caret::{CaretMode, CaretSide, CaretStop};
pub use ime::Composition;
pub use rules::{Key, Modifiers, Rule, RuleAction, RuleSet};
pub use selection::{Affinity, Selection, TextPosition};
pub use undo::{Transaction, UndoEntry, UndoStack};

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ops::Range;

use crate::attributes::{Attribute, AttributeKind, AttributeRef, AttributeSet, BaseDirection, TextOverflow};
use crate::font::FontProvider;
use crate::layout::LayoutParams;
use crate::rich_text::RichText;
use crate::shape::ShaperCache;
use crate::text_buffer::TextBuffer;
use crate::unicode;

const DEFAULT_MAX_UNDO_LEVELS: usize = 100;
const DEFAULT_MAX_INDENT_LEVEL: u32 = 8;

/// The editor's input state (§4.I "States").
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    Selecting,
    Composing,
}

/// Owns a [`RichText`], the current selection, active-attribute set for
/// the next insertion, IME composition, undo stack, and view offset
/// (§4.I "Editor state").
pub struct Editor {
    rich_text: RichText,
    selection: Selection,
    state: EditorState,
    undo: UndoStack,
    composition: Option<Composition>,
    caret_mode: CaretMode,
    view_offset: f32,
    view_extent: f32,
    active_attributes: AttributeSet,
    params: LayoutParams,
    max_indent_level: u32,
    input_filter: Option<Box<dyn FnMut(Range<u32>, &mut TextBuffer)>>,
    generation: u64,
}

impl Editor {
    pub fn new(base_direction: BaseDirection) -> Self {
        Self {
            rich_text: RichText::new(base_direction),
            selection: Selection::collapsed(TextPosition::new(0, Affinity::Leading)),
            state: EditorState::Idle,
            undo: UndoStack::new(DEFAULT_MAX_UNDO_LEVELS),
            composition: None,
            caret_mode: CaretMode::Skribidi,
            view_offset: 0.0,
            view_extent: f32::INFINITY,
            active_attributes: AttributeSet::new(),
            params: LayoutParams::default(),
            max_indent_level: DEFAULT_MAX_INDENT_LEVEL,
            input_filter: None,
            generation: 0,
        }
    }

    /// Bumps on every text or attribute mutation; callers may cache
    /// derived state (e.g. an IME candidate window) keyed on this value
    /// instead of recomputing it every frame.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn rich_text(&self) -> &RichText {
        &self.rich_text
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn set_params(&mut self, params: LayoutParams) {
        self.params = params;
    }

    pub fn set_input_filter(&mut self, filter: Box<dyn FnMut(Range<u32>, &mut TextBuffer)>) {
        self.input_filter = Some(filter);
    }

    pub fn set_selection_range(&mut self, range: Range<u32>) {
        self.selection = Selection {
            anchor: TextPosition::new(range.start, Affinity::Leading),
            focus: TextPosition::new(range.end, Affinity::Trailing),
        };
    }

    /// Convenience for plain-text insertion at the current selection,
    /// replacing any selected range.
    pub fn insert_str(&mut self, text: &str) {
        let range = self.selection.range();
        let incoming = TextBuffer::from_chars(text.chars().collect());
        self.replace(range, &incoming);
    }

    /// The mutation funnel every text change passes through (§4.I "Text
    /// mutation"): runs the input filter, records an undo entry unless
    /// composing, then rebases the selection by "rebase after splice".
    pub fn replace(&mut self, range: Range<u32>, incoming: &TextBuffer) {
        let mut incoming = incoming.clone();
        if let Some(filter) = &mut self.input_filter {
            filter(range.clone(), &mut incoming);
        }
        let removed = self.rich_text.chars_in_range(range.clone());
        let inserted = incoming.text().to_vec();
        let inserted_len = inserted.len() as u32;
        let selection_before = self.selection;

        self.rich_text.replace(range.clone(), &incoming);
        self.selection = self.selection.rebase(range.clone(), inserted_len);
        let selection_after = self.selection;
        self.generation += 1;

        if self.state != EditorState::Composing {
            self.undo.record(UndoEntry {
                range,
                removed,
                inserted,
                selection_before,
                selection_after,
            });
        }
    }

    /// Re-lays every dirty paragraph and clamps the view offset
    /// (§4.I "View offset").
    pub fn relayout(&mut self, provider: &dyn FontProvider, shaper_cache: &mut ShaperCache) {
        let params = self.params.clone();
        self.rich_text.relayout(&params, provider, shaper_cache);
        self.clamp_view_offset();
    }

    fn clamp_view_offset(&mut self) {
        if !matches!(self.params.overflow, TextOverflow::Scroll) {
            return;
        }
        let content = self.rich_text.paragraph_offsets_y().last().copied().unwrap_or(0.0);
        let max_scroll = (content - self.view_extent).max(0.0);
        self.view_offset = self.view_offset.clamp(-max_scroll, 0.0);
    }

    pub fn set_view_extent(&mut self, extent: f32) {
        self.view_extent = extent;
        self.clamp_view_offset();
    }

    pub fn view_offset(&self) -> f32 {
        self.view_offset
    }

    fn paragraph_for_offset(&self, offset: u32) -> (usize, Range<u32>) {
        let offsets = self.rich_text.paragraph_offsets();
        let last = self.rich_text.paragraph_count().saturating_sub(1);
        for i in 0..=last {
            if offset < offsets[i + 1] || i == last {
                return (i, offsets[i]..offsets[i + 1]);
            }
        }
        (0, 0..0)
    }

    fn current_paragraph_range(&self) -> Range<u32> {
        self.paragraph_for_offset(self.selection.focus.offset).1
    }

    fn current_paragraph_starts_with(&self, prefix: &str) -> bool {
        let range = self.current_paragraph_range();
        let take = prefix.chars().count() as u32;
        if range.start + take > range.end {
            return false;
        }
        self.rich_text.text_utf8_in_range(range.start..range.start + take) == prefix
    }

    // --- Mouse (§4.I "Mouse") ---

    fn hit_test(&self, x: f32, y: f32) -> TextPosition {
        let count = self.rich_text.paragraph_count();
        if count == 0 {
            return TextPosition::new(0, Affinity::Leading);
        }
        let offsets = self.rich_text.paragraph_offsets();
        let offsets_y = self.rich_text.paragraph_offsets_y();
        let mut para_idx = count - 1;
        for i in 0..count {
            if y < offsets_y[i + 1] || i == count - 1 {
                para_idx = i;
                break;
            }
        }

        let layout = self.rich_text.paragraphs()[para_idx].layout();
        if layout.lines.is_empty() {
            return TextPosition::new(offsets[para_idx], Affinity::Leading);
        }
        let local_y = y - offsets_y[para_idx];
        let mut line_idx = layout.lines.len() - 1;
        for (i, line) in layout.lines.iter().enumerate() {
            if local_y < line.bounds.y + line.bounds.height {
                line_idx = i;
                break;
            }
        }

        let stops = caret::caret_stops(layout, line_idx, self.caret_mode);
        let mut best = stops.first();
        for stop in &stops {
            if stop.x <= x {
                best = Some(stop);
            } else {
                break;
            }
        }
        let local_offset = best.map(|s| s.right.offset).unwrap_or(0);
        TextPosition::new(offsets[para_idx] + local_offset, Affinity::Leading)
    }

    pub fn click(&mut self, x: f32, y: f32) {
        self.selection = Selection::collapsed(self.hit_test(x, y));
        self.state = EditorState::Selecting;
    }

    pub fn drag(&mut self, x: f32, y: f32) {
        self.selection.focus = self.hit_test(x, y);
    }

    pub fn release(&mut self) {
        if self.state == EditorState::Selecting {
            self.state = EditorState::Idle;
        }
    }

    pub fn double_click_word(&mut self, x: f32, y: f32) {
        let pos = self.hit_test(x, y);
        let (para_idx, para_range) = self.paragraph_for_offset(pos.offset);
        let text = self.rich_text.paragraphs()[para_idx].buffer().text();
        let bounds = unicode::word_boundaries(text);
        let local_offset = pos.offset - para_range.start;
        let mut start = 0u32;
        let mut end = text.len() as u32;
        for w in bounds.windows(2) {
            if w[0] <= local_offset && local_offset < w[1] {
                start = w[0];
                end = w[1];
                break;
            }
        }
        self.selection = Selection {
            anchor: TextPosition::new(para_range.start + start, Affinity::Leading),
            focus: TextPosition::new(para_range.start + end, Affinity::Trailing),
        };
    }

    pub fn triple_click_paragraph(&mut self, x: f32, y: f32) {
        let pos = self.hit_test(x, y);
        let (_, para_range) = self.paragraph_for_offset(pos.offset);
        self.selection = Selection {
            anchor: TextPosition::new(para_range.start, Affinity::Leading),
            focus: TextPosition::new(para_range.end, Affinity::Trailing),
        };
    }

    // --- IME (§4.I "IME composition") ---

    pub fn set_composition(&mut self, text: Vec<char>, caret: u32) {
        self.state = EditorState::Composing;
        self.composition = Some(Composition::new(text, caret));
    }

    pub fn commit_composition(&mut self) {
        if let Some(composition) = self.composition.take() {
            self.state = EditorState::Idle;
            let range = self.selection.range();
            let incoming = TextBuffer::from_chars(composition.text);
            self.replace(range, &incoming);
        }
    }

    pub fn cancel_composition(&mut self) {
        self.composition = None;
        self.state = EditorState::Idle;
    }

    pub fn composition(&self) -> Option<&Composition> {
        self.composition.as_ref()
    }

    // --- Attributes (§4.I "Attributes") ---

    fn toggle_active_attribute(&mut self, attr: Attribute) {
        let already = self
            .active_attributes
            .entries()
            .iter()
            .any(|e| matches!(e, AttributeRef::Inline(v) if v == &attr));
        if already {
            let kept: Vec<AttributeRef> = self
                .active_attributes
                .entries()
                .iter()
                .cloned()
                .filter(|e| !matches!(e, AttributeRef::Inline(v) if v.kind() == attr.kind()))
                .collect();
            self.active_attributes = AttributeSet::new();
            for entry in kept {
                self.active_attributes.push(entry);
            }
        } else {
            self.active_attributes.push(AttributeRef::Inline(attr));
        }
    }

    /// Clears `attr` if every codepoint in `range` already carries an
    /// equal value, otherwise sets it uniformly; an empty range toggles
    /// the active-attribute set instead (§4.I "toggle_attribute").
    pub fn toggle_attribute(&mut self, range: Range<u32>, attr: Attribute) {
        if range.is_empty() {
            self.toggle_active_attribute(attr);
            return;
        }
        if self.rich_text.has_attribute(range.clone(), &attr) {
            self.rich_text.clear_attribute(range, attr.kind());
        } else {
            self.rich_text.add_attribute(range, attr);
        }
        self.generation += 1;
    }

    pub fn set_attribute(&mut self, range: Range<u32>, attr: Attribute) {
        if range.is_empty() {
            self.active_attributes.push(AttributeRef::Inline(attr));
        } else {
            self.rich_text.add_attribute(range, attr);
        }
        self.generation += 1;
    }

    pub fn clear_attribute(&mut self, range: Range<u32>, kind: AttributeKind) {
        self.rich_text.clear_attribute(range, kind);
        self.generation += 1;
    }

    pub fn set_paragraph_attribute(&mut self, range: Range<u32>, attr: Attribute) {
        self.rich_text.set_paragraph_attribute(range, attr);
        self.generation += 1;
    }

    /// Adds `delta` to the paragraph's indent level, clamped to
    /// `[0, max_indent_level]` (§4.I "set_paragraph_attribute_delta").
    pub fn set_paragraph_attribute_delta(&mut self, range: Range<u32>, delta: i32) {
        let offsets = self.rich_text.paragraph_offsets();
        for i in 0..self.rich_text.paragraph_count() {
            let start = offsets[i];
            let end = offsets[i + 1];
            if range.start < end && range.end > start {
                let current = match self.rich_text.paragraphs()[i]
                    .attributes()
                    .resolve(AttributeKind::IndentLevel, &|_, _| None)
                {
                    Ok(Some(Attribute::IndentLevel(level))) => level,
                    _ => 0,
                };
                let updated = (current as i32 + delta).clamp(0, self.max_indent_level as i32) as u32;
                self.rich_text.set_paragraph_attribute(start..end, Attribute::IndentLevel(updated));
                self.generation += 1;
            }
        }
    }

    pub fn has_attribute(&self, range: Range<u32>, attr: &Attribute) -> bool {
        if range.is_empty() {
            return self
                .active_attributes
                .resolve(attr.kind(), &|_, _| None)
                .ok()
                .flatten()
                .as_ref()
                == Some(attr);
        }
        self.rich_text.has_attribute(range, attr)
    }

    pub fn has_text_attribute(&self, range: Range<u32>, attr: &Attribute) -> bool {
        if range.is_empty() {
            if range.start == 0 {
                return false;
            }
            return self.rich_text.has_attribute(range.start - 1..range.start, attr);
        }
        self.rich_text.has_attribute(range, attr)
    }

    pub fn has_paragraph_attribute(&self, range: Range<u32>, attr: &Attribute) -> bool {
        let offsets = self.rich_text.paragraph_offsets();
        let mut touched = false;
        for i in 0..self.rich_text.paragraph_count() {
            let start = offsets[i];
            let end = offsets[i + 1];
            let overlaps = (range.start < end && range.end > start)
                || (range.is_empty() && range.start >= start && range.start <= end);
            if !overlaps {
                continue;
            }
            touched = true;
            let resolved = self.rich_text.paragraphs()[i]
                .attributes()
                .resolve(attr.kind(), &|_, _| None)
                .ok()
                .flatten();
            if resolved.as_ref() != Some(attr) {
                return false;
            }
        }
        touched
    }

    // --- Undo / redo (§4.I "Undo / redo") ---

    pub fn begin_transaction(&mut self) {
        self.undo.begin_transaction();
    }

    pub fn end_transaction(&mut self) {
        self.undo.end_transaction();
    }

    pub fn undo(&mut self) -> bool {
        let Some(txn) = self.undo.undo() else {
            return false;
        };
        for entry in txn.entries.iter().rev() {
            let current_len = entry.inserted.len() as u32;
            let range = entry.range.start..entry.range.start + current_len;
            let incoming = TextBuffer::from_chars(entry.removed.clone());
            self.rich_text.replace(range, &incoming);
        }
        if let Some(first) = txn.entries.first() {
            self.selection = first.selection_before;
        }
        self.generation += 1;
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(txn) = self.undo.redo() else {
            return false;
        };
        for entry in &txn.entries {
            let incoming = TextBuffer::from_chars(entry.inserted.clone());
            self.rich_text.replace(entry.range.clone(), &incoming);
        }
        if let Some(last) = txn.entries.last() {
            self.selection = last.selection_after;
        }
        self.generation += 1;
        true
    }

    // --- Rule dispatch (§4.I "Rule sets") ---

    pub fn process(&mut self, rules: &RuleSet, key: Key, mods: Modifiers) -> bool {
        rules.process(self, key, mods)
    }

    /// Applies one matched rule's action; returns whether it reports
    /// itself handled (used by [`RuleSet::process`]).
    pub(crate) fn apply_rule_action(&mut self, rule: &Rule) -> bool {
        match &rule.action {
            RuleAction::ToggleAttribute(attr) => {
                self.toggle_attribute(self.selection.range(), attr.clone());
                true
            }
            RuleAction::SetAttribute(attr) => {
                self.set_attribute(self.selection.range(), attr.clone());
                true
            }
            RuleAction::ClearAttribute(kind) => {
                self.clear_attribute(self.selection.range(), *kind);
                true
            }
            RuleAction::SetParagraphAttribute(attr) => {
                let range = self.current_paragraph_range();
                self.set_paragraph_attribute(range, attr.clone());
                true
            }
            RuleAction::IndentLevelDelta(delta) => {
                let range = self.current_paragraph_range();
                self.set_paragraph_attribute_delta(range, *delta);
                true
            }
            RuleAction::PrefixToParagraphStyle(attr) => {
                let Some(prefix) = &rule.content_prefix else {
                    return false;
                };
                let para_range = self.current_paragraph_range();
                let prefix_len = prefix.chars().count() as u32;
                self.begin_transaction();
                self.replace(para_range.start..para_range.start + prefix_len, &TextBuffer::new());
                let updated_range = self.current_paragraph_range();
                self.set_paragraph_attribute(updated_range, attr.clone());
                self.end_transaction();
                true
            }
            RuleAction::ParagraphStyleIfEmptyOrAtEnd(attr) => {
                let para_range = self.current_paragraph_range();
                let content_len = para_range.end.saturating_sub(para_range.start);
                let at_end = self.selection.focus.offset + 1 >= para_range.end;
                let empty = content_len <= 1;
                if at_end || empty {
                    self.set_paragraph_attribute(para_range, attr.clone());
                    true
                } else {
                    false
                }
            }
            RuleAction::Tab => {
                let range = self.selection.range();
                let spans_paragraphs = !range.is_empty()
                    && self.paragraph_for_offset(range.start).0
                        != self.paragraph_for_offset(range.end - 1).0;
                if spans_paragraphs {
                    let delta = if rule.mods.shift { -1 } else { 1 };
                    self.set_paragraph_attribute_delta(range, delta);
                } else {
                    let incoming = TextBuffer::from_chars(alloc::vec!['\t']);
                    self.replace(range, &incoming);
                }
                true
            }
            RuleAction::BasePassthrough => false,
            RuleAction::SelectAll => {
                let len = self.rich_text.len();
                self.selection = Selection {
                    anchor: TextPosition::new(0, Affinity::Leading),
                    focus: TextPosition::new(len, Affinity::Trailing),
                };
                true
            }
            RuleAction::Undo => self.undo(),
            RuleAction::Redo => self.redo(),
            RuleAction::InsertChar(c) => {
                let range = self.selection.range();
                let incoming = TextBuffer::from_chars(alloc::vec![*c]);
                self.replace(range, &incoming);
                true
            }
            RuleAction::Custom(f) => f(self),
        }
    }
}
