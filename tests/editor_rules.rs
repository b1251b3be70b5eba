// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scenario 5: a "#" + Space prefix rule converts a paragraph's style
//! and strips the prefix, as one undoable transaction.

mod support;

use support::FixedFont;
use wordform::attributes::{Attribute, BaseDirection};
use wordform::editor::rules::{Key, Modifiers, Rule, RuleAction, RuleSet};
use wordform::editor::Editor;
use wordform::shape::ShaperCache;

fn heading() -> Attribute {
    Attribute::FontSize(30.0)
}

fn h1_rule() -> RuleSet {
    let mut rules = RuleSet::new();
    rules.push(Rule {
        key: Key::Char(' '),
        mods: Modifiers::default(),
        paragraph_style: None,
        content_prefix: Some("#".into()),
        action: RuleAction::PrefixToParagraphStyle(heading()),
    });
    rules
}

#[test]
fn hash_space_at_paragraph_start_converts_to_heading_and_strips_prefix() {
    let mut editor = Editor::new(BaseDirection::Ltr);
    editor.insert_str("#foo");
    editor.set_selection_range(1..1);
    let rules = h1_rule();

    let handled = editor.process(&rules, Key::Char(' '), Modifiers::default());
    assert!(handled);

    let len = editor.rich_text().len();
    assert_eq!(editor.rich_text().text_utf8_in_range(0..len), "foo");
    assert!(editor.has_paragraph_attribute(0..len, &heading()));

    // The paragraph-level style is a layout default, not just bookkeeping:
    // it must actually affect the rendered line metrics once relaid.
    let mut shaper = ShaperCache::new();
    editor.relayout(&FixedFont, &mut shaper);
    let line = &editor.rich_text().paragraphs()[0].layout().lines[0];
    assert_eq!(line.ascender, 30.0 * 0.8);
    assert_eq!(line.descender, 30.0 * 0.2);
}

#[test]
fn a_paragraph_without_the_heading_style_keeps_the_default_font_size() {
    let mut editor = Editor::new(BaseDirection::Ltr);
    editor.insert_str("foo");
    let mut shaper = ShaperCache::new();
    editor.relayout(&FixedFont, &mut shaper);
    let line = &editor.rich_text().paragraphs()[0].layout().lines[0];
    assert_eq!(line.ascender, 16.0 * 0.8);
}

#[test]
fn the_prefix_strip_and_style_change_undo_as_one_transaction() {
    let mut editor = Editor::new(BaseDirection::Ltr);
    editor.insert_str("#foo");
    editor.set_selection_range(1..1);
    let rules = h1_rule();
    editor.process(&rules, Key::Char(' '), Modifiers::default());

    assert!(editor.undo());
    let len = editor.rich_text().len();
    assert_eq!(editor.rich_text().text_utf8_in_range(0..len), "#foo");
}

#[test]
fn the_rule_does_not_match_mid_paragraph() {
    let mut editor = Editor::new(BaseDirection::Ltr);
    editor.insert_str("fo#o");
    editor.set_selection_range(3..3);
    let rules = h1_rule();
    let handled = editor.process(&rules, Key::Char(' '), Modifiers::default());
    assert!(!handled);
    assert_eq!(editor.rich_text().text_utf8_in_range(0..editor.rich_text().len()), "fo#o");
}
