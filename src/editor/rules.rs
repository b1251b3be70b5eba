// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered key/modifier rule dispatch (§4.I "Rule sets"): each rule
//! matches a key, a modifier mask, and optional paragraph-style/prefix
//! conditions, then performs one of a fixed set of editor actions.
//! `process` scans in order and stops at the first rule that reports
//! itself handled.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::attributes::Attribute;

use super::Editor;

/// A logical key event, independent of any host keyboard backend.
#[derive(Clone, Debug, PartialEq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Escape,
}

/// Modifier mask accompanying a [`Key`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// What a matched rule does to the editor (§4.I "Rule sets").
pub enum RuleAction {
    ToggleAttribute(Attribute),
    SetAttribute(Attribute),
    ClearAttribute(crate::attributes::AttributeKind),
    SetParagraphAttribute(Attribute),
    IndentLevelDelta(i32),
    /// Converts a start-of-paragraph textual prefix to a paragraph
    /// style, removing the prefix from the text.
    PrefixToParagraphStyle(Attribute),
    /// Changes the paragraph style only if the current paragraph is
    /// empty or the caret is at its end.
    ParagraphStyleIfEmptyOrAtEnd(Attribute),
    /// Tab key handling (§13.2): a selection spanning more than one
    /// paragraph shifts every touched paragraph's indent level by +1,
    /// or -1 when the matched rule's modifiers carry `shift`; any other
    /// selection inserts a literal tab codepoint.
    Tab,
    /// Falls through to the editor's default key handling.
    BasePassthrough,
    SelectAll,
    Undo,
    Redo,
    InsertChar(char),
    Custom(Box<dyn Fn(&mut Editor) -> bool>),
}

impl core::fmt::Debug for RuleAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ToggleAttribute(a) => write!(f, "ToggleAttribute({a:?})"),
            Self::SetAttribute(a) => write!(f, "SetAttribute({a:?})"),
            Self::ClearAttribute(k) => write!(f, "ClearAttribute({k:?})"),
            Self::SetParagraphAttribute(a) => write!(f, "SetParagraphAttribute({a:?})"),
            Self::IndentLevelDelta(d) => write!(f, "IndentLevelDelta({d})"),
            Self::PrefixToParagraphStyle(a) => write!(f, "PrefixToParagraphStyle({a:?})"),
            Self::ParagraphStyleIfEmptyOrAtEnd(a) => write!(f, "ParagraphStyleIfEmptyOrAtEnd({a:?})"),
            Self::Tab => write!(f, "Tab"),
            Self::BasePassthrough => write!(f, "BasePassthrough"),
            Self::SelectAll => write!(f, "SelectAll"),
            Self::Undo => write!(f, "Undo"),
            Self::Redo => write!(f, "Redo"),
            Self::InsertChar(c) => write!(f, "InsertChar({c:?})"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// One entry of a [`RuleSet`]: a key/modifier match plus optional
/// paragraph-style and content-prefix conditions.
pub struct Rule {
    pub key: Key,
    pub mods: Modifiers,
    pub paragraph_style: Option<Attribute>,
    pub content_prefix: Option<String>,
    pub action: RuleAction,
}

impl Rule {
    fn matches(&self, editor: &Editor, key: &Key, mods: Modifiers) -> bool {
        if &self.key != key || self.mods != mods {
            return false;
        }
        if let Some(style) = &self.paragraph_style {
            if !editor.has_paragraph_attribute(editor.current_paragraph_range(), style) {
                return false;
            }
        }
        if let Some(prefix) = &self.content_prefix {
            if !editor.current_paragraph_starts_with(prefix) {
                return false;
            }
        }
        true
    }
}

/// An ordered list of [`Rule`]s, scanned first-match-wins (§4.I "Rule
/// sets").
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Scans rules in order against `key`/`mods`; the first whose
    /// conditions match and whose action succeeds stops the scan and
    /// returns `true`. Returns `false` if no rule matches, signaling the
    /// caller to fall through to its default handling.
    pub fn process(&self, editor: &mut Editor, key: Key, mods: Modifiers) -> bool {
        for i in 0..self.rules.len() {
            if !self.rules[i].matches(editor, &key, mods) {
                continue;
            }
            if editor.apply_rule_action(&self.rules[i]) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Attribute, BaseDirection};
    use crate::editor::Editor;

    #[test]
    fn unmatched_key_falls_through() {
        let mut editor = Editor::new(BaseDirection::Ltr);
        let mut rules = RuleSet::new();
        rules.push(Rule {
            key: Key::Char('b'),
            mods: Modifiers { ctrl: true, ..Modifiers::default() },
            paragraph_style: None,
            content_prefix: None,
            action: RuleAction::ToggleAttribute(Attribute::FontWeight(700.0)),
        });
        assert!(!rules.process(&mut editor, Key::Char('x'), Modifiers::default()));
    }

    #[test]
    fn matched_key_toggles_attribute() {
        let mut editor = Editor::new(BaseDirection::Ltr);
        editor.insert_str("hi");
        editor.set_selection_range(0..2);
        let mut rules = RuleSet::new();
        rules.push(Rule {
            key: Key::Char('b'),
            mods: Modifiers { ctrl: true, ..Modifiers::default() },
            paragraph_style: None,
            content_prefix: None,
            action: RuleAction::ToggleAttribute(Attribute::FontWeight(700.0)),
        });
        let handled = rules.process(
            &mut editor,
            Key::Char('b'),
            Modifiers { ctrl: true, ..Modifiers::default() },
        );
        assert!(handled);
        assert!(editor.has_text_attribute(0..2, &Attribute::FontWeight(700.0)));
    }
}
