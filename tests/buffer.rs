// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rich-text mutation scenarios spanning paragraph boundaries.

use wordform::attributes::{Attribute, BaseDirection};
use wordform::rich_text::RichText;
use wordform::text_buffer::TextBuffer;

fn buffer_of(s: &str) -> TextBuffer {
    TextBuffer::from_chars(s.chars().collect())
}

/// Scenario 2: a replace whose range starts in one paragraph and runs
/// to the end of the next merges the pair into one buffer, then
/// resplits at whatever separator the merged text still contains.
#[test]
fn rich_text_replace_merges_paragraphs() {
    let mut rich = RichText::new(BaseDirection::Ltr);
    // Build "Foo\u{2029}barbaz" as two paragraphs directly via public API.
    rich.replace(0..0, &buffer_of("Foo\u{2029}barbaz"));
    assert_eq!(rich.paragraph_count(), 2);
    assert_eq!(rich.len(), 10);

    let incoming = buffer_of("Foo\u{2029}bar");
    rich.replace(3..10, &incoming);
    assert_eq!(rich.len(), 10);
    assert_eq!(rich.paragraph_count(), 2);
    assert_eq!(rich.text_utf8_in_range(0..rich.len()), "FooFoo\u{2029}bar");
}

/// Testable property: `len(apply(M, R)) = len(R) + len(M.insert) -
/// len(M.range)`.
#[test]
fn mutation_length_invariant_holds_across_paragraphs() {
    let mut rich = RichText::new(BaseDirection::Ltr);
    rich.replace(0..0, &buffer_of("alpha\u{2029}beta\u{2029}gamma"));
    let before = rich.len();
    let range = 2..8;
    let incoming = buffer_of("XYZ");
    rich.replace(range.clone(), &incoming);
    assert_eq!(rich.len(), before + incoming.len() - (range.end - range.start));
}

/// Testable property: after `add_attribute`, `has_attribute` holds for
/// the exact range, across a multi-paragraph rich text.
#[test]
fn add_attribute_then_has_attribute_across_paragraphs() {
    let mut rich = RichText::new(BaseDirection::Ltr);
    rich.replace(0..0, &buffer_of("hello\u{2029}world"));
    let attr = Attribute::FontWeight(700.0);
    rich.add_attribute(2..8, attr.clone());
    assert!(rich.has_attribute(2..8, &attr));
    rich.clear_attribute(2..8, attr.kind());
    assert!(!rich.has_attribute(2..8, &attr));
}

#[test]
fn paragraph_separator_invariant_always_holds() {
    let mut rich = RichText::new(BaseDirection::Ltr);
    rich.replace(0..0, &buffer_of("a\u{2029}b\u{2029}c\u{2029}d"));
    assert_eq!(rich.paragraph_count(), 4);
    let paragraphs = rich.paragraphs();
    for p in &paragraphs[..paragraphs.len() - 1] {
        assert!(p.ends_with_separator());
    }
    assert!(!paragraphs.last().unwrap().ends_with_separator());
}
