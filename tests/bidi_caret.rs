// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scenario 3: bidi caret stops at a direction flip inside one line.

mod support;

use support::FixedFont;
use wordform::attributes::BaseDirection;
use wordform::editor::caret::{caret_stops, CaretMode};
use wordform::editor::selection::Affinity;
use wordform::layout::{build_layout, LayoutParams};
use wordform::shape::ShaperCache;

/// "abc" (LTR) + "אבג" (RTL) + "xyz" (LTR), base direction LTR. The run
/// boundaries sit at codepoint offsets 3 and 6.
fn build(mode: CaretMode) -> Vec<wordform::editor::caret::CaretStop> {
    let text: Vec<char> = "abc\u{05D0}\u{05D1}\u{05D2}xyz".chars().collect();
    let mut shaper = ShaperCache::new();
    let layout = build_layout(
        &text,
        &[],
        &LayoutParams::default(),
        BaseDirection::Ltr,
        &FixedFont,
        &mut shaper,
    );
    caret_stops(&layout, 0, mode)
}

/// A flip stop is the dual leading/trailing pair injected at a direction
/// change: both sides share the same logical offset.
fn flip_stops(stops: &[wordform::editor::caret::CaretStop]) -> Vec<u32> {
    stops[1..stops.len() - 1]
        .iter()
        .filter(|s| s.left.offset == s.right.offset)
        .map(|s| s.left.offset)
        .collect()
}

#[test]
fn skribidi_mode_inserts_dual_stops_at_each_direction_flip() {
    let stops = build(CaretMode::Skribidi);
    assert_eq!(flip_stops(&stops), vec![3, 6]);

    let at_three = stops.iter().find(|s| s.left.offset == 3 && s.right.offset == 3).unwrap();
    assert_eq!(at_three.left.affinity, Affinity::Trailing);
    assert!(!at_three.left.rtl);
    assert_eq!(at_three.right.affinity, Affinity::Leading);
    assert!(at_three.right.rtl);

    let at_six = stops.iter().find(|s| s.left.offset == 6 && s.right.offset == 6).unwrap();
    assert_eq!(at_six.left.affinity, Affinity::Trailing);
    assert!(at_six.left.rtl);
    assert_eq!(at_six.right.affinity, Affinity::Leading);
    assert!(!at_six.right.rtl);
}

#[test]
fn simple_mode_has_no_flip_stops() {
    let stops = build(CaretMode::Simple);
    assert!(flip_stops(&stops).is_empty());
}

#[test]
fn skribidi_mode_has_exactly_two_more_stops_than_simple() {
    let skribidi = build(CaretMode::Skribidi);
    let simple = build(CaretMode::Simple);
    assert_eq!(skribidi.len(), simple.len() + 2);
}

#[test]
fn stops_cover_every_codepoint_with_non_decreasing_x() {
    let stops = build(CaretMode::Skribidi);
    assert_eq!(stops.first().unwrap().left.affinity, Affinity::StartOfLine);
    assert_eq!(stops.last().unwrap().left.affinity, Affinity::EndOfLine);
    for window in stops.windows(2) {
        assert!(window[1].x >= window[0].x);
    }
    let last_real = stops[stops.len() - 2];
    assert_eq!(last_real.right.offset, 9);
}
