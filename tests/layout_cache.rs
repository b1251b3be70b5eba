// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scenario 6: two builds of the same text/params/attributes under a
//! deterministic font hit the same cache slot and produce identical
//! glyph output.

mod support;

use support::FixedFont;
use wordform::attributes::{AttributeSet, BaseDirection};
use wordform::layout::LayoutParams;
use wordform::layout_cache::{layout_fingerprint, LayoutCache};
use wordform::shape::ShaperCache;

fn total_advance(layout: &wordform::layout::Layout) -> f32 {
    layout.glyphs.iter().map(|g| g.advance_x).sum()
}

#[test]
fn identical_inputs_hit_the_same_cache_slot() {
    let text: Vec<char> = "Hamburgerfontstiv".chars().collect();
    let attrs = AttributeSet::new();
    let params = LayoutParams::default();
    let mut cache = LayoutCache::new(8);
    let mut shaper = ShaperCache::new();

    let fp_a = layout_fingerprint(&text, &attrs, &[], &params, BaseDirection::Ltr);
    let fp_b = layout_fingerprint(&text, &attrs, &[], &params, BaseDirection::Ltr);
    assert_eq!(fp_a, fp_b);

    let first = cache.get(&text, &attrs, &[], &params, BaseDirection::Ltr, &FixedFont, &mut shaper);
    let glyph_count = first.glyphs.len();
    let advance_sum = total_advance(first);
    assert!(glyph_count > 0);
    assert_eq!(cache.len(), 1);

    let second = cache.get(&text, &attrs, &[], &params, BaseDirection::Ltr, &FixedFont, &mut shaper);
    assert_eq!(second.glyphs.len(), glyph_count);
    assert_eq!(total_advance(second), advance_sum);
    // Still one slot: the second call was a fingerprint hit, not a
    // fresh insert.
    assert_eq!(cache.len(), 1);
}

#[test]
fn a_different_tab_stop_increment_is_a_distinct_fingerprint() {
    let text: Vec<char> = "Hamburgerfontstiv".chars().collect();
    let attrs = AttributeSet::new();
    let narrow = LayoutParams { tab_stop_increment: 24.0, ..LayoutParams::default() };
    let wide = LayoutParams { tab_stop_increment: 48.0, ..LayoutParams::default() };
    let fp_narrow = layout_fingerprint(&text, &attrs, &[], &narrow, BaseDirection::Ltr);
    let fp_wide = layout_fingerprint(&text, &attrs, &[], &wide, BaseDirection::Ltr);
    assert_ne!(fp_narrow, fp_wide);
}

#[test]
fn a_different_paragraph_attribute_set_is_a_distinct_fingerprint() {
    let text: Vec<char> = "Hamburgerfontstiv".chars().collect();
    let params = LayoutParams::default();
    let plain = AttributeSet::new();
    let heading = AttributeSet::from_inline([wordform::attributes::Attribute::FontSize(30.0)]);
    let fp_plain = layout_fingerprint(&text, &plain, &[], &params, BaseDirection::Ltr);
    let fp_heading = layout_fingerprint(&text, &heading, &[], &params, BaseDirection::Ltr);
    assert_ne!(fp_plain, fp_heading);
}
