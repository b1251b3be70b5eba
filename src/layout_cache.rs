// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout cache keyed by a fingerprint of text, params, and attributes
//! (§4.H). Grounded in spirit on `parley::lru_cache::LruCache`'s
//! epoch-stamped linear scan, but reworked into the dense-array-plus-
//! free-list-plus-intrusive-doubly-linked-list shape the spec calls for,
//! since the teacher's cache is keyed by an arbitrary `Equivalent` id
//! rather than a precomputed fingerprint.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::attributes::{AttributeSet, AttributeSpan, Fnv1a};
use crate::font::FontProvider;
use crate::layout::{build_layout, Layout, LayoutParams};
use crate::shape::ShaperCache;

const NIL: u32 = u32::MAX;

struct Slot {
    fingerprint: u64,
    layout: Layout,
    stamp: u64,
    prev: u32,
    next: u32,
}

/// Fingerprint of the inputs to [`LayoutCache::get`]: text, params, base
/// direction, paragraph attribute set, and buffer attribute spans, folded
/// together with the same [`Fnv1a`] accumulator attribute sets use (§4.H).
/// `attributes`'s own [`AttributeSet::fingerprint`] is reused directly
/// rather than re-walked entry by entry, so two attribute sets that are
/// equal by that fingerprint never cause a spurious cache miss or hit
/// mismatch with `RichText`'s own notion of equality.
pub fn layout_fingerprint(
    text: &[char],
    attributes: &AttributeSet,
    spans: &[AttributeSpan],
    params: &LayoutParams,
    base_direction: crate::attributes::BaseDirection,
) -> u64 {
    let mut h = Fnv1a::new();
    for &c in text {
        h.write_u32(c as u32);
    }
    h.write_u64(attributes.fingerprint());
    h.write_u32(params.layout_width.to_bits());
    h.write_u8(params.wrap as u8);
    h.write_u8(params.overflow as u8);
    h.write_u8(params.horizontal_align as u8);
    match params.vertical_align {
        crate::attributes::VerticalAlign::Top => h.write_u8(0),
        crate::attributes::VerticalAlign::Center => h.write_u8(1),
        crate::attributes::VerticalAlign::Bottom => h.write_u8(2),
        crate::attributes::VerticalAlign::Baseline(kind) => {
            h.write_u8(3);
            h.write_u8(kind as u8);
        }
    }
    h.write_u32(params.tab_stop_increment.to_bits());
    h.write_u8(params.quantize as u8);
    h.write_u8(base_direction as u8);
    for span in spans {
        h.write_u32(span.range.start);
        h.write_u32(span.range.end);
        span.value.stable_hash(&mut h);
    }
    h.finish()
}

/// Bounded layout cache: `get` returns a cached layout on a fingerprint
/// hit (bumping its position to the front of the LRU list) or builds,
/// inserts, and returns a new one on miss. Entries live in a dense `Vec`
/// slot array; freed slots are recycled via `free_list` before the array
/// grows, and LRU order is tracked with an intrusive doubly-linked list
/// over slot indices so eviction never needs a full scan (§4.H).
pub struct LayoutCache {
    slots: Vec<Option<Slot>>,
    free_list: Vec<u32>,
    index: HashMap<u64, u32>,
    head: u32, // most-recently-used
    tail: u32, // least-recently-used
    max_entries: usize,
    clock: u64,
}

impl LayoutCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            index: HashMap::new(),
            head: NIL,
            tail: NIL,
            max_entries: max_entries.max(1),
            clock: 0,
        }
    }

    /// Returns the cached layout for
    /// `(text, attributes, spans, params, base_direction)`, building and
    /// inserting one on a miss (§4.H). `attributes` is the paragraph-level
    /// default set (§3); `spans` are the buffer's per-codepoint overrides.
    /// Both feed the fingerprint, and both are composed (overrides last)
    /// before being handed to the layout engine.
    pub fn get(
        &mut self,
        text: &[char],
        attributes: &AttributeSet,
        spans: &[AttributeSpan],
        params: &LayoutParams,
        base_direction: crate::attributes::BaseDirection,
        provider: &dyn FontProvider,
        shaper_cache: &mut ShaperCache,
    ) -> &Layout {
        self.clock += 1;
        let fingerprint = layout_fingerprint(text, attributes, spans, params, base_direction);

        if let Some(&slot_index) = self.index.get(&fingerprint) {
            self.touch(slot_index);
            return &self.slots[slot_index as usize].as_ref().unwrap().layout;
        }

        let composed = crate::attributes::compose_paragraph_spans(attributes, spans, text.len() as u32);
        let layout = build_layout(text, &composed, params, base_direction, provider, shaper_cache);
        let slot_index = self.insert(fingerprint, layout);
        &self.slots[slot_index as usize].as_ref().unwrap().layout
    }

    fn insert(&mut self, fingerprint: u64, layout: Layout) -> u32 {
        let slot_index = if let Some(free) = self.free_list.pop() {
            free
        } else if self.slots.len() < self.max_entries {
            self.slots.push(None);
            self.slots.len() as u32 - 1
        } else {
            let evicted = self.tail;
            self.remove_from_list(evicted);
            let old = self.slots[evicted as usize].take().unwrap();
            self.index.remove(&old.fingerprint);
            evicted
        };

        self.slots[slot_index as usize] = Some(Slot {
            fingerprint,
            layout,
            stamp: self.clock,
            prev: NIL,
            next: NIL,
        });
        self.index.insert(fingerprint, slot_index);
        self.push_front(slot_index);
        slot_index
    }

    /// Moves `slot_index` to the front of the LRU list and refreshes its
    /// staleness stamp.
    fn touch(&mut self, slot_index: u32) {
        self.remove_from_list(slot_index);
        self.slots[slot_index as usize].as_mut().unwrap().stamp = self.clock;
        self.push_front(slot_index);
    }

    fn push_front(&mut self, slot_index: u32) {
        let slot = self.slots[slot_index as usize].as_mut().unwrap();
        slot.prev = NIL;
        slot.next = self.head;
        if self.head != NIL {
            self.slots[self.head as usize].as_mut().unwrap().prev = slot_index;
        }
        self.head = slot_index;
        if self.tail == NIL {
            self.tail = slot_index;
        }
    }

    fn remove_from_list(&mut self, slot_index: u32) {
        let (prev, next) = {
            let slot = self.slots[slot_index as usize].as_ref().unwrap();
            (slot.prev, slot.next)
        };
        if prev != NIL {
            self.slots[prev as usize].as_mut().unwrap().next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.slots[next as usize].as_mut().unwrap().prev = prev;
        } else {
            self.tail = prev;
        }
    }

    /// Evicts every entry whose staleness stamp is older than
    /// `current_clock - max_age` (§4.H "evicts entries older than a
    /// configured staleness stamp").
    pub fn compact(&mut self, max_age: u64) {
        let threshold = self.clock.saturating_sub(max_age);
        let stale: Vec<u32> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Some(s) if s.stamp < threshold => Some(i as u32),
                _ => None,
            })
            .collect();
        for slot_index in stale {
            self.remove_from_list(slot_index);
            let old = self.slots[slot_index as usize].take().unwrap();
            self.index.remove(&old.fingerprint);
            self.free_list.push(slot_index);
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.index.clear();
        self.head = NIL;
        self.tail = NIL;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::BaseDirection;
    use crate::font::{FontHandle, FontMetrics, GlyphBounds};

    struct NullFont;
    impl FontProvider for NullFont {
        fn match_font(&self, _: &str, _: f32, _: crate::attributes::FontStyle, _: f32, _: u16, _: bool) -> Option<FontHandle> {
            Some(FontHandle(1))
        }
        fn metrics(&self, _: FontHandle, _: f32) -> FontMetrics {
            FontMetrics {
                units_per_em: 1000,
                ascender: 800.0,
                descender: -200.0,
                cap_height: 700.0,
                x_height: 500.0,
                underline_offset: -100.0,
                underline_thickness: 50.0,
            }
        }
        fn glyph_bounds(&self, _: FontHandle, _: u16, size: f32) -> GlyphBounds {
            GlyphBounds { x_min: 0.0, y_min: 0.0, x_max: size * 0.6, y_max: size }
        }
        fn nominal_glyph(&self, _: FontHandle, c: char) -> u16 {
            c as u16
        }
        fn fallback_chain(&self, _: u16, _: bool) -> Vec<FontHandle> {
            Vec::new()
        }
    }

    #[test]
    fn repeat_query_is_a_cache_hit_and_does_not_grow() {
        let mut cache = LayoutCache::new(4);
        let mut shaper = ShaperCache::new();
        let text: Vec<char> = "hi".chars().collect();
        let attrs = AttributeSet::new();
        let params = LayoutParams::default();
        cache.get(&text, &attrs, &[], &params, BaseDirection::Ltr, &NullFont, &mut shaper);
        cache.get(&text, &attrs, &[], &params, BaseDirection::Ltr, &NullFont, &mut shaper);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_fingerprints_each_get_a_slot_up_to_capacity() {
        let mut cache = LayoutCache::new(2);
        let mut shaper = ShaperCache::new();
        let attrs = AttributeSet::new();
        let params = LayoutParams::default();
        let a: Vec<char> = "a".chars().collect();
        let b: Vec<char> = "b".chars().collect();
        let c: Vec<char> = "c".chars().collect();
        cache.get(&a, &attrs, &[], &params, BaseDirection::Ltr, &NullFont, &mut shaper);
        cache.get(&b, &attrs, &[], &params, BaseDirection::Ltr, &NullFont, &mut shaper);
        assert_eq!(cache.len(), 2);
        // Capacity is 2: inserting a third evicts the LRU entry ("a").
        cache.get(&c, &attrs, &[], &params, BaseDirection::Ltr, &NullFont, &mut shaper);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn compact_evicts_entries_older_than_max_age() {
        let mut cache = LayoutCache::new(4);
        let mut shaper = ShaperCache::new();
        let attrs = AttributeSet::new();
        let params = LayoutParams::default();
        let a: Vec<char> = "a".chars().collect();
        cache.get(&a, &attrs, &[], &params, BaseDirection::Ltr, &NullFont, &mut shaper);
        for i in 0..10 {
            let text: Vec<char> = alloc::format!("x{i}").chars().collect();
            cache.get(&text, &attrs, &[], &params, BaseDirection::Ltr, &NullFont, &mut shaper);
        }
        cache.compact(1);
        assert!(cache.len() <= 4);
    }

    #[test]
    fn a_different_paragraph_attribute_set_is_a_distinct_fingerprint() {
        let text: Vec<char> = "hi".chars().collect();
        let params = LayoutParams::default();
        let plain = AttributeSet::new();
        let heading = AttributeSet::from_inline([crate::attributes::Attribute::FontSize(30.0)]);
        let fp_plain = layout_fingerprint(&text, &plain, &[], &params, BaseDirection::Ltr);
        let fp_heading = layout_fingerprint(&text, &heading, &[], &params, BaseDirection::Ltr);
        assert_ne!(fp_plain, fp_heading);
    }
}
