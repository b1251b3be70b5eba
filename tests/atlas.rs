// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scenario 4: atlas eviction cycle. A page sized to hold exactly four
//! 16x16 glyphs is filled, one frame passes touching only half of them,
//! and a fifth insert evicts the untouched half to make room.

use wordform::atlas::{Atlas, AtlasConfig, GlyphFingerprint, RasterMode};
use wordform::font::FontHandle;

fn glyph(id: u16) -> GlyphFingerprint {
    GlyphFingerprint::new(FontHandle(1), id, 16.0, RasterMode::Grayscale)
}

#[test]
fn untouched_entries_are_evicted_to_make_room_for_a_new_one() {
    let mut atlas = Atlas::new(AtlasConfig { page_width: 64, page_height: 16, max_pages: 1 });

    let g1 = glyph(1);
    let g2 = glyph(2);
    let g3 = glyph(3);
    let g4 = glyph(4);
    atlas.insert_glyph(g1, 16, 16).unwrap();
    atlas.insert_glyph(g2, 16, 16).unwrap();
    atlas.insert_glyph(g3, 16, 16).unwrap();
    atlas.insert_glyph(g4, 16, 16).unwrap();
    assert_eq!(atlas.entry_count(), 4);

    // The page is exactly full: a fifth distinct entry cannot fit
    // without eviction while everything is still pinned.
    let g_pending = glyph(5);
    assert!(atlas.insert_glyph(g_pending, 16, 16).is_err());

    // End the frame (clears every pin), then re-touch only g1 and g2,
    // leaving g3 and g4 cold.
    atlas.end_frame();
    assert!(atlas.get_glyph(g1).is_some());
    assert!(atlas.get_glyph(g2).is_some());

    let g5 = atlas.insert_glyph(glyph(5), 16, 16).unwrap();
    assert!(atlas.get_glyph(glyph(5)).is_some());
    let _ = g5;

    assert!(atlas.get_glyph(g3).is_none());
    assert!(atlas.get_glyph(g4).is_none());
    assert!(atlas.get_glyph(g1).is_some());
    assert!(atlas.get_glyph(g2).is_some());
    assert_eq!(atlas.entry_count(), 3);
}

#[test]
fn end_frame_drains_dirty_rects_only_once_per_page() {
    let mut atlas = Atlas::new(AtlasConfig::default());
    atlas.insert_glyph(glyph(1), 10, 10).unwrap();
    atlas.insert_glyph(glyph(2), 10, 10).unwrap();
    let dirty = atlas.end_frame();
    assert_eq!(dirty.len(), 1);
    assert!(atlas.end_frame().is_empty());
}
