// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Image atlas: per-page rectangle packing, LRU eviction with pinning,
//! dirty-rect tracking (§4.G). Grounded on `parley_draw::atlas` for the
//! cache/eviction/fingerprint/pin shape; the packer itself is original
//! since the teacher's `guillotiere`-backed `ImageCache` is a rendering
//! dependency this core must not carry (Non-goals).

mod packer;

#[cfg(feature = "libm")]
#[allow(unused_imports)]
use core_maths::CoreFloat;

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::error::{Error, Result};
use packer::{PagePacker, Rect as PackedRect};

/// Rasterization mode, folded into a glyph's fingerprint so that e.g. a
/// hinted and an unhinted rendering of the same glyph never collide
/// (§4.G "fingerprint for glyph entries").
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RasterMode {
    Grayscale,
    Subpixel,
    Color,
}

/// Stable cache key for a rasterized glyph. Font size is quantized to the
/// nearest 1/4 px so that sub-pixel layout jitter does not explode the
/// atlas with near-duplicate entries (Open Question decision, §13).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GlyphFingerprint {
    pub font: crate::font::FontHandle,
    pub glyph_id: u16,
    pub size_quarter_px: u32,
    pub mode: RasterMode,
}

impl GlyphFingerprint {
    pub fn new(font: crate::font::FontHandle, glyph_id: u16, size: f32, mode: RasterMode) -> Self {
        Self {
            font,
            glyph_id,
            size_quarter_px: (size * 4.0).round() as u32,
            mode,
        }
    }
}

/// Stable cache key for a rasterized icon (§4.G "for icons").
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IconFingerprint {
    pub icon: crate::font::IconHandle,
    pub width_quarter_px: u32,
    pub height_quarter_px: u32,
    pub mode: RasterMode,
}

impl IconFingerprint {
    pub fn new(icon: crate::font::IconHandle, width: f32, height: f32, mode: RasterMode) -> Self {
        Self {
            icon,
            width_quarter_px: (width * 4.0).round() as u32,
            height_quarter_px: (height * 4.0).round() as u32,
            mode,
        }
    }
}

/// Either fingerprint kind, used as the cache's actual hash-map key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Fingerprint {
    Glyph(GlyphFingerprint),
    Icon(IconFingerprint),
}

/// Opaque handle returned on insertion, stable across rebuilds as long as
/// the entry survives eviction (§4.G "opaque handle").
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AtlasHandle {
    page: u32,
    slot: u32,
}

struct Entry {
    page: u32,
    rect: PackedRect,
    last_use: u64,
    pinned: bool,
}

struct Page {
    packer: PagePacker,
    dirty_rect: Option<PackedRect>,
}

impl Page {
    fn new(width: u16, height: u16) -> Self {
        Self {
            packer: PagePacker::new(width, height),
            dirty_rect: None,
        }
    }

    fn mark_dirty(&mut self, rect: PackedRect) {
        self.dirty_rect = Some(match self.dirty_rect {
            Some(existing) => existing.union(rect),
            None => rect,
        });
    }
}

/// Configuration bounds for atlas growth (§4.G "bounded by max page count
/// + max page size").
#[derive(Copy, Clone, Debug)]
pub struct AtlasConfig {
    pub page_width: u16,
    pub page_height: u16,
    pub max_pages: u32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            page_width: 1024,
            page_height: 1024,
            max_pages: 4,
        }
    }
}

/// Glyph/icon bitmap atlas: packs entries into one or more fixed-size
/// pages, evicts the coldest unpinned entries under pressure, and tracks
/// a per-page dirty rectangle for the external renderer to flush (§4.G).
pub struct Atlas {
    config: AtlasConfig,
    pages: Vec<Page>,
    entries: HashMap<Fingerprint, (AtlasHandle, Entry)>,
    handle_to_fingerprint: HashMap<AtlasHandle, Fingerprint>,
    next_slot: u32,
    clock: u64,
}

impl Atlas {
    pub fn new(config: AtlasConfig) -> Self {
        Self {
            config,
            pages: alloc::vec![Page::new(config.page_width, config.page_height)],
            entries: HashMap::new(),
            handle_to_fingerprint: HashMap::new(),
            next_slot: 0,
            clock: 0,
        }
    }

    /// Looks up a cached glyph bitmap, bumping its LRU stamp and pinning
    /// it for the current frame on hit (§4.G "the same fingerprint hit
    /// bumps the LRU").
    pub fn get_glyph(&mut self, key: GlyphFingerprint) -> Option<AtlasHandle> {
        self.get(Fingerprint::Glyph(key))
    }

    /// Looks up a cached icon bitmap; see [`Atlas::get_glyph`].
    pub fn get_icon(&mut self, key: IconFingerprint) -> Option<AtlasHandle> {
        self.get(Fingerprint::Icon(key))
    }

    fn get(&mut self, fp: Fingerprint) -> Option<AtlasHandle> {
        let clock = self.clock;
        if let Some((handle, entry)) = self.entries.get_mut(&fp) {
            entry.last_use = clock;
            entry.pinned = true;
            return Some(*handle);
        }
        None
    }

    /// Inserts a new glyph bitmap of `width`x`height` pixels, trying
    /// existing pages before allocating a new one, up to
    /// `config.max_pages` (§4.G).
    pub fn insert_glyph(&mut self, key: GlyphFingerprint, width: u16, height: u16) -> Result<AtlasHandle> {
        self.insert(Fingerprint::Glyph(key), width, height)
    }

    /// Inserts a new icon bitmap; see [`Atlas::insert_glyph`].
    pub fn insert_icon(&mut self, key: IconFingerprint, width: u16, height: u16) -> Result<AtlasHandle> {
        self.insert(Fingerprint::Icon(key), width, height)
    }

    fn insert(&mut self, fp: Fingerprint, width: u16, height: u16) -> Result<AtlasHandle> {
        if let Some((handle, entry)) = self.entries.get_mut(&fp) {
            entry.last_use = self.clock;
            entry.pinned = true;
            return Ok(*handle);
        }

        for page_index in 0..self.pages.len() as u32 {
            if let Some(rect) = self.pages[page_index as usize].packer.allocate(width, height) {
                return Ok(self.place(fp, page_index, rect));
            }
        }

        if (self.pages.len() as u32) < self.config.max_pages {
            self.pages
                .push(Page::new(self.config.page_width, self.config.page_height));
            let page_index = self.pages.len() as u32 - 1;
            if let Some(rect) = self.pages[page_index as usize].packer.allocate(width, height) {
                return Ok(self.place(fp, page_index, rect));
            }
        }

        if self.evict_cold(width, height) {
            return self.insert(fp, width, height);
        }

        log::debug!(
            "atlas capacity exceeded for a {width}x{height} entry across {} pages",
            self.pages.len()
        );
        Err(Error::atlas_capacity_exceeded(
            width as usize * height as usize,
            self.config.page_width as usize * self.config.page_height as usize,
        ))
    }

    fn place(&mut self, fp: Fingerprint, page: u32, rect: PackedRect) -> AtlasHandle {
        let slot = self.next_slot;
        self.next_slot += 1;
        let handle = AtlasHandle { page, slot };
        self.pages[page as usize].mark_dirty(rect);
        self.entries.insert(
            fp,
            (
                handle,
                Entry {
                    page,
                    rect,
                    last_use: self.clock,
                    pinned: true,
                },
            ),
        );
        self.handle_to_fingerprint.insert(handle, fp);
        handle
    }

    /// Evicts the coldest unpinned entries on whichever page has the most
    /// unpinned area, then rebuilds that page's free space (§4.G
    /// "rebuild: evict cold entries, coalesce free space"). Returns
    /// whether anything was freed.
    fn evict_cold(&mut self, width: u16, height: u16) -> bool {
        let mut candidates: Vec<(Fingerprint, u32, u64)> = self
            .entries
            .iter()
            .filter(|(_, (_, e))| !e.pinned)
            .map(|(fp, (_, e))| (*fp, e.page, e.last_use))
            .collect();
        if candidates.is_empty() {
            return false;
        }
        candidates.sort_by_key(|&(_, _, last_use)| last_use);

        let mut freed_any = false;
        let mut rebuilt_pages = alloc::vec::Vec::new();
        for (fp, page, _) in candidates {
            if let Some((handle, _)) = self.entries.remove(&fp) {
                self.handle_to_fingerprint.remove(&handle);
                freed_any = true;
                if !rebuilt_pages.contains(&page) {
                    rebuilt_pages.push(page);
                }
            }
        }

        for page in rebuilt_pages {
            self.rebuild_page(page);
        }

        let _ = (width, height);
        freed_any
    }

    /// Rebuilds a page's free-rectangle list from the entries still live
    /// on it and marks the whole page dirty for full re-upload (§4.G).
    fn rebuild_page(&mut self, page: u32) {
        let width = self.config.page_width;
        let height = self.config.page_height;
        let mut packer = PagePacker::new(width, height);
        for (_, entry) in self.entries.values().filter(|(_, e)| e.page == page) {
            packer.reserve(entry.rect);
        }
        self.pages[page as usize].packer = packer;
        self.pages[page as usize].mark_dirty(PackedRect {
            x: 0,
            y: 0,
            width,
            height,
        });
    }

    /// Advances the frame clock and clears every entry's pin, so that the
    /// next frame's accesses determine what stays pinned (§4.G "entries
    /// touched during the current frame").
    pub fn end_frame(&mut self) -> Vec<(u32, PackedRect)> {
        self.clock += 1;
        for (_, entry) in self.entries.values_mut() {
            entry.pinned = false;
        }
        self.pages
            .iter_mut()
            .enumerate()
            .filter_map(|(i, p)| p.dirty_rect.take().map(|r| (i as u32, r)))
            .collect()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontHandle;

    fn glyph(id: u16) -> GlyphFingerprint {
        GlyphFingerprint::new(FontHandle(1), id, 16.0, RasterMode::Grayscale)
    }

    #[test]
    fn repeated_insert_of_same_fingerprint_returns_same_handle() {
        let mut atlas = Atlas::new(AtlasConfig::default());
        let h1 = atlas.insert_glyph(glyph(5), 10, 10).unwrap();
        let h2 = atlas.insert_glyph(glyph(5), 10, 10).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(atlas.entry_count(), 1);
    }

    #[test]
    fn quantized_size_collapses_near_identical_fingerprints() {
        let a = GlyphFingerprint::new(FontHandle(1), 5, 16.01, RasterMode::Grayscale);
        let b = GlyphFingerprint::new(FontHandle(1), 5, 16.02, RasterMode::Grayscale);
        assert_eq!(a, b);
    }

    #[test]
    fn unpinned_cold_entry_is_evicted_to_make_room() {
        let mut atlas = Atlas::new(AtlasConfig {
            page_width: 32,
            page_height: 32,
            max_pages: 1,
        });
        let first = atlas.insert_glyph(glyph(1), 30, 30).unwrap();
        atlas.end_frame(); // unpins `first`
        let _second = atlas.insert_glyph(glyph(2), 30, 30).unwrap();
        assert!(atlas.entries.get(&Fingerprint::Glyph(glyph(1))).is_none());
        let _ = first;
    }

    #[test]
    fn pinned_entry_survives_eviction_pressure() {
        let mut atlas = Atlas::new(AtlasConfig {
            page_width: 32,
            page_height: 32,
            max_pages: 1,
        });
        let _first = atlas.insert_glyph(glyph(1), 30, 30).unwrap();
        // No `end_frame` call: entry 1 stays pinned, so a second
        // same-size insert that cannot coexist must fail outright.
        let err = atlas.insert_glyph(glyph(2), 30, 30);
        assert!(err.is_err());
    }

    #[test]
    fn end_frame_reports_dirty_rect_once() {
        let mut atlas = Atlas::new(AtlasConfig::default());
        atlas.insert_glyph(glyph(1), 10, 10).unwrap();
        let dirty = atlas.end_frame();
        assert_eq!(dirty.len(), 1);
        let dirty_again = atlas.end_frame();
        assert!(dirty_again.is_empty());
    }
}
