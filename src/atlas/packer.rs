// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-page rectangle packer: a free-rectangle list with best-fit by
//! shortest side (§4.G "per-page allocator"). Original, since the
//! teacher's page allocator is `guillotiere`, a dependency of the
//! out-of-scope `vello_common::image_cache::ImageCache`.

use alloc::vec::Vec;

/// An axis-aligned rectangle in page-pixel coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    fn right(&self) -> u16 {
        self.x + self.width
    }

    fn bottom(&self) -> u16 {
        self.y + self.height
    }

    fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// The smallest rectangle containing both `self` and `other`, used to
    /// accumulate a page's dirty region across several writes.
    pub fn union(self, other: Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }
}

/// Free-rectangle-list packer for one atlas page. Allocation picks the
/// free rectangle whose shorter side is closest to the requested size
/// (best-fit by shortest side), then splits the remainder into at most
/// two new free rectangles (a guillotine split).
pub struct PagePacker {
    width: u16,
    height: u16,
    free: Vec<Rect>,
}

impl PagePacker {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            free: alloc::vec![Rect { x: 0, y: 0, width, height }],
        }
    }

    /// Finds and reserves space for a `width`x`height` entry, returning
    /// its placement, or `None` if no free rectangle fits.
    pub fn allocate(&mut self, width: u16, height: u16) -> Option<Rect> {
        if width == 0 || height == 0 || width > self.width || height > self.height {
            return None;
        }

        let mut best_index = None;
        let mut best_short_side_waste = u32::MAX;
        for (i, rect) in self.free.iter().enumerate() {
            if rect.width < width || rect.height < height {
                continue;
            }
            let leftover_w = rect.width - width;
            let leftover_h = rect.height - height;
            let short_side_waste = leftover_w.min(leftover_h) as u32;
            if short_side_waste < best_short_side_waste {
                best_short_side_waste = short_side_waste;
                best_index = Some(i);
            }
        }

        let index = best_index?;
        let chosen = self.free.remove(index);
        let placed = Rect {
            x: chosen.x,
            y: chosen.y,
            width,
            height,
        };

        // Guillotine split: the strip to the right of the placed rect
        // spans the placed rect's full height; the strip below spans the
        // chosen rect's full width. This keeps the free list small at the
        // cost of some fragmentation, acceptable since `rebuild_page`
        // periodically coalesces it from scratch.
        if chosen.width > width {
            self.free.push(Rect {
                x: chosen.x + width,
                y: chosen.y,
                width: chosen.width - width,
                height,
            });
        }
        if chosen.height > height {
            self.free.push(Rect {
                x: chosen.x,
                y: chosen.y + height,
                width: chosen.width,
                height: chosen.height - height,
            });
        }

        Some(placed)
    }

    /// Marks `rect` as occupied without returning it from `allocate`,
    /// used by [`super::Atlas::rebuild_page`] to re-seed a fresh packer
    /// from the entries still live on a page.
    pub fn reserve(&mut self, rect: Rect) {
        let mut next = Vec::with_capacity(self.free.len());
        for free in self.free.drain(..) {
            if !free.contains(&rect) && !rects_overlap(&free, &rect) {
                next.push(free);
                continue;
            }
            if !rects_overlap(&free, &rect) {
                next.push(free);
                continue;
            }
            split_around(free, rect, &mut next);
        }
        self.free = next;
    }
}

fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && b.x < a.right() && a.y < b.bottom() && b.y < a.bottom()
}

/// Splits free rectangle `free` into the (up to four) sub-rectangles
/// remaining after carving out `occupied`, pushing the non-empty ones
/// into `out`.
fn split_around(free: Rect, occupied: Rect, out: &mut Vec<Rect>) {
    // Left strip.
    if occupied.x > free.x {
        out.push(Rect {
            x: free.x,
            y: free.y,
            width: occupied.x - free.x,
            height: free.height,
        });
    }
    // Right strip.
    if occupied.right() < free.right() {
        out.push(Rect {
            x: occupied.right(),
            y: free.y,
            width: free.right() - occupied.right(),
            height: free.height,
        });
    }
    // Top strip (constrained to the occupied rect's horizontal span).
    if occupied.y > free.y {
        out.push(Rect {
            x: occupied.x.max(free.x),
            y: free.y,
            width: occupied.width.min(free.width),
            height: occupied.y - free.y,
        });
    }
    // Bottom strip.
    if occupied.bottom() < free.bottom() {
        out.push(Rect {
            x: occupied.x.max(free.x),
            y: occupied.bottom(),
            width: occupied.width.min(free.width),
            height: free.bottom() - occupied.bottom(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_from_empty_page() {
        let mut packer = PagePacker::new(64, 64);
        let placed = packer.allocate(10, 10).unwrap();
        assert_eq!(placed, Rect { x: 0, y: 0, width: 10, height: 10 });
    }

    #[test]
    fn second_allocation_avoids_first() {
        let mut packer = PagePacker::new(64, 64);
        let a = packer.allocate(10, 10).unwrap();
        let b = packer.allocate(10, 10).unwrap();
        assert!(!rects_overlap(&a, &b));
    }

    #[test]
    fn oversized_allocation_fails() {
        let mut packer = PagePacker::new(16, 16);
        assert!(packer.allocate(32, 8).is_none());
    }

    #[test]
    fn best_fit_prefers_tightest_shortest_side() {
        let mut packer = PagePacker::new(100, 10);
        // Two disjoint free rects after an initial split: a 40x10 and a 60x10 strip.
        packer.allocate(40, 10).unwrap();
        // Remaining free rect should be exactly 60x10; a 50x10 request must fit there.
        let placed = packer.allocate(50, 10).unwrap();
        assert_eq!(placed.width, 50);
    }
}
