// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decoration emission and run-merging (§4.E step 7).

#[cfg(feature = "libm")]
#[allow(unused_imports)]
use core_maths::CoreFloat;

use alloc::vec::Vec;

use super::data::Decoration;

/// Merges adjacent decorations with identical style/paint/thickness into
/// a single run, matching "merge adjacent decoration spans with
/// identical style/paint/thickness into one run" (§4.E step 7).
pub fn merge_adjacent(mut decorations: Vec<Decoration>) -> Vec<Decoration> {
    decorations.sort_by(|a, b| a.position.partial_cmp(&b.position).unwrap());
    let mut merged: Vec<Decoration> = Vec::with_capacity(decorations.len());
    for dec in decorations {
        if let Some(last) = merged.last_mut() {
            let mergeable = last.style == dec.style
                && last.paint == dec.paint
                && last.thickness == dec.thickness
                && last.offset == dec.offset
                && (last.position + last.length - dec.position).abs() < f32::EPSILON;
            if mergeable {
                last.length = dec.position + dec.length - last.position;
                continue;
            }
        }
        merged.push(dec);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{DecorationStyle, PaintRef};

    fn dec(position: f32, length: f32) -> Decoration {
        Decoration {
            style: DecorationStyle::Solid,
            position,
            offset: 0.0,
            length,
            pattern_offset: 0.0,
            thickness: 1.0,
            paint: PaintRef(1),
        }
    }

    #[test]
    fn adjacent_identical_decorations_merge() {
        let merged = merge_adjacent(alloc::vec![dec(0.0, 10.0), dec(10.0, 5.0)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].length, 15.0);
    }

    #[test]
    fn gap_between_decorations_prevents_merge() {
        let merged = merge_adjacent(alloc::vec![dec(0.0, 10.0), dec(12.0, 5.0)]);
        assert_eq!(merged.len(), 2);
    }
}
