// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;

use super::{Attribute, AttributeKind, CollectionId, Fnv1a};
use crate::error::{Error, Result};

/// One entry of an [`AttributeSet`]: either an attribute value carried
/// inline, or a reference to a named set resolved via an
/// [`super::AttributeCollection`] (§3 "Attribute set").
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeRef {
    Inline(Attribute),
    Named {
        collection: CollectionId,
        name: String,
    },
}

/// An ordered list of attribute values or named references. Resolving a
/// property scans back-to-front; the last matching entry wins (§4.A).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeSet {
    entries: Vec<AttributeRef>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn from_inline(values: impl IntoIterator<Item = Attribute>) -> Self {
        Self {
            entries: values.into_iter().map(AttributeRef::Inline).collect(),
        }
    }

    pub fn push(&mut self, entry: AttributeRef) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[AttributeRef] {
        &self.entries
    }

    /// Composes `self` (defaults) with `overrides`, returning a new set in
    /// which every entry of `overrides` resolves after (and therefore wins
    /// over) every entry of `self`, matching "paragraph defaults + span
    /// values, with span values overriding" (§3).
    pub fn compose(&self, overrides: &Self) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + overrides.entries.len());
        entries.extend(self.entries.iter().cloned());
        entries.extend(overrides.entries.iter().cloned());
        Self { entries }
    }

    /// Resolves the effective value for `kind`, scanning back-to-front.
    /// For `paint-color` attributes, `kind` must already carry the
    /// specific [`super::PaintTag`] slot/state being queried so "last
    /// matching `paint-tag` wins" holds without extra branching here.
    pub fn resolve(
        &self,
        kind: AttributeKind,
        collections: &dyn Fn(CollectionId, &str) -> Option<Attribute>,
    ) -> Result<Option<Attribute>> {
        for entry in self.entries.iter().rev() {
            let value = match entry {
                AttributeRef::Inline(v) => {
                    if v.kind() == kind {
                        Some(v.clone())
                    } else {
                        None
                    }
                }
                AttributeRef::Named { collection, name } => {
                    match collections(*collection, name) {
                        Some(v) if v.kind() == kind => Some(v),
                        Some(_) => None,
                        None => {
                            log::debug!(
                                "attribute reference {name:?} not found in collection {collection:?}"
                            );
                            return Err(Error::unknown_attribute_collection(0, 0, 0));
                        }
                    }
                }
            };
            if value.is_some() {
                return Ok(value);
            }
        }
        Ok(None)
    }

    /// Stable 64-bit hash over the declared entry order. Named references
    /// are hashed by `(collection, name)` identity, not by their resolved
    /// value, since collections are immutable once shared (§5) — two sets
    /// referencing the same name in the same collection are equivalent for
    /// caching purposes without a collection lookup.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a::new();
        for entry in &self.entries {
            match entry {
                AttributeRef::Inline(v) => {
                    h.write_u8(0);
                    v.stable_hash(&mut h);
                }
                AttributeRef::Named { collection, name } => {
                    h.write_u8(1);
                    h.write_u32(collection.0);
                    h.write_bytes(name.as_bytes());
                }
            }
        }
        h.finish()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::FontStyle;

    #[test]
    fn later_inline_entry_wins() {
        let mut set = AttributeSet::new();
        set.push(AttributeRef::Inline(Attribute::FontStyle(FontStyle::Normal)));
        set.push(AttributeRef::Inline(Attribute::FontStyle(FontStyle::Italic)));
        let resolved = set
            .resolve(AttributeKind::FontStyle, &|_, _| None)
            .unwrap();
        assert_eq!(resolved, Some(Attribute::FontStyle(FontStyle::Italic)));
    }

    #[test]
    fn compose_overrides_win() {
        let defaults = AttributeSet::from_inline([Attribute::FontSize(12.0)]);
        let overrides = AttributeSet::from_inline([Attribute::FontSize(30.0)]);
        let composed = defaults.compose(&overrides);
        let resolved = composed
            .resolve(AttributeKind::FontSize, &|_, _| None)
            .unwrap();
        assert_eq!(resolved, Some(Attribute::FontSize(30.0)));
    }

    #[test]
    fn fingerprint_depends_on_order() {
        let a = AttributeSet::from_inline([
            Attribute::FontSize(12.0),
            Attribute::FontWeight(400.0),
        ]);
        let b = AttributeSet::from_inline([
            Attribute::FontWeight(400.0),
            Attribute::FontSize(12.0),
        ]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn unknown_named_reference_errors() {
        let mut set = AttributeSet::new();
        set.push(AttributeRef::Named {
            collection: CollectionId(1),
            name: "missing".into(),
        });
        let result = set.resolve(AttributeKind::FontSize, &|_, _| None);
        assert!(result.is_err());
    }
}
