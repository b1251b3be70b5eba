// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use hashbrown::HashMap;

use super::{Attribute, AttributeSet};

static NEXT_COLLECTION_ID: AtomicU32 = AtomicU32::new(1);

/// Opaque identity of an [`AttributeCollection`]. A named reference
/// resolved against the wrong collection (an `id` mismatch) fails with
/// [`crate::ErrorKind::UnknownAttributeCollection`] (§4.A).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CollectionId(pub(crate) u32);

/// A shared table of named attribute sets, optionally grouped (e.g. all
/// the "heading" styles grouped under `"headings"`). Collections are
/// immutable from a reader's perspective once shared across editors on the
/// same thread (§5); mutation methods here take `&mut self` for the
/// construction phase only.
#[derive(Debug)]
pub struct AttributeCollection {
    id: CollectionId,
    named: HashMap<String, AttributeSet>,
    groups: HashMap<String, Vec<String>>,
}

impl Default for AttributeCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeCollection {
    pub fn new() -> Self {
        Self {
            id: CollectionId(NEXT_COLLECTION_ID.fetch_add(1, Ordering::Relaxed)),
            named: HashMap::new(),
            groups: HashMap::new(),
        }
    }

    pub fn id(&self) -> CollectionId {
        self.id
    }

    /// Adds a named set, optionally associating it with a group.
    pub fn add_named_set(&mut self, name: impl Into<String>, set: AttributeSet, group: Option<&str>) {
        let name = name.into();
        if let Some(group) = group {
            self.groups
                .entry_ref(group)
                .or_insert_with(Vec::new)
                .push(name.clone());
        }
        self.named.insert(name, set);
    }

    /// Resolves a named reference to its inline [`AttributeSet`].
    pub fn resolve_named(&self, name: &str) -> Option<&AttributeSet> {
        self.named.get(name)
    }

    /// Resolves a single attribute value stored under `name`, used by
    /// [`super::AttributeSet::resolve`]'s collection callback. Returns the
    /// last entry of the named set matching `kind`, i.e. the named set's
    /// own effective value for that kind.
    pub fn resolve_attribute(&self, name: &str, kind: super::AttributeKind) -> Option<Attribute> {
        let set = self.named.get(name)?;
        set.entries().iter().rev().find_map(|entry| match entry {
            super::AttributeRef::Inline(v) if v.kind() == kind => Some(v.clone()),
            _ => None,
        })
    }

    pub fn members_of_group(&self, group: &str) -> &[String] {
        self.groups.get(group).map_or(&[], |v| v.as_slice())
    }
}

impl Default for CollectionId {
    fn default() -> Self {
        Self(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attribute;

    #[test]
    fn named_set_round_trips() {
        let mut collection = AttributeCollection::new();
        let set = AttributeSet::from_inline([Attribute::FontSize(24.0)]);
        collection.add_named_set("h1", set.clone(), Some("headings"));
        assert_eq!(collection.resolve_named("h1"), Some(&set));
        assert_eq!(collection.members_of_group("headings"), &["h1".to_owned()]);
    }
}
