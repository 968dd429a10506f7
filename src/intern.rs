//! String interning for entity and relation identifiers.
//!
//! The data model treats subjects, relations and objects as opaque strings
//! (spec §3). For speed, this implementation interns every string to a
//! niche-optimized `u32` id the first time it is seen, following the same
//! `NonZeroU64`-for-niche-optimization trick the teacher crate uses for its
//! symbol ids, narrowed to `NonZeroU32` since a single knowledge graph here
//! is expected to hold at most a few million distinct entities.

use std::num::NonZeroU32;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Interned entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct EntityId(NonZeroU32);

/// Interned relation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct RelationId(NonZeroU32);

macro_rules! impl_interned_id {
    ($ty:ident) => {
        impl $ty {
            fn from_index(index: u32) -> Self {
                // index is 0-based; offset by one so zero stays the NonZero niche.
                Self(NonZeroU32::new(index + 1).expect("index + 1 is never zero"))
            }

            fn to_index(self) -> usize {
                (self.0.get() - 1) as usize
            }
        }
    };
}

impl_interned_id!(EntityId);
impl_interned_id!(RelationId);

/// Bidirectional string ↔ id interner, shared by a [`crate::graph::KnowledgeGraph`].
///
/// Mirrors the `DashMap`-backed bidirectional registry pattern used elsewhere
/// in the codebase for label ↔ id lookups, specialized here to two disjoint
/// id spaces (entities and relations) since the two never need to compare
/// equal.
pub struct Interner<Id> {
    label_to_id: DashMap<String, Id>,
    id_to_label: DashMap<Id, String>,
    counter: std::sync::atomic::AtomicU32,
}

impl<Id> Default for Interner<Id>
where
    Id: std::hash::Hash + Eq + Copy,
{
    fn default() -> Self {
        Self {
            label_to_id: DashMap::new(),
            id_to_label: DashMap::new(),
            counter: std::sync::atomic::AtomicU32::new(0),
        }
    }
}

impl<Id> Interner<Id>
where
    Id: std::hash::Hash + Eq + Copy,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.id_to_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_label.is_empty()
    }

    pub fn resolve(&self, id: Id) -> Option<String> {
        self.id_to_label.get(&id).map(|r| r.value().clone())
    }

    pub fn lookup(&self, label: &str) -> Option<Id> {
        self.label_to_id.get(label).map(|r| *r.value())
    }

    pub fn all_ids(&self) -> Vec<Id> {
        self.id_to_label.iter().map(|r| *r.key()).collect()
    }
}

impl Interner<EntityId> {
    pub fn intern(&self, label: &str) -> EntityId {
        if let Some(id) = self.label_to_id.get(label) {
            return *id.value();
        }
        let index = self.counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let id = EntityId::from_index(index);
        self.label_to_id.insert(label.to_string(), id);
        self.id_to_label.insert(id, label.to_string());
        id
    }
}

impl Interner<RelationId> {
    pub fn intern(&self, label: &str) -> RelationId {
        if let Some(id) = self.label_to_id.get(label) {
            return *id.value();
        }
        let index = self.counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let id = RelationId::from_index(index);
        self.label_to_id.insert(label.to_string(), id);
        self.id_to_label.insert(id, label.to_string());
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_label_returns_same_id() {
        let interner: Interner<EntityId> = Interner::new();
        let a = interner.intern("alice");
        let b = interner.intern("alice");
        assert_eq!(a, b);
    }

    #[test]
    fn interning_distinct_labels_returns_distinct_ids() {
        let interner: Interner<EntityId> = Interner::new();
        let a = interner.intern("alice");
        let b = interner.intern("bob");
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_round_trips_the_label() {
        let interner: Interner<RelationId> = Interner::new();
        let id = interner.intern("knows");
        assert_eq!(interner.resolve(id).as_deref(), Some("knows"));
        assert_eq!(interner.lookup("knows"), Some(id));
    }
}
