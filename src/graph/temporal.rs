//! Optional temporal extension (spec §6): timestamp-indexed triples.
//!
//! Built alongside [`super::index::KnowledgeGraph`] whenever at least one
//! input triple carries a timestamp. Ported from
//! `original_source/extension/knowledge_graph/KnowledgeGraph.py`, including
//! its naive linear scan over distinct timestamps for range queries — the
//! Python reference notes that a sorted structure with binary search would
//! be preferable at scale, and this port keeps that same tradeoff rather
//! than inventing one.

use std::collections::HashMap;

use crate::graph::Triple;
use crate::intern::{EntityId, RelationId};

/// Bit-pattern wrapper making `f64` timestamps usable as hash-map keys.
///
/// Equality and hashing are exact-bits, which is sufficient here since
/// timestamps are only ever produced by re-parsing the same input value;
/// reconstructing the `f64` for range comparisons uses [`TimeKey::value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeKey(u64);

impl TimeKey {
    pub fn new(t: f64) -> Self {
        Self(t.to_bits())
    }

    pub fn value(self) -> f64 {
        f64::from_bits(self.0)
    }
}

type RelAdj = HashMap<RelationId, HashMap<EntityId, std::collections::HashSet<EntityId>>>;

/// Timestamp-indexed adjacency, supplementing the base [`super::index::KnowledgeGraph`].
#[derive(Default)]
pub struct TemporalIndex {
    time_index: HashMap<TimeKey, Vec<Triple>>,
    adj_by_time: HashMap<TimeKey, RelAdj>,
    adj_inv_by_time: HashMap<TimeKey, RelAdj>,
}

impl TemporalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, triple: Triple) {
        let Some(t) = triple.timestamp else { return };
        let key = TimeKey::new(t);
        self.time_index.entry(key).or_default().push(triple);
        self.adj_by_time
            .entry(key)
            .or_default()
            .entry(triple.relation)
            .or_default()
            .entry(triple.subject)
            .or_default()
            .insert(triple.object);
        self.adj_inv_by_time
            .entry(key)
            .or_default()
            .entry(triple.relation)
            .or_default()
            .entry(triple.object)
            .or_default()
            .insert(triple.subject);
    }

    pub fn is_empty(&self) -> bool {
        self.time_index.is_empty()
    }

    pub fn triples_at(&self, timestamp: f64) -> &[Triple] {
        self.time_index
            .get(&TimeKey::new(timestamp))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn triples_in_interval(&self, start: f64, end: f64) -> Vec<Triple> {
        let mut out = Vec::new();
        for (key, triples) in &self.time_index {
            let t = key.value();
            if start <= t && t <= end {
                out.extend_from_slice(triples);
            }
        }
        out
    }

    /// `has_fact_temporal(s, r, o, t, tol)`: naive `t ± tol` scan over
    /// indexed timestamps (spec §6).
    pub fn has_fact_at(&self, s: EntityId, r: RelationId, o: EntityId, timestamp: f64, tolerance: f64) -> bool {
        let t_min = timestamp - tolerance;
        let t_max = timestamp + tolerance;
        for (key, by_relation) in &self.adj_by_time {
            let t = key.value();
            if t < t_min || t > t_max {
                continue;
            }
            if by_relation
                .get(&r)
                .and_then(|by_subject| by_subject.get(&s))
                .is_some_and(|objects| objects.contains(&o))
            {
                return true;
            }
        }
        false
    }
}
