//! In-memory, dual-indexed knowledge graph.
//!
//! Built once from a sequence of triples (`O(|E|)`) and read-only
//! thereafter, so every lookup here takes `&self`: fact membership,
//! forward/backward neighbour enumeration, and uniform random triple
//! selection are all `O(1)` or `O(output)` as spec §4.A requires.

use std::collections::{HashMap, HashSet};

use crate::error::SamplingError;
use crate::graph::temporal::TemporalIndex;
use crate::graph::Triple;
use crate::intern::{EntityId, Interner, RelationId};
use crate::rng::SharedRng;

/// Dual-indexed, read-only knowledge graph.
///
/// - `triples`: insertion order, used for uniform random selection.
/// - `outgoing[s]` / `incoming[o]`: adjacency lists for walk enumeration.
/// - `adj[r][s]` / `adj_inv[r][o]`: per-relation sets for `O(1)` membership
///   and random-candidate enumeration during sampling and grounding.
pub struct KnowledgeGraph {
    triples: Vec<Triple>,
    outgoing: HashMap<EntityId, Vec<(RelationId, EntityId)>>,
    incoming: HashMap<EntityId, Vec<(RelationId, EntityId)>>,
    adj: HashMap<RelationId, HashMap<EntityId, HashSet<EntityId>>>,
    adj_inv: HashMap<RelationId, HashMap<EntityId, HashSet<EntityId>>>,
    entities: Vec<EntityId>,
    relations: Vec<RelationId>,
    pub entity_interner: Interner<EntityId>,
    pub relation_interner: Interner<RelationId>,
    temporal: TemporalIndex,
}

impl KnowledgeGraph {
    /// Build a graph from raw `(subject, relation, object)` string triples,
    /// interning each component. Duplicate triples collapse in the
    /// adjacency sets but are retained verbatim in `triples` (spec §3).
    pub fn from_string_triples<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a str, Option<f64>)>,
    {
        let entity_interner = Interner::new();
        let relation_interner = Interner::new();

        let mut triples = Vec::new();
        let mut outgoing: HashMap<EntityId, Vec<(RelationId, EntityId)>> = HashMap::new();
        let mut incoming: HashMap<EntityId, Vec<(RelationId, EntityId)>> = HashMap::new();
        let mut adj: HashMap<RelationId, HashMap<EntityId, HashSet<EntityId>>> = HashMap::new();
        let mut adj_inv: HashMap<RelationId, HashMap<EntityId, HashSet<EntityId>>> = HashMap::new();
        let mut entity_set = HashSet::new();
        let mut relation_set = HashSet::new();
        let mut temporal = TemporalIndex::new();

        for (s, r, o, t) in rows {
            let s = entity_interner.intern(s);
            let r = relation_interner.intern(r);
            let o = entity_interner.intern(o);

            let mut triple = Triple::new(s, r, o);
            if let Some(ts) = t {
                triple = triple.with_timestamp(ts);
            }
            triples.push(triple);

            outgoing.entry(s).or_default().push((r, o));
            incoming.entry(o).or_default().push((r, s));
            adj.entry(r).or_default().entry(s).or_default().insert(o);
            adj_inv.entry(r).or_default().entry(o).or_default().insert(s);
            temporal.insert(triple);

            entity_set.insert(s);
            entity_set.insert(o);
            relation_set.insert(r);
        }

        Self {
            triples,
            outgoing,
            incoming,
            adj,
            adj_inv,
            entities: entity_set.into_iter().collect(),
            relations: relation_set.into_iter().collect(),
            entity_interner,
            relation_interner,
            temporal,
        }
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn relations(&self) -> &[RelationId] {
        &self.relations
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn has_fact(&self, s: EntityId, r: RelationId, o: EntityId) -> bool {
        self.adj
            .get(&r)
            .and_then(|by_subject| by_subject.get(&s))
            .is_some_and(|objects| objects.contains(&o))
    }

    pub fn neighbours_out(&self, s: EntityId) -> &[(RelationId, EntityId)] {
        self.outgoing.get(&s).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn neighbours_in(&self, o: EntityId) -> &[(RelationId, EntityId)] {
        self.incoming.get(&o).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn objects_of(&self, r: RelationId, s: EntityId) -> Option<&HashSet<EntityId>> {
        self.adj.get(&r).and_then(|by_subject| by_subject.get(&s))
    }

    pub fn subjects_of(&self, r: RelationId, o: EntityId) -> Option<&HashSet<EntityId>> {
        self.adj_inv.get(&r).and_then(|by_object| by_object.get(&o))
    }

    /// All subjects in the graph that have at least one outgoing `r` edge,
    /// i.e. `keys(adj[r])`. Used by the "neither bound" grounding case
    /// (spec §4.E/§4.F).
    pub fn subjects_with_relation(&self, r: RelationId) -> Option<&HashMap<EntityId, HashSet<EntityId>>> {
        self.adj.get(&r)
    }

    /// `has_fact_temporal(s, r, o, t, tol)`: whether `(s, r, o)` holds at a
    /// timestamp within `t ± tol`, per the timestamp-indexed adjacency built
    /// alongside the base graph (spec §6).
    pub fn has_fact_temporal(&self, s: EntityId, r: RelationId, o: EntityId, timestamp: f64, tolerance: f64) -> bool {
        self.temporal.has_fact_at(s, r, o, timestamp, tolerance)
    }

    /// Uniformly pick a random triple from the original insertion-ordered
    /// sequence.
    pub fn random_triple(&self, rng: &SharedRng) -> Result<Triple, SamplingError> {
        if self.triples.is_empty() {
            return Err(SamplingError::EmptyGraph);
        }
        let idx = rng.gen_index(self.triples.len());
        Ok(self.triples[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> KnowledgeGraph {
        KnowledgeGraph::from_string_triples(vec![
            ("a", "r", "b", None),
            ("b", "r", "c", None),
        ])
    }

    // Scenario S1 — trivial fact lookup.
    #[test]
    fn s1_trivial_fact_lookup() {
        let kg = graph();
        let a = kg.entity_interner.lookup("a").unwrap();
        let b = kg.entity_interner.lookup("b").unwrap();
        let c = kg.entity_interner.lookup("c").unwrap();
        let r = kg.relation_interner.lookup("r").unwrap();

        assert!(kg.has_fact(a, r, b));
        assert!(!kg.has_fact(a, r, c));
        assert_eq!(kg.objects_of(r, a).unwrap(), &HashSet::from([b]));
    }

    #[test]
    fn duplicate_triples_collapse_in_adjacency_not_in_triples() {
        let kg = KnowledgeGraph::from_string_triples(vec![
            ("a", "r", "b", None),
            ("a", "r", "b", None),
        ]);
        assert_eq!(kg.len(), 2);
        let a = kg.entity_interner.lookup("a").unwrap();
        let r = kg.relation_interner.lookup("r").unwrap();
        assert_eq!(kg.objects_of(r, a).unwrap().len(), 1);
    }

    #[test]
    fn random_triple_on_empty_graph_errors() {
        let kg = KnowledgeGraph::from_string_triples(Vec::<(&str, &str, &str, Option<f64>)>::new());
        let rng = SharedRng::from_seed(0);
        assert!(matches!(kg.random_triple(&rng), Err(SamplingError::EmptyGraph)));
    }

    #[test]
    fn has_fact_temporal_is_wired_to_the_timestamped_triples() {
        let kg = KnowledgeGraph::from_string_triples(vec![("a", "r", "b", Some(10.0))]);
        let a = kg.entity_interner.lookup("a").unwrap();
        let b = kg.entity_interner.lookup("b").unwrap();
        let r = kg.relation_interner.lookup("r").unwrap();

        assert!(kg.has_fact_temporal(a, r, b, 10.0, 0.0));
        assert!(kg.has_fact_temporal(a, r, b, 11.0, 1.0));
        assert!(!kg.has_fact_temporal(a, r, b, 12.0, 1.0));
    }
}
