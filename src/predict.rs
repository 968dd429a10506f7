//! Rule-based link prediction: index learned rules by head relation, ground
//! queries against the graph, aggregate candidates by lexicographic tuple
//! max (spec §4.G).

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::graph::index::KnowledgeGraph;
use crate::intern::{EntityId, RelationId};
use crate::learn::RuleMap;
use crate::rule::{RuleAtom, Term};

type Bindings = HashMap<Term, EntityId>;

/// Read-only index over a learned rule set, grouped by head relation and
/// sorted by descending confidence.
pub struct Predictor {
    by_relation: HashMap<RelationId, Vec<(RuleAtom, Vec<RuleAtom>, f64)>>,
}

impl Predictor {
    pub fn new(rules: &RuleMap) -> Self {
        let mut by_relation: HashMap<RelationId, Vec<(RuleAtom, Vec<RuleAtom>, f64)>> = HashMap::new();
        for (rule, stats) in rules.values() {
            by_relation
                .entry(rule.generalized_head.relation)
                .or_default()
                .push((rule.generalized_head, rule.generalized_body.clone(), stats.confidence));
        }
        for group in by_relation.values_mut() {
            group.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));
        }
        Self { by_relation }
    }

    /// Rank tail candidates for the query `(subject, relation, ?)`.
    pub fn predict_tail(&self, kg: &KnowledgeGraph, subject: EntityId, relation: RelationId, k: usize) -> Vec<(EntityId, f64)> {
        self.predict(kg, relation, k, subject, true)
    }

    /// Rank head candidates for the query `(?, relation, object)`.
    pub fn predict_head(&self, kg: &KnowledgeGraph, relation: RelationId, object: EntityId, k: usize) -> Vec<(EntityId, f64)> {
        self.predict(kg, relation, k, object, false)
    }

    /// `query_is_subject`: true for `predict_tail` (the known endpoint binds
    /// the head's subject position), false for `predict_head` (it binds the
    /// object position).
    fn predict(&self, kg: &KnowledgeGraph, relation: RelationId, k: usize, known: EntityId, query_is_subject: bool) -> Vec<(EntityId, f64)> {
        let Some(group) = self.by_relation.get(&relation) else {
            return Vec::new();
        };

        let mut confidences_by_candidate: HashMap<EntityId, Vec<f64>> = HashMap::new();

        for (head, body, confidence) in group {
            let (known_term, candidate_term) = if query_is_subject { (head.subject, head.object) } else { (head.object, head.subject) };

            let mut initial = Bindings::new();
            match known_term {
                Term::Variable(_) => {
                    initial.insert(known_term, known);
                }
                Term::Constant(id) => {
                    if id != known {
                        continue;
                    }
                }
            }

            let completions = complete_grounding(kg, body, initial);
            for bindings in completions {
                let candidate = match candidate_term {
                    Term::Variable(_) => bindings.get(&candidate_term).copied(),
                    Term::Constant(id) => Some(id),
                };
                if let Some(candidate) = candidate {
                    confidences_by_candidate.entry(candidate).or_default().push(*confidence);
                }
            }
        }

        rank_candidates(confidences_by_candidate, k)
    }
}

/// Enumerate every full body grounding consistent with `initial`, via
/// deterministic breadth-first expansion over the body atoms (spec §4.F).
fn complete_grounding(kg: &KnowledgeGraph, body: &[RuleAtom], initial: Bindings) -> Vec<Bindings> {
    let mut frontier = vec![initial];

    for atom in body {
        let mut next_frontier = Vec::new();
        for bindings in &frontier {
            next_frontier.extend(extend_bindings(kg, atom, bindings));
        }
        if next_frontier.is_empty() {
            return Vec::new();
        }
        frontier = next_frontier;
    }

    frontier
}

fn resolve(bindings: &Bindings, term: Term) -> Option<EntityId> {
    match term {
        Term::Constant(id) => Some(id),
        Term::Variable(_) => bindings.get(&term).copied(),
    }
}

/// All ways `bindings` can be extended to satisfy `atom`, using the same
/// four binding cases as the confidence sampler — but enumerating every
/// option instead of drawing one at random.
fn extend_bindings(kg: &KnowledgeGraph, atom: &RuleAtom, bindings: &Bindings) -> Vec<Bindings> {
    let subject = resolve(bindings, atom.subject);
    let object = resolve(bindings, atom.object);

    match (subject, object) {
        (Some(s), Some(o)) => {
            if kg.has_fact(s, atom.relation, o) {
                vec![bindings.clone()]
            } else {
                Vec::new()
            }
        }
        (Some(s), None) => kg
            .objects_of(atom.relation, s)
            .into_iter()
            .flatten()
            .map(|&o| {
                let mut extended = bindings.clone();
                extended.insert(atom.object, o);
                extended
            })
            .collect(),
        (None, Some(o)) => kg
            .subjects_of(atom.relation, o)
            .into_iter()
            .flatten()
            .map(|&s| {
                let mut extended = bindings.clone();
                extended.insert(atom.subject, s);
                extended
            })
            .collect(),
        (None, None) => {
            let Some(by_subject) = kg.subjects_with_relation(atom.relation) else {
                return Vec::new();
            };
            by_subject
                .iter()
                .flat_map(|(&s, objects)| {
                    objects.iter().map(move |&o| {
                        let mut extended = bindings.clone();
                        extended.insert(atom.subject, s);
                        extended.insert(atom.object, o);
                        extended
                    })
                })
                .collect()
        }
    }
}

/// Sort each candidate's confidence list descending, zero-pad to `k`, then
/// select the top `k` candidates by lexicographic tuple comparison
/// (spec §4.G).
fn rank_candidates(confidences_by_candidate: HashMap<EntityId, Vec<f64>>, k: usize) -> Vec<(EntityId, f64)> {
    let mut scored: Vec<(EntityId, Vec<f64>)> = confidences_by_candidate
        .into_iter()
        .map(|(candidate, mut confidences)| {
            confidences.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
            confidences.resize(k, 0.0);
            (candidate, confidences)
        })
        .collect();

    scored.sort_by(|a, b| {
        for (x, y) in a.1.iter().zip(b.1.iter()) {
            match y.partial_cmp(x).unwrap_or(Ordering::Equal) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    });

    scored
        .into_iter()
        .take(k)
        .map(|(candidate, confidences)| (candidate, confidences.first().copied().unwrap_or(0.0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SharedRng;
    use crate::rule::bottom::BottomRule;
    use crate::rule::confidence::calculate_confidence;
    use crate::rule::generalize::generalize;
    use crate::rule::StartFrom;

    fn build_rules(kg: &KnowledgeGraph) -> RuleMap {
        let mut rules = RuleMap::new();
        let head = crate::graph::Triple::new(
            kg.entity_interner.lookup("a").unwrap(),
            kg.relation_interner.lookup("r").unwrap(),
            kg.entity_interner.lookup("b").unwrap(),
        );
        let bottom = BottomRule::new(head, StartFrom::Object);
        let rng = SharedRng::from_seed(3);
        for rule in generalize(&bottom) {
            let stats = calculate_confidence(kg, &rule, 20, 5.0, &rng);
            rules.insert(rule.canonical_key(), (rule, stats));
        }
        rules
    }

    #[test]
    fn predict_tail_on_unknown_relation_is_empty() {
        let kg = KnowledgeGraph::from_string_triples(vec![("a", "r", "b", None)]);
        let rules = build_rules(&kg);
        let predictor = Predictor::new(&rules);
        let unknown = kg.relation_interner.intern("other");
        let a = kg.entity_interner.lookup("a").unwrap();
        assert!(predictor.predict_tail(&kg, a, unknown, 5).is_empty());
    }

    #[test]
    fn predict_tail_finds_known_object_via_ac2_rule() {
        let kg = KnowledgeGraph::from_string_triples(vec![("a", "r", "b", None)]);
        let rules = build_rules(&kg);
        let predictor = Predictor::new(&rules);
        let a = kg.entity_interner.lookup("a").unwrap();
        let b = kg.entity_interner.lookup("b").unwrap();
        let r = kg.relation_interner.lookup("r").unwrap();
        let predictions = predictor.predict_tail(&kg, a, r, 5);
        assert!(predictions.iter().any(|(candidate, _)| *candidate == b));
    }

    // Scenario S6 — tuple-lex aggregation.
    #[test]
    fn s6_single_high_confidence_rule_outranks_several_lower_ones() {
        let interner: crate::intern::Interner<EntityId> = crate::intern::Interner::new();
        let x = interner.intern("x");
        let y = interner.intern("y");
        let mut confidences = HashMap::new();
        confidences.insert(x, vec![0.9]);
        confidences.insert(y, vec![0.8, 0.8, 0.8]);
        let ranked = rank_candidates(confidences, 3);
        assert_eq!(ranked[0].0, x);
    }
}
