//! Monte-Carlo confidence estimation (spec §4.E).

use std::collections::HashMap;

use crate::graph::index::KnowledgeGraph;
use crate::intern::EntityId;
use crate::rng::SharedRng;
use crate::rule::generalize::GeneralizedRule;
use crate::rule::{RuleAtom, Term};

/// Mutated, per-rule statistics, kept apart from the immutable
/// [`GeneralizedRule`] body so the body can be shared read-only while
/// `Stats` is refreshed by resampling.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stats {
    pub confidence: f64,
    pub body_groundings_count: usize,
    pub head_groundings_count: usize,
}

const INNER_ATTEMPTS: usize = 50;

type Bindings = HashMap<Term, EntityId>;

fn resolve(bindings: &Bindings, term: Term) -> Option<EntityId> {
    match term {
        Term::Constant(id) => Some(id),
        Term::Variable(_) => bindings.get(&term).copied(),
    }
}

/// Try to extend `bindings` with one random grounding of `atom`, using
/// whichever of the four binding cases applies (spec §4.E).
fn ground_atom(kg: &KnowledgeGraph, atom: &RuleAtom, bindings: &mut Bindings, rng: &SharedRng) -> bool {
    let subject = resolve(bindings, atom.subject);
    let object = resolve(bindings, atom.object);

    match (subject, object) {
        (Some(s), Some(o)) => kg.has_fact(s, atom.relation, o),
        (Some(s), None) => match kg.objects_of(atom.relation, s) {
            Some(objects) if !objects.is_empty() => {
                let pool: Vec<EntityId> = objects.iter().copied().collect();
                let chosen = *rng.choose(&pool).expect("pool is non-empty");
                bindings.insert(atom.object, chosen);
                true
            }
            _ => false,
        },
        (None, Some(o)) => match kg.subjects_of(atom.relation, o) {
            Some(subjects) if !subjects.is_empty() => {
                let pool: Vec<EntityId> = subjects.iter().copied().collect();
                let chosen = *rng.choose(&pool).expect("pool is non-empty");
                bindings.insert(atom.subject, chosen);
                true
            }
            _ => false,
        },
        (None, None) => match kg.subjects_with_relation(atom.relation) {
            Some(by_subject) if !by_subject.is_empty() => {
                let subjects: Vec<EntityId> = by_subject.keys().copied().collect();
                let s = *rng.choose(&subjects).expect("subjects is non-empty");
                let objects: Vec<EntityId> = by_subject[&s].iter().copied().collect();
                let o = *rng.choose(&objects).expect("objects is non-empty");
                bindings.insert(atom.subject, s);
                bindings.insert(atom.object, o);
                true
            }
            _ => false,
        },
    }
}

/// Attempt a single full body grounding, greedily left to right. Returns the
/// bindings on success.
fn try_ground_body(kg: &KnowledgeGraph, body: &[RuleAtom], rng: &SharedRng) -> Option<Bindings> {
    let mut bindings = Bindings::new();
    for atom in body {
        if !ground_atom(kg, atom, &mut bindings, rng) {
            return None;
        }
    }
    Some(bindings)
}

fn head_is_fact(kg: &KnowledgeGraph, head: &RuleAtom, bindings: &Bindings) -> bool {
    match (resolve(bindings, head.subject), resolve(bindings, head.object)) {
        (Some(s), Some(o)) => kg.has_fact(s, head.relation, o),
        _ => false,
    }
}

/// Monte-Carlo estimate of a generalized rule's confidence: repeatedly sample
/// a body grounding (up to [`INNER_ATTEMPTS`] tries each) and check whether
/// the substituted head holds.
pub fn calculate_confidence(
    kg: &KnowledgeGraph,
    rule: &GeneralizedRule,
    sample_size: usize,
    pc: f64,
    rng: &SharedRng,
) -> Stats {
    let mut stats = Stats::default();

    for _ in 0..sample_size {
        let mut grounded = None;
        for _ in 0..INNER_ATTEMPTS {
            if let Some(bindings) = try_ground_body(kg, &rule.generalized_body, rng) {
                grounded = Some(bindings);
                break;
            }
        }
        let Some(bindings) = grounded else { continue };
        stats.body_groundings_count += 1;
        if head_is_fact(kg, &rule.generalized_head, &bindings) {
            stats.head_groundings_count += 1;
        }
    }

    stats.confidence = if stats.body_groundings_count > 0 {
        (stats.head_groundings_count as f64 + pc) / (stats.body_groundings_count as f64 + pc)
    } else {
        0.0
    };

    stats
}
