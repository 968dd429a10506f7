//! Filtered Hits@k / MRR evaluation (spec §4.G rationale, §6 "Evaluation").

use crate::graph::index::KnowledgeGraph;
use crate::intern::{EntityId, RelationId};
use crate::predict::Predictor;

/// Aggregate evaluation metrics over a held-out test set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub hits_at_1: f64,
    pub hits_at_k: f64,
    pub mrr: f64,
    pub evaluated: usize,
}

/// Drop every candidate other than the gold answer that the training graph
/// already confirms for `(subject, relation, *)` (spec §6 filtering rule),
/// then return the rank (1-based) of `gold` in what remains, if present.
fn filtered_rank(kg: &KnowledgeGraph, subject: EntityId, relation: RelationId, gold: EntityId, candidates: &[(EntityId, f64)]) -> Option<usize> {
    let filtered: Vec<EntityId> = candidates
        .iter()
        .map(|(candidate, _)| *candidate)
        .filter(|&candidate| candidate == gold || !kg.has_fact(subject, relation, candidate))
        .collect();

    filtered.iter().position(|&candidate| candidate == gold).map(|pos| pos + 1)
}

/// Evaluate `predictor` over `test_triples` (subject, relation, object),
/// using `predict_tail` with filtered ranking against `train_kg`.
pub fn evaluate_predictions(train_kg: &KnowledgeGraph, predictor: &Predictor, test_triples: &[(EntityId, RelationId, EntityId)], k: usize) -> Metrics {
    let mut hits_at_1 = 0.0;
    let mut hits_at_k = 0.0;
    let mut reciprocal_rank_sum = 0.0;
    let evaluated = test_triples.len();

    for &(subject, relation, object) in test_triples {
        let candidates = predictor.predict_tail(train_kg, subject, relation, k);
        match filtered_rank(train_kg, subject, relation, object, &candidates) {
            Some(rank) => {
                reciprocal_rank_sum += 1.0 / rank as f64;
                if rank == 1 {
                    hits_at_1 += 1.0;
                }
                if rank <= k {
                    hits_at_k += 1.0;
                }
            }
            None => {}
        }
    }

    if evaluated == 0 {
        return Metrics::default();
    }

    Metrics {
        hits_at_1: hits_at_1 / evaluated as f64,
        hits_at_k: hits_at_k / evaluated as f64,
        mrr: reciprocal_rank_sum / evaluated as f64,
        evaluated,
    }
}
