//! Bottom-rule random-walk sampler (spec §4.B).

use crate::error::SamplingError;
use crate::graph::index::KnowledgeGraph;
use crate::graph::{StepDirection, Triple};
use crate::intern::EntityId;
use crate::rng::SharedRng;
use crate::rule::bottom::BottomRule;
use crate::rule::StartFrom;

/// Which walk directions a sampling step may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionAllowed {
    Both,
    ForwardOnly,
    BackwardOnly,
}

/// Constraints on a sampling run beyond the base algorithm (spec §6's
/// temporal extension).
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleOptions {
    /// When set, every walked edge's timestamp must be non-decreasing
    /// relative to the first sampled edge's timestamp (a "temporal
    /// window"). Edges with no timestamp are always accepted.
    pub temporal_window: bool,
}

fn pick_step_direction(direction_allowed: DirectionAllowed, rng: &SharedRng) -> StepDirection {
    match direction_allowed {
        DirectionAllowed::Both => {
            if rng.coin_flip() {
                StepDirection::Forward
            } else {
                StepDirection::Backward
            }
        }
        DirectionAllowed::ForwardOnly => StepDirection::Forward,
        DirectionAllowed::BackwardOnly => StepDirection::Backward,
    }
}

fn possible_moves(kg: &KnowledgeGraph, current_node: EntityId, direction: StepDirection) -> Vec<Triple> {
    match direction {
        StepDirection::Forward => kg
            .neighbours_out(current_node)
            .iter()
            .map(|&(r, o)| Triple::new(current_node, r, o))
            .collect(),
        StepDirection::Backward => kg
            .neighbours_in(current_node)
            .iter()
            .map(|&(r, s)| Triple::new(s, r, current_node))
            .collect(),
    }
}

/// Reject candidates that revisit an intermediate node, unless this is the
/// final step and the far endpoint closes the cycle back to the *other*
/// head endpoint (spec §4.B step 4).
fn filter_valid_moves(
    bottom_rule: &BottomRule,
    candidates: Vec<Triple>,
    direction: StepDirection,
    is_last_step: bool,
) -> Vec<Triple> {
    candidates
        .into_iter()
        .filter(|candidate| {
            let far_endpoint = match direction {
                StepDirection::Forward => candidate.object,
                StepDirection::Backward => candidate.subject,
            };
            if !bottom_rule.visited.contains(&far_endpoint) {
                return true;
            }
            if !is_last_step {
                return false;
            }
            match bottom_rule.start_from {
                StartFrom::Subject => far_endpoint == bottom_rule.head.object,
                StartFrom::Object => far_endpoint == bottom_rule.head.subject,
            }
        })
        .collect()
}

/// Whether `candidate` may be walked given the window's current start time.
/// A triple with no timestamp is always allowed (spec §6 only restricts
/// timestamped edges relative to one another).
fn satisfies_window(window_start: Option<f64>, candidate: &Triple) -> bool {
    match (window_start, candidate.timestamp) {
        (Some(start), Some(t)) => t >= start,
        _ => true,
    }
}

/// Sample a bottom rule of walk length `n` (1 head atom + `n - 1` body
/// atoms). Returns `Ok(None)` when the walk cannot be completed — a
/// sentinel per spec §7, not an error.
pub fn sample(
    kg: &KnowledgeGraph,
    n: usize,
    direction_allowed: DirectionAllowed,
    options: SampleOptions,
    rng: &SharedRng,
) -> Result<Option<BottomRule>, SamplingError> {
    if n < 1 {
        return Err(SamplingError::InvalidLength { n });
    }

    let head = kg.random_triple(rng)?;
    let start_from = if rng.coin_flip() { StartFrom::Subject } else { StartFrom::Object };
    let mut current_node = match start_from {
        StartFrom::Subject => head.subject,
        StartFrom::Object => head.object,
    };

    let mut bottom_rule = BottomRule::new(head, start_from);
    let mut window_start = head.timestamp;

    if n == 1 {
        return Ok(Some(bottom_rule));
    }

    for step_id in 0..(n - 1) {
        let direction = pick_step_direction(direction_allowed, rng);
        let candidates = possible_moves(kg, current_node, direction);
        if candidates.is_empty() {
            return Ok(None);
        }

        let is_last_step = step_id == n - 2;
        let mut candidates = filter_valid_moves(&bottom_rule, candidates, direction, is_last_step);
        if options.temporal_window {
            candidates.retain(|c| satisfies_window(window_start, c));
        }
        if candidates.is_empty() {
            return Ok(None);
        }

        let chosen = *rng.choose(&candidates).expect("candidates is non-empty");
        if options.temporal_window {
            if let Some(t) = chosen.timestamp {
                window_start.get_or_insert(t);
            }
        }
        bottom_rule.push_step(chosen, direction);
        current_node = match direction {
            StepDirection::Forward => chosen.object,
            StepDirection::Backward => chosen.subject,
        };
    }

    bottom_rule.is_cyclical = current_node == bottom_rule.head.object || current_node == bottom_rule.head.subject;

    Ok(Some(bottom_rule))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_graph() -> KnowledgeGraph {
        KnowledgeGraph::from_string_triples(vec![
            ("a", "r", "b", None),
            ("b", "r", "c", None),
            ("c", "r", "a", None),
        ])
    }

    #[test]
    fn invalid_length_is_an_error() {
        let kg = triangle_graph();
        let rng = SharedRng::from_seed(0);
        let result = sample(&kg, 0, DirectionAllowed::Both, SampleOptions::default(), &rng);
        assert!(matches!(result, Err(SamplingError::InvalidLength { n: 0 })));
    }

    #[test]
    fn length_one_walk_has_no_body() {
        let kg = triangle_graph();
        let rng = SharedRng::from_seed(1);
        let rule = sample(&kg, 1, DirectionAllowed::Both, SampleOptions::default(), &rng)
            .unwrap()
            .unwrap();
        assert!(rule.body.is_empty());
    }

    // Scenario S2 — cycle detection on a 3-cycle.
    #[test]
    fn s2_cycle_detection_on_triangle() {
        let kg = triangle_graph();
        let mut found_cycle = false;
        for seed in 0..500 {
            let rng = SharedRng::from_seed(seed);
            if let Some(rule) = sample(&kg, 3, DirectionAllowed::ForwardOnly, SampleOptions::default(), &rng).unwrap()
            {
                assert_eq!(rule.body.len(), 2);
                if rule.is_cyclical {
                    found_cycle = true;
                }
            }
        }
        assert!(found_cycle, "expected at least one cyclical walk over many seeds");
    }

    #[test]
    fn invariant_body_length_matches_n_minus_one() {
        let kg = triangle_graph();
        for seed in 0..50 {
            let rng = SharedRng::from_seed(seed);
            if let Some(rule) = sample(&kg, 3, DirectionAllowed::Both, SampleOptions::default(), &rng).unwrap() {
                assert_eq!(rule.body.len(), 2);
            }
        }
    }
}
