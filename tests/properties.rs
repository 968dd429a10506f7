//! Property tests over the invariants named in spec.md §8.

use std::collections::HashSet;

use proptest::prelude::*;

use anyburl_rs::graph::index::KnowledgeGraph;
use anyburl_rs::rng::SharedRng;
use anyburl_rs::rule::generalize::generalize;
use anyburl_rs::rule::sampler::{sample, DirectionAllowed, SampleOptions};

/// A small ring graph of `size` entities, each linked to the next by
/// relation `r`, guaranteeing every walk of length <= `size` can complete.
fn ring_graph(size: usize) -> KnowledgeGraph {
    let labels: Vec<String> = (0..size).map(|i| i.to_string()).collect();
    let rows: Vec<(&str, &str, &str, Option<f64>)> =
        (0..size).map(|i| (labels[i].as_str(), "r", labels[(i + 1) % size].as_str(), None)).collect();
    KnowledgeGraph::from_string_triples(rows)
}

proptest! {
    // Invariant 1 — every input triple round-trips through has_fact/adj/adj_inv.
    #[test]
    fn invariant_1_every_input_triple_is_reachable(size in 2usize..12) {
        let kg = ring_graph(size);
        for i in 0..size {
            let s = kg.entity_interner.lookup(&i.to_string()).unwrap();
            let o = kg.entity_interner.lookup(&((i + 1) % size).to_string()).unwrap();
            let r = kg.relation_interner.lookup("r").unwrap();
            prop_assert!(kg.has_fact(s, r, o));
            prop_assert!(kg.objects_of(r, s).unwrap().contains(&o));
            prop_assert!(kg.subjects_of(r, o).unwrap().contains(&s));
        }
    }

    // Invariant 2 — body length matches n - 1; no internal revisit except a
    // final cycle closure.
    #[test]
    fn invariant_2_body_length_and_visit_discipline(size in 4usize..10, n in 1usize..4, seed in 0u64..200) {
        let kg = ring_graph(size);
        let rng = SharedRng::from_seed(seed);
        if let Some(rule) = sample(&kg, n, DirectionAllowed::Both, SampleOptions::default(), &rng).unwrap() {
            prop_assert_eq!(rule.body.len(), n - 1);

            let mut seen = HashSet::new();
            seen.insert(rule.head.subject);
            seen.insert(rule.head.object);
            for (i, step) in rule.body.iter().enumerate() {
                let far_endpoint = if rule.steps[i] == anyburl_rs::graph::StepDirection::Forward {
                    step.object
                } else {
                    step.subject
                };
                let is_last = i == rule.body.len() - 1;
                if seen.contains(&far_endpoint) {
                    prop_assert!(is_last, "internal node revisited before the final step");
                }
                seen.insert(far_endpoint);
            }
        }
    }

    // Invariant 3 — is_cyclical iff the final node equals the other head endpoint.
    #[test]
    fn invariant_3_is_cyclical_matches_final_endpoint(size in 4usize..10, n in 2usize..4, seed in 0u64..200) {
        let kg = ring_graph(size);
        let rng = SharedRng::from_seed(seed);
        if let Some(rule) = sample(&kg, n, DirectionAllowed::Both, SampleOptions::default(), &rng).unwrap() {
            let current = rule.current_node();
            let expected = current == rule.head.subject || current == rule.head.object;
            prop_assert_eq!(rule.is_cyclical, expected);
        }
    }

    // Invariant 4 — generalized body length matches bottom rule body length;
    // AC1/AC2 carry at least one constant head position.
    #[test]
    fn invariant_4_generalized_body_length_and_anchoring(size in 4usize..10, n in 2usize..4, seed in 0u64..200) {
        let kg = ring_graph(size);
        let rng = SharedRng::from_seed(seed);
        if let Some(rule) = sample(&kg, n, DirectionAllowed::Both, SampleOptions::default(), &rng).unwrap() {
            for generalized in generalize(&rule) {
                prop_assert_eq!(generalized.generalized_body.len(), rule.body.len());
                if generalized.rule_type != anyburl_rs::rule::generalize::RuleType::C {
                    let head = generalized.generalized_head;
                    let has_constant = !head.subject.is_variable() || !head.object.is_variable();
                    prop_assert!(has_constant);
                }
            }
        }
    }

    // Invariant 5 — confidence is in [0, 1] and h <= b.
    #[test]
    fn invariant_5_confidence_bounds(size in 4usize..10, n in 2usize..4, seed in 0u64..100) {
        let kg = ring_graph(size);
        let rng = SharedRng::from_seed(seed);
        if let Some(rule) = sample(&kg, n, DirectionAllowed::Both, SampleOptions::default(), &rng).unwrap() {
            for generalized in generalize(&rule) {
                let stats = anyburl_rs::rule::confidence::calculate_confidence(&kg, &generalized, 30, 5.0, &rng);
                prop_assert!(stats.confidence >= 0.0 && stats.confidence <= 1.0);
                prop_assert!(stats.head_groundings_count <= stats.body_groundings_count);
            }
        }
    }

    // Invariant 7 — the predictor's candidate lists are in non-increasing
    // (lexicographic, reduced here to the leading element) order.
    #[test]
    fn invariant_7_predictor_output_is_non_increasing(size in 4usize..10, seed in 0u64..100) {
        let kg = ring_graph(size);
        let rng = SharedRng::from_seed(seed);
        let config = anyburl_rs::config::LearnConfig {
            sample_size: 20,
            ts: 0.02,
            max_total_time: 0.05,
            min_head_groundings: 0,
            ..Default::default()
        };
        let rules = anyburl_rs::learn::learn(&kg, &config, &rng, None);
        let predictor = anyburl_rs::predict::Predictor::new(&rules);
        let subject = kg.entity_interner.lookup("0").unwrap();
        let r = kg.relation_interner.lookup("r").unwrap();
        let predictions = predictor.predict_tail(&kg, subject, r, 5);
        for window in predictions.windows(2) {
            prop_assert!(window[0].1 >= window[1].1);
        }
    }

    // Invariant 6 — round trip through the canonical string grammar.
    #[test]
    fn invariant_6_canonical_string_round_trips(size in 4usize..10, n in 2usize..4, seed in 0u64..100) {
        let kg = ring_graph(size);
        let rng = SharedRng::from_seed(seed);
        if let Some(rule) = sample(&kg, n, DirectionAllowed::Both, SampleOptions::default(), &rng).unwrap() {
            for generalized in generalize(&rule) {
                let key = generalized.canonical_key();
                let rendered = key.display(&kg.entity_interner, &kg.relation_interner).to_string();
                let reparsed: anyburl_rs::rule::canonical::ParsedRule = rendered.parse().unwrap();
                prop_assert_eq!(reparsed.to_string(), rendered);
            }
        }
    }
}
