//! The anytime learning controller (spec §4.F): a saturation-driven outer
//! loop over bottom-rule sampling, generalization, and confidence
//! estimation.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, info, info_span};

use crate::config::LearnConfig;
use crate::graph::index::KnowledgeGraph;
use crate::rng::SharedRng;
use crate::rule::canonical::CanonicalKey;
use crate::rule::confidence::{calculate_confidence, Stats};
use crate::rule::generalize::{generalize, GeneralizedRule};
use crate::rule::sampler::{sample, DirectionAllowed, SampleOptions};

/// Canonical-string-keyed rule map: body and mutable stats are stored
/// together but remain logically separate (spec §9 "Per-rule state").
pub type RuleMap = HashMap<CanonicalKey, (GeneralizedRule, Stats)>;

/// `Q(rule) → bool`. Defaults to `head_groundings_count >= config.min_head_groundings`.
/// `Send + Sync` so the sharded `parallel`-feature controller can share it
/// across threads.
pub type QualityFn<'a> = &'a (dyn Fn(&Stats) -> bool + Send + Sync);

fn merge_into(global: &mut RuleMap, span: RuleMap) {
    for (key, value) in span {
        global.insert(key, value);
    }
}

fn saturation(span: &RuleMap, global: &RuleMap) -> f64 {
    if span.is_empty() {
        return 0.0;
    }
    let known = span.keys().filter(|key| global.contains_key(*key)).count();
    known as f64 / span.len() as f64
}

/// Run the anytime controller until `config.max_total_time` elapses,
/// returning the accumulated rule map.
pub fn learn(kg: &KnowledgeGraph, config: &LearnConfig, rng: &SharedRng, quality: Option<QualityFn<'_>>) -> RuleMap {
    let mut global: RuleMap = HashMap::new();

    if kg.is_empty() {
        debug!("learn called on an empty graph; returning no rules");
        return global;
    }

    let quality_holds = |stats: &Stats| match quality {
        Some(q) => q(stats),
        None => stats.head_groundings_count >= config.min_head_groundings,
    };

    let total_budget = Duration::from_secs_f64(config.max_total_time.max(0.0));
    let span_budget = Duration::from_secs_f64(config.ts.max(0.0));
    let start = Instant::now();

    let mut n = 2usize;
    let mut iteration: u64 = 0;

    while start.elapsed() < total_budget {
        iteration += 1;
        let cyclic_mode = n == 3 && config.alternate_cyclic_sampling && iteration % 2 == 1;
        let span = info_span!("learn_span", iteration, n, cyclic_mode);
        let _enter = span.enter();

        let mut span_rules: RuleMap = HashMap::new();
        let span_start = Instant::now();
        let mut sampler_exhausted = false;

        let sample_options = SampleOptions { temporal_window: config.temporal_window };
        while span_start.elapsed() < span_budget && start.elapsed() < total_budget {
            let bottom_rule = match sample(kg, n, DirectionAllowed::Both, sample_options, rng) {
                Ok(Some(rule)) => rule,
                Ok(None) => continue,
                Err(err) => {
                    debug!(%err, "sampler could not proceed; ending span early");
                    sampler_exhausted = true;
                    break;
                }
            };
            if cyclic_mode && !bottom_rule.is_cyclical {
                continue;
            }

            for variant in generalize(&bottom_rule) {
                let stats = calculate_confidence(kg, &variant, config.sample_size, config.pc, rng);
                if quality_holds(&stats) {
                    let key = variant.canonical_key();
                    span_rules.insert(key, (variant, stats));
                }
            }
        }

        let sat = saturation(&span_rules, &global);
        debug!(iteration, n, span_rule_count = span_rules.len(), saturation = sat, "span complete");
        if sat > config.sat {
            n += 1;
        }
        merge_into(&mut global, span_rules);

        if sampler_exhausted {
            break;
        }
    }

    info!(total_rules = global.len(), iterations = iteration, "learning run finished");
    global
}

/// Sharded variant of [`learn`], available behind the `parallel` feature.
/// Each span is split across `rayon`'s thread pool into independent
/// thread-local spans that sample concurrently, merging into the shared
/// global map with the same last-writer-wins rule (spec §5).
#[cfg(feature = "parallel")]
pub fn learn_parallel(kg: &KnowledgeGraph, config: &LearnConfig, rng: &SharedRng, quality: Option<QualityFn<'_>>) -> RuleMap {
    use dashmap::DashMap;

    let global: DashMap<CanonicalKey, (GeneralizedRule, Stats)> = DashMap::new();

    if kg.is_empty() {
        debug!("learn_parallel called on an empty graph; returning no rules");
        return HashMap::new();
    }

    let quality_holds = |stats: &Stats| match quality {
        Some(q) => q(stats),
        None => stats.head_groundings_count >= config.min_head_groundings,
    };

    let total_budget = Duration::from_secs_f64(config.max_total_time.max(0.0));
    let span_budget = Duration::from_secs_f64(config.ts.max(0.0));
    let start = Instant::now();
    let shard_count = rayon::current_num_threads().max(1);

    let mut n = 2usize;
    let mut iteration: u64 = 0;

    while start.elapsed() < total_budget {
        iteration += 1;
        let current_n = n;
        let cyclic_mode = current_n == 3 && config.alternate_cyclic_sampling && iteration % 2 == 1;
        let span_start = Instant::now();

        use rayon::prelude::*;
        let sample_options = SampleOptions { temporal_window: config.temporal_window };
        let shard_results: Vec<RuleMap> = (0..shard_count)
            .into_par_iter()
            .map(|_| {
                let mut local: RuleMap = HashMap::new();
                while span_start.elapsed() < span_budget && start.elapsed() < total_budget {
                    let bottom_rule = match sample(kg, current_n, DirectionAllowed::Both, sample_options, rng) {
                        Ok(Some(rule)) => rule,
                        Ok(None) => continue,
                        Err(_) => break,
                    };
                    if cyclic_mode && !bottom_rule.is_cyclical {
                        continue;
                    }
                    for variant in generalize(&bottom_rule) {
                        let stats = calculate_confidence(kg, &variant, config.sample_size, config.pc, rng);
                        if quality_holds(&stats) {
                            local.insert(variant.canonical_key(), (variant, stats));
                        }
                    }
                }
                local
            })
            .collect();

        let mut span_rules: RuleMap = HashMap::new();
        for shard in shard_results {
            merge_into(&mut span_rules, shard);
        }

        let known = span_rules.keys().filter(|key| global.contains_key(*key)).count();
        let sat = if span_rules.is_empty() { 0.0 } else { known as f64 / span_rules.len() as f64 };
        if sat > config.sat {
            n += 1;
        }
        for (key, value) in span_rules {
            global.insert(key, value);
        }
    }

    global.into_iter().collect()
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
    fn learning_on_empty_graph_returns_no_rules() {
        let kg = KnowledgeGraph::from_string_triples(Vec::<(&str, &str, &str, Option<f64>)>::new());
        let config = LearnConfig { max_total_time: 1.0, ..Default::default() };
        let rng = SharedRng::from_seed(0);
        let rules = learn(&kg, &config, &rng, None);
        assert!(rules.is_empty());
    }

    #[test]
    fn learning_discovers_at_least_one_rule_on_a_small_cycle() {
        let kg = triangle_graph();
        let config = LearnConfig {
            sample_size: 20,
            sat: 0.99,
            ts: 0.05,
            pc: 5.0,
            max_total_time: 0.2,
            min_head_groundings: 0,
            alternate_cyclic_sampling: true,
            temporal_window: false,
        };
        let rng = SharedRng::from_seed(42);
        let rules = learn(&kg, &config, &rng, None);
        assert!(!rules.is_empty());
    }

    #[test]
    fn custom_quality_predicate_can_reject_everything() {
        let kg = triangle_graph();
        let config = LearnConfig { ts: 0.05, max_total_time: 0.1, ..Default::default() };
        let rng = SharedRng::from_seed(1);
        let never: QualityFn = &|_stats| false;
        let rules = learn(&kg, &config, &rng, Some(never));
        assert!(rules.is_empty());
    }
}
