//! # anyburl-rs
//!
//! Anytime bottom-up rule learning (AnyBURL) for knowledge-graph completion:
//! learn first-order logic rules from a triple store under a wall-clock
//! budget, then rank link-prediction candidates with those rules.
//!
//! ## Architecture
//!
//! - **Graph index** (`graph`): dual-indexed, read-only knowledge graph —
//!   O(1) fact lookup and neighbour enumeration.
//! - **Rule representation** (`rule`): bottom-rule sampling, generalization
//!   into variable-typed templates, Monte-Carlo confidence estimation, and
//!   the canonical string grammar used for deduplication and display.
//! - **Anytime controller** (`learn`): saturation-driven outer loop that
//!   grows path length as shorter rules stop producing novelty.
//! - **Predictor** (`predict`): rule-indexed grounding with lexicographic
//!   tuple-max aggregation.
//! - **Evaluation** (`eval`): filtered Hits@k / MRR over held-out triples.
//!
//! ## Library usage
//!
//! ```no_run
//! use anyburl_rs::config::LearnConfig;
//! use anyburl_rs::graph::index::KnowledgeGraph;
//! use anyburl_rs::learn::learn;
//! use anyburl_rs::rng::SharedRng;
//!
//! let kg = KnowledgeGraph::from_string_triples(vec![
//!     ("alice", "knows", "bob", None),
//!     ("bob", "knows", "carol", None),
//! ]);
//! let config = LearnConfig::default();
//! let rng = SharedRng::from_seed(0);
//! let rules = learn(&kg, &config, &rng, None);
//! ```

pub mod config;
pub mod error;
pub mod eval;
pub mod graph;
pub mod intern;
pub mod io;
pub mod learn;
pub mod predict;
pub mod rng;
pub mod rule;
