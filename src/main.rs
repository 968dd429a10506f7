//! anyburl CLI: anytime bottom-up rule learning for knowledge-graph completion.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use anyburl_rs::config::LearnConfig;
use anyburl_rs::eval::evaluate_predictions;
use anyburl_rs::graph::index::KnowledgeGraph;
use anyburl_rs::io::read_triples_csv;
use anyburl_rs::learn::learn;
use anyburl_rs::predict::Predictor;
use anyburl_rs::rng::SharedRng;
use anyburl_rs::rule::canonical::CanonicalKey;

#[derive(Parser)]
#[command(name = "anyburl", version, about = "Anytime bottom-up rule learning for knowledge-graph completion")]
struct Cli {
    /// Path to the training triple file (`subject,relation,object[,timestamp]`).
    #[arg(long, global = true)]
    graph: PathBuf,

    /// Seed the shared PRNG for reproducible runs.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Learn a rule set from the training graph and print it.
    Learn {
        /// Monte-Carlo samples per confidence estimate.
        #[arg(long, default_value = "500")]
        sample_size: usize,

        /// Saturation threshold that triggers path-length growth.
        #[arg(long, default_value = "0.99")]
        sat: f64,

        /// Wall-clock seconds per sampling span.
        #[arg(long, default_value = "1.0")]
        ts: f64,

        /// Laplace smoothing constant.
        #[arg(long, default_value = "5.0")]
        pc: f64,

        /// Total wall-clock budget for the run, in seconds.
        #[arg(long, default_value = "60.0")]
        max_total_time: f64,

        /// Write the learned rule set as JSON to this path.
        #[arg(long)]
        rules_out: Option<PathBuf>,
    },

    /// Learn a rule set, then rank candidates for a single query.
    Predict {
        /// Subject entity for `(subject, relation, ?)`, mutually exclusive with `--object`.
        #[arg(long)]
        subject: Option<String>,

        /// Object entity for `(?, relation, object)`, mutually exclusive with `--subject`.
        #[arg(long)]
        object: Option<String>,

        /// Relation of the query.
        #[arg(long)]
        relation: String,

        /// Number of ranked candidates to return.
        #[arg(long, default_value = "10")]
        k: usize,

        #[command(flatten)]
        learn_args: LearnArgs,
    },

    /// Learn a rule set, then evaluate filtered Hits@1 / Hits@k / MRR over a held-out file.
    Evaluate {
        /// Path to the held-out triple file.
        #[arg(long)]
        test_graph: PathBuf,

        /// Number of ranked candidates to consider per query.
        #[arg(long, default_value = "10")]
        k: usize,

        #[command(flatten)]
        learn_args: LearnArgs,
    },
}

#[derive(clap::Args)]
struct LearnArgs {
    #[arg(long, default_value = "500")]
    sample_size: usize,
    #[arg(long, default_value = "0.99")]
    sat: f64,
    #[arg(long, default_value = "1.0")]
    ts: f64,
    #[arg(long, default_value = "5.0")]
    pc: f64,
    #[arg(long, default_value = "60.0")]
    max_total_time: f64,
}

impl From<&LearnArgs> for LearnConfig {
    fn from(args: &LearnArgs) -> Self {
        LearnConfig {
            sample_size: args.sample_size,
            sat: args.sat,
            ts: args.ts,
            pc: args.pc,
            max_total_time: args.max_total_time,
            ..Default::default()
        }
    }
}

fn load_graph(path: &PathBuf) -> Result<KnowledgeGraph> {
    let rows = read_triples_csv(path).into_diagnostic()?;
    let borrowed: Vec<(&str, &str, &str, Option<f64>)> =
        rows.iter().map(|(s, r, o, t)| (s.as_str(), r.as_str(), o.as_str(), *t)).collect();
    Ok(KnowledgeGraph::from_string_triples(borrowed))
}

fn print_rules(kg: &KnowledgeGraph, rules: &anyburl_rs::learn::RuleMap) {
    let mut lines: Vec<(String, f64, usize, usize)> = rules
        .iter()
        .map(|(key, (_, stats)): (&CanonicalKey, _)| {
            (
                key.display(&kg.entity_interner, &kg.relation_interner).to_string(),
                stats.confidence,
                stats.body_groundings_count,
                stats.head_groundings_count,
            )
        })
        .collect();
    lines.sort_by(|a, b| a.0.cmp(&b.0));
    for (line, confidence, body_groundings, head_groundings) in lines {
        println!("{line}\t{confidence:.4}\t{body_groundings}\t{head_groundings}");
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(miette::MietteHandlerOpts::new().terminal_links(true).unicode(true).context_lines(3).build())
    }))
    .ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let rng = match cli.seed {
        Some(seed) => SharedRng::from_seed(seed),
        None => SharedRng::from_entropy(),
    };

    let kg = load_graph(&cli.graph)?;

    match cli.command {
        Commands::Learn { sample_size, sat, ts, pc, max_total_time, rules_out } => {
            let config = LearnConfig { sample_size, sat, ts, pc, max_total_time, ..Default::default() };
            let rules = learn(&kg, &config, &rng, None);
            print_rules(&kg, &rules);

            if let Some(path) = rules_out {
                let serializable: Vec<_> = rules
                    .values()
                    .map(|(rule, stats)| {
                        serde_json::json!({
                            "rule_type": format!("{:?}", rule.rule_type),
                            "canonical": rule.canonical_key().display(&kg.entity_interner, &kg.relation_interner).to_string(),
                            "confidence": stats.confidence,
                            "body_groundings_count": stats.body_groundings_count,
                            "head_groundings_count": stats.head_groundings_count,
                        })
                    })
                    .collect();
                let json = serde_json::to_string_pretty(&serializable).into_diagnostic()?;
                std::fs::write(&path, json)
                    .map_err(|source| anyburl_rs::error::IoError::Write { path: path.display().to_string(), source })
                    .into_diagnostic()?;
            }
        }

        Commands::Predict { subject, object, relation, k, learn_args } => {
            let config = LearnConfig::from(&learn_args);
            let rules = learn(&kg, &config, &rng, None);
            let predictor = Predictor::new(&rules);
            let relation_id = kg
                .relation_interner
                .lookup(&relation)
                .ok_or_else(|| miette::miette!("unknown relation: {relation}"))?;

            let predictions = match (subject, object) {
                (Some(s), None) => {
                    let subject_id =
                        kg.entity_interner.lookup(&s).ok_or_else(|| miette::miette!("unknown entity: {s}"))?;
                    predictor.predict_tail(&kg, subject_id, relation_id, k)
                }
                (None, Some(o)) => {
                    let object_id =
                        kg.entity_interner.lookup(&o).ok_or_else(|| miette::miette!("unknown entity: {o}"))?;
                    predictor.predict_head(&kg, relation_id, object_id, k)
                }
                _ => miette::bail!("exactly one of --subject or --object must be given"),
            };

            for (candidate, confidence) in predictions {
                let label = kg.entity_interner.resolve(candidate).unwrap_or_default();
                println!("{label}\t{confidence:.4}");
            }
        }

        Commands::Evaluate { test_graph, k, learn_args } => {
            let config = LearnConfig::from(&learn_args);
            let rules = learn(&kg, &config, &rng, None);
            let predictor = Predictor::new(&rules);

            let test_rows = read_triples_csv(&test_graph).into_diagnostic()?;
            let test_triples: Vec<_> = test_rows
                .iter()
                .filter_map(|(s, r, o, _)| {
                    Some((kg.entity_interner.lookup(s)?, kg.relation_interner.lookup(r)?, kg.entity_interner.lookup(o)?))
                })
                .collect();

            let metrics = evaluate_predictions(&kg, &predictor, &test_triples, k);
            println!("hits@1\t{:.4}", metrics.hits_at_1);
            println!("hits@{k}\t{:.4}", metrics.hits_at_k);
            println!("mrr\t{:.4}", metrics.mrr);
            println!("evaluated\t{}", metrics.evaluated);
        }
    }

    Ok(())
}
