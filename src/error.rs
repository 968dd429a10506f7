//! Diagnostic error types for the anyburl-rs engine.
//!
//! Only fail-fast boundary conditions are modeled as errors here. The other
//! three kinds of "failure" named by the design (a sampler that can't
//! complete a walk, a rule whose body has no grounding, a relation with no
//! learned rules) are sentinels — `None` or an empty `Vec` — not
//! `Result::Err`, so they never appear in this enum.

use miette::Diagnostic;
use thiserror::Error;

/// Result type used throughout the crate.
pub type AnyburlResult<T> = std::result::Result<T, AnyburlError>;

/// Top-level error type for anyburl-rs.
#[derive(Debug, Error, Diagnostic)]
pub enum AnyburlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Sampling(#[from] SamplingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] IoError),
}

// ---------------------------------------------------------------------------
// Sampling errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SamplingError {
    #[error("walk length n must be >= 1, got {n}")]
    #[diagnostic(
        code(anyburl::sampling::invalid_length),
        help("A bottom rule of length n has 1 head atom and (n - 1) body atoms; n must be positive.")
    )]
    InvalidLength { n: usize },

    #[error("knowledge graph has no triples to sample a head from")]
    #[diagnostic(
        code(anyburl::sampling::empty_graph),
        help("Load at least one triple into the graph before sampling bottom rules.")
    )]
    EmptyGraph,
}

// ---------------------------------------------------------------------------
// Rule construction errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RuleError {
    #[error("AC1 rules on a cyclical bottom rule require an AC1 variant (Y_as_constant or X_as_constant)")]
    #[diagnostic(
        code(anyburl::rule::missing_ac1_variant),
        help("Call GeneralizedRule::ac1 with an explicit Ac1Variant when the bottom rule is cyclical.")
    )]
    MissingAc1Variant,

    #[error("AC1 variant was specified for a non-cyclical bottom rule or a non-AC1 rule type")]
    #[diagnostic(
        code(anyburl::rule::unexpected_ac1_variant),
        help("Ac1Variant only applies to AC1 rules derived from a cyclical bottom rule.")
    )]
    UnexpectedAc1Variant,

    #[error("malformed canonical rule string: {input}")]
    #[diagnostic(
        code(anyburl::rule::canonical_parse),
        help("Expected the grammar `head <- body_atom (, body_atom)*` where an atom is `relation(term,term)`.")
    )]
    CanonicalParse { input: String },
}

// ---------------------------------------------------------------------------
// I/O errors (CLI boundary)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum IoError {
    #[error("failed to read triples from {path}: {source}")]
    #[diagnostic(
        code(anyburl::io::csv_read),
        help("Check that the file exists and is a comma- or tab-delimited `subject,relation,object[,timestamp]` file.")
    )]
    CsvRead {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write {path}: {source}")]
    #[diagnostic(code(anyburl::io::write))]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
