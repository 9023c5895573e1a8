//! Error taxonomy for the net model, parser, and analysis engines.
//!
//! Parse errors are fatal before any analysis runs. Invariant violations
//! indicate a bug in the caller, not a condition to recover from. Solver
//! errors are fatal for the client that raised them but never invalidate an
//! already-computed reach-set.

use std::time::Duration;

/// Structural or semantic defects found while parsing a PNML document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no <net> element found in PNML document")]
    MissingNet,

    #[error("place is missing its required id attribute")]
    PlaceMissingId,

    #[error("transition is missing its required id attribute")]
    TransitionMissingId,

    #[error("arc is missing a required id, source, or target attribute")]
    ArcMissingAttribute,

    #[error("duplicate place id {0:?}")]
    DuplicatePlaceId(String),

    #[error("duplicate transition id {0:?}")]
    DuplicateTransitionId(String),

    #[error("place {place:?} has invalid initial marking {text:?}; must be 0 or 1")]
    InvalidInitialMarking { place: String, text: String },

    #[error("arc {arc:?} has invalid inscription {text:?}; must be an integer >= 1")]
    InvalidArcWeight { arc: String, text: String },

    #[error(
        "arc {arc:?} has inscription weight {weight}, but this engine only supports 1-safe \
         nets (binary place variables); weight must be 1. Reject the net or extend the \
         symbolic encoding to multi-bit places before lifting this restriction"
    )]
    UnsupportedArcWeight { arc: String, weight: u32 },

    #[error("arc {arc:?} references unknown endpoint {endpoint:?}")]
    UnknownArcEndpoint { arc: String, endpoint: String },

    #[error(
        "arc {arc:?} connects two {kind}s ({source:?} -> {target:?}); nets must be bipartite"
    )]
    NotBipartite {
        arc: String,
        kind: &'static str,
        source: String,
        target: String,
    },

    #[error("duplicate arc between {source:?} and {target:?}")]
    DuplicateArc { source: String, target: String },

    #[error("failed to read or deserialize PNML document: {0}")]
    Xml(String),
}

/// Errors raised while driving the analysis engines over an already-valid net.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A caller asked the net model to do something its own preconditions
    /// forbid (e.g. firing a disabled transition). This is a programming
    /// error, not a recoverable runtime condition.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// No implementation of the requested capability is compiled in. The
    /// rest of the pipeline (explicit reachability, structural report)
    /// still runs; only the client that needed this capability is skipped.
    #[error("solver backend unavailable: {0}")]
    SolverUnavailable(String),

    #[error("solver error: {0}")]
    SolverError(String),

    #[error("solver exceeded its time budget of {0:?}")]
    Timeout(Duration),

    /// Not part of the distilled spec's taxonomy: a malformed CLI
    /// objective vector. Fatal before any analysis runs, like a
    /// [`ParseError`], but about the command line rather than the PNML
    /// document.
    #[error("invalid objective vector: {0}")]
    InvalidObjective(String),
}

pub type ParseResult<T> = Result<T, ParseError>;
pub type AnalysisResult<T> = Result<T, AnalysisError>;
