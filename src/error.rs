//! Error type for the stable matching engine.
//!
//! Parameters arriving from the UI layer are clamped before they reach the
//! engine, so the recoverable variants here are all boundary rejections.
//! [`EngineError::ProposalLimitExceeded`] is the one fatal-class condition:
//! it signals a broken invariant inside the proposal loop.

use thiserror::Error;

use crate::types::ParticipantId;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by the engine, the lab runner and configuration loading.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Population size outside `1..=max`.
    #[error("population size must be between 1 and {max}, got {got}")]
    InvalidPopulation { got: usize, max: usize },

    /// Lab grid resolution outside `1..=MAX_LAB_RESOLUTION`.
    #[error(
        "lab grid resolution must be between 1 and {max}, got {0}",
        max = crate::config::MAX_LAB_RESOLUTION
    )]
    InvalidResolution(usize),

    /// Lab batch size of zero.
    #[error("lab batch size must be at least 1")]
    InvalidBatchSize,

    /// An explicit preference table that is not a set of permutations.
    #[error("malformed preference list for {participant}: {reason}")]
    MalformedPreferences {
        participant: ParticipantId,
        reason: String,
    },

    /// Explicit preference lists with a different count per side.
    #[error("side A has {a} preference lists but side B has {b}")]
    SideCountMismatch { a: usize, b: usize },

    /// A proposal was requested from a participant that is matched or has
    /// exhausted its preference list.
    #[error("{0} is not eligible to propose")]
    IneligibleProposer(ParticipantId),

    /// The proposal loop ran past its defensive bound.
    #[error("proposal loop exceeded {limit} proposals without terminating")]
    ProposalLimitExceeded { limit: u64 },

    /// SSZ encoding failed while fingerprinting a matching.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}
