//! # Stable Match Lab
//!
//! Deferred-acceptance (Gale–Shapley) stable matching between two equal-size
//! populations, with correlated random preferences, a biased proposal
//! scheduler and a batch lab over a consensus grid.
//!
//! ## Architecture
//!
//! - **Types**: Participant identity, roles, the `Match` record
//! - **Preferences**: Correlated random generation, O(1) rank lookup
//! - **Matching**: Slab-backed partial matching
//! - **Engine**: Proposal scheduler and stability verifier
//! - **Lab**: Rank statistics and the cooperative grid runner
//! - **Simulation**: Interactive play / pause / step / reset controller
//!
//! ## Design Principles
//!
//! 1. **Explicit state**: Each round owns its preferences, cursors and
//!    matching; nothing is shared between runs
//! 2. **Injected randomness**: Seeded runs are reproducible end to end
//! 3. **Synchronous steps**: The only suspension point is between lab batches
//! 4. **Boundary validation**: Bad parameters are rejected before the
//!    algorithm runs; a runaway proposal loop is an error, not a truncation

// ============================================================================
// Module declarations
// ============================================================================

/// Error type and result alias
pub mod error;

/// Parameter surface: population, bias, consensus, lab grid
pub mod config;

/// Core data types: Side, ParticipantId, Role, Match
pub mod types;

/// Preference tables and the correlated generator
pub mod preferences;

/// Matching state with slab-based storage
pub mod matching;

/// Deferred-acceptance engine and stability verifier
pub mod engine;

/// Rank statistics and the batch lab runner
pub mod lab;

/// Interactive simulation controller
pub mod simulation;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::SimConfig;
pub use engine::{verify, Engine, Interaction, ProposalOutcome, StabilityReport, Step};
pub use error::{EngineError, Result};
pub use lab::{LabCell, LabConfig, LabProgress, LabRunner, RankSummary};
pub use matching::MatchingState;
pub use preferences::{generate, PreferenceTable};
pub use simulation::{RunState, Simulation};
pub use types::{Match, ParticipantId, Role, Side};
