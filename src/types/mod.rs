//! Core data types for the stable matching engine.
//!
//! ## Types
//!
//! - [`Side`]: Population side, A or B
//! - [`ParticipantId`]: Side plus index, displayed as `A3` / `B7`
//! - [`Role`]: Asker or asked, per match member
//! - [`Match`]: A pairing between one A and one B participant
//!
//! `Match` implements SSZ serialization for deterministic encoding of a
//! final matching.

mod pairing;
mod participant;

// Re-export all types at module level
pub use pairing::Match;
pub use participant::{ParticipantId, Role, Side};
