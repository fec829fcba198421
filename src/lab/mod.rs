//! Batch lab: aggregate rank statistics over a consensus grid.
//!
//! ## Components
//!
//! - [`RankSummary`]: Mean achieved rank by side and by role
//! - [`LabRunner`]: Cooperative R x R sweep, one batch per call
//! - [`simulate_cell`]: One fresh headless round, summarized

pub mod runner;
pub mod stats;

pub use runner::{coefficient, simulate_cell, LabCell, LabConfig, LabProgress, LabRunner, LabState};
pub use stats::RankSummary;
