//! Matching state for the deferred-acceptance engine.
//!
//! ## Components
//!
//! - [`MatchingState`]: Slab-backed partial matching with per-side slot
//!   tables
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Pair | O(1) |
//! | Dissolve | O(1) |
//! | Partner lookup | O(1) |
//! | Singles | O(n) |
//! | Fingerprint | O(n) |

pub mod state;

pub use state::MatchingState;
