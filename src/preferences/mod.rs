//! Preference generation and lookup.
//!
//! ## Components
//!
//! - [`PreferenceTable`]: Lists, inverse ranks and qualities for both sides
//! - [`generate`]: Correlated random generator driven by a consensus
//!   coefficient per side
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Generate | O(n² log n) |
//! | Rank lookup | O(1) |
//! | List access | O(1) |

pub mod generator;
pub mod table;

pub use generator::generate;
pub use table::PreferenceTable;
