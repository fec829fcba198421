//! Deferred-acceptance engine and stability verifier.
//!
//! ## Design Principles
//!
//! 1. **Explicit state**: One [`Engine`] owns the preferences, matching and
//!    cursors of a round; every step takes it by `&mut`
//! 2. **Injected randomness**: Every random decision draws from a caller
//!    supplied `rand::Rng`, so seeded runs are reproducible
//! 3. **Synchronous steps**: A step never suspends; hosts pace them
//! 4. **Loud failure**: Running past the proposal bound is an error, never a
//!    truncated matching
//!
//! ## Modes
//!
//! - **Single step**: [`Engine::step`] for animated stepping, with the last
//!   interaction exposed for highlighting
//! - **Headless**: [`Engine::run_to_completion`] for batch runs
//!
//! ## Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use stable_match_lab::engine::{verify, Engine, Step};
//! use stable_match_lab::preferences::generate;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(3);
//! let prefs = generate(4, 0.2, 0.9, &mut rng).unwrap();
//! let mut engine = Engine::new(prefs, 0.0);
//!
//! while let Step::Proposed(interaction) = engine.step(&mut rng).unwrap() {
//!     println!("{} -> {}: {:?}", interaction.proposer, interaction.receiver, interaction.outcome);
//! }
//!
//! let report = verify(engine.state(), engine.preferences());
//! assert!(report.verified);
//! ```

pub mod scheduler;
pub mod stability;

pub use scheduler::{Engine, Interaction, ProposalOutcome, Step};
pub use stability::{verify, StabilityReport};
