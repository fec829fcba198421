//! Interactive simulation controller.
//!
//! Wraps one [`Engine`] round with the controls an animated view needs:
//! play, pause, single step, timer ticks and reset. Steps are synchronous,
//! so ticks can never overlap.
//!
//! ```text
//! Paused --play--> Running --pause--> Paused
//!    \               |
//!     `--step--.     | tick (no proposer left)
//!               v    v
//!               Finished --reset/reconfigure--> Paused
//! ```

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::engine::{verify, Engine, Interaction, StabilityReport, Step};
use crate::error::Result;
use crate::lab::RankSummary;
use crate::matching::MatchingState;
use crate::preferences::{generate, PreferenceTable};

/// Playback state of the interactive round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not stepping automatically (initial state)
    Paused,
    /// Timer ticks make proposals
    Running,
    /// No eligible proposer remains
    Finished,
}

/// Interactive deferred-acceptance round.
///
/// ## Example
///
/// ```
/// use stable_match_lab::config::SimConfig;
/// use stable_match_lab::simulation::{RunState, Simulation};
///
/// let config = SimConfig { population: 6, bias_percent: 100.0, seed: Some(1), ..SimConfig::default() };
/// let mut sim = Simulation::new(config).unwrap();
///
/// sim.play();
/// while sim.run_state() == RunState::Running {
///     sim.tick().unwrap();
/// }
///
/// assert_eq!(sim.run_state(), RunState::Finished);
/// assert!(sim.stability().unwrap().verified);
/// ```
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    rng: ChaCha8Rng,
    engine: Engine,
    run_state: RunState,
    stability: Option<StabilityReport>,
}

impl Simulation {
    /// Validate `config` and generate the first round.
    ///
    /// Percentages are clamped; population and lab parameters are
    /// rejected if out of range.
    pub fn new(config: SimConfig) -> Result<Self> {
        let config = config.clamped();
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let engine = fresh_engine(&config, &mut rng)?;

        Ok(Self {
            config,
            rng,
            engine,
            run_state: RunState::Paused,
            stability: None,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn matching(&self) -> &MatchingState {
        self.engine.state()
    }

    pub fn preferences(&self) -> &PreferenceTable {
        self.engine.preferences()
    }

    /// Most recent proposer/receiver pair
    pub fn last_interaction(&self) -> Option<&Interaction> {
        self.engine.last_interaction()
    }

    /// Rank statistics of the current (possibly partial) matching
    pub fn summary(&self) -> RankSummary {
        RankSummary::from_state(self.engine.state(), self.engine.preferences())
    }

    /// Stability report, computed once when the round finishes
    pub fn stability(&self) -> Option<&StabilityReport> {
        self.stability.as_ref()
    }

    /// Delay a host timer should wait between ticks
    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval()
    }

    // ========================================================================
    // Controls
    // ========================================================================

    /// Start automatic stepping; no effect once finished
    pub fn play(&mut self) {
        if self.run_state == RunState::Paused {
            self.run_state = RunState::Running;
        }
    }

    /// Stop issuing steps; state is kept
    pub fn pause(&mut self) {
        if self.run_state == RunState::Running {
            self.run_state = RunState::Paused;
        }
    }

    /// Timer callback: steps only while running
    pub fn tick(&mut self) -> Result<Option<Interaction>> {
        if self.run_state != RunState::Running {
            return Ok(None);
        }
        self.step()
    }

    /// Make one proposal regardless of playback state.
    ///
    /// # Returns
    ///
    /// The interaction, or None once the round is finished
    pub fn step(&mut self) -> Result<Option<Interaction>> {
        if self.run_state == RunState::Finished {
            return Ok(None);
        }
        match self.engine.step(&mut self.rng)? {
            Step::Proposed(interaction) => Ok(Some(interaction)),
            Step::Finished => {
                self.finish();
                Ok(None)
            }
        }
    }

    /// Step until the round is over
    pub fn run_to_end(&mut self) -> Result<u64> {
        while self.step()?.is_some() {}
        Ok(self.engine.proposals())
    }

    /// Discard the round and regenerate preferences with the same config
    pub fn reset(&mut self) -> Result<()> {
        self.engine = fresh_engine(&self.config, &mut self.rng)?;
        self.run_state = RunState::Paused;
        self.stability = None;
        debug!(population = self.config.population, "simulation reset");
        Ok(())
    }

    /// Apply a new configuration.
    ///
    /// Population, consensus or seed changes regenerate the round. Bias
    /// and speed changes apply to the round in progress.
    pub fn reconfigure(&mut self, config: SimConfig) -> Result<()> {
        let config = config.clamped();
        config.validate()?;

        let regenerate = self.config.needs_regeneration(&config);
        let reseed = self.config.seed != config.seed;
        self.config = config;

        info!(
            population = self.config.population,
            bias = self.config.bias_percent,
            consensus_a = self.config.consensus_a_percent,
            consensus_b = self.config.consensus_b_percent,
            regenerate,
            "simulation reconfigured"
        );

        if reseed {
            if let Some(seed) = self.config.seed {
                self.rng = ChaCha8Rng::seed_from_u64(seed);
            }
        }
        if regenerate {
            self.reset()
        } else {
            self.engine.set_bias(self.config.bias());
            Ok(())
        }
    }

    fn finish(&mut self) {
        self.run_state = RunState::Finished;
        if self.config.verify_on_finish && self.stability.is_none() {
            let report = verify(self.engine.state(), self.engine.preferences());
            info!(
                proposals = self.engine.proposals(),
                blocking_pairs = report.blocking_pairs,
                "round finished"
            );
            self.stability = Some(report);
        }
    }
}

fn fresh_engine(config: &SimConfig, rng: &mut ChaCha8Rng) -> Result<Engine> {
    let prefs = generate(config.population, config.consensus_a(), config.consensus_b(), rng)?;
    Ok(Engine::new(prefs, config.bias()))
}

// ============================================================================
// Unit Tests
// ============================================================================
