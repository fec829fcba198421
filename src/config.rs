//! Simulation and lab parameters.
//!
//! The UI sliders map straight onto [`SimConfig`]. Percentages are clamped
//! into `[0, 100]` by [`SimConfig::clamped`]; population size and lab grid
//! parameters are checked by [`SimConfig::validate`] and rejected at the
//! boundary rather than handled inside the algorithm.
//!
//! Loaded from JSON at runtime:
//!
//! ```
//! use stable_match_lab::config::SimConfig;
//!
//! let config = SimConfig::from_json_str(r#"{ "population": 12, "bias_percent": 80 }"#).unwrap();
//! assert_eq!(config.population, 12);
//! assert_eq!(config.bias_percent, 80.0);
//! // Missing fields fall back to defaults
//! assert_eq!(config.lab_batch_size, 25);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Largest population either side may have
pub const MAX_POPULATION: usize = 200;

/// Largest lab grid resolution (R x R cells)
pub const MAX_LAB_RESOLUTION: usize = 101;

/// Default lab batch size (cells per cooperative turn)
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Parameter surface of the engine.
///
/// `bias_percent` is the probability (in percent) that side A's population
/// gets the next proposal. It is a population-level coin flip per tick, not
/// a per-individual weighting: whichever side wins the flip, the proposer is
/// then drawn uniformly from that side's eligible singles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Participants per side
    pub population: usize,

    /// Probability in percent that side A proposes next
    pub bias_percent: f64,

    /// Side A consensus in percent (0 = idiosyncratic, 100 = quality-ranked)
    pub consensus_a_percent: f64,

    /// Side B consensus in percent
    pub consensus_b_percent: f64,

    /// Interval between automatic ticks in interactive mode (milliseconds)
    pub tick_interval_ms: u64,

    /// Run the stability verifier when an interactive round finishes
    pub verify_on_finish: bool,

    /// Lab grid resolution R (R x R cells)
    pub lab_resolution: usize,

    /// Lab cells processed per cooperative batch
    pub lab_batch_size: usize,

    /// Seed for reproducible runs; entropy when absent
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            population: 20,
            bias_percent: 50.0,
            consensus_a_percent: 50.0,
            consensus_b_percent: 50.0,
            tick_interval_ms: 100,
            verify_on_finish: true,
            lab_resolution: 11,
            lab_batch_size: DEFAULT_BATCH_SIZE,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Parse a JSON document; absent fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    /// Copy with every percentage clamped into `[0, 100]`
    pub fn clamped(mut self) -> Self {
        self.bias_percent = clamp_percent(self.bias_percent);
        self.consensus_a_percent = clamp_percent(self.consensus_a_percent);
        self.consensus_b_percent = clamp_percent(self.consensus_b_percent);
        self
    }

    /// Reject configurations the engine cannot run.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidPopulation`] for 0 or more than [`MAX_POPULATION`]
    /// - [`EngineError::InvalidResolution`] for a lab resolution of 0 or more
    ///   than [`MAX_LAB_RESOLUTION`]
    /// - [`EngineError::InvalidBatchSize`] for a lab batch size of 0
    pub fn validate(&self) -> Result<()> {
        validate_population(self.population)?;
        validate_resolution(self.lab_resolution)?;
        if self.lab_batch_size == 0 {
            return Err(EngineError::InvalidBatchSize);
        }
        Ok(())
    }

    /// Probability that side A proposes, in `[0, 1]`
    pub fn bias(&self) -> f64 {
        clamp_percent(self.bias_percent) / 100.0
    }

    /// Side A consensus coefficient in `[0, 1]`
    pub fn consensus_a(&self) -> f64 {
        clamp_percent(self.consensus_a_percent) / 100.0
    }

    /// Side B consensus coefficient in `[0, 1]`
    pub fn consensus_b(&self) -> f64 {
        clamp_percent(self.consensus_b_percent) / 100.0
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Whether switching to `other` requires regenerating preferences
    pub fn needs_regeneration(&self, other: &SimConfig) -> bool {
        self.population != other.population
            || self.consensus_a_percent != other.consensus_a_percent
            || self.consensus_b_percent != other.consensus_b_percent
            || self.seed != other.seed
    }
}

/// Check a population size against `1..=MAX_POPULATION`
pub fn validate_population(n: usize) -> Result<()> {
    if n == 0 || n > MAX_POPULATION {
        return Err(EngineError::InvalidPopulation { got: n, max: MAX_POPULATION });
    }
    Ok(())
}

/// Check a lab grid resolution against `1..=MAX_LAB_RESOLUTION`
pub fn validate_resolution(resolution: usize) -> Result<()> {
    if resolution == 0 || resolution > MAX_LAB_RESOLUTION {
        return Err(EngineError::InvalidResolution(resolution));
    }
    Ok(())
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bias(), 0.5);
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_clamped() {
        let config = SimConfig {
            bias_percent: 140.0,
            consensus_a_percent: -3.0,
            consensus_b_percent: f64::NAN,
            ..SimConfig::default()
        }
        .clamped();

        assert_eq!(config.bias_percent, 100.0);
        assert_eq!(config.consensus_a_percent, 0.0);
        assert_eq!(config.consensus_b_percent, 0.0);
    }

    #[test]
    fn test_coefficients() {
        let config = SimConfig {
            bias_percent: 25.0,
            consensus_a_percent: 100.0,
            consensus_b_percent: 40.0,
            ..SimConfig::default()
        };
        assert_eq!(config.bias(), 0.25);
        assert_eq!(config.consensus_a(), 1.0);
        assert!((config.consensus_b() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_validate_population() {
        let zero = SimConfig { population: 0, ..SimConfig::default() };
        assert!(matches!(zero.validate(), Err(EngineError::InvalidPopulation { got: 0, .. })));

        let huge = SimConfig { population: MAX_POPULATION + 1, ..SimConfig::default() };
        assert!(matches!(huge.validate(), Err(EngineError::InvalidPopulation { .. })));

        let max = SimConfig { population: MAX_POPULATION, ..SimConfig::default() };
        assert!(max.validate().is_ok());
    }

    #[test]
    fn test_validate_lab_parameters() {
        let no_grid = SimConfig { lab_resolution: 0, ..SimConfig::default() };
        assert!(matches!(no_grid.validate(), Err(EngineError::InvalidResolution(0))));

        let too_fine = SimConfig { lab_resolution: 1 << 33, ..SimConfig::default() };
        assert!(matches!(too_fine.validate(), Err(EngineError::InvalidResolution(r)) if r == 1 << 33));

        let finest = SimConfig { lab_resolution: MAX_LAB_RESOLUTION, ..SimConfig::default() };
        assert!(finest.validate().is_ok());

        let no_batch = SimConfig { lab_batch_size: 0, ..SimConfig::default() };
        assert!(matches!(no_batch.validate(), Err(EngineError::InvalidBatchSize)));
    }

    #[test]
    fn test_from_json_defaults_and_seed() {
        let config = SimConfig::from_json_str(r#"{ "seed": 9, "verify_on_finish": false }"#).unwrap();
        assert_eq!(config.seed, Some(9));
        assert!(!config.verify_on_finish);
        assert_eq!(config.population, SimConfig::default().population);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let result = SimConfig::from_json_str("{ population: ");
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_needs_regeneration() {
        let base = SimConfig::default();
        let faster = SimConfig { tick_interval_ms: 10, bias_percent: 90.0, ..base.clone() };
        assert!(!base.needs_regeneration(&faster));

        let bigger = SimConfig { population: 30, ..base.clone() };
        assert!(base.needs_regeneration(&bigger));
    }
}
