//! Batch lab runner: deferred acceptance over a consensus grid.
//!
//! ## Grid
//!
//! For resolution R the lab runs R x R cells. Cell `(i, j)` uses
//! `consensus_a = i / (R - 1)` and `consensus_b = j / (R - 1)`; a 1 x 1 grid
//! is the single cell at the origin. Every cell generates fresh preferences
//! and runs one headless round; nothing is cached between cells.
//!
//! ## Cooperative Batching
//!
//! Cells are processed in fixed-size batches. [`LabRunner::next_batch`]
//! runs one batch and returns, so a host event loop can call it once per
//! turn and stay responsive. Progress is reported after every batch.
//!
//! ```text
//! Idle --next_batch--> Running(processed/total) --last batch--> Idle
//! ```

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{validate_population, validate_resolution, SimConfig, DEFAULT_BATCH_SIZE};
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::lab::RankSummary;
use crate::preferences::generate;

/// Parameters of one lab sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabConfig {
    /// Participants per side in every cell
    pub population: usize,
    /// Probability that side A proposes, in `[0, 1]`
    pub bias: f64,
    /// Grid resolution R
    pub resolution: usize,
    /// Cells per batch
    pub batch_size: usize,
}

impl LabConfig {
    pub fn new(population: usize, bias: f64, resolution: usize) -> Self {
        Self {
            population,
            bias,
            resolution,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Total number of cells, R x R; saturates for resolutions `validate`
    /// would reject
    pub fn total_cells(&self) -> usize {
        self.resolution
            .checked_mul(self.resolution)
            .unwrap_or(usize::MAX)
    }

    fn validate(&self) -> Result<()> {
        validate_population(self.population)?;
        validate_resolution(self.resolution)?;
        if self.batch_size == 0 {
            return Err(EngineError::InvalidBatchSize);
        }
        Ok(())
    }
}

impl From<&SimConfig> for LabConfig {
    fn from(config: &SimConfig) -> Self {
        Self {
            population: config.population,
            bias: config.bias(),
            resolution: config.lab_resolution,
            batch_size: config.lab_batch_size,
        }
    }
}

/// Result record of one grid cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabCell {
    /// Row: side-A consensus index
    pub i: usize,
    /// Column: side-B consensus index
    pub j: usize,
    pub consensus_a: f64,
    pub consensus_b: f64,
    #[serde(flatten)]
    pub summary: RankSummary,
}

/// Cells processed so far out of the total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabProgress {
    pub processed: usize,
    pub total: usize,
}

impl LabProgress {
    /// Progress in percent, `0.0..=100.0`
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.processed as f64 * 100.0 / self.total as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// Lab runner state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabState {
    Idle,
    Running(LabProgress),
}

/// Grid coefficient for index `index` at resolution `resolution`
pub fn coefficient(index: usize, resolution: usize) -> f64 {
    if resolution <= 1 {
        0.0
    } else {
        index as f64 / (resolution - 1) as f64
    }
}

/// Run one headless round with fresh preferences and summarize it.
///
/// No stability check is made.
pub fn simulate_cell<R: Rng + ?Sized>(
    population: usize,
    bias: f64,
    consensus_a: f64,
    consensus_b: f64,
    rng: &mut R,
) -> Result<RankSummary> {
    let prefs = generate(population, consensus_a, consensus_b, rng)?;
    let mut engine = Engine::new(prefs, bias);
    engine.run_to_completion(rng)?;
    Ok(RankSummary::from_state(engine.state(), engine.preferences()))
}

/// Cooperative runner over the consensus grid.
///
/// ## Example
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use stable_match_lab::lab::{LabConfig, LabRunner};
///
/// let config = LabConfig::new(8, 0.5, 3).with_batch_size(4);
/// let mut runner = LabRunner::new(config, ChaCha8Rng::seed_from_u64(0)).unwrap();
///
/// // One batch per host turn
/// loop {
///     let progress = runner.next_batch().unwrap();
///     if progress.is_complete() {
///         break;
///     }
/// }
/// assert_eq!(runner.cells().len(), 9);
/// ```
#[derive(Debug)]
pub struct LabRunner<R> {
    config: LabConfig,
    rng: R,
    cells: Vec<LabCell>,
    next_cell: usize,
    state: LabState,
}

impl<R: Rng> LabRunner<R> {
    /// # Errors
    ///
    /// Rejects an invalid population, a resolution outside
    /// `1..=MAX_LAB_RESOLUTION` or a zero batch size.
    pub fn new(config: LabConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cells: Vec::new(),
            config,
            rng,
            next_cell: 0,
            state: LabState::Idle,
        })
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    pub fn state(&self) -> LabState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LabState::Running(_))
    }

    /// Cells produced by the current or most recent sweep, in grid order
    pub fn cells(&self) -> &[LabCell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<LabCell> {
        self.cells
    }

    fn progress(&self) -> LabProgress {
        LabProgress {
            processed: self.next_cell,
            total: self.config.total_cells(),
        }
    }

    /// Process one batch of cells.
    ///
    /// Called while idle, this starts a new sweep (discarding the previous
    /// cells) and processes its first batch. After the last batch the
    /// runner returns to idle.
    ///
    /// # Errors
    ///
    /// Propagates engine errors; the runner returns to idle.
    pub fn next_batch(&mut self) -> Result<LabProgress> {
        if self.state == LabState::Idle {
            self.cells.clear();
            self.next_cell = 0;
            self.state = LabState::Running(self.progress());
            info!(
                cells = self.config.total_cells(),
                population = self.config.population,
                bias = self.config.bias,
                "lab sweep started"
            );
        }

        let total = self.config.total_cells();
        let end = (self.next_cell + self.config.batch_size).min(total);
        let resolution = self.config.resolution;

        while self.next_cell < end {
            let i = self.next_cell / resolution;
            let j = self.next_cell % resolution;
            let consensus_a = coefficient(i, resolution);
            let consensus_b = coefficient(j, resolution);

            let summary = match simulate_cell(
                self.config.population,
                self.config.bias,
                consensus_a,
                consensus_b,
                &mut self.rng,
            ) {
                Ok(summary) => summary,
                Err(e) => {
                    self.state = LabState::Idle;
                    return Err(e);
                }
            };

            self.cells.push(LabCell {
                i,
                j,
                consensus_a,
                consensus_b,
                summary,
            });
            self.next_cell += 1;
        }

        let progress = self.progress();
        debug!(
            processed = progress.processed,
            total = progress.total,
            "lab batch done"
        );

        if progress.is_complete() {
            self.state = LabState::Idle;
            info!(cells = self.cells.len(), "lab sweep finished");
        } else {
            self.state = LabState::Running(progress);
        }
        Ok(progress)
    }

    /// Drive a whole sweep, calling `on_progress` after every batch.
    ///
    /// # Returns
    ///
    /// The cells of the sweep, in grid order
    pub fn run(&mut self, mut on_progress: impl FnMut(LabProgress)) -> Result<&[LabCell]> {
        // An in-flight sweep is finished rather than restarted
        loop {
            let progress = self.next_batch()?;
            on_progress(progress);
            if progress.is_complete() {
                return Ok(&self.cells);
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_LAB_RESOLUTION;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn runner(population: usize, resolution: usize, batch: usize) -> LabRunner<ChaCha8Rng> {
        let config = LabConfig::new(population, 0.5, resolution).with_batch_size(batch);
        LabRunner::new(config, ChaCha8Rng::seed_from_u64(77)).unwrap()
    }

    #[test]
    fn test_coefficient() {
        assert_eq!(coefficient(0, 5), 0.0);
        assert_eq!(coefficient(2, 5), 0.5);
        assert_eq!(coefficient(4, 5), 1.0);
        assert_eq!(coefficient(0, 1), 0.0);
    }

    #[test]
    fn test_new_rejects_invalid() {
        let rng = || ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            LabRunner::new(LabConfig::new(0, 0.5, 3), rng()),
            Err(EngineError::InvalidPopulation { .. })
        ));
        assert!(matches!(
            LabRunner::new(LabConfig::new(5, 0.5, 0), rng()),
            Err(EngineError::InvalidResolution(0))
        ));
        assert!(matches!(
            LabRunner::new(LabConfig::new(5, 0.5, MAX_LAB_RESOLUTION + 1), rng()),
            Err(EngineError::InvalidResolution(_))
        ));
        assert!(matches!(
            LabRunner::new(LabConfig::new(5, 0.5, 2).with_batch_size(0), rng()),
            Err(EngineError::InvalidBatchSize)
        ));
    }

    #[test]
    fn test_oversized_grid_is_rejected_not_allocated() {
        let config = LabConfig::new(5, 0.5, 1 << 33);
        assert_eq!(config.total_cells(), usize::MAX);
        assert!(matches!(
            LabRunner::new(config, ChaCha8Rng::seed_from_u64(0)),
            Err(EngineError::InvalidResolution(r)) if r == 1 << 33
        ));
    }

    #[test]
    fn test_state_machine() {
        let mut lab = runner(5, 3, 4);
        assert_eq!(lab.state(), LabState::Idle);

        let p = lab.next_batch().unwrap();
        assert_eq!(p, LabProgress { processed: 4, total: 9 });
        assert_eq!(lab.state(), LabState::Running(p));

        let p = lab.next_batch().unwrap();
        assert_eq!(p.processed, 8);
        assert!(lab.is_running());

        let p = lab.next_batch().unwrap();
        assert_eq!(p.processed, 9);
        assert!(p.is_complete());
        assert_eq!(p.percent(), 100.0);
        assert_eq!(lab.state(), LabState::Idle);
    }

    #[test]
    fn test_grid_order_and_coefficients() {
        let mut lab = runner(4, 3, 25);
        let cells = lab.run(|_| {}).unwrap();

        assert_eq!(cells.len(), 9);
        for (k, cell) in cells.iter().enumerate() {
            assert_eq!(cell.i, k / 3);
            assert_eq!(cell.j, k % 3);
            assert_eq!(cell.consensus_a, coefficient(cell.i, 3));
            assert_eq!(cell.consensus_b, coefficient(cell.j, 3));
        }
        assert_eq!(cells[8].consensus_a, 1.0);
        assert_eq!(cells[8].consensus_b, 1.0);
    }

    #[test]
    fn test_single_cell_grid() {
        let mut lab = runner(3, 1, 25);
        let cells = lab.run(|_| {}).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].consensus_a, 0.0);
    }

    #[test]
    fn test_rerun_starts_fresh() {
        let mut lab = runner(4, 2, 3);
        lab.run(|_| {}).unwrap();
        let cells = lab.run(|_| {}).unwrap();
        assert_eq!(cells.len(), 4);
    }

    #[test]
    fn test_cell_serializes_flat() {
        let mut lab = runner(3, 2, 25);
        let cells = lab.run(|_| {}).unwrap();
        let json = serde_json::to_value(&cells[0]).unwrap();

        assert!(json.get("side_a").is_some());
        assert!(json.get("asked").is_some());
        assert!(json.get("summary").is_none());
    }
}
