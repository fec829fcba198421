//! Stable Match Lab - demo CLI.
//!
//! Runs the engine headless, step by step, or as a consensus-grid lab.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stable_match_lab::config::SimConfig;
use stable_match_lab::lab::{LabConfig, LabRunner};
use stable_match_lab::simulation::Simulation;
use stable_match_lab::types::Side;

#[derive(Parser)]
#[command(name = "stable-match-lab")]
#[command(about = "Deferred-acceptance stable matching with a consensus lab")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file; flags override its values
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Participants per side
    #[arg(long, short = 'n')]
    population: Option<usize>,

    /// Probability in percent that side A proposes next
    #[arg(long)]
    bias: Option<f64>,

    /// Side A consensus in percent
    #[arg(long)]
    consensus_a: Option<f64>,

    /// Side B consensus in percent
    #[arg(long)]
    consensus_b: Option<f64>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one round to completion and verify it.
    Run,

    /// Print every proposal of a round.
    Step {
        /// Stop after this many proposals
        #[arg(long, default_value_t = 1000)]
        ticks: usize,
    },

    /// Sweep the consensus grid and print the cells as JSON.
    Lab {
        /// Grid resolution R
        #[arg(long)]
        resolution: Option<usize>,
    },
}

impl Cli {
    fn sim_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SimConfig::default(),
        };
        if let Some(n) = self.population {
            config.population = n;
        }
        if let Some(bias) = self.bias {
            config.bias_percent = bias;
        }
        if let Some(c) = self.consensus_a {
            config.consensus_a_percent = c;
        }
        if let Some(c) = self.consensus_b {
            config.consensus_b_percent = c;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config.clamped())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.sim_config()?;

    match cli.command {
        Commands::Run => {
            let mut sim = Simulation::new(SimConfig { verify_on_finish: true, ..config })?;
            let proposals = sim.run_to_end()?;
            let summary = sim.summary();

            println!("Population:      {}", sim.config().population);
            println!("Proposals:       {}", proposals);
            println!("  by side A:     {}", sim.engine().proposals_by(Side::A));
            println!("  by side B:     {}", sim.engine().proposals_by(Side::B));
            println!("Matched pairs:   {}", sim.matching().len());
            println!();
            println!("Average rank");
            println!("  side A:        {:.3}", summary.side_a);
            println!("  side B:        {:.3}", summary.side_b);
            println!("  askers:        {:.3}", summary.askers);
            println!("  asked:         {:.3}", summary.asked);
            println!();
            if let Some(report) = sim.stability() {
                println!(
                    "Stability:       {} ({} blocking pairs)",
                    if report.verified { "stable" } else { "UNSTABLE" },
                    report.blocking_pairs
                );
            }
            println!("Fingerprint:     {}", sim.matching().fingerprint_hex()?);
        }

        Commands::Step { ticks } => {
            let mut sim = Simulation::new(config)?;
            let mut count = 0;
            while count < ticks {
                let Some(interaction) = sim.step()? else { break };
                count += 1;
                println!(
                    "{:>5}  {:>4} -> {:<4} {:?}",
                    count, interaction.proposer, interaction.receiver, interaction.outcome
                );
            }
            println!("{} matched after {} proposals", sim.matching().len(), count);
        }

        Commands::Lab { resolution } => {
            let mut lab_config = LabConfig::from(&config);
            if let Some(r) = resolution {
                lab_config.resolution = r;
            }
            let rng = match config.seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            let mut runner = LabRunner::new(lab_config, rng)?;
            let cells = runner.run(|progress| {
                info!(
                    "lab progress {:.0}% ({}/{})",
                    progress.percent(),
                    progress.processed,
                    progress.total
                );
            })?;
            println!("{}", serde_json::to_string_pretty(cells)?);
        }
    }

    Ok(())
}
