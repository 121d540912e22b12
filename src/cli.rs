use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Regime-switching Markov chain driver.
#[derive(Parser)]
#[command(
    name = "regime",
    version,
    about = "Stitched discrete-time Markov chain simulator"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Print the marginal state distribution at each model time step.
    Distribution(DistributionArgs),
    /// Simulate a cohort and compare its occupancy with the marginals.
    Simulate(SimulateArgs),
}

/// Arguments for the `distribution` subcommand.
#[derive(clap::Args)]
pub struct DistributionArgs {
    /// Path to TOML model file.
    #[arg(short, long, default_value = "model.toml")]
    pub config: PathBuf,

    /// Number of model time steps to report after the start date.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub steps: usize,
}

/// Arguments for the `simulate` subcommand.
#[derive(clap::Args)]
pub struct SimulateArgs {
    /// Path to TOML model file.
    #[arg(short, long, default_value = "model.toml")]
    pub config: PathBuf,

    /// Number of simulated individuals.
    #[arg(long, default_value_t = 1000)]
    pub cohort: usize,

    /// Override RNG seed from the model file.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Number of model time steps to simulate.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub steps: usize,
}
