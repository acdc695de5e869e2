//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pirates-sim", version, about = "Run and inspect pirate treasure-hunt games")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Play a two-episode match between two sample bots
    Play(PlayArgs),
    /// Apply scripted joint actions and print the final state
    Replay(ReplayArgs),
    /// Validate a configuration file
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub struct ScenarioArgs {
    /// Configuration file (JSON); the built-in 7x7 scenario when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Seed for the environment and both bots
    #[arg(short, long, default_value_t = 0)]
    pub seed: u64,

    /// Rounds per episode instead of the configuration's turn count
    #[arg(short, long)]
    pub rounds: Option<u32>,

    /// Seconds an agent may take per action
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,

    /// Play a single episode without swapping seats
    #[arg(long)]
    pub no_swap: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Script with one joint action per line, players alternating
    #[arg(short, long)]
    pub actions: PathBuf,

    /// Seed for the environment step
    #[arg(short, long, default_value_t = 0)]
    pub seed: u64,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,
}
