//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::sync::SyncCommands;

#[derive(Debug, Parser)]
#[command(
    name = "ourairports-cli",
    version,
    about = "Create and update per-country OurAirports datasets on a CKAN catalog"
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Path to a config.toml (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create or update one dataset per country row of the input sheet
    Sync(SyncCommands),
    /// Inspect the effective configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}
