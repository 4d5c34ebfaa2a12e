mod api;
mod cli;
mod config;
mod source;
mod sync;

use std::process::exit;

use clap::Parser;
use colored::*;
use log::LevelFilter;

use cli::{Cli, Commands};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_target(false);
    // RUST_LOG still wins when set
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

#[tokio::main]
async fn main() {
    // A missing .env is normal
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Sync(args) => cli::commands::sync::handle_sync_command(args, config_path).await,
        Commands::Config(command) => {
            cli::commands::config::handle_config_command(command, config_path)
        }
    };

    match result {
        Ok(code) => exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            exit(1);
        }
    }
}
