//! `sync` command arguments

pub mod handler;

use std::path::PathBuf;

use clap::Args;

use crate::sync::UpsertMode;

pub use handler::handle_sync_command;

#[derive(Debug, Args)]
pub struct SyncCommands {
    /// Input sheet: a URL (Google Sheets links are exported as CSV) or a local CSV/XLSX file
    #[arg(short, long, value_name = "URL|PATH")]
    pub source: Option<String>,

    /// Catalog base URL, overriding config and environment
    #[arg(long, value_name = "URL")]
    pub ckan_url: Option<String>,

    /// Which catalog call to try first
    #[arg(long, value_enum, default_value_t = UpsertMode::UpdateFirst)]
    pub mode: UpsertMode,

    /// Skip rows whose M49 code has no matching catalog group
    #[arg(long)]
    pub check_groups: bool,

    /// Build and print the datasets without touching the catalog
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with status 1 if any row failed
    #[arg(long)]
    pub strict: bool,

    /// Number of rows processed at once
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,

    /// Write the per-row outcomes as JSON to this file
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
