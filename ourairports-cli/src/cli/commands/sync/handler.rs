//! Sync command handler

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use colored::*;
use log::info;

use super::SyncCommands;
use crate::api::{Catalog, CkanClient};
use crate::config::Config;
use crate::source::load_country_rows;
use crate::sync::{BatchReport, SyncOptions, Synchronizer};

/// Run one synchronization pass and return the process exit code
pub async fn handle_sync_command(args: SyncCommands, config_path: Option<&Path>) -> Result<i32> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let mut config = Config::load(config_path)?;
    if let Some(url) = args.ckan_url {
        config.ckan_url = Some(url);
    }
    let source = args.source.unwrap_or_else(|| config.inputs_url.clone());

    let options = SyncOptions {
        mode: args.mode,
        check_groups: args.check_groups,
        concurrency: usize::from(args.concurrency),
        build: config.build,
    };

    let synchronizer = if args.dry_run {
        println!("{}", "Dry run: no catalog changes will be made".yellow());
        Synchronizer::dry_run(options)
    } else {
        let (url, api_key) = config.catalog_credentials()?;
        let client = CkanClient::new(url, Some(api_key), &config.user_agent)
            .context("Failed to create catalog client")?;
        println!("Catalog: {}", client.base_url().bright_green());
        let catalog: Arc<dyn Catalog> = Arc::new(client);
        Synchronizer::new(catalog, options)
    };

    println!("Source:  {}", source.cyan());
    let start = Instant::now();

    let rows = load_country_rows(&source, &config.user_agent)
        .await
        .context("Failed to load country rows")?;

    let report = synchronizer.run(&rows).await;
    report.print_summary();
    info!("Finished in {:.1}s", start.elapsed().as_secs_f64());

    if let Some(path) = args.report {
        write_report(&report, &path)?;
        println!("Report saved to: {}", path.display().to_string().bright_green());
    }

    Ok(exit_code(&report, args.strict))
}

/// Row failures only affect the exit code in strict mode
pub fn exit_code(report: &BatchReport, strict: bool) -> i32 {
    if strict && report.has_failures() { 1 } else { 0 }
}

fn write_report(report: &BatchReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to format report")?;
    fs::write(path, json).with_context(|| format!("Failed to write report to: {}", path.display()))
}
