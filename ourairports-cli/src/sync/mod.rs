//! Dataset synchronizer
//!
//! Walks the country rows, skips rows without an M49 code, builds each
//! country's dataset and upserts it. A failing row is logged and recorded
//! in the [`BatchReport`]; it never stops the rows after it.

pub mod builder;
pub mod report;
pub mod upsert;

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};

use crate::api::{Catalog, Lookup};
use crate::source::CountryRow;

pub use builder::{BuildOptions, GroupKey, ResourceFormat, build_dataset};
pub use report::{BatchReport, RowOutcome, RowStatus, SkipReason};
pub use upsert::{UpsertAction, UpsertMode, upsert};

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub mode: UpsertMode,
    /// Skip rows whose M49 group is missing from the catalog
    pub check_groups: bool,
    /// Rows in flight at once; 1 keeps the run strictly sequential
    pub concurrency: usize,
    pub build: BuildOptions,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            mode: UpsertMode::default(),
            check_groups: false,
            concurrency: 1,
            build: BuildOptions::default(),
        }
    }
}

pub struct Synchronizer {
    /// `None` for a dry run: datasets are built and logged but never sent
    catalog: Option<Arc<dyn Catalog>>,
    options: SyncOptions,
}

impl Synchronizer {
    pub fn new(catalog: Arc<dyn Catalog>, options: SyncOptions) -> Self {
        Self {
            catalog: Some(catalog),
            options,
        }
    }

    pub fn dry_run(options: SyncOptions) -> Self {
        Self {
            catalog: None,
            options,
        }
    }

    /// Process every row and return their outcomes in sheet order
    pub async fn run(&self, rows: &[CountryRow]) -> BatchReport {
        let concurrency = self.options.concurrency.max(1);
        info!(
            "Synchronizing {} rows ({:?}, concurrency {})",
            rows.len(),
            self.options.mode,
            concurrency
        );

        let outcomes = stream::iter(rows)
            .map(|row| self.sync_row(row))
            .buffered(concurrency)
            .collect::<Vec<_>>()
            .await;

        let report = BatchReport::new(outcomes);
        report.log_summary();
        report
    }

    /// Process a single row; never fails, the outcome carries any error
    pub async fn sync_row(&self, row: &CountryRow) -> RowOutcome {
        let Some(m49) = row.m49() else {
            debug!("Row {}: no M49 code, skipping", row.row_number);
            return RowOutcome::new(row.row_number, None, RowStatus::Skipped(SkipReason::MissingM49));
        };

        let dataset = build_dataset(m49, row, &self.options.build);
        let name = dataset.name.clone();

        let Some(catalog) = self.catalog.as_deref() else {
            match serde_json::to_string_pretty(&dataset) {
                Ok(json) => info!("Would upsert {}:\n{}", name, json),
                Err(e) => warn!("Would upsert {} (could not render JSON: {})", name, e),
            }
            return RowOutcome::new(row.row_number, Some(name), RowStatus::Planned);
        };

        if self.options.check_groups {
            let group = m49.to_lowercase();
            match catalog.group_show(&group).await {
                Ok(Lookup::Found(_)) => {}
                Ok(Lookup::NotFound) => {
                    warn!("No catalog group for M49 code {}, skipping {}", group, name);
                    return RowOutcome::new(
                        row.row_number,
                        Some(name),
                        RowStatus::Skipped(SkipReason::UnknownGroup),
                    );
                }
                Err(e) => {
                    error!("Failed to check group {} for {}: {}", group, name, e);
                    return RowOutcome::new(row.row_number, Some(name), RowStatus::Failed(e.to_string()));
                }
            }
        }

        match upsert(catalog, &dataset, self.options.mode).await {
            Ok(action) => {
                match action {
                    UpsertAction::Created => info!("Created {}", name),
                    UpsertAction::Updated => info!("Updated {}", name),
                }
                RowOutcome::new(row.row_number, Some(name), action.into())
            }
            Err(e) => {
                error!("Failed to create record for {}: {}", name, e);
                RowOutcome::new(row.row_number, Some(name), RowStatus::Failed(e.to_string()))
            }
        }
    }
}
