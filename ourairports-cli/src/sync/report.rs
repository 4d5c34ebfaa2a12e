//! Per-row outcomes and the end-of-run summary

use colored::*;
use log::{error, info};
use serde::Serialize;

use super::upsert::UpsertAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    MissingM49,
    UnknownGroup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "kebab-case")]
pub enum RowStatus {
    Created,
    Updated,
    /// Built but not submitted (dry run)
    Planned,
    Skipped(SkipReason),
    Failed(String),
}

impl From<UpsertAction> for RowStatus {
    fn from(action: UpsertAction) -> Self {
        match action {
            UpsertAction::Created => RowStatus::Created,
            UpsertAction::Updated => RowStatus::Updated,
        }
    }
}

/// What happened to one sheet row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOutcome {
    pub row_number: usize,
    /// Catalog identifier, absent when the row had no M49 code
    pub name: Option<String>,
    #[serde(flatten)]
    pub status: RowStatus,
}

impl RowOutcome {
    pub fn new(row_number: usize, name: Option<String>, status: RowStatus) -> Self {
        Self {
            row_number,
            name,
            status,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, RowStatus::Failed(_))
    }
}

/// All row outcomes of one run, in sheet order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<RowOutcome>,
}

impl BatchReport {
    pub fn new(outcomes: Vec<RowOutcome>) -> Self {
        Self { outcomes }
    }

    fn count(&self, predicate: impl Fn(&RowStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.status)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|s| matches!(s, RowStatus::Created))
    }

    pub fn updated(&self) -> usize {
        self.count(|s| matches!(s, RowStatus::Updated))
    }

    pub fn planned(&self) -> usize {
        self.count(|s| matches!(s, RowStatus::Planned))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, RowStatus::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, RowStatus::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(RowOutcome::is_failure)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RowOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// Log totals and repeat each failure so they are easy to find at the end
    pub fn log_summary(&self) {
        info!(
            "Sync finished: {} created, {} updated, {} planned, {} skipped, {} failed",
            self.created(),
            self.updated(),
            self.planned(),
            self.skipped(),
            self.failed()
        );
        for outcome in self.failures() {
            if let RowStatus::Failed(message) = &outcome.status {
                error!(
                    "Row {} ({}): {}",
                    outcome.row_number,
                    outcome.name.as_deref().unwrap_or("-"),
                    message
                );
            }
        }
    }

    pub fn print_summary(&self) {
        println!();
        println!("{}", "Summary".bold());
        println!("  {:<8} {}", "created", self.created().to_string().green());
        println!("  {:<8} {}", "updated", self.updated().to_string().cyan());
        if self.planned() > 0 {
            println!("  {:<8} {}", "planned", self.planned().to_string().cyan());
        }
        println!("  {:<8} {}", "skipped", self.skipped().to_string().yellow());
        let failed = self.failed().to_string();
        if self.has_failures() {
            println!("  {:<8} {}", "failed", failed.red().bold());
        } else {
            println!("  {:<8} {}", "failed", failed.dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report() -> BatchReport {
        BatchReport::new(vec![
            RowOutcome::new(3, Some("ourairports-4".into()), RowStatus::Created),
            RowOutcome::new(4, None, RowStatus::Skipped(SkipReason::MissingM49)),
            RowOutcome::new(5, Some("ourairports-8".into()), RowStatus::Failed("Server: boom".into())),
            RowOutcome::new(6, Some("ourairports-12".into()), RowStatus::Updated),
        ])
    }

    #[test]
    fn test_counts() {
        let report = report();
        assert_eq!(report.created(), 1);
        assert_eq!(report.updated(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.planned(), 0);
        assert!(report.has_failures());
        assert_eq!(report.failures().next().unwrap().row_number, 5);
    }

    #[test]
    fn test_empty_report_has_no_failures() {
        assert!(!BatchReport::default().has_failures());
    }

    #[test]
    fn test_outcome_json_shape() {
        let report = report();
        let value = serde_json::to_value(&report.outcomes[2]).unwrap();
        assert_eq!(
            value,
            json!({
                "row_number": 5,
                "name": "ourairports-8",
                "status": "failed",
                "detail": "Server: boom"
            })
        );

        let skipped = serde_json::to_value(&report.outcomes[1]).unwrap();
        assert_eq!(skipped["status"], json!("skipped"));
        assert_eq!(skipped["detail"], json!("missing-m49"));
    }
}
