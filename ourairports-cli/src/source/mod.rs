//! Country rows from the HXL-tagged input spreadsheet

pub mod fetch;
pub mod hxl;

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};

pub use hxl::{HxlTable, TagPattern};

pub const M49_TAG: &str = "#country+code+m49";
pub const NAME_TAG: &str = "#country+name+en";
pub const ISO2_TAG: &str = "#country+code+iso2";

/// One country entry from the input sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryRow {
    /// 1-based row number in the sheet
    pub row_number: usize,
    pub m49: Option<String>,
    pub name: Option<String>,
    pub iso2: Option<String>,
}

impl CountryRow {
    /// The M49 code if present and non-blank; rows without it are skipped
    pub fn m49(&self) -> Option<&str> {
        non_blank(self.m49.as_deref())
    }

    pub fn name(&self) -> &str {
        non_blank(self.name.as_deref()).unwrap_or_default()
    }

    pub fn iso2(&self) -> &str {
        non_blank(self.iso2.as_deref()).unwrap_or_default()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Pull the country columns out of an HXL table.
///
/// Only the M49 column is mandatory; a sheet without it cannot be mapped
/// to catalog identifiers at all.
pub fn country_rows(table: &HxlTable) -> Result<Vec<CountryRow>> {
    let m49_col = table
        .column_index(&M49_TAG.parse::<TagPattern>()?)
        .with_context(|| format!("Source sheet has no {} column", M49_TAG))?;
    let name_col = table.column_index(&NAME_TAG.parse::<TagPattern>()?);
    let iso2_col = table.column_index(&ISO2_TAG.parse::<TagPattern>()?);

    let cell = |row: &[String], col: Option<usize>| col.and_then(|i| row.get(i)).cloned();

    Ok(table
        .rows()
        .map(|(row_number, row)| CountryRow {
            row_number,
            m49: cell(row, Some(m49_col)),
            name: cell(row, name_col),
            iso2: cell(row, iso2_col),
        })
        .collect())
}

/// Fetch the sheet at `location` and return its country rows in sheet order
pub async fn load_country_rows(location: &str, user_agent: &str) -> Result<Vec<CountryRow>> {
    let raw = fetch::load_table(location, user_agent).await?;
    if raw.is_empty() {
        bail!("Source sheet is empty: {}", location);
    }

    let table = HxlTable::from_rows(raw)
        .with_context(|| format!("Failed to read HXL tags from {}", location))?;
    debug!("{} data rows below the hashtag row", table.len());
    if table.is_empty() {
        warn!("Source sheet {} has no data rows below its hashtag row", location);
    }
    let rows = country_rows(&table)?;

    info!("Read {} country rows from {}", rows.len(), location);
    Ok(rows)
}
