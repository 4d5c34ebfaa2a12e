//! Fetch the raw country sheet from a URL or a local file

use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static GOOGLE_SHEET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://docs\.google\.com/spreadsheets/(?:u/\d+/)?d/([0-9A-Za-z_-]+)")
        .expect("google sheets regex is valid")
});

static GOOGLE_GID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[#?&]gid=(\d+)").expect("gid regex is valid"));

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Rewrite a Google Sheets edit/view link into its CSV export link.
/// Other URLs are returned unchanged.
pub fn export_url(url: &str) -> String {
    let Some(caps) = GOOGLE_SHEET.captures(url) else {
        return url.to_string();
    };
    if url.contains("/export?") {
        return url.to_string();
    }
    let gid = GOOGLE_GID
        .captures(url)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "0".to_string());
    format!(
        "https://docs.google.com/spreadsheets/d/{}/export?format=csv&gid={}",
        &caps[1], gid
    )
}

/// Load every row of the sheet as strings, header rows included
pub async fn load_table(location: &str, user_agent: &str) -> Result<Vec<Vec<String>>> {
    if is_url(location) {
        let url = export_url(location);
        let text = fetch_text(&url, user_agent).await?;
        return parse_csv(&text).with_context(|| format!("Failed to parse CSV from {}", url));
    }

    let path = Path::new(location);
    if !path.exists() {
        bail!("Source file does not exist: {}", path.display());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        read_workbook(path)
    } else {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read source file: {}", path.display()))?;
        parse_csv(&text).with_context(|| format!("Failed to parse CSV file: {}", path.display()))
    }
}

async fn fetch_text(url: &str, user_agent: &str) -> Result<String> {
    debug!("Fetching source sheet from {}", url);
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    let status = response.status();
    if !status.is_success() {
        bail!("Fetching {} failed with HTTP {}", url, status);
    }

    response
        .text()
        .await
        .with_context(|| format!("Failed to read response body from {}", url))
}

/// Parse CSV text without treating any row as a header; rows may be ragged
pub fn parse_csv(text: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }
    Ok(rows)
}

fn read_workbook(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .context("Workbook has no sheets")?
        .clone();

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_string).collect())
        .collect())
}

/// Spreadsheet cell as the text a CSV export of it would hold.
/// Whole numbers lose their fraction so an M49 cell of 250.0 reads "250".
fn cell_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_url_rewrites_edit_link() {
        let url = "https://docs.google.com/spreadsheets/d/1CuecXwSYOeW1fa7bqs00H3unprRCAxsYFB94a3O0-Ag/edit#gid=0";
        assert_eq!(
            export_url(url),
            "https://docs.google.com/spreadsheets/d/1CuecXwSYOeW1fa7bqs00H3unprRCAxsYFB94a3O0-Ag/export?format=csv&gid=0"
        );
    }

    #[test]
    fn test_export_url_keeps_gid() {
        let url = "https://docs.google.com/spreadsheets/u/1/d/abc_DEF-123/edit?usp=sharing#gid=98765";
        assert_eq!(
            export_url(url),
            "https://docs.google.com/spreadsheets/d/abc_DEF-123/export?format=csv&gid=98765"
        );
    }

    #[test]
    fn test_export_url_leaves_other_urls_alone() {
        let url = "https://example.org/countries.csv";
        assert_eq!(export_url(url), url);
        let export = "https://docs.google.com/spreadsheets/d/abc/export?format=csv&gid=3";
        assert_eq!(export_url(export), export);
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.org/a.csv"));
        assert!(is_url("http://example.org/a.csv"));
        assert!(!is_url("countries.csv"));
        assert!(!is_url("/tmp/countries.xlsx"));
    }

    #[test]
    fn test_parse_csv_keeps_ragged_rows() {
        let rows = parse_csv("Country,M49\n#country+name,#country+code+m49\nFrance,250,extra\n").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Country", "M49"]);
        assert_eq!(rows[2], vec!["France", "250", "extra"]);
    }

    #[test]
    fn test_cell_string_drops_whole_number_fraction() {
        assert_eq!(cell_string(&Data::Float(250.0)), "250");
        assert_eq!(cell_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_string(&Data::Int(4)), "4");
        assert_eq!(cell_string(&Data::String("FR".to_string())), "FR");
        assert_eq!(cell_string(&Data::Empty), "");
    }

    #[tokio::test]
    async fn test_load_table_reads_first_workbook_sheet() {
        let path = std::env::temp_dir().join(format!("ourairports-cli-{}.xlsx", std::process::id()));

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Name").unwrap();
        sheet.write_string(0, 1, "M49").unwrap();
        sheet.write_string(1, 0, "#country+name+en").unwrap();
        sheet.write_string(1, 1, "#country+code+m49").unwrap();
        sheet.write_string(2, 0, "France").unwrap();
        sheet.write_number(2, 1, 250).unwrap();
        workbook.save(&path).unwrap();

        let rows = load_table(path.to_str().unwrap(), "test").await;
        std::fs::remove_file(&path).ok();
        let rows = rows.unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["#country+name+en", "#country+code+m49"]);
        assert_eq!(rows[2], vec!["France", "250"]);
    }

    #[tokio::test]
    async fn test_load_table_missing_file() {
        let err = load_table("/definitely/not/here.csv", "test").await.unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
