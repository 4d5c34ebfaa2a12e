//! HXL hashtag row detection and column matching
//!
//! An HXL spreadsheet has a row of `#hashtag+attribute` cells somewhere near
//! the top. Rows above it are free-form headers; rows below it are data.
//! Columns are selected with tag patterns such as `#country+code+m49`,
//! which match any column with that hashtag carrying at least those
//! attributes.

use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use once_cell::sync::Lazy;
use regex::Regex;

/// How far down the sheet to look for the hashtag row
const MAX_HEADER_ROWS: usize = 25;

static TAG_SPEC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*#([A-Za-z][A-Za-z0-9_]*)((?:\s*\+\s*[A-Za-z][A-Za-z0-9_]*)*)\s*$")
        .expect("tag spec regex is valid")
});

/// A column's parsed hashtag spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub tag: String,
    pub attributes: Vec<String>,
}

impl Column {
    /// Parse a cell such as `#country +code +m49`; `None` if it is not a tag spec
    pub fn parse(spec: &str) -> Option<Self> {
        let caps = TAG_SPEC.captures(spec)?;
        let tag = caps[1].to_lowercase();
        let attributes = caps
            .get(2)
            .map(|m| {
                m.as_str()
                    .split('+')
                    .map(|a| a.trim().to_lowercase())
                    .filter(|a| !a.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Some(Self { tag, attributes })
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }
}

/// A column selector: hashtag plus required (`+attr`) and excluded (`-attr`) attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    tag: String,
    include: Vec<String>,
    exclude: Vec<String>,
}

impl TagPattern {
    pub fn matches(&self, column: &Column) -> bool {
        column.tag == self.tag
            && self.include.iter().all(|a| column.has_attribute(a))
            && !self.exclude.iter().any(|a| column.has_attribute(a))
    }
}

impl FromStr for TagPattern {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let body = s
            .strip_prefix('#')
            .ok_or_else(|| anyhow!("tag pattern must start with '#': {}", s))?;

        let mut tag = String::new();
        let mut include = Vec::new();
        let mut exclude = Vec::new();

        // Split on + and - while remembering which sign introduced each part
        let mut current = String::new();
        let mut sign: Option<char> = None;
        for ch in body.chars().chain(std::iter::once('+')) {
            if ch == '+' || ch == '-' {
                let part = current.trim().to_lowercase();
                match sign {
                    None => tag = part,
                    Some('+') if !part.is_empty() => include.push(part),
                    Some('-') if !part.is_empty() => exclude.push(part),
                    _ => bail!("empty attribute in tag pattern: {}", s),
                }
                current.clear();
                sign = Some(ch);
            } else {
                current.push(ch);
            }
        }

        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            bail!("invalid hashtag in tag pattern: {}", s);
        }

        Ok(Self {
            tag,
            include,
            exclude,
        })
    }
}

/// A sheet split into its hashtag row and the data rows beneath it
#[derive(Debug, Clone)]
pub struct HxlTable {
    columns: Vec<Option<Column>>,
    rows: Vec<Vec<String>>,
    /// 1-based sheet row number of the first data row
    first_data_row: usize,
}

impl HxlTable {
    /// Locate the hashtag row and keep everything after it as data
    pub fn from_rows(mut raw: Vec<Vec<String>>) -> Result<Self> {
        let tag_row_index = raw
            .iter()
            .take(MAX_HEADER_ROWS)
            .position(|row| is_tag_row(row))
            .ok_or_else(|| {
                anyhow!(
                    "no HXL hashtag row found in the first {} rows",
                    MAX_HEADER_ROWS
                )
            })?;

        let rows = raw.split_off(tag_row_index + 1);
        let columns = raw[tag_row_index]
            .iter()
            .map(|cell| Column::parse(cell))
            .collect();

        Ok(Self {
            columns,
            rows,
            first_data_row: tag_row_index + 2,
        })
    }

    /// Index of the first column matching `pattern`
    pub fn column_index(&self, pattern: &TagPattern) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.as_ref().is_some_and(|c| pattern.matches(c)))
    }

    /// Data rows paired with their 1-based sheet row numbers
    pub fn rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.rows
            .iter()
            .enumerate()
            .map(move |(i, row)| (self.first_data_row + i, row.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn is_tag_row(row: &[String]) -> bool {
    let mut cells = row.iter().map(|c| c.trim()).filter(|c| !c.is_empty()).peekable();
    cells.peek().is_some() && cells.all(|c| Column::parse(c).is_some())
}
