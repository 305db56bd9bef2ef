// src/table.rs

//! In-memory 2-D table, as returned by the data API.
//!
//! The API responds with a JSON array of string arrays where the first row is
//! the header. CSV output mirrors pandas' default: a leading row-index column
//! in front of the data columns.

use anyhow::{ensure, Context, Result};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Column names, from the first row of the response.
    pub headers: Vec<String>,
    /// Data rows, each with one field per header.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// A table with no columns and no rows. Stands in for skipped downloads.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode an array-of-arrays JSON payload, first row as the header.
    pub fn from_json_rows(value: Value) -> Result<Self> {
        let all_rows = value
            .as_array()
            .context("expected a JSON array of rows")?;

        let mut iter = all_rows.iter();
        let headers = match iter.next() {
            Some(header) => decode_row(header).context("decoding header row")?,
            None => Vec::new(),
        };

        let mut rows = Vec::with_capacity(all_rows.len().saturating_sub(1));
        for (i, row) in iter.enumerate() {
            let row = decode_row(row).with_context(|| format!("decoding row {i}"))?;
            ensure!(
                row.len() == headers.len(),
                "row {} has {} fields, expected {}",
                i,
                row.len(),
                headers.len()
            );
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of the named column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<String>> {
        let idx = self.headers.iter().position(|h| h == name)?;
        Some(
            self.rows
                .iter()
                .filter_map(|row| row.get(idx).cloned())
                .collect(),
        )
    }

    /// Serialize to a CSV file with a leading row-index column.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;

        let mut header = Vec::with_capacity(self.headers.len() + 1);
        header.push("");
        header.extend(self.headers.iter().map(String::as_str));
        writer.write_record(&header)?;

        for (i, row) in self.rows.iter().enumerate() {
            let index = i.to_string();
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(index.as_str());
            record.extend(row.iter().map(String::as_str));
            writer.write_record(&record)?;
        }

        writer
            .flush()
            .with_context(|| format!("flushing {}", path.display()))
    }
}

fn decode_row(value: &Value) -> Result<Vec<String>> {
    value
        .as_array()
        .context("expected a row array")?
        .iter()
        .map(|cell| {
            Ok(match cell {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
        })
        .collect()
}
