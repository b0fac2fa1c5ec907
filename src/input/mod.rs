use std::path::Path;

pub mod reader;

pub use reader::{detect_delimiter, open_maybe_gz, read_raw_table};

/// A delimited import exactly as read, before any column resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Builds a table from string slices; handy for callers holding records
    /// already parsed by another layer.
    pub fn from_str_rows(columns: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Cell text, empty when the row is shorter than the header.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub fn load_raw_table(path: &Path) -> Result<RawTable, InputError> {
    let reader = open_maybe_gz(path)?;
    let table = read_raw_table(reader)?;
    crate::info!(
        "read panel import {}: {} columns, {} rows",
        path.display(),
        table.columns.len(),
        table.n_rows()
    );
    Ok(table)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
