//! Data source abstraction and metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about an ingested survey export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Display name of the source (file name or upload name).
    pub name: String,
    /// SHA-256 hash of the raw contents.
    pub hash: String,
    /// Raw size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Zero-based line index of the detected header row.
    pub header_line: usize,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the source was parsed.
    pub parsed_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a source that has been located and parsed.
    pub fn new(
        name: impl Into<String>,
        hash: String,
        size_bytes: u64,
        format: String,
        header_line: usize,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        Self {
            name: name.into(),
            hash,
            size_bytes,
            format,
            header_line,
            row_count,
            column_count,
            parsed_at: Utc::now(),
        }
    }
}

/// Represents parsed tabular data: the raw table located in a survey export.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
    /// The delimiter used.
    pub delimiter: u8,
}

impl DataTable {
    /// Create a new data table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, delimiter: u8) -> Self {
        Self {
            headers,
            rows,
            delimiter,
        }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Whether a column with this exact name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Get a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(self.column_values(index).collect())
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Check if a value represents a missing/null value.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
            || trimmed == "."
            || trimmed == "-"
    }

    /// Parse a cell as a number, treating null tokens as missing.
    ///
    /// Returns `Ok(None)` for missing cells and `Err(())` for non-numeric text.
    pub fn parse_numeric(value: &str) -> std::result::Result<Option<f64>, ()> {
        if Self::is_null_value(value) {
            return Ok(None);
        }
        match value.trim().parse::<f64>() {
            Ok(v) if v.is_nan() => Ok(None),
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(()),
        }
    }
}
