//! Harmonization summary returned to callers after an upload.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::Record;

/// How a selected feature column was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Every present cell parsed as a number; imputed and used as model input.
    Numeric,
    /// Contains free text; carried in the unscaled table only.
    Text,
    /// Every cell was missing; omitted from both tables.
    Empty,
}

/// One selected source column and what became of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMapping {
    /// Header in the uploaded file.
    pub source: String,
    /// Name after renaming.
    pub canonical: String,
    pub kind: FeatureKind,
    /// Missing cells among surviving rows before imputation.
    pub missing: usize,
    /// Fill value for numeric columns.
    pub median: Option<f64>,
    /// Whether the column made it into the canonical table.
    pub in_canonical: bool,
}

/// Summary of a harmonization run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarmonizationReport {
    /// Zero-based line index of the detected header row.
    pub header_line: usize,
    /// Source column holding the disposition label.
    pub target_column: String,
    /// Source column carried through as the row identifier.
    pub identifier_column: Option<String>,
    /// Data rows in the located table.
    pub input_rows: usize,
    /// Rows dropped because their label is not in the label vocabulary.
    pub dropped_rows: usize,
    /// Rows in both output tables.
    pub kept_rows: usize,
    /// Selected feature columns in keyword order.
    pub features: Vec<FeatureMapping>,
    /// Missing values per canonical column after imputation.
    pub missing_counts: IndexMap<String, usize>,
    /// Model features that look like effective temperatures.
    pub temperature_columns: Vec<String>,
    /// Model features that look like radii.
    pub radius_columns: Vec<String>,
    /// First rows of the unscaled features.
    pub extracted_raw: Vec<Record>,
    /// First rows of the canonical features.
    pub extracted_normalized: Vec<Record>,
    /// First raw labels of surviving rows.
    pub targets_raw: Vec<String>,
    /// First encoded targets.
    pub targets_numeric: Vec<u8>,
}

impl HarmonizationReport {
    /// Canonical names of features that were dropped from the canonical table.
    pub fn excluded_features(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter(|f| !f.in_canonical)
            .map(|f| f.source.as_str())
            .collect()
    }

    /// Total cells filled by imputation.
    pub fn imputed_cells(&self) -> usize {
        self.features
            .iter()
            .filter(|f| f.kind == FeatureKind::Numeric)
            .map(|f| f.missing)
            .sum()
    }
}
