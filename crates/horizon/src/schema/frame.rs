//! Columnar tables produced by harmonization.

use indexmap::IndexMap;
use serde_json::Value;

use super::types::{ColumnRole, TargetClass};

/// One display row: column name -> JSON value, in column order.
pub type Record = IndexMap<String, Value>;

/// Values stored in a column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// Numeric values with no missing entries.
    Numeric(Vec<f64>),
    /// Free text, carried through unchanged.
    Text(Vec<String>),
    /// Encoded classification target.
    Target(Vec<TargetClass>),
}

impl ColumnValues {
    /// Number of values.
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
            ColumnValues::Target(v) => v.len(),
        }
    }

    /// Whether the column has no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `row` rendered as a CSV cell.
    pub fn cell(&self, row: usize) -> String {
        match self {
            ColumnValues::Numeric(v) => v.get(row).map(|x| format_number(*x)).unwrap_or_default(),
            ColumnValues::Text(v) => v.get(row).cloned().unwrap_or_default(),
            ColumnValues::Target(v) => v.get(row).map(|c| c.ordinal().to_string()).unwrap_or_default(),
        }
    }

    /// Value at `row` as JSON.
    pub fn json(&self, row: usize) -> Value {
        match self {
            ColumnValues::Numeric(v) => v
                .get(row)
                .and_then(|x| serde_json::Number::from_f64(*x))
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ColumnValues::Text(v) => v.get(row).map(|s| Value::String(s.clone())).unwrap_or(Value::Null),
            ColumnValues::Target(v) => v.get(row).map(|c| Value::from(c.ordinal())).unwrap_or(Value::Null),
        }
    }
}

/// A named column with its role.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub role: ColumnRole,
    pub values: ColumnValues,
}

impl Column {
    /// Create a column.
    pub fn new(name: impl Into<String>, role: ColumnRole, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            role,
            values,
        }
    }

    /// Numeric values, if this is a numeric column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.values {
            ColumnValues::Numeric(v) => Some(v),
            _ => None,
        }
    }
}

/// An ordered set of equally long columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    row_count: usize,
}

impl Frame {
    /// Create an empty frame with a fixed row count.
    pub fn with_rows(row_count: usize) -> Self {
        Self {
            columns: Vec::new(),
            row_count,
        }
    }

    /// Append a column. Returns `false` (and leaves the frame unchanged) if the
    /// name is taken or the length does not match.
    pub fn push(&mut self, column: Column) -> bool {
        if column.values.len() != self.row_count || self.column(&column.name).is_some() {
            return false;
        }
        self.columns.push(column);
        true
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Numeric values of a column by name.
    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        self.column(name).and_then(Column::as_numeric)
    }

    /// Names of feature columns, in order.
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.role == ColumnRole::Feature)
            .map(|c| c.name.clone())
            .collect()
    }

    /// The encoded target column, if present.
    pub fn target(&self) -> Option<&[TargetClass]> {
        self.columns.iter().find_map(|c| match (&c.role, &c.values) {
            (ColumnRole::Target, ColumnValues::Target(v)) => Some(v.as_slice()),
            _ => None,
        })
    }

    /// The identifier column, if present.
    pub fn identifier(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.role == ColumnRole::Identifier)
    }

    /// Rows as JSON records (column name -> value).
    pub fn records(&self) -> Vec<Record> {
        (0..self.row_count).map(|row| self.record(row)).collect()
    }

    /// First `n` rows of the given columns as JSON records.
    pub fn head_records(&self, n: usize, names: &[String]) -> Vec<Record> {
        (0..self.row_count.min(n))
            .map(|row| {
                names
                    .iter()
                    .filter_map(|name| self.column(name).map(|c| (name.clone(), c.values.json(row))))
                    .collect()
            })
            .collect()
    }

    /// One row as a JSON record.
    pub fn record(&self, row: usize) -> Record {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.values.json(row)))
            .collect()
    }
}

/// Render a float the way tabular exports do (`2.0`, not `2`).
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
