//! Median imputation.

/// Median of a slice; the mean of the two middle values for even lengths.
///
/// Returns `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// A numeric column after imputation.
#[derive(Debug, Clone, PartialEq)]
pub struct ImputedColumn {
    /// Values with every gap filled.
    pub values: Vec<f64>,
    /// Median of the observed values, used as the fill value.
    pub median: f64,
    /// Number of cells that were missing before imputation.
    pub filled: usize,
}

/// Fill missing entries with the median of the present ones.
///
/// Returns `None` when every entry is missing.
pub fn impute_median(values: &[Option<f64>]) -> Option<ImputedColumn> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let median = median(&present)?;
    let filled = values.len() - present.len();
    Some(ImputedColumn {
        values: values.iter().map(|v| v.unwrap_or(median)).collect(),
        median,
        filled,
    })
}
