//! Dense feature matrices and the train/test split.

use crate::error::{HorizonError, Result};
use crate::schema::Frame;

/// Row-major matrix of model inputs with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    feature_names: Vec<String>,
    values: Vec<f64>,
    n_rows: usize,
}

impl FeatureMatrix {
    /// Build from row-major values.
    pub fn new(feature_names: Vec<String>, values: Vec<f64>) -> Result<Self> {
        let n_features = feature_names.len();
        if n_features == 0 {
            return Err(HorizonError::EmptyData("no feature columns".to_string()));
        }
        if values.len() % n_features != 0 {
            return Err(HorizonError::Prediction(format!(
                "{} values do not fill rows of {} features",
                values.len(),
                n_features
            )));
        }
        Ok(Self {
            n_rows: values.len() / n_features,
            feature_names,
            values,
        })
    }

    /// Project the named numeric columns of a frame, in the given order.
    ///
    /// Every name must be a numeric column of the frame.
    pub fn from_frame(frame: &Frame, feature_names: &[String]) -> Result<Self> {
        let columns = feature_names
            .iter()
            .map(|name| {
                frame.numeric(name).ok_or_else(|| {
                    HorizonError::Prediction(format!("feature '{}' is not in the dataset", name))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_columns(feature_names.to_vec(), &columns, frame.row_count())
    }

    /// Project a frame onto `feature_names`, filling absent columns with zero.
    pub fn reconciled(frame: &Frame, feature_names: &[String]) -> Result<Self> {
        let zeros = vec![0.0; frame.row_count()];
        let columns: Vec<&[f64]> = feature_names
            .iter()
            .map(|name| frame.numeric(name).unwrap_or(&zeros))
            .collect();
        Self::from_columns(feature_names.to_vec(), &columns, frame.row_count())
    }

    fn from_columns(feature_names: Vec<String>, columns: &[&[f64]], n_rows: usize) -> Result<Self> {
        if feature_names.is_empty() {
            return Err(HorizonError::EmptyData("no feature columns".to_string()));
        }
        let mut values = Vec::with_capacity(n_rows * columns.len());
        for row in 0..n_rows {
            values.extend(columns.iter().map(|c| c[row]));
        }
        Ok(Self {
            feature_names,
            values,
            n_rows,
        })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// One row of feature values.
    pub fn row(&self, row: usize) -> &[f64] {
        let n = self.n_features();
        &self.values[row * n..(row + 1) * n]
    }

    pub fn get(&self, row: usize, feature: usize) -> f64 {
        self.values[row * self.n_features() + feature]
    }

    /// Values of one feature across all rows.
    pub fn column(&self, feature: usize) -> Vec<f64> {
        (0..self.n_rows).map(|row| self.get(row, feature)).collect()
    }

    /// A new matrix holding the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let mut values = Vec::with_capacity(rows.len() * self.n_features());
        for &row in rows {
            values.extend_from_slice(self.row(row));
        }
        Self {
            feature_names: self.feature_names.clone(),
            values,
            n_rows: rows.len(),
        }
    }
}

/// Row indices of a shuffled train/test split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_rows` with a seeded generator and cut off the test share.
///
/// The test split holds `ceil(n_rows * test_fraction)` rows. The split is not
/// stratified, so a rare class can be missing from either side.
pub fn train_test_split(n_rows: usize, test_fraction: f64, seed: u64) -> Result<SplitIndices> {
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(HorizonError::Training(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }
    if n_rows < 2 {
        return Err(HorizonError::Training(format!(
            "need at least 2 rows to split, got {}",
            n_rows
        )));
    }

    let n_test = ((n_rows as f64 * test_fraction).ceil() as usize).clamp(1, n_rows - 1);
    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = fastrand::Rng::with_seed(seed);
    rng.shuffle(&mut indices);

    let train = indices.split_off(n_test);
    Ok(SplitIndices {
        train,
        test: indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ColumnRole, ColumnValues};

    fn frame() -> Frame {
        let mut frame = Frame::with_rows(3);
        frame.push(Column::new(
            "pl_rade",
            ColumnRole::Feature,
            ColumnValues::Numeric(vec![1.0, 2.0, 3.0]),
        ));
        frame.push(Column::new(
            "pl_orbper",
            ColumnRole::Feature,
            ColumnValues::Numeric(vec![10.0, 20.0, 30.0]),
        ));
        frame
    }

    #[test]
    fn test_from_frame_row_major() {
        let names = vec!["pl_orbper".to_string(), "pl_rade".to_string()];
        let m = FeatureMatrix::from_frame(&frame(), &names).unwrap();
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.row(1), &[20.0, 2.0]);
        assert_eq!(m.column(1), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_from_frame_missing_column() {
        let names = vec!["st_teff".to_string()];
        assert!(FeatureMatrix::from_frame(&frame(), &names).is_err());
    }

    #[test]
    fn test_reconciled_zero_fills() {
        let names = vec!["st_teff".to_string(), "pl_rade".to_string()];
        let m = FeatureMatrix::reconciled(&frame(), &names).unwrap();
        assert_eq!(m.row(2), &[0.0, 3.0]);
    }

    #[test]
    fn test_select_rows() {
        let names = vec!["pl_rade".to_string()];
        let m = FeatureMatrix::from_frame(&frame(), &names).unwrap();
        let sub = m.select_rows(&[2, 0]);
        assert_eq!(sub.column(0), vec![3.0, 1.0]);
    }

    #[test]
    fn test_split_sizes_and_determinism() {
        let split = train_test_split(10, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);
        assert_eq!(split, train_test_split(10, 0.2, 42).unwrap());

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_rounds_test_size_up() {
        let split = train_test_split(11, 0.2, 1).unwrap();
        assert_eq!(split.test.len(), 3);
    }

    #[test]
    fn test_split_rejects_tiny_input() {
        assert!(train_test_split(1, 0.2, 42).is_err());
        assert!(train_test_split(10, 1.5, 42).is_err());
    }
}
