//! Held-out evaluation: accuracy, confusion matrix and binary ROC.

use serde::{Deserialize, Serialize};

use crate::schema::TargetClass;

/// Fraction of rows where the prediction equals the truth.
pub fn accuracy(y_true: &[TargetClass], y_pred: &[TargetClass]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Counts of (actual, predicted) pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Sorted union of the labels seen in truth and predictions.
    pub labels: Vec<TargetClass>,
    /// `matrix[i][j]`: rows with actual `labels[i]` predicted as `labels[j]`.
    pub matrix: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(y_true: &[TargetClass], y_pred: &[TargetClass]) -> Self {
        let mut labels: Vec<TargetClass> = y_true.iter().chain(y_pred).copied().collect();
        labels.sort();
        labels.dedup();

        let mut matrix = vec![vec![0; labels.len()]; labels.len()];
        for (t, p) in y_true.iter().zip(y_pred) {
            // Both are in `labels` by construction.
            if let (Ok(i), Ok(j)) = (labels.binary_search(t), labels.binary_search(p)) {
                matrix[i][j] += 1;
            }
        }
        Self { labels, matrix }
    }

    /// Count for one (actual, predicted) pair.
    pub fn get(&self, actual: TargetClass, predicted: TargetClass) -> usize {
        match (self.labels.binary_search(&actual), self.labels.binary_search(&predicted)) {
            (Ok(i), Ok(j)) => self.matrix[i][j],
            _ => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Sum of the diagonal.
    pub fn correct(&self) -> usize {
        (0..self.labels.len()).map(|i| self.matrix[i][i]).sum()
    }
}

/// Receiver operating characteristic of a binary score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocCurve {
    /// False positive rate per point, starting at 0.
    pub fpr: Vec<f64>,
    /// True positive rate per point, starting at 0.
    pub tpr: Vec<f64>,
    /// Score threshold for every point after the origin, highest first.
    pub thresholds: Vec<f64>,
    /// Area under the curve by the trapezoidal rule.
    pub auc: f64,
}

impl RocCurve {
    /// Compute from binary truth and positive-class scores.
    ///
    /// Returns `None` when only one class is present in `positives`.
    pub fn compute(positives: &[bool], scores: &[f64]) -> Option<Self> {
        let n_pos = positives.iter().filter(|&&p| p).count();
        let n_neg = positives.len() - n_pos;
        if n_pos == 0 || n_neg == 0 || positives.len() != scores.len() {
            return None;
        }

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        let mut fpr = vec![0.0];
        let mut tpr = vec![0.0];
        let mut thresholds = Vec::new();
        let (mut tp, mut fp) = (0usize, 0usize);

        for (i, &idx) in order.iter().enumerate() {
            if positives[idx] {
                tp += 1;
            } else {
                fp += 1;
            }
            // Emit a point once all rows sharing this score are counted.
            let last_of_score = order
                .get(i + 1)
                .is_none_or(|&next| scores[next] != scores[idx]);
            if last_of_score {
                fpr.push(fp as f64 / n_neg as f64);
                tpr.push(tp as f64 / n_pos as f64);
                thresholds.push(scores[idx]);
            }
        }

        let auc = fpr
            .windows(2)
            .zip(tpr.windows(2))
            .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
            .sum();

        Some(Self {
            fpr,
            tpr,
            thresholds,
            auc,
        })
    }
}
