//! Classification objectives: gradients, base scores and output transforms.
//!
//! Raw predictions are stored row-major, `n_rows x num_outputs`.

use serde::{Deserialize, Serialize};

/// Lower bound for hessians so leaf weights stay finite.
const HESS_MIN: f64 = 1e-6;

/// Learning objective for a boosted classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Objective {
    /// Two classes, one output holding the log-odds of the second class.
    Logistic,
    /// `num_class` classes, one output per class.
    Softmax { num_class: usize },
}

impl Objective {
    /// Objective for a training split with `num_class` distinct labels.
    pub fn for_classes(num_class: usize) -> Self {
        if num_class > 2 {
            Objective::Softmax { num_class }
        } else {
            Objective::Logistic
        }
    }

    /// Number of raw outputs (trees per boosting round).
    pub fn num_outputs(&self) -> usize {
        match self {
            Objective::Logistic => 1,
            Objective::Softmax { num_class } => *num_class,
        }
    }

    /// Number of classes predicted.
    pub fn num_classes(&self) -> usize {
        match self {
            Objective::Logistic => 2,
            Objective::Softmax { num_class } => *num_class,
        }
    }

    pub fn is_multiclass(&self) -> bool {
        matches!(self, Objective::Softmax { .. })
    }

    /// Initial raw score per output.
    ///
    /// Logistic starts from the log-odds of the positive rate; softmax from zero.
    pub fn base_score(&self, labels: &[usize]) -> Vec<f64> {
        match self {
            Objective::Logistic => {
                if labels.is_empty() {
                    return vec![0.0];
                }
                let positive = labels.iter().filter(|&&y| y == 1).count() as f64;
                let p = (positive / labels.len() as f64).clamp(1e-7, 1.0 - 1e-7);
                vec![(p / (1.0 - p)).ln()]
            }
            Objective::Softmax { num_class } => vec![0.0; *num_class],
        }
    }

    /// Gradients and hessians for every row and output.
    pub fn gradients(&self, raw: &[f64], labels: &[usize], grad: &mut [f64], hess: &mut [f64]) {
        match self {
            Objective::Logistic => {
                for (i, &y) in labels.iter().enumerate() {
                    let p = sigmoid(raw[i]);
                    let target = if y == 1 { 1.0 } else { 0.0 };
                    grad[i] = p - target;
                    hess[i] = (p * (1.0 - p)).max(HESS_MIN);
                }
            }
            Objective::Softmax { num_class } => {
                let k = *num_class;
                for (i, &y) in labels.iter().enumerate() {
                    let probs = softmax(&raw[i * k..(i + 1) * k]);
                    for (c, p) in probs.into_iter().enumerate() {
                        let target = if y == c { 1.0 } else { 0.0 };
                        grad[i * k + c] = p - target;
                        hess[i * k + c] = (2.0 * p * (1.0 - p)).max(HESS_MIN);
                    }
                }
            }
        }
    }

    /// Class probabilities for one row of raw outputs.
    pub fn probabilities(&self, raw_row: &[f64]) -> Vec<f64> {
        match self {
            Objective::Logistic => {
                let p = sigmoid(raw_row[0]);
                vec![1.0 - p, p]
            }
            Objective::Softmax { .. } => softmax(raw_row),
        }
    }
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub(crate) fn softmax(raw: &[f64]) -> Vec<f64> {
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = raw.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
