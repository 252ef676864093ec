//! Evaluation metrics computed from raw boosting outputs.

use super::objective::Objective;

const EPS: f64 = 1e-15;

/// A per-round evaluation metric. Lower is better for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Mean negative log-likelihood of the true class.
    LogLoss,
    /// Fraction of misclassified rows.
    Error,
}

impl Metric {
    /// Evaluate over row-major raw outputs.
    pub fn evaluate(self, objective: &Objective, raw: &[f64], labels: &[usize]) -> f64 {
        if labels.is_empty() {
            return 0.0;
        }
        let k = objective.num_outputs();
        let total: f64 = labels
            .iter()
            .enumerate()
            .map(|(i, &y)| {
                let probs = objective.probabilities(&raw[i * k..(i + 1) * k]);
                match self {
                    Metric::LogLoss => -probs[y].clamp(EPS, 1.0 - EPS).ln(),
                    Metric::Error => {
                        if argmax(&probs) == y {
                            0.0
                        } else {
                            1.0
                        }
                    }
                }
            })
            .sum();
        total / labels.len() as f64
    }
}

/// Index of the largest value; the first one wins ties.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
