//! Per-iteration metric histories.
//!
//! The two backends record evaluation results in different native shapes.
//! Both convert into [`TrainingHistory`], keyed by evaluation set name and then
//! metric name, so consumers never need to know which backend ran.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Normalized history: dataset -> metric -> value per iteration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainingHistory(IndexMap<String, IndexMap<String, Vec<f64>>>);

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value to a series, creating it if needed.
    pub fn push(&mut self, dataset: &str, metric: &str, value: f64) {
        self.0
            .entry(dataset.to_string())
            .or_default()
            .entry(metric.to_string())
            .or_default()
            .push(value);
    }

    /// Evaluation set names in recording order.
    pub fn datasets(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Metric names recorded for one evaluation set.
    pub fn metrics(&self, dataset: &str) -> Vec<&str> {
        self.0
            .get(dataset)
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// One series.
    pub fn series(&self, dataset: &str, metric: &str) -> Option<&[f64]> {
        self.0.get(dataset)?.get(metric).map(Vec::as_slice)
    }

    /// Every series as `(dataset, metric, values)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[f64])> {
        self.0.iter().flat_map(|(dataset, metrics)| {
            metrics
                .iter()
                .map(move |(metric, values)| (dataset.as_str(), metric.as_str(), values.as_slice()))
        })
    }

    /// Length of the longest series.
    pub fn iterations(&self) -> usize {
        self.iter().map(|(_, _, v)| v.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Depth-wise backend history: nested maps filled as rounds complete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalsResult {
    pub sets: IndexMap<String, IndexMap<String, Vec<f64>>>,
}

impl EvalsResult {
    pub fn record(&mut self, dataset: &str, metric: &str, value: f64) {
        self.sets
            .entry(dataset.to_string())
            .or_default()
            .entry(metric.to_string())
            .or_default()
            .push(value);
    }
}

impl From<EvalsResult> for TrainingHistory {
    fn from(result: EvalsResult) -> Self {
        TrainingHistory(result.sets)
    }
}

/// One entry of the leaf-wise backend's flat evaluation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalRecord {
    /// Zero-based boosting round.
    pub iteration: usize,
    pub dataset: String,
    pub metric: String,
    pub value: f64,
}

impl From<Vec<EvalRecord>> for TrainingHistory {
    fn from(mut records: Vec<EvalRecord>) -> Self {
        // Series must come out in iteration order even if the log was not.
        records.sort_by_key(|r| r.iteration);
        let mut history = TrainingHistory::new();
        for record in records {
            history.push(&record.dataset, &record.metric, record.value);
        }
        history
    }
}
