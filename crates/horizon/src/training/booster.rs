//! The boosting loop shared by both backends.

use tracing::{debug, info};

use super::callback::EarlyStopping;
use super::data::FeatureMatrix;
use super::grower::{GrowerParams, TreeGrower};
use super::metric::Metric;
use super::objective::Objective;
use super::params::BoosterParams;
use super::quantize::{BinCuts, BinnedMatrix};
use crate::error::{HorizonError, Result};
use crate::model::Tree;

/// A named dataset evaluated after every round.
#[derive(Debug, Clone, Copy)]
pub struct EvalSet<'a> {
    pub name: &'a str,
    pub matrix: &'a FeatureMatrix,
    /// Class indices in `0..num_classes`.
    pub labels: &'a [usize],
}

impl<'a> EvalSet<'a> {
    pub fn new(name: &'a str, matrix: &'a FeatureMatrix, labels: &'a [usize]) -> Self {
        Self {
            name,
            matrix,
            labels,
        }
    }
}

/// A metric under the name a backend reports it as.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedMetric {
    pub name: &'static str,
    pub metric: Metric,
}

/// Trees and scores produced by one boosting run.
#[derive(Debug, Clone)]
pub struct BoostOutput {
    pub base_score: Vec<f64>,
    /// One entry per kept round, each with one tree per output.
    pub trees: Vec<Vec<Tree>>,
    /// Best round when early stopping was active.
    pub best_iteration: Option<usize>,
    /// Rounds actually run (may exceed the trees kept).
    pub rounds_run: usize,
}

/// Additive tree boosting with histogram split finding.
pub struct Booster {
    params: BoosterParams,
    objective: Objective,
}

impl Booster {
    pub fn new(params: BoosterParams, objective: Objective) -> Self {
        Self { params, objective }
    }

    /// Fit on `train`, reporting every metric on every eval set through `on_eval`
    /// as `(round, dataset, metric, value)`.
    ///
    /// With early stopping enabled, the first metric on the last eval set is
    /// monitored and trees after the best round are discarded.
    pub fn fit<F>(
        &self,
        train: &FeatureMatrix,
        labels: &[usize],
        eval_sets: &[EvalSet<'_>],
        metrics: &[NamedMetric],
        mut on_eval: F,
    ) -> Result<BoostOutput>
    where
        F: FnMut(usize, &str, &str, f64),
    {
        if train.n_rows() == 0 {
            return Err(HorizonError::Training("training split is empty".to_string()));
        }
        if labels.len() != train.n_rows() {
            return Err(HorizonError::Training(format!(
                "{} labels for {} rows",
                labels.len(),
                train.n_rows()
            )));
        }
        let num_classes = self.objective.num_classes();
        if let Some(&bad) = labels.iter().find(|&&y| y >= num_classes) {
            return Err(HorizonError::Training(format!(
                "label index {} out of range for {} classes",
                bad, num_classes
            )));
        }
        for set in eval_sets {
            if set.matrix.n_features() != train.n_features() {
                return Err(HorizonError::Training(format!(
                    "eval set '{}' has {} features, expected {}",
                    set.name,
                    set.matrix.n_features(),
                    train.n_features()
                )));
            }
        }

        let cuts = BinCuts::from_matrix(train, self.params.max_bins);
        let binned = BinnedMatrix::new(train, &cuts);
        let grower = TreeGrower::new(
            &binned,
            &cuts,
            GrowerParams {
                strategy: self.params.strategy,
                gain: self.params.gain.clone(),
                learning_rate: self.params.learning_rate,
            },
        );

        let k = self.objective.num_outputs();
        let base_score = self.objective.base_score(labels);
        let mut train_raw = repeat_rows(&base_score, train.n_rows());
        let mut eval_raw: Vec<Vec<f64>> = eval_sets
            .iter()
            .map(|s| repeat_rows(&base_score, s.matrix.n_rows()))
            .collect();

        let n = train.n_rows();
        let mut grad = vec![0.0; n * k];
        let mut hess = vec![0.0; n * k];
        let mut out_grad = vec![0.0; n];
        let mut out_hess = vec![0.0; n];

        let mut early_stopping = self.params.early_stopping_rounds.map(EarlyStopping::new);
        let mut trees: Vec<Vec<Tree>> = Vec::new();

        for round in 0..self.params.n_estimators {
            self.objective.gradients(&train_raw, labels, &mut grad, &mut hess);

            let mut round_trees = Vec::with_capacity(k);
            for output in 0..k {
                for row in 0..n {
                    out_grad[row] = grad[row * k + output];
                    out_hess[row] = hess[row * k + output];
                }
                let tree = grower.grow(&out_grad, &out_hess);
                add_tree(&tree, train, output, k, &mut train_raw);
                for (set, raw) in eval_sets.iter().zip(eval_raw.iter_mut()) {
                    add_tree(&tree, set.matrix, output, k, raw);
                }
                round_trees.push(tree);
            }
            trees.push(round_trees);

            let mut monitored = None;
            let mut summary = Vec::new();
            for (set, raw) in eval_sets.iter().zip(&eval_raw) {
                for (i, named) in metrics.iter().enumerate() {
                    let value = named.metric.evaluate(&self.objective, raw, set.labels);
                    on_eval(round, set.name, named.name, value);
                    if i == 0 {
                        monitored = Some(value);
                    }
                    summary.push(format!("{}'s {}: {:.6}", set.name, named.name, value));
                }
            }

            debug!(round, "{}", summary.join("  "));
            if let Some(period) = self.params.log_period {
                if period > 0 && (round + 1) % period == 0 {
                    info!("[{}]  {}", round + 1, summary.join("  "));
                }
            }

            if let (Some(stopping), Some(value)) = (early_stopping.as_mut(), monitored) {
                if stopping.should_stop(value) {
                    info!(
                        best_iteration = stopping.best_round() + 1,
                        "early stopping, no improvement for {} rounds",
                        stopping.current_round() - stopping.best_round() - 1
                    );
                    break;
                }
            }
        }

        let rounds_run = trees.len();
        let best_iteration = match &early_stopping {
            Some(stopping) if stopping.best_value().is_some() => Some(stopping.best_round()),
            _ => None,
        };
        // Prediction uses the best round whether or not stopping fired.
        if let Some(best) = best_iteration {
            trees.truncate(best + 1);
        }

        Ok(BoostOutput {
            base_score,
            trees,
            best_iteration,
            rounds_run,
        })
    }
}

fn repeat_rows(base: &[f64], n_rows: usize) -> Vec<f64> {
    base.iter().copied().cycle().take(base.len() * n_rows).collect()
}

fn add_tree(tree: &Tree, matrix: &FeatureMatrix, output: usize, k: usize, raw: &mut [f64]) {
    for row in 0..matrix.n_rows() {
        raw[row * k + output] += tree.predict_row(matrix.row(row)).unwrap_or(0.0);
    }
}
