//! Split, fit, evaluate: the training entry point.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::backend::{Backend, BackendKind, FitInput};
use super::data::{FeatureMatrix, train_test_split};
use super::evaluation::{ConfusionMatrix, RocCurve, accuracy};
use super::history::TrainingHistory;
use super::params::Hyperparameters;
use crate::error::{HorizonError, Result};
use crate::model::{Classifier, GradientBoostedModel};
use crate::schema::{Frame, TargetClass};

/// Evaluation artifacts of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    pub backend: BackendKind,
    /// `binary` or `multiclass`, decided from the training split.
    pub objective: String,
    /// Classes present in the training split.
    pub classes: Vec<TargetClass>,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Accuracy on the test split.
    pub accuracy: f64,
    pub confusion_matrix: ConfusionMatrix,
    /// Only for binary models.
    pub roc: Option<RocCurve>,
    pub auc_score: Option<f64>,
    /// Per-iteration metrics, dataset -> metric -> values.
    pub history: TrainingHistory,
    /// Rounds kept in the model.
    pub rounds: usize,
    pub best_iteration: Option<usize>,
}

/// A fitted model together with its evaluation.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: GradientBoostedModel,
    pub result: TrainingResult,
}

/// Trains a backend on a canonical table and evaluates it on a held-out split.
#[derive(Debug, Clone)]
pub struct TrainingOrchestrator {
    test_fraction: f64,
    seed: u64,
}

impl Default for TrainingOrchestrator {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

impl TrainingOrchestrator {
    /// 80/20 split with seed 42.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_split(test_fraction: f64, seed: u64) -> Self {
        Self {
            test_fraction,
            seed,
        }
    }

    /// Train the backend named `backend` (`xgb` or `lgbm`).
    pub fn train(
        &self,
        canonical: &Frame,
        feature_names: &[String],
        backend: &str,
        hyperparameters: &Hyperparameters,
    ) -> Result<TrainingOutcome> {
        let kind: BackendKind = backend.parse()?;
        self.train_with(canonical, feature_names, kind.backend().as_ref(), hyperparameters)
    }

    /// Train with an explicit backend implementation.
    pub fn train_with(
        &self,
        canonical: &Frame,
        feature_names: &[String],
        backend: &dyn Backend,
        hyperparameters: &Hyperparameters,
    ) -> Result<TrainingOutcome> {
        self.run(canonical, feature_names, backend, hyperparameters)
            .map_err(|e| match e {
                HorizonError::Training(_) => e,
                other => HorizonError::Training(other.to_string()),
            })
    }

    fn run(
        &self,
        canonical: &Frame,
        feature_names: &[String],
        backend: &dyn Backend,
        hyperparameters: &Hyperparameters,
    ) -> Result<TrainingOutcome> {
        let targets = canonical
            .target()
            .ok_or_else(|| HorizonError::Training("dataset has no target column".to_string()))?;
        let x = FeatureMatrix::from_frame(canonical, feature_names)?;

        let split = train_test_split(x.n_rows(), self.test_fraction, self.seed)?;
        let x_train = x.select_rows(&split.train);
        let x_test = x.select_rows(&split.test);
        let t_train: Vec<TargetClass> = split.train.iter().map(|&i| targets[i]).collect();
        let t_test: Vec<TargetClass> = split.test.iter().map(|&i| targets[i]).collect();

        // The objective follows the classes present in the training split.
        let mut classes = t_train.clone();
        classes.sort();
        classes.dedup();
        let missing: Vec<TargetClass> = t_test
            .iter()
            .filter(|c| classes.binary_search(c).is_err())
            .copied()
            .collect();
        if !missing.is_empty() {
            warn!(
                rows = missing.len(),
                "test split holds classes absent from the training split"
            );
        }

        let y_train: Vec<usize> = t_train
            .iter()
            .filter_map(|c| classes.binary_search(c).ok())
            .collect();
        // Eval-set metrics only cover rows whose class the model can predict.
        let known_test: Vec<usize> = (0..t_test.len())
            .filter(|&i| classes.binary_search(&t_test[i]).is_ok())
            .collect();
        let x_eval = x_test.select_rows(&known_test);
        let y_eval: Vec<usize> = known_test
            .iter()
            .filter_map(|&i| classes.binary_search(&t_test[i]).ok())
            .collect();

        info!(
            backend = %backend.kind(),
            train_rows = x_train.n_rows(),
            test_rows = x_test.n_rows(),
            classes = classes.len(),
            features = feature_names.len(),
            "training"
        );

        let (model, history) = backend.fit(
            FitInput {
                x_train: &x_train,
                y_train: &y_train,
                x_test: &x_eval,
                y_test: &y_eval,
                classes: &classes,
            },
            hyperparameters,
        )?;

        let predictions = model.predict(&x_test)?;
        let accuracy = accuracy(&t_test, &predictions);
        let confusion_matrix = ConfusionMatrix::new(&t_test, &predictions);

        let roc = if classes.len() == 2 {
            let probabilities = model.predict_class_probabilities(&x_eval)?;
            let scores: Vec<f64> = probabilities.iter().map(|p| p[1]).collect();
            let positives: Vec<bool> = y_eval.iter().map(|&y| y == 1).collect();
            let roc = RocCurve::compute(&positives, &scores);
            if roc.is_none() {
                warn!("test split holds a single class, ROC omitted");
            }
            roc
        } else {
            None
        };

        let result = TrainingResult {
            backend: backend.kind(),
            objective: if model.objective.is_multiclass() {
                "multiclass".to_string()
            } else {
                "binary".to_string()
            },
            classes,
            train_rows: x_train.n_rows(),
            test_rows: x_test.n_rows(),
            accuracy,
            confusion_matrix,
            auc_score: roc.as_ref().map(|r| r.auc),
            roc,
            history,
            rounds: model.n_rounds(),
            best_iteration: model.best_iteration,
        };

        info!(
            backend = %result.backend,
            accuracy = result.accuracy,
            auc = ?result.auc_score,
            rounds = result.rounds,
            "training finished"
        );

        Ok(TrainingOutcome { model, result })
    }
}
