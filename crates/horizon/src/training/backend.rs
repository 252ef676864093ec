//! The two gradient-boosting backends behind one interface.
//!
//! Both fit the same kind of model but differ in tree growth, defaults,
//! metric and eval-set naming, early stopping and the shape in which they
//! record evaluation history. Callers only see [`Backend`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::booster::{Booster, EvalSet, NamedMetric};
use super::data::FeatureMatrix;
use super::history::{EvalRecord, EvalsResult, TrainingHistory};
use super::metric::Metric;
use super::objective::Objective;
use super::params::{BoosterParams, Hyperparameters};
use crate::error::{HorizonError, Result};
use crate::model::GradientBoostedModel;
use crate::schema::TargetClass;

/// Which backend to train with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Depth-wise growth, XGBoost-style naming and artifact layout.
    Xgb,
    /// Leaf-wise growth with early stopping, LightGBM-style naming and layout.
    Lgbm,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Xgb => "xgb",
            BackendKind::Lgbm => "lgbm",
        }
    }

    /// The backend implementation.
    pub fn backend(self) -> Box<dyn Backend> {
        match self {
            BackendKind::Xgb => Box::new(DepthWiseBackend),
            BackendKind::Lgbm => Box::new(LeafWiseBackend),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = HorizonError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "xgb" => Ok(BackendKind::Xgb),
            "lgbm" => Ok(BackendKind::Lgbm),
            other => Err(HorizonError::InvalidBackend(other.to_string())),
        }
    }
}

/// Training data handed to a backend.
#[derive(Debug, Clone, Copy)]
pub struct FitInput<'a> {
    pub x_train: &'a FeatureMatrix,
    /// Class indices into `classes`.
    pub y_train: &'a [usize],
    pub x_test: &'a FeatureMatrix,
    pub y_test: &'a [usize],
    /// Ordinal classes present in the training split, ascending.
    pub classes: &'a [TargetClass],
}

/// A gradient-boosting implementation.
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Fit a classifier and return it with its normalized evaluation history.
    ///
    /// The train split is evaluated first, then the test split.
    fn fit(
        &self,
        input: FitInput<'_>,
        hyperparameters: &Hyperparameters,
    ) -> Result<(GradientBoostedModel, TrainingHistory)>;
}

fn check_classes(input: &FitInput<'_>) -> Result<Objective> {
    if input.classes.len() < 2 {
        return Err(HorizonError::Training(format!(
            "training split contains {} class(es); at least 2 are required",
            input.classes.len()
        )));
    }
    Ok(Objective::for_classes(input.classes.len()))
}

fn assemble(
    kind: BackendKind,
    input: &FitInput<'_>,
    objective: Objective,
    params: &BoosterParams,
    output: super::booster::BoostOutput,
) -> GradientBoostedModel {
    GradientBoostedModel {
        backend: kind,
        feature_names: input.x_train.feature_names().to_vec(),
        objective,
        classes: input.classes.to_vec(),
        base_score: output.base_score,
        learning_rate: params.learning_rate,
        trees: output.trees,
        best_iteration: output.best_iteration,
    }
}

/// Depth-wise backend. Records history as nested maps under
/// `validation_0` (train) and `validation_1` (test).
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthWiseBackend;

impl DepthWiseBackend {
    fn metrics(objective: &Objective) -> Vec<NamedMetric> {
        if objective.is_multiclass() {
            vec![
                NamedMetric { name: "mlogloss", metric: Metric::LogLoss },
                NamedMetric { name: "merror", metric: Metric::Error },
            ]
        } else {
            vec![
                NamedMetric { name: "logloss", metric: Metric::LogLoss },
                NamedMetric { name: "error", metric: Metric::Error },
            ]
        }
    }
}

impl Backend for DepthWiseBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Xgb
    }

    fn fit(
        &self,
        input: FitInput<'_>,
        hyperparameters: &Hyperparameters,
    ) -> Result<(GradientBoostedModel, TrainingHistory)> {
        let objective = check_classes(&input)?;
        let params = hyperparameters.depth_wise()?;
        let eval_sets = [
            EvalSet::new("validation_0", input.x_train, input.y_train),
            EvalSet::new("validation_1", input.x_test, input.y_test),
        ];

        let mut evals_result = EvalsResult::default();
        let output = Booster::new(params.clone(), objective).fit(
            input.x_train,
            input.y_train,
            &eval_sets,
            &Self::metrics(&objective),
            |_, dataset, metric, value| evals_result.record(dataset, metric, value),
        )?;

        let model = assemble(self.kind(), &input, objective, &params, output);
        Ok((model, evals_result.into()))
    }
}

/// Leaf-wise backend. Logs every 10 rounds, stops early after 20 rounds
/// without improvement on the test split, and records history as a flat list
/// under `training` (train) and `valid_1` (test).
#[derive(Debug, Clone, Copy, Default)]
pub struct LeafWiseBackend;

impl LeafWiseBackend {
    fn metrics(objective: &Objective) -> Vec<NamedMetric> {
        if objective.is_multiclass() {
            vec![
                NamedMetric { name: "multi_logloss", metric: Metric::LogLoss },
                NamedMetric { name: "multi_error", metric: Metric::Error },
            ]
        } else {
            vec![
                NamedMetric { name: "binary_logloss", metric: Metric::LogLoss },
                NamedMetric { name: "binary_error", metric: Metric::Error },
            ]
        }
    }
}

impl Backend for LeafWiseBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Lgbm
    }

    fn fit(
        &self,
        input: FitInput<'_>,
        hyperparameters: &Hyperparameters,
    ) -> Result<(GradientBoostedModel, TrainingHistory)> {
        let objective = check_classes(&input)?;
        let params = hyperparameters.leaf_wise()?;
        let eval_sets = [
            EvalSet::new("training", input.x_train, input.y_train),
            EvalSet::new("valid_1", input.x_test, input.y_test),
        ];

        let mut records: Vec<EvalRecord> = Vec::new();
        let output = Booster::new(params.clone(), objective).fit(
            input.x_train,
            input.y_train,
            &eval_sets,
            &Self::metrics(&objective),
            |iteration, dataset, metric, value| {
                records.push(EvalRecord {
                    iteration,
                    dataset: dataset.to_string(),
                    metric: metric.to_string(),
                    value,
                })
            },
        )?;

        let model = assemble(self.kind(), &input, objective, &params, output);
        Ok((model, records.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_data() -> (FeatureMatrix, Vec<usize>) {
        let values: Vec<f64> = (0..60).map(|i| (i % 30) as f64).collect();
        let labels = (0..60).map(|i| usize::from(i % 30 >= 15)).collect();
        (FeatureMatrix::new(vec!["pl_rade".to_string()], values).unwrap(), labels)
    }

    #[test]
    fn test_parse_backend() {
        assert_eq!("xgb".parse::<BackendKind>().unwrap(), BackendKind::Xgb);
        assert_eq!("lgbm".parse::<BackendKind>().unwrap(), BackendKind::Lgbm);
        let err = "svm".parse::<BackendKind>().unwrap_err();
        assert!(matches!(err, HorizonError::InvalidBackend(name) if name == "svm"));
    }

    #[test]
    fn test_both_backends_share_history_shape() {
        let (x, y) = input_data();
        let classes = [TargetClass::FalsePositive, TargetClass::Confirmed];
        let input = FitInput {
            x_train: &x,
            y_train: &y,
            x_test: &x,
            y_test: &y,
            classes: &classes,
        };
        let hyper = Hyperparameters {
            n_estimators: Some(5),
            ..Default::default()
        };

        let (model, history) = DepthWiseBackend.fit(input, &hyper).unwrap();
        assert_eq!(model.backend, BackendKind::Xgb);
        assert_eq!(history.datasets().collect::<Vec<_>>(), vec!["validation_0", "validation_1"]);
        assert_eq!(history.metrics("validation_1"), vec!["logloss", "error"]);
        assert_eq!(history.series("validation_0", "logloss").unwrap().len(), 5);

        let (model, history) = LeafWiseBackend.fit(input, &hyper).unwrap();
        assert_eq!(model.backend, BackendKind::Lgbm);
        assert_eq!(history.datasets().collect::<Vec<_>>(), vec!["training", "valid_1"]);
        assert_eq!(history.metrics("training"), vec!["binary_logloss", "binary_error"]);
    }

    #[test]
    fn test_single_class_is_rejected() {
        let (x, _) = input_data();
        let y = vec![0; 60];
        let classes = [TargetClass::Candidate];
        let input = FitInput {
            x_train: &x,
            y_train: &y,
            x_test: &x,
            y_test: &y,
            classes: &classes,
        };
        let err = LeafWiseBackend.fit(input, &Hyperparameters::default()).unwrap_err();
        assert!(matches!(err, HorizonError::Training(_)));
    }
}
