//! JSON model artifacts.
//!
//! Two layouts exist, one per backend:
//!
//! - learner layout (`xgb`): everything under a `learner` object, feature names
//!   at `/learner/feature_names`
//! - estimator layout (`lgbm`): flat fields with trailing underscores, feature
//!   names at `/feature_name_`
//!
//! Readers find the feature names by probing both locations, so any artifact
//! in either layout can be dispatched without knowing which backend wrote it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::gbdt::GradientBoostedModel;
use super::tree::Tree;
use crate::error::{HorizonError, Result};
use crate::schema::TargetClass;
use crate::training::{BackendKind, Objective};

/// Artifact layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Learner,
    Estimator,
}

impl ArtifactFormat {
    /// Layout written for models from `backend`.
    pub fn for_backend(backend: BackendKind) -> Self {
        match backend {
            BackendKind::Xgb => ArtifactFormat::Learner,
            BackendKind::Lgbm => ArtifactFormat::Estimator,
        }
    }

    /// Detect the layout from the feature-name location.
    pub fn detect(value: &Value) -> Option<Self> {
        if value.pointer("/learner/feature_names").is_some() {
            Some(ArtifactFormat::Learner)
        } else if value.pointer("/feature_name_").is_some() {
            Some(ArtifactFormat::Estimator)
        } else {
            None
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LearnerArtifact {
    learner: Learner,
}

#[derive(Debug, Serialize, Deserialize)]
struct Learner {
    feature_names: Vec<String>,
    objective: String,
    /// Zero for binary models.
    num_class: usize,
    classes: Vec<TargetClass>,
    base_score: Vec<f64>,
    learning_rate: f64,
    trees: Vec<Vec<Tree>>,
    #[serde(default)]
    best_iteration: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EstimatorArtifact {
    feature_name_: Vec<String>,
    objective_: String,
    classes_: Vec<TargetClass>,
    n_classes_: usize,
    init_score_: Vec<f64>,
    learning_rate: f64,
    trees_: Vec<Vec<Tree>>,
    #[serde(default)]
    best_iteration_: Option<usize>,
}

/// Feature names recorded in an artifact, from whichever layout it uses.
pub fn feature_names(value: &Value) -> Result<Vec<String>> {
    let names = match ArtifactFormat::detect(value) {
        Some(ArtifactFormat::Learner) => value.pointer("/learner/feature_names"),
        Some(ArtifactFormat::Estimator) => value.pointer("/feature_name_"),
        None => None,
    }
    .ok_or_else(|| {
        HorizonError::UnknownModelFormat(
            "expected 'learner.feature_names' or 'feature_name_'".to_string(),
        )
    })?;

    serde_json::from_value(names.clone())
        .map_err(|e| HorizonError::Prediction(format!("invalid feature name list: {}", e)))
}

/// Serialize a model in its backend's layout.
pub fn to_json(model: &GradientBoostedModel) -> Result<Vec<u8>> {
    let bytes = match ArtifactFormat::for_backend(model.backend) {
        ArtifactFormat::Learner => serde_json::to_vec_pretty(&LearnerArtifact {
            learner: Learner {
                feature_names: model.feature_names.clone(),
                objective: match model.objective {
                    Objective::Logistic => "binary:logistic".to_string(),
                    Objective::Softmax { .. } => "multi:softprob".to_string(),
                },
                num_class: match model.objective {
                    Objective::Logistic => 0,
                    Objective::Softmax { num_class } => num_class,
                },
                classes: model.classes.clone(),
                base_score: model.base_score.clone(),
                learning_rate: model.learning_rate,
                trees: model.trees.clone(),
                best_iteration: model.best_iteration,
            },
        })?,
        ArtifactFormat::Estimator => serde_json::to_vec_pretty(&EstimatorArtifact {
            feature_name_: model.feature_names.clone(),
            objective_: match model.objective {
                Objective::Logistic => "binary".to_string(),
                Objective::Softmax { .. } => "multiclass".to_string(),
            },
            classes_: model.classes.clone(),
            n_classes_: model.objective.num_classes(),
            init_score_: model.base_score.clone(),
            learning_rate: model.learning_rate,
            trees_: model.trees.clone(),
            best_iteration_: model.best_iteration,
        })?,
    };
    Ok(bytes)
}

/// Deserialize a model from either layout.
///
/// Fails with `UnknownModelFormat` when neither layout is recognized and with
/// `Prediction` when a recognized artifact is corrupt.
pub fn from_json(bytes: &[u8]) -> Result<GradientBoostedModel> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| HorizonError::Prediction(format!("model artifact is not valid JSON: {}", e)))?;
    from_value(value)
}

/// Deserialize a model from a parsed artifact.
pub fn from_value(value: Value) -> Result<GradientBoostedModel> {
    let corrupt = |e: serde_json::Error| HorizonError::Prediction(format!("corrupt model artifact: {}", e));

    let model = match ArtifactFormat::detect(&value) {
        Some(ArtifactFormat::Learner) => {
            let artifact: LearnerArtifact = serde_json::from_value(value).map_err(corrupt)?;
            let learner = artifact.learner;
            let objective = match learner.objective.as_str() {
                "binary:logistic" => Objective::Logistic,
                "multi:softprob" | "multi:softmax" => Objective::Softmax {
                    num_class: learner.num_class,
                },
                other => return Err(unsupported_objective(other)),
            };
            GradientBoostedModel {
                backend: BackendKind::Xgb,
                feature_names: learner.feature_names,
                objective,
                classes: learner.classes,
                base_score: learner.base_score,
                learning_rate: learner.learning_rate,
                trees: learner.trees,
                best_iteration: learner.best_iteration,
            }
        }
        Some(ArtifactFormat::Estimator) => {
            let artifact: EstimatorArtifact = serde_json::from_value(value).map_err(corrupt)?;
            let objective = match artifact.objective_.as_str() {
                "binary" => Objective::Logistic,
                "multiclass" => Objective::Softmax {
                    num_class: artifact.n_classes_,
                },
                other => return Err(unsupported_objective(other)),
            };
            GradientBoostedModel {
                backend: BackendKind::Lgbm,
                feature_names: artifact.feature_name_,
                objective,
                classes: artifact.classes_,
                base_score: artifact.init_score_,
                learning_rate: artifact.learning_rate,
                trees: artifact.trees_,
                best_iteration: artifact.best_iteration_,
            }
        }
        None => {
            return Err(HorizonError::UnknownModelFormat(
                "expected 'learner.feature_names' or 'feature_name_'".to_string(),
            ));
        }
    };

    model.validate()?;
    Ok(model)
}

fn unsupported_objective(name: &str) -> HorizonError {
    HorizonError::Prediction(format!("unsupported objective '{}'", name))
}

/// Write a model artifact to disk.
pub fn save(model: &GradientBoostedModel, path: &Path) -> Result<()> {
    let bytes = to_json(model)?;
    fs::write(path, bytes).map_err(|source| HorizonError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a model artifact from disk.
pub fn load(path: &Path) -> Result<GradientBoostedModel> {
    let bytes = fs::read(path).map_err(|source| HorizonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_json(&bytes)
}
