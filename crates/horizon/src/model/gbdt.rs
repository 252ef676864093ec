//! Gradient-boosted tree ensembles.

use super::classifier::Classifier;
use super::tree::Tree;
use crate::error::{HorizonError, Result};
use crate::schema::TargetClass;
use crate::training::{BackendKind, FeatureMatrix, Objective};

/// A trained boosted ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientBoostedModel {
    /// Backend that produced the model; decides the artifact layout.
    pub backend: BackendKind,
    pub feature_names: Vec<String>,
    pub objective: Objective,
    /// Ordinal classes, indexed by output position.
    pub classes: Vec<TargetClass>,
    /// Initial raw score per output.
    pub base_score: Vec<f64>,
    pub learning_rate: f64,
    /// One entry per boosting round, each with one tree per output.
    pub trees: Vec<Vec<Tree>>,
    /// Best round chosen by early stopping, if it ran.
    pub best_iteration: Option<usize>,
}

impl GradientBoostedModel {
    /// Number of boosting rounds kept.
    pub fn n_rounds(&self) -> usize {
        self.trees.len()
    }

    /// Check internal consistency after deserialization.
    pub fn validate(&self) -> Result<()> {
        let outputs = self.objective.num_outputs();
        if self.feature_names.is_empty() {
            return Err(HorizonError::Prediction("model has no feature names".to_string()));
        }
        if let Objective::Softmax { num_class } = self.objective {
            if num_class < 3 {
                return Err(HorizonError::Prediction(format!(
                    "multiclass objective needs at least 3 classes, found {}",
                    num_class
                )));
            }
        }
        if !self.classes.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(HorizonError::Prediction(
                "model classes must be unique and in ascending order".to_string(),
            ));
        }
        if self.classes.len() != self.objective.num_classes() {
            return Err(HorizonError::Prediction(format!(
                "model lists {} classes but its objective predicts {}",
                self.classes.len(),
                self.objective.num_classes()
            )));
        }
        if self.base_score.len() != outputs {
            return Err(HorizonError::Prediction(format!(
                "expected {} base scores, found {}",
                outputs,
                self.base_score.len()
            )));
        }
        for (round, trees) in self.trees.iter().enumerate() {
            if trees.len() != outputs {
                return Err(HorizonError::Prediction(format!(
                    "round {} has {} trees, expected {}",
                    round,
                    trees.len(),
                    outputs
                )));
            }
            if trees
                .iter()
                .filter_map(Tree::max_feature)
                .any(|f| f >= self.feature_names.len())
            {
                return Err(HorizonError::Prediction(format!(
                    "round {} references a feature outside the model's {} features",
                    round,
                    self.feature_names.len()
                )));
            }
        }
        Ok(())
    }

    /// Raw additive scores, row-major `n_rows x outputs`.
    pub fn predict_raw(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        if x.n_features() != self.feature_names.len() {
            return Err(HorizonError::Prediction(format!(
                "model expects {} features, input has {}",
                self.feature_names.len(),
                x.n_features()
            )));
        }
        let k = self.objective.num_outputs();
        let mut raw = Vec::with_capacity(x.n_rows() * k);
        for row in 0..x.n_rows() {
            let values = x.row(row);
            for output in 0..k {
                let mut score = self.base_score[output];
                for round in &self.trees {
                    score += round[output].predict_row(values).ok_or_else(|| {
                        HorizonError::Prediction("malformed tree in model".to_string())
                    })?;
                }
                raw.push(score);
            }
        }
        Ok(raw)
    }
}

impl Classifier for GradientBoostedModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn classes(&self) -> &[TargetClass] {
        &self.classes
    }

    fn predict_class_probabilities(&self, x: &FeatureMatrix) -> Result<Vec<Vec<f64>>> {
        let k = self.objective.num_outputs();
        let raw = self.predict_raw(x)?;
        Ok(raw
            .chunks(k)
            .map(|row| self.objective.probabilities(row))
            .collect())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<TargetClass>> {
        let probabilities = self.predict_class_probabilities(x)?;
        probabilities
            .iter()
            .map(|p| {
                self.classes
                    .get(crate::training::argmax(p))
                    .copied()
                    .ok_or_else(|| HorizonError::Prediction("class index out of range".to_string()))
            })
            .collect()
    }
}
