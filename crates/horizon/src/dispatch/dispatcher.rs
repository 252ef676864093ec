//! Model selection and inference over harmonized tables.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use super::store::{DirectoryStore, ModelStore, PretrainedModel};
use crate::error::{HorizonError, Result};
use crate::model::{Classifier, GradientBoostedModel, artifact};
use crate::schema::vocabulary::SINGLE_OBJECT_FEATURES;
use crate::schema::{Column, ColumnRole, ColumnValues, Frame, Record, TargetClass};
use crate::training::FeatureMatrix;

/// Which model produced a batch of predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionSource {
    Pretrained { model: PretrainedModel },
    Supplied,
}

/// Predictions for every row of a dataset, plus the rows to show next to them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionBatch {
    pub source: PredictionSource,
    pub predictions: Vec<TargetClass>,
    pub count: usize,
    /// Unscaled rows, one per prediction.
    #[serde(rename = "raw_data_for_prediction")]
    pub display_rows: Vec<Record>,
}

impl PredictionBatch {
    fn new(source: PredictionSource, predictions: Vec<TargetClass>, unscaled: &Frame) -> Self {
        Self {
            source,
            count: predictions.len(),
            predictions,
            display_rows: unscaled.records(),
        }
    }
}

/// Runs pretrained or caller-supplied models against harmonized tables.
#[derive(Clone)]
pub struct ModelDispatcher {
    store: Arc<dyn ModelStore>,
}

impl ModelDispatcher {
    pub fn new(store: impl ModelStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn with_store(store: Arc<dyn ModelStore>) -> Self {
        Self { store }
    }

    /// Dispatcher over artifacts in a directory.
    pub fn from_directory(root: impl Into<std::path::PathBuf>) -> Self {
        Self::new(DirectoryStore::new(root))
    }

    /// Load a pretrained model and the feature list recorded in its metadata.
    pub fn load(&self, which: PretrainedModel) -> Result<GradientBoostedModel> {
        let value = self.store.load(which)?;
        let features = artifact::feature_names(&value)?;
        debug!(model = %which, features = features.len(), "loaded pretrained model");
        artifact::from_value(value)
    }

    /// Choose a pretrained model from the unscaled columns and predict every
    /// row of the canonical table with it.
    ///
    /// Features the model expects but the table lacks are filled with zero;
    /// columns are reordered to the model's feature order.
    pub fn select_and_predict(&self, canonical: &Frame, unscaled: &Frame) -> Result<PredictionBatch> {
        let which = PretrainedModel::select(unscaled);
        info!(model = %which, store = %self.store.location(), "selected pretrained model");

        let model = self.load(which)?;
        let missing: Vec<&str> = model
            .feature_names
            .iter()
            .filter(|name| canonical.numeric(name).is_none())
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            debug!(?missing, "zero-filling features absent from the dataset");
        }

        let x = FeatureMatrix::reconciled(canonical, &model.feature_names)?;
        let predictions = model.predict(&x)?;
        Ok(PredictionBatch::new(
            PredictionSource::Pretrained { model: which },
            predictions,
            unscaled,
        ))
    }

    /// Predict with a model artifact supplied by the caller.
    ///
    /// No reconciliation happens: the model must expect exactly the
    /// harmonized feature list, in the same order.
    pub fn predict_with_supplied(
        &self,
        model_bytes: &[u8],
        canonical: &Frame,
        feature_names: &[String],
        unscaled: &Frame,
    ) -> Result<PredictionBatch> {
        let model = artifact::from_json(model_bytes)?;
        self.predict_with_model(&model, canonical, feature_names, unscaled)
    }

    /// Predict with an already loaded model, without reconciliation.
    pub fn predict_with_model(
        &self,
        model: &GradientBoostedModel,
        canonical: &Frame,
        feature_names: &[String],
        unscaled: &Frame,
    ) -> Result<PredictionBatch> {
        if model.feature_names.as_slice() != feature_names {
            return Err(HorizonError::Prediction(format!(
                "feature_names mismatch: model expects [{}], dataset provides [{}]",
                model.feature_names.join(", "),
                feature_names.join(", ")
            )));
        }
        let x = FeatureMatrix::from_frame(canonical, feature_names)?;
        let predictions = model.predict(&x)?;
        info!(rows = predictions.len(), "predicted with supplied model");
        Ok(PredictionBatch::new(PredictionSource::Supplied, predictions, unscaled))
    }

    /// Classify one object from named feature values with the Kepler model.
    ///
    /// Values are taken for the fixed single-object feature set, absent ones
    /// as zero, and matched to the model's features by name.
    pub fn predict_single(&self, values: &IndexMap<String, f64>) -> Result<TargetClass> {
        let mut frame = Frame::with_rows(1);
        for &name in SINGLE_OBJECT_FEATURES {
            let value = values.get(name).copied().unwrap_or(0.0);
            frame.push(Column::new(name, ColumnRole::Feature, ColumnValues::Numeric(vec![value])));
        }

        let model = self.load(PretrainedModel::Kepler)?;
        let x = FeatureMatrix::reconciled(&frame, &model.feature_names)?;
        model
            .predict(&x)?
            .first()
            .copied()
            .ok_or_else(|| HorizonError::Prediction("model returned no prediction".to_string()))
    }
}

impl std::fmt::Debug for ModelDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDispatcher")
            .field("store", &self.store.location())
            .finish()
    }
}
