//! Pretrained model registry and the stores that serve artifacts.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HorizonError, Result};
use crate::model::{GradientBoostedModel, artifact};
use crate::schema::Frame;
use crate::schema::vocabulary::{KEPLER_CHARACTERISTIC, TESS_CHARACTERISTIC};

/// One of the three mission models shipped with the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PretrainedModel {
    Kepler,
    Tess,
    K2,
}

impl PretrainedModel {
    pub const ALL: [PretrainedModel; 3] =
        [PretrainedModel::Kepler, PretrainedModel::Tess, PretrainedModel::K2];

    pub fn as_str(&self) -> &'static str {
        match self {
            PretrainedModel::Kepler => "kepler",
            PretrainedModel::Tess => "tess",
            PretrainedModel::K2 => "k2",
        }
    }

    /// Artifact file name inside the model directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            PretrainedModel::Kepler => "xgb_kepler_model.json",
            PretrainedModel::Tess => "xgb_tess_model.json",
            PretrainedModel::K2 => "xgb_k2_model.json",
        }
    }

    /// Pick the model for a table by its original column names.
    ///
    /// Kepler columns win over TESS columns; anything else falls back to K2.
    pub fn select(unscaled: &Frame) -> Self {
        let has_any = |names: &[&str]| names.iter().any(|n| unscaled.has_column(n));
        if has_any(KEPLER_CHARACTERISTIC) {
            PretrainedModel::Kepler
        } else if has_any(TESS_CHARACTERISTIC) {
            PretrainedModel::Tess
        } else {
            PretrainedModel::K2
        }
    }
}

impl fmt::Display for PretrainedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source of pretrained model artifacts.
///
/// Stores return the parsed artifact document; the dispatcher reads its
/// feature-name metadata before building the model.
pub trait ModelStore: Send + Sync {
    /// Load the artifact for `model`.
    fn load(&self, model: PretrainedModel) -> Result<Value>;

    /// Human-readable location of the store, for logs.
    fn location(&self) -> String;
}

/// Reads artifacts from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a model's artifact.
    pub fn path_for(&self, model: PretrainedModel) -> PathBuf {
        self.root.join(model.file_name())
    }
}

impl ModelStore for DirectoryStore {
    fn load(&self, model: PretrainedModel) -> Result<Value> {
        let path = self.path_for(model);
        let bytes = fs::read(&path).map_err(|e| {
            HorizonError::Prediction(format!(
                "could not read pretrained model '{}': {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            HorizonError::Prediction(format!(
                "pretrained model '{}' is not valid JSON: {}",
                path.display(),
                e
            ))
        })
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}

/// Keeps artifacts in memory. Used in tests and for embedding models.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    artifacts: HashMap<PretrainedModel, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trained model under `slot`.
    pub fn insert(&mut self, slot: PretrainedModel, model: &GradientBoostedModel) -> Result<()> {
        let value = serde_json::from_slice(&artifact::to_json(model)?)?;
        self.artifacts.insert(slot, value);
        Ok(())
    }

    /// Register a raw artifact document under `slot`.
    pub fn insert_value(&mut self, slot: PretrainedModel, value: Value) {
        self.artifacts.insert(slot, value);
    }

    pub fn with_model(mut self, slot: PretrainedModel, model: &GradientBoostedModel) -> Result<Self> {
        self.insert(slot, model)?;
        Ok(self)
    }
}

impl ModelStore for MemoryStore {
    fn load(&self, model: PretrainedModel) -> Result<Value> {
        self.artifacts.get(&model).cloned().ok_or_else(|| {
            HorizonError::Prediction(format!("pretrained model '{}' is not available", model))
        })
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
