//! The `Horizon` facade and its session-level operations.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::HorizonConfig;
use crate::dispatch::{ModelDispatcher, PredictionBatch};
use crate::error::{HorizonError, Result};
use crate::harmonize::{HarmonizationReport, HarmonizedDataset, SchemaHarmonizer};
use crate::input::{HeaderLocator, LocatedTable, SourceMetadata};
use crate::schema::TargetClass;
use crate::session::Session;
use crate::training::{Hyperparameters, TrainingOrchestrator, TrainingOutcome, TrainingResult};

/// Response to an upload: where the table came from and how it was harmonized.
#[derive(Debug, Clone, Serialize)]
pub struct UploadSummary {
    pub source: SourceMetadata,
    #[serde(flatten)]
    pub report: HarmonizationReport,
}

/// Entry point tying the pipeline stages together.
pub struct Horizon {
    config: HorizonConfig,
    locator: HeaderLocator,
    harmonizer: SchemaHarmonizer,
    orchestrator: TrainingOrchestrator,
    dispatcher: ModelDispatcher,
}

impl Horizon {
    /// Create an instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(HorizonConfig::default())
    }

    /// Create an instance from a configuration. Pretrained models are read
    /// from `config.model_dir`.
    pub fn with_config(config: HorizonConfig) -> Self {
        Self {
            locator: HeaderLocator::with_config(config.parser(), config.locator()),
            harmonizer: SchemaHarmonizer::new(),
            orchestrator: config.orchestrator(),
            dispatcher: ModelDispatcher::from_directory(config.model_dir.clone()),
            config,
        }
    }

    /// Serve pretrained models from another store.
    pub fn with_dispatcher(mut self, dispatcher: ModelDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn config(&self) -> &HorizonConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &ModelDispatcher {
        &self.dispatcher
    }

    /// Locate and harmonize an uploaded export.
    pub fn harmonize_bytes(&self, name: &str, bytes: &[u8]) -> Result<(HarmonizedDataset, SourceMetadata)> {
        let (table, source) = self.locator.locate_bytes(name, bytes)?;
        let dataset = self.harmonizer.harmonize_located(&LocatedTable {
            header_line: source.header_line,
            table,
        })?;
        Ok((dataset, source))
    }

    /// Locate and harmonize an export on disk.
    pub fn harmonize_file(&self, path: impl AsRef<Path>) -> Result<(HarmonizedDataset, SourceMetadata)> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| HorizonError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.harmonize_bytes(&name, &bytes)
    }

    /// Train `backend` on a harmonized dataset.
    pub fn train(
        &self,
        dataset: &HarmonizedDataset,
        backend: &str,
        hyperparameters: &Hyperparameters,
    ) -> Result<TrainingOutcome> {
        self.orchestrator
            .train(&dataset.canonical, &dataset.feature_names, backend, hyperparameters)
    }

    /// Predict with the pretrained model matching the dataset's mission.
    pub fn predict_pretrained(&self, dataset: &HarmonizedDataset) -> Result<PredictionBatch> {
        self.dispatcher
            .select_and_predict(&dataset.canonical, &dataset.unscaled)
    }

    /// Predict with a model artifact supplied by the caller.
    pub fn predict_with_supplied(&self, dataset: &HarmonizedDataset, model_bytes: &[u8]) -> Result<PredictionBatch> {
        self.dispatcher.predict_with_supplied(
            model_bytes,
            &dataset.canonical,
            &dataset.feature_names,
            &dataset.unscaled,
        )
    }

    /// Classify a single object from canonical feature values.
    pub fn predict_single(&self, values: &IndexMap<String, f64>) -> Result<TargetClass> {
        self.dispatcher.predict_single(values)
    }

    /// Harmonize an upload and make it the session's dataset.
    ///
    /// On failure the session is left as it was.
    pub fn upload(&self, session: &mut Session, name: &str, bytes: &[u8]) -> Result<UploadSummary> {
        let (dataset, source) = self.harmonize_bytes(name, bytes)?;
        let report = dataset.report.clone();
        session.set_dataset(dataset);
        Ok(UploadSummary { source, report })
    }

    /// Train on the session's dataset and keep the model.
    ///
    /// A failed run leaves any previously trained model in place.
    pub fn train_session(
        &self,
        session: &mut Session,
        backend: &str,
        hyperparameters: &Hyperparameters,
    ) -> Result<TrainingResult> {
        let dataset = session.dataset()?.clone();
        let outcome = self.train(&dataset, backend, hyperparameters)?;
        let result = outcome.result.clone();
        session.record_training(&dataset, outcome);
        Ok(result)
    }

    /// Predict the session's dataset with a pretrained model and keep the predictions.
    pub fn predict_session(&self, session: &mut Session) -> Result<PredictionBatch> {
        let dataset = session.dataset()?.clone();
        let batch = self.predict_pretrained(&dataset)?;
        session.record_predictions(&dataset, batch.predictions.clone());
        Ok(batch)
    }

    /// Predict the session's dataset with a supplied model and keep the predictions.
    pub fn predict_supplied_session(&self, session: &mut Session, model_bytes: &[u8]) -> Result<PredictionBatch> {
        let dataset = session.dataset()?.clone();
        let batch = self.predict_with_supplied(&dataset, model_bytes)?;
        session.record_predictions(&dataset, batch.predictions.clone());
        Ok(batch)
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self::new()
    }
}
