//! Per-user working state: the active dataset and what was derived from it.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{HorizonError, Result};
use crate::export;
use crate::harmonize::HarmonizedDataset;
use crate::model::{GradientBoostedModel, artifact};
use crate::schema::TargetClass;
use crate::training::{TrainingOutcome, TrainingResult};

/// A trained model with the evaluation of the run that produced it.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub model: GradientBoostedModel,
    pub result: TrainingResult,
}

impl From<TrainingOutcome> for TrainedModel {
    fn from(outcome: TrainingOutcome) -> Self {
        Self {
            model: outcome.model,
            result: outcome.result,
        }
    }
}

/// Working state owned by one caller.
///
/// A session holds at most one dataset. Replacing it drops the trained model
/// and predictions derived from the previous one. Results computed against a
/// dataset that is no longer active are refused rather than stored.
#[derive(Debug, Clone, Default)]
pub struct Session {
    dataset: Option<Arc<HarmonizedDataset>>,
    trained: Option<Arc<TrainedModel>>,
    predictions: Option<Vec<TargetClass>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing has been uploaded.
    pub fn is_empty(&self) -> bool {
        self.dataset.is_none()
    }

    /// The active dataset.
    pub fn dataset(&self) -> Result<&Arc<HarmonizedDataset>> {
        self.dataset.as_ref().ok_or(HorizonError::NoDataset)
    }

    /// The most recently trained model.
    pub fn trained(&self) -> Result<&Arc<TrainedModel>> {
        self.trained.as_ref().ok_or(HorizonError::NoTrainedModel)
    }

    /// Predictions for the active dataset.
    pub fn predictions(&self) -> Result<&[TargetClass]> {
        self.predictions.as_deref().ok_or(HorizonError::NoPredictions)
    }

    /// Make `dataset` the active dataset, clearing everything derived from
    /// the previous one.
    pub fn set_dataset(&mut self, dataset: HarmonizedDataset) -> Arc<HarmonizedDataset> {
        let dataset = Arc::new(dataset);
        info!(rows = dataset.row_count(), "session dataset replaced");
        self.dataset = Some(Arc::clone(&dataset));
        self.trained = None;
        self.predictions = None;
        dataset
    }

    /// Store a training outcome computed from `dataset`.
    ///
    /// Returns `false` (and stores nothing) when `dataset` is no longer the
    /// active dataset.
    pub fn record_training(&mut self, dataset: &Arc<HarmonizedDataset>, outcome: TrainingOutcome) -> bool {
        if !self.is_active(dataset) {
            debug!("discarding training result for a replaced dataset");
            return false;
        }
        self.trained = Some(Arc::new(outcome.into()));
        true
    }

    /// Store predictions computed from `dataset`; `false` if it was replaced.
    pub fn record_predictions(&mut self, dataset: &Arc<HarmonizedDataset>, predictions: Vec<TargetClass>) -> bool {
        if !self.is_active(dataset) {
            debug!("discarding predictions for a replaced dataset");
            return false;
        }
        self.predictions = Some(predictions);
        true
    }

    /// Back to an empty session.
    pub fn reset(&mut self) {
        *self = Session::default();
        info!("session reset");
    }

    /// The canonical table as CSV.
    pub fn download_processed(&self) -> Result<Vec<u8>> {
        export::frame_csv(&self.dataset()?.canonical)
    }

    /// The unscaled table joined with the stored predictions, as CSV.
    pub fn download_predictions(&self) -> Result<Vec<u8>> {
        let dataset = self.dataset.as_ref().ok_or(HorizonError::NoPredictions)?;
        export::predictions_csv(&dataset.unscaled, self.predictions()?)
    }

    /// The trained model artifact and its download name.
    pub fn download_model(&self) -> Result<(String, Vec<u8>)> {
        let trained = self.trained()?;
        let bytes = artifact::to_json(&trained.model)?;
        Ok((export::model_file_name(trained.model.backend), bytes))
    }

    fn is_active(&self, dataset: &Arc<HarmonizedDataset>) -> bool {
        self.dataset
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harmonize::SchemaHarmonizer;
    use crate::input::DataTable;
    use crate::training::{Hyperparameters, TrainingOrchestrator};

    fn dataset() -> HarmonizedDataset {
        let labels = ["CONFIRMED", "FALSE POSITIVE"];
        let rows = (0..20)
            .map(|i| vec![format!("{}", i % 2 * 10 + i % 3), labels[i % 2].to_string()])
            .collect();
        let table = DataTable::new(
            vec!["koi_prad".to_string(), "koi_disposition".to_string()],
            rows,
            b',',
        );
        SchemaHarmonizer::new().harmonize(&table).unwrap()
    }

    fn outcome(dataset: &HarmonizedDataset) -> TrainingOutcome {
        let hyper = Hyperparameters {
            n_estimators: Some(3),
            ..Default::default()
        };
        TrainingOrchestrator::new()
            .train(&dataset.canonical, &dataset.feature_names, "xgb", &hyper)
            .unwrap()
    }

    #[test]
    fn test_empty_session_errors() {
        let session = Session::new();
        assert!(matches!(session.download_processed(), Err(HorizonError::NoDataset)));
        assert!(matches!(session.download_predictions(), Err(HorizonError::NoPredictions)));
        assert!(matches!(session.download_model(), Err(HorizonError::NoTrainedModel)));
    }

    #[test]
    fn test_new_dataset_clears_derived_state() {
        let mut session = Session::new();
        let first = session.set_dataset(dataset());
        assert!(session.record_training(&first, outcome(&first)));
        assert!(session.record_predictions(&first, vec![TargetClass::Confirmed; first.row_count()]));
        assert!(session.download_model().is_ok());

        session.set_dataset(dataset());
        assert!(matches!(session.trained(), Err(HorizonError::NoTrainedModel)));
        assert!(matches!(session.predictions(), Err(HorizonError::NoPredictions)));
    }

    #[test]
    fn test_stale_results_are_refused() {
        let mut session = Session::new();
        let first = session.set_dataset(dataset());
        let trained = outcome(&first);
        session.set_dataset(dataset());
        assert!(!session.record_training(&first, trained));
        assert!(!session.record_predictions(&first, vec![]));
        assert!(session.trained().is_err());
    }

    #[test]
    fn test_download_predictions_has_label_column() {
        let mut session = Session::new();
        let ds = session.set_dataset(dataset());
        session.record_predictions(&ds, vec![TargetClass::Candidate; ds.row_count()]);
        let text = String::from_utf8(session.download_predictions().unwrap()).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, "koi_prad,target,prediction,prediction_label");
        assert!(text.lines().nth(1).unwrap().ends_with(",1,CANDIDATE"));
    }

    #[test]
    fn test_reset() {
        let mut session = Session::new();
        session.set_dataset(dataset());
        session.reset();
        assert!(session.is_empty());
    }
}
