//! Error types for the horizon library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for horizon operations.
#[derive(Debug, Error)]
pub enum HorizonError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No line within the scan bound looked like a header carrying a target column.
    #[error("Could not detect valid dataset header within the first {scanned} lines")]
    HeaderNotFound { scanned: usize },

    /// The harmonizer found none of the known target columns.
    #[error("No valid target column found in this dataset (expected one of: {expected})")]
    NoTargetColumn { expected: String },

    /// Unknown training backend name.
    #[error("Invalid model choice '{0}' (expected 'xgb' or 'lgbm')")]
    InvalidBackend(String),

    /// Fitting or evaluating a model failed.
    #[error("Training failed: {0}")]
    Training(String),

    /// A model artifact carried neither known feature-name metadata shape.
    #[error("Could not determine feature names from model artifact: {0}")]
    UnknownModelFormat(String),

    /// Inference failed (feature mismatch, corrupt artifact).
    #[error("Prediction failed: {0}")]
    Prediction(String),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to process.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error writing or reading persisted artifacts.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An operation needed a harmonized dataset but none is active.
    #[error("No dataset uploaded yet.")]
    NoDataset,

    /// An operation needed predictions but none were generated.
    #[error("No predictions have been generated to download.")]
    NoPredictions,

    /// An operation needed a trained model but none is active.
    #[error("No model has been trained yet.")]
    NoTrainedModel,

    /// Fetching a remote sample dataset failed.
    #[error("Failed to fetch the dataset: {0}")]
    Download(String),
}

impl HorizonError {
    /// Short machine-readable kind, used in structured error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            HorizonError::Io { .. } => "io",
            HorizonError::HeaderNotFound { .. } => "header_not_found",
            HorizonError::NoTargetColumn { .. } => "no_target_column",
            HorizonError::InvalidBackend(_) => "invalid_backend",
            HorizonError::Training(_) => "training_failure",
            HorizonError::UnknownModelFormat(_) => "unknown_model_format",
            HorizonError::Prediction(_) => "prediction_failure",
            HorizonError::Csv(_) => "csv",
            HorizonError::EmptyData(_) => "empty_data",
            HorizonError::Config(_) => "config",
            HorizonError::Persistence(_) => "persistence",
            HorizonError::Json(_) => "json",
            HorizonError::NoDataset => "no_dataset",
            HorizonError::NoPredictions => "no_predictions",
            HorizonError::NoTrainedModel => "no_trained_model",
            HorizonError::Download(_) => "download",
        }
    }

    /// Whether the error was caused by the caller's input rather than the system.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            HorizonError::HeaderNotFound { .. }
                | HorizonError::NoTargetColumn { .. }
                | HorizonError::InvalidBackend(_)
                | HorizonError::EmptyData(_)
                | HorizonError::NoDataset
                | HorizonError::NoPredictions
                | HorizonError::NoTrainedModel
        )
    }
}

/// Result type alias for horizon operations.
pub type Result<T> = std::result::Result<T, HorizonError>;
