//! Training and trained-model download.

use std::sync::Arc;

use axum::{Json, extract::State, response::Response};
use horizon::{Hyperparameters, TrainingResult};
use serde::Deserialize;

use super::{attachment, run_blocking};
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Request body for `/train`.
#[derive(Debug, Deserialize)]
pub struct TrainRequest {
    /// Backend name, `xgb` or `lgbm`.
    #[serde(default = "default_backend")]
    pub model: String,
    #[serde(default)]
    pub hyperparams: Hyperparameters,
}

fn default_backend() -> String {
    "xgb".to_string()
}

/// Train a backend on the active dataset.
pub async fn train(
    State(state): State<AppState>,
    Json(request): Json<TrainRequest>,
) -> Result<Json<TrainingResult>, ApiError> {
    let dataset = Arc::clone(state.session.read().await.dataset()?);

    let horizon = Arc::clone(&state.horizon);
    let data = Arc::clone(&dataset);
    let outcome = run_blocking(move || horizon.train(&data, &request.model, &request.hyperparams)).await?;

    let result = outcome.result.clone();
    if !state.session.write().await.record_training(&dataset, outcome) {
        return Err(ApiError::Conflict(
            "The dataset was replaced while training; the model was discarded.".to_string(),
        ));
    }

    tracing::info!(
        backend = %result.backend.as_str(),
        accuracy = result.accuracy,
        "model trained"
    );
    Ok(Json(result))
}

/// Download the most recently trained model.
pub async fn download_model(State(state): State<AppState>) -> Result<Response, ApiError> {
    let (file_name, bytes) = state.session.read().await.download_model()?;
    Ok(attachment("application/json", &file_name, bytes))
}
