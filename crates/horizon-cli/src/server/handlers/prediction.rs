//! Batch, supplied-model and single-object prediction.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State, rejection::JsonRejection},
    response::Response,
};
use horizon::export::PREDICTIONS_FILE_NAME;
use horizon::{HarmonizedDataset, PredictionBatch, TargetClass};
use indexmap::IndexMap;
use serde::Serialize;

use super::{attachment, read_upload, run_blocking};
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Response for `/predict_single`.
#[derive(Serialize)]
pub struct SinglePrediction {
    /// Ordinal class, 0 to 2.
    pub prediction: TargetClass,
    pub label: &'static str,
}

/// Predict the active dataset with the matching pretrained model.
pub async fn predict(State(state): State<AppState>) -> Result<Json<PredictionBatch>, ApiError> {
    let dataset = Arc::clone(state.session.read().await.dataset()?);

    let horizon = Arc::clone(&state.horizon);
    let data = Arc::clone(&dataset);
    let batch = run_blocking(move || horizon.predict_pretrained(&data)).await?;

    store(&state, &dataset, &batch).await?;
    Ok(Json(batch))
}

/// Predict the active dataset with a model uploaded in the `model_file` field.
pub async fn predict_with_uploaded_model(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PredictionBatch>, ApiError> {
    let dataset = state
        .session
        .read()
        .await
        .dataset()
        .map(Arc::clone)
        .map_err(|_| ApiError::BadRequest("Please upload and process a dataset first.".to_string()))?;
    let upload = read_upload(multipart, "model_file", "No model file was uploaded.").await?;

    let horizon = Arc::clone(&state.horizon);
    let data = Arc::clone(&dataset);
    let batch = run_blocking(move || horizon.predict_with_supplied(&data, &upload.bytes)).await?;

    store(&state, &dataset, &batch).await?;
    Ok(Json(batch))
}

/// Classify one object from a JSON map of feature values.
pub async fn predict_single(
    State(state): State<AppState>,
    body: Result<Json<IndexMap<String, f64>>, JsonRejection>,
) -> Result<Json<SinglePrediction>, ApiError> {
    let Json(values) = body.map_err(|_| ApiError::BadRequest("Request must be JSON".to_string()))?;

    let horizon = Arc::clone(&state.horizon);
    let class = run_blocking(move || horizon.predict_single(&values)).await?;

    Ok(Json(SinglePrediction {
        prediction: class,
        label: class.label(),
    }))
}

/// Download the unscaled table with the stored predictions.
pub async fn download_predictions(State(state): State<AppState>) -> Result<Response, ApiError> {
    let bytes = state.session.read().await.download_predictions()?;
    Ok(attachment("text/csv", PREDICTIONS_FILE_NAME, bytes))
}

async fn store(state: &AppState, dataset: &Arc<HarmonizedDataset>, batch: &PredictionBatch) -> Result<(), ApiError> {
    let recorded = state
        .session
        .write()
        .await
        .record_predictions(dataset, batch.predictions.clone());
    if !recorded {
        return Err(ApiError::Conflict(
            "The dataset was replaced while predicting; the predictions were discarded.".to_string(),
        ));
    }
    tracing::info!(rows = batch.count, "predictions stored");
    Ok(())
}
