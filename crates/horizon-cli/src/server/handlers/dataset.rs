//! Dataset upload, processed download and reset.

use std::sync::Arc;

use axum::{Json, extract::Multipart, extract::State, response::Response};
use horizon::UploadSummary;
use horizon::export::PROCESSED_FILE_NAME;
use serde::Serialize;

use super::{attachment, read_upload, run_blocking};
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Plain acknowledgement.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Harmonize an uploaded export and make it the active dataset.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadSummary>, ApiError> {
    let upload = read_upload(multipart, "file", "No file uploaded").await?;

    let horizon = Arc::clone(&state.horizon);
    let name = upload.file_name.clone();
    let (dataset, source) =
        run_blocking(move || horizon.harmonize_bytes(&name, &upload.bytes)).await?;

    let summary = UploadSummary {
        source,
        report: dataset.report.clone(),
    };
    state.session.write().await.set_dataset(dataset);

    tracing::info!(
        file = %upload.file_name,
        rows = summary.report.kept_rows,
        "dataset uploaded"
    );
    Ok(Json(summary))
}

/// Download the canonical table as CSV.
pub async fn save(State(state): State<AppState>) -> Result<Response, ApiError> {
    let bytes = state.session.read().await.download_processed()?;
    Ok(attachment("text/csv", PROCESSED_FILE_NAME, bytes))
}

/// Clear the session.
pub async fn reset(State(state): State<AppState>) -> Json<MessageResponse> {
    state.session.write().await.reset();
    Json(MessageResponse {
        message: "Server state cleared successfully.".to_string(),
    })
}
