//! Sample catalog proxy.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Response,
};
use horizon::samples::{SampleDataset, SampleFetcher};

use super::{attachment, run_blocking};
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Fetch a sample catalog upstream and hand it back as a download.
pub async fn download_sample(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let sample = SampleDataset::from_name(&name)
        .ok_or_else(|| ApiError::NotFound("Invalid dataset name".to_string()))?;

    let horizon = Arc::clone(&state.horizon);
    // The blocking client must be built off the async runtime.
    let bytes = run_blocking(move || {
        SampleFetcher::with_urls(horizon.config().sample_urls.clone())?.fetch(sample)
    })
    .await?;

    Ok(attachment("text/csv", &sample.file_name(), bytes))
}
