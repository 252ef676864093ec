//! API request handlers.

mod dataset;
mod prediction;
mod samples;
mod training;

pub use dataset::*;
pub use prediction::*;
pub use samples::*;
pub use training::*;

use axum::extract::Multipart;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::server::error::ApiError;

/// Run CPU-bound or blocking library work off the async runtime.
async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> horizon::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("worker task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// A file upload read from a multipart body.
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

/// Read the multipart field `name`, skipping any others.
///
/// `missing` is the message returned when the field is absent or empty.
async fn read_upload(mut multipart: Multipart, name: &str, missing: &str) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(name) {
            continue;
        }
        let file_name = field.file_name().unwrap_or(name).to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
        if bytes.is_empty() {
            break;
        }
        return Ok(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::BadRequest(missing.to_string()))
}

/// A download response with a suggested file name.
fn attachment(content_type: &str, file_name: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}
