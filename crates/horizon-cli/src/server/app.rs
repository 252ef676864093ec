//! Axum application setup.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use super::handlers;
use super::state::AppState;

/// Survey exports run to tens of megabytes.
const MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Dataset
        .route("/upload", post(handlers::upload))
        .route("/save", get(handlers::save))
        .route("/reset", post(handlers::reset))
        // Training
        .route("/train", post(handlers::train))
        .route("/download_model", get(handlers::download_model))
        // Prediction
        .route("/predict", post(handlers::predict))
        .route(
            "/predict_with_uploaded_model",
            post(handlers::predict_with_uploaded_model),
        )
        .route("/predict_single", post(handlers::predict_single))
        .route("/download_predictions", get(handlers::download_predictions))
        // Samples
        .route("/download_sample/:name", get(handlers::download_sample));

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));

    tracing::info!(%addr, "server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
