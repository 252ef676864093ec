//! Application state for the web server.

use std::sync::Arc;
use tokio::sync::RwLock;

use horizon::{Horizon, Session};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline configuration and model dispatch.
    pub horizon: Arc<Horizon>,
    /// The one working session the API operates on.
    pub session: Arc<RwLock<Session>>,
}

impl AppState {
    /// Create new application state with an empty session.
    pub fn new(horizon: Horizon) -> Self {
        Self {
            horizon: Arc::new(horizon),
            session: Arc::new(RwLock::new(Session::new())),
        }
    }
}
