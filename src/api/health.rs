//! Health check endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::ApiState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always "online" while the process serves requests
    pub status: &'static str,
    /// Service name
    pub server: &'static str,
    /// Crate version
    pub version: &'static str,
    /// Number of active WebSocket sessions
    pub clients: usize,
    /// Seconds since startup
    pub uptime_secs: u64,
}

/// Build the health router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}

/// Liveness probe with basic service stats
async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "online",
        server: "Friday Voice Server",
        version: env!("CARGO_PKG_VERSION"),
        clients: state.relay.active_sessions().await,
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}
