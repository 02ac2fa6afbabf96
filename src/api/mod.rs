//! HTTP surface: health check, cached audio files, and the voice WebSocket

mod health;
mod websocket;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::relay::SessionRelay;
use crate::Result;

/// Shared state for HTTP handlers
pub struct ApiState {
    /// The session relay
    pub relay: Arc<SessionRelay>,
    /// Cache directory served under `/audio`
    pub cache_dir: PathBuf,
    /// Process start time, for the health endpoint
    pub started_at: Instant,
}

impl ApiState {
    /// Create API state around a relay
    #[must_use]
    pub fn new(relay: Arc<SessionRelay>, cache_dir: PathBuf) -> Self {
        Self {
            relay,
            cache_dir,
            started_at: Instant::now(),
        }
    }
}

/// Build the full router
///
/// Audio artifacts are exposed as static files; protocol messages only ever
/// carry their URL paths.
pub fn router(state: Arc<ApiState>) -> Router {
    let audio_dir = state.cache_dir.clone();
    Router::new()
        .merge(health::router(Arc::clone(&state)))
        .merge(websocket::router(state))
        .nest_service("/audio", ServeDir::new(audio_dir))
        // Browser clients fetch audio artifacts from a different origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serve the API until the process is stopped
///
/// # Errors
///
/// Returns error if the listener cannot bind or the server fails
pub async fn serve(state: Arc<ApiState>, bind: &str, port: u16) -> Result<()> {
    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Friday voice server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
