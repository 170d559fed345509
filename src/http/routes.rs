use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/sessions/start", post(handlers::start_session))
        .route("/sessions/stop", post(handlers::stop_session))
        .route("/sessions/reset", post(handlers::reset_session))
        // Session queries
        .route("/sessions/status", get(handlers::session_status))
        .route("/sessions/transcript", get(handlers::session_transcript))
        // Transcript-derived features
        .route("/sessions/notes", post(handlers::generate_notes))
        .route("/sessions/chat", post(handlers::chat))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        // The recording UI runs in a browser on another origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
