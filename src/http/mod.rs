//! HTTP API server for external control (browser client)
//!
//! This module provides a REST API for controlling recording sessions:
//! - POST /sessions/start - Start a new recording session
//! - POST /sessions/stop - Stop the active session
//! - POST /sessions/reset - Discard the current session
//! - GET /sessions/status - Query session status
//! - GET /sessions/transcript - Get accumulated transcript
//! - POST /sessions/notes - Generate structured notes from the transcript
//! - POST /sessions/chat - Ask a question grounded in the transcript
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
