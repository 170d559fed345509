use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::state::AppState;
use crate::notes;
use crate::remote::ChatTurn;
use crate::session::{SessionStats, TranscriptionMode};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Optional transcription mode override: "live" or "chunked".
    pub mode: Option<TranscriptionMode>,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub mode: TranscriptionMode,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StopSessionResponse {
    pub status: String,
    pub stats: SessionStats,
}

#[derive(Debug, Serialize)]
pub struct NotesResponse {
    pub notes: String,
    pub html: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponseBody {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions/start
/// Start a new recording session. The body is optional; a body-less start
/// uses the configured default mode.
pub async fn start_session(
    State(state): State<AppState>,
    req: Option<Json<StartSessionRequest>>,
) -> impl IntoResponse {
    let mode = req.and_then(|Json(req)| req.mode);
    // Check for an active recording first so callers get a clean conflict.
    if let Some(session) = state.manager.current().await {
        if session.is_recording() {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Session {} is already recording", session.session_id()),
                }),
            )
                .into_response();
        }
    }

    match state.manager.start_session(mode).await {
        Ok(session) => {
            info!(session_id = %session.session_id(), "Recording started via API");
            (
                StatusCode::OK,
                Json(StartSessionResponse {
                    session_id: session.session_id().to_string(),
                    mode: session.mode(),
                    status: "recording".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to start session: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to start session: {e:#}"),
                }),
            )
                .into_response()
        }
    }
}

/// POST /sessions/stop
/// Stop the active recording session.
pub async fn stop_session(State(state): State<AppState>) -> impl IntoResponse {
    match state.manager.stop_session().await {
        Some(stats) => (
            StatusCode::OK,
            Json(StopSessionResponse {
                status: "stopped".to_string(),
                stats,
            }),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No session to stop".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /sessions/status
/// Stats for the active-or-last session.
pub async fn session_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.manager.current().await {
        Some(session) => (StatusCode::OK, Json(session.stats())).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No session".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /sessions/transcript
/// Transcript accumulated so far (plus interim text in live mode).
pub async fn session_transcript(State(state): State<AppState>) -> impl IntoResponse {
    match state.manager.current().await {
        Some(session) => (StatusCode::OK, Json(session.transcript())).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No session".to_string(),
            }),
        )
            .into_response(),
    }
}

/// POST /sessions/notes
/// Generate structured notes from the transcript.
pub async fn generate_notes(State(state): State<AppState>) -> impl IntoResponse {
    match state.manager.generate_notes().await {
        Ok(notes_text) => (
            StatusCode::OK,
            Json(NotesResponse {
                html: notes::render_html(&notes_text),
                notes: notes_text,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to generate notes: {e:#}");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("Failed to generate notes: {e:#}"),
                }),
            )
                .into_response()
        }
    }
}

/// POST /sessions/chat
/// Ask a question grounded in the transcript.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequestBody>,
) -> impl IntoResponse {
    if req.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Message is required".to_string(),
            }),
        )
            .into_response();
    }

    match state.manager.chat(&req.message, &req.history).await {
        Ok(turn) => (
            StatusCode::OK,
            Json(ChatResponseBody {
                response: turn.content,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("{e:#}"),
            }),
        )
            .into_response(),
    }
}

/// POST /sessions/reset
/// Discard the current session entirely, stopping it first if needed.
pub async fn reset_session(State(state): State<AppState>) -> impl IntoResponse {
    state.manager.reset().await;
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "reset" })),
    )
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
