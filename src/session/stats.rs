use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::TranscriptionMode;

/// Snapshot of a recording session's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Session identifier.
    pub session_id: String,

    /// Whether recording is currently active.
    pub is_recording: bool,

    /// Transcription mode of the session.
    pub mode: TranscriptionMode,

    /// When the recording started.
    pub started_at: DateTime<Utc>,

    /// Recording duration in seconds; frozen once the session stops.
    pub duration_secs: f64,

    /// Number of audio chunks uploaded so far (chunked mode).
    pub chunks_uploaded: u64,

    /// Number of transcript segments in the store.
    pub segment_count: usize,

    /// Most recent user-visible error, if any.
    pub last_error: Option<String>,
}
