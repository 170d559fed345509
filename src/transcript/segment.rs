use serde::{Deserialize, Serialize};

/// One timestamped unit of transcribed text.
///
/// Segments come from two producers: the chunked transcription pipeline
/// (server-assigned ids, chunk-relative times re-based to the session) and
/// the live speech reconciler (locally assigned `live-N` ids).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Unique id within a session, used to drop duplicates from
    /// overlapping or retried chunk uploads.
    pub id: String,

    /// Start offset in seconds since recording started.
    pub start: f64,

    /// End offset in seconds since recording started.
    pub end: f64,

    /// Transcribed text.
    pub text: String,

    /// Display timestamp derived from `start`, formatted `m:ss`.
    pub timestamp: String,
}

impl TranscriptSegment {
    pub fn new(id: impl Into<String>, start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            text: text.into(),
            timestamp: format_timestamp(start),
        }
    }
}

/// Format a second offset as `minutes:seconds` with seconds zero-padded
/// to two digits, e.g. `0:03` or `12:45`.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let mins = total / 60;
    let secs = total % 60;
    format!("{}:{:02}", mins, secs)
}
