use serde::{Deserialize, Deserializer, Serialize};

/// Error payload shape shared by all collaborator endpoints.
#[derive(Debug, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

/// One segment as returned by the transcription endpoint. Times are
/// chunk-relative seconds; the pipeline re-bases them onto the session
/// timeline.
#[derive(Debug, Clone, Deserialize)]
pub struct WireSegment {
    /// Server-assigned id; some backends use integers, others strings.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Response of the transcription upload endpoint.
#[derive(Debug, Deserialize)]
pub struct TranscriptionResponse {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub segments: Vec<WireSegment>,
}

#[derive(Debug, Serialize)]
pub struct NotesRequest {
    pub session_id: String,
    #[serde(rename = "fullTranscript")]
    pub full_transcript: String,
}

#[derive(Debug, Deserialize)]
pub struct NotesResponse {
    #[serde(rename = "updatedNotes")]
    pub updated_notes: String,
}

/// One prior turn in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// `user` or `assistant`.
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub transcript: String,
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Accept segment ids as either JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Str(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Num(n) => n.to_string(),
        Raw::Str(s) => s,
    })
}
