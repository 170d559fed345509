use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use super::types::{
    ChatRequest, ChatResponse, ChatTurn, ErrorPayload, NotesRequest, NotesResponse,
    TranscriptionResponse,
};

/// Pull the `error` field out of a failure body where one exists,
/// otherwise fall back to the raw body text.
async fn failure_detail(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorPayload>(&body) {
        Ok(payload) => payload.error,
        Err(_) => body,
    }
}

/// Client for the chunk transcription upload endpoint.
///
/// Uploads a WAV chunk as multipart form data together with the chunk's
/// millisecond offset since recording start. No request timeout is set;
/// failures surface through error responses or transport errors only.
#[derive(Debug, Clone)]
pub struct TranscriptionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl TranscriptionClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub async fn transcribe_chunk(
        &self,
        wav_bytes: Vec<u8>,
        offset_ms: u64,
    ) -> Result<TranscriptionResponse> {
        let size = wav_bytes.len();
        let part = reqwest::multipart::Part::bytes(wav_bytes)
            .file_name("audio-chunk.wav")
            .mime_str("audio/wav")
            .context("Failed to build multipart audio part")?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("timestamp", offset_ms.to_string());

        debug!(size, offset_ms, "Uploading audio chunk");

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .context("Transcription request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!(
                "Transcription endpoint returned {status}: {}",
                failure_detail(response).await
            );
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .context("Failed to parse transcription response")?;

        info!(
            segments = parsed.segments.len(),
            offset_ms, "Chunk transcribed"
        );
        Ok(parsed)
    }
}

/// Client for the notes generation endpoint. Fails closed: no partial
/// notes come back from an unsuccessful response.
#[derive(Debug, Clone)]
pub struct NotesClient {
    http: reqwest::Client,
    endpoint: String,
}

impl NotesClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub async fn generate(&self, session_id: &str, full_transcript: &str) -> Result<String> {
        let request = NotesRequest {
            session_id: session_id.to_string(),
            full_transcript: full_transcript.to_string(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context("Notes request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!(
                "Notes endpoint returned {status}: {}",
                failure_detail(response).await
            );
        }

        let parsed: NotesResponse = response
            .json()
            .await
            .context("Failed to parse notes response")?;

        info!(session_id, "Notes generated");
        Ok(parsed.updated_notes)
    }
}

/// Client for the Q&A chat endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub async fn ask(
        &self,
        message: &str,
        transcript: &str,
        history: &[ChatTurn],
    ) -> Result<String> {
        let request = ChatRequest {
            message: message.to_string(),
            transcript: transcript.to_string(),
            history: history.to_vec(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context("Chat request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!(
                "Chat endpoint returned {status}: {}",
                failure_detail(response).await
            );
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat response")?;

        Ok(parsed.response)
    }
}

/// Bundle of collaborator clients built from the endpoint configuration.
#[derive(Debug, Clone)]
pub struct RemoteClients {
    pub transcription: TranscriptionClient,
    pub notes: NotesClient,
    pub chat: ChatClient,
}

impl RemoteClients {
    pub fn new(transcribe_url: &str, notes_url: &str, chat_url: &str) -> Self {
        Self {
            transcription: TranscriptionClient::new(transcribe_url),
            notes: NotesClient::new(notes_url),
            chat: ChatClient::new(chat_url),
        }
    }
}
