use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::sync::Mutex as AsyncMutex;
use tracing::info;

use super::config::{SessionConfig, TranscriptionMode};
use super::session::Session;
use super::stats::SessionStats;
use crate::audio::{AudioCapture, CaptureConfig, MicrophoneCapture};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::pipeline::PipelineConfig;
use crate::remote::{ChatTurn, RemoteClients};
use crate::speech::{SpeechRecognizer, UnsupportedRecognizer};

/// Builds the audio capture capability for a new session.
pub type CaptureProvider =
    Box<dyn Fn(CaptureConfig) -> Result<Box<dyn AudioCapture>> + Send + Sync>;

/// Builds the speech recognizer capability for a new session.
pub type RecognizerProvider = Box<dyn Fn() -> Box<dyn SpeechRecognizer> + Send + Sync>;

/// Owns the single active recording session and the collaborator clients.
///
/// Exactly one session may hold the audio resources at a time; starting
/// while one is recording is a conflict. A stopped session stays available
/// (frozen) for transcript, notes and chat until the next start or reset
/// replaces it.
pub struct SessionManager {
    defaults: SessionDefaults,
    clients: RemoteClients,
    capture_provider: CaptureProvider,
    recognizer_provider: RecognizerProvider,
    current: AsyncMutex<Option<Arc<Session>>>,
}

#[derive(Debug, Clone)]
struct SessionDefaults {
    mode: TranscriptionMode,
    flush_interval: std::time::Duration,
    process_interval: std::time::Duration,
    capture: CaptureConfig,
    pipeline: PipelineConfig,
}

impl SessionManager {
    /// Manager with the default capabilities: cpal microphone capture and
    /// no speech recognizer (live mode fails fast on this host).
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_providers(
            config,
            Box::new(|capture_config| {
                Ok(Box::new(MicrophoneCapture::new(capture_config)) as Box<dyn AudioCapture>)
            }),
            Box::new(|| Box::new(UnsupportedRecognizer) as Box<dyn SpeechRecognizer>),
        )
    }

    /// Manager with injected capabilities; used by tests and embedders that
    /// bring their own capture or recognizer.
    pub fn with_providers(
        config: &Config,
        capture_provider: CaptureProvider,
        recognizer_provider: RecognizerProvider,
    ) -> Result<Self> {
        let mode: TranscriptionMode = config
            .recording
            .mode
            .parse()
            .context("Invalid recording.mode in configuration")?;

        let capture = CaptureConfig {
            sample_rate: config.audio.sample_rate,
            channels: config.audio.channels,
            block_size: config.audio.block_size,
            input_gain: config.audio.input_gain,
            ..CaptureConfig::default()
        };

        let pipeline = PipelineConfig {
            sample_rate: config.audio.sample_rate,
            channels: config.audio.channels,
            min_chunk_samples: config.recording.min_chunk_samples,
            ..PipelineConfig::default()
        };

        Ok(Self {
            defaults: SessionDefaults {
                mode,
                flush_interval: std::time::Duration::from_secs(
                    config.recording.flush_interval_secs,
                ),
                process_interval: std::time::Duration::from_secs(
                    config.recording.process_interval_secs,
                ),
                capture,
                pipeline,
            },
            clients: RemoteClients::new(
                &config.endpoints.transcribe_url,
                &config.endpoints.notes_url,
                &config.endpoints.chat_url,
            ),
            capture_provider,
            recognizer_provider,
            current: AsyncMutex::new(None),
        })
    }

    /// Start a new session, replacing any stopped one.
    pub async fn start_session(&self, mode: Option<TranscriptionMode>) -> Result<Arc<Session>> {
        let mut current = self.current.lock().await;

        if let Some(session) = current.as_ref() {
            if session.is_recording() {
                bail!(
                    "Session {} is already recording",
                    session.session_id()
                );
            }
        }

        let mode = mode.unwrap_or(self.defaults.mode);
        let config = SessionConfig {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            mode,
            flush_interval: self.defaults.flush_interval,
            process_interval: self.defaults.process_interval,
            capture: self.defaults.capture.clone(),
            pipeline: self.defaults.pipeline.clone(),
        };
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());

        let session = match mode {
            TranscriptionMode::Chunked => {
                let capture = (self.capture_provider)(config.capture.clone())?;
                Session::start_chunked(config, clock, self.clients.transcription.clone(), capture)
                    .await?
            }
            TranscriptionMode::Live => {
                let recognizer = (self.recognizer_provider)();
                Session::start_live(config, clock, recognizer).await?
            }
        };

        *current = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Stop the current session if there is one. Returns its final stats.
    pub async fn stop_session(&self) -> Option<SessionStats> {
        let current = self.current.lock().await;
        match current.as_ref() {
            Some(session) => Some(session.stop().await),
            None => None,
        }
    }

    /// The active-or-last session.
    pub async fn current(&self) -> Option<Arc<Session>> {
        self.current.lock().await.clone()
    }

    /// Discard the current session entirely, stopping it first if needed.
    pub async fn reset(&self) {
        let mut current = self.current.lock().await;
        if let Some(session) = current.take() {
            if session.is_recording() {
                session.stop().await;
            }
            info!(session_id = %session.session_id(), "Session discarded");
        }
    }

    /// Generate notes for the current session's transcript.
    pub async fn generate_notes(&self) -> Result<String> {
        let session = self
            .current()
            .await
            .context("No session to generate notes for")?;
        session.generate_notes(&self.clients.notes).await
    }

    /// Ask a question about the current session's transcript.
    pub async fn chat(&self, message: &str, history: &[ChatTurn]) -> Result<ChatTurn> {
        let session = self.current().await.context("No session to chat about")?;
        Ok(session.chat(&self.clients.chat, message, history).await)
    }
}
