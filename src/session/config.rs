use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::CaptureConfig;
use crate::pipeline::PipelineConfig;

/// How a session turns speech into transcript segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionMode {
    /// Continuous speech recognition events reconciled locally.
    Live,
    /// Periodic WAV chunk uploads to the transcription endpoint.
    Chunked,
}

impl std::str::FromStr for TranscriptionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(Self::Live),
            "chunked" => Ok(Self::Chunked),
            other => anyhow::bail!("unknown transcription mode: {other:?} (expected live|chunked)"),
        }
    }
}

/// Configuration for one recording session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Unique session identifier.
    pub session_id: String,

    /// Transcription mode for this session.
    pub mode: TranscriptionMode,

    /// Interval between live reconciler flushes.
    pub flush_interval: Duration,

    /// Interval between chunk process-and-upload passes.
    pub process_interval: Duration,

    /// Audio capture parameters (chunked mode).
    pub capture: CaptureConfig,

    /// Pipeline thresholds (chunked mode).
    pub pipeline: PipelineConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            mode: TranscriptionMode::Chunked,
            flush_interval: Duration::from_secs(5),
            process_interval: Duration::from_secs(5),
            capture: CaptureConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}
