use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub recording: RecordingConfig,
    pub endpoints: EndpointConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Capture sample rate; 16 kHz is what speech models expect.
    pub sample_rate: u32,
    pub channels: u16,
    /// Samples per capture block.
    pub block_size: usize,
    /// Linear input gain boost applied at capture time.
    pub input_gain: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordingConfig {
    /// Default transcription mode: "live" or "chunked".
    pub mode: String,
    /// Seconds between live reconciler flushes.
    pub flush_interval_secs: u64,
    /// Seconds between chunk process-and-upload passes.
    pub process_interval_secs: u64,
    /// Chunks with fewer samples than this are skipped.
    pub min_chunk_samples: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub transcribe_url: String,
    pub notes_url: String,
    pub chat_url: String,
}

impl Config {
    /// Load configuration from an optional file layered over built-in
    /// defaults. Endpoint URLs default to a local development stack.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "lectern")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8090)?
            .set_default("audio.sample_rate", 16_000)?
            .set_default("audio.channels", 1)?
            .set_default("audio.block_size", 4096)?
            .set_default("audio.input_gain", 1.5)?
            .set_default("recording.mode", "chunked")?
            .set_default("recording.flush_interval_secs", 5)?
            .set_default("recording.process_interval_secs", 5)?
            .set_default("recording.min_chunk_samples", 1000)?
            .set_default(
                "endpoints.transcribe_url",
                "http://localhost:3000/api/transcribe-chunk",
            )?
            .set_default("endpoints.notes_url", "http://localhost:3000/api/notes")?
            .set_default("endpoints.chat_url", "http://localhost:3000/api/chat")?
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
