use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::audio::{self, wav};
use crate::remote::TranscriptionClient;
use crate::transcript::{TranscriptSegment, TranscriptStore};

/// Pipeline thresholds and audio parameters.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sample rate the buffered audio was captured at.
    pub sample_rate: u32,
    /// Channel count of the buffered audio.
    pub channels: u16,
    /// Chunks with fewer samples than this are skipped before upload.
    pub min_chunk_samples: usize,
    /// Peak amplitude below which a chunk may be silence.
    pub silence_peak: f32,
    /// RMS below which a chunk may be silence. Both thresholds must be
    /// undershot for the chunk to be discarded.
    pub silence_rms: f32,
    /// Peak amplitude below which a quiet-but-audible chunk gets a single
    /// linear gain correction before encoding.
    pub quiet_peak: f32,
    /// Gain correction target as a fraction of full scale.
    pub gain_target: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
            min_chunk_samples: 1000,
            silence_peak: 0.01,
            silence_rms: 0.005,
            quiet_peak: 0.1,
            gain_target: 0.8,
        }
    }
}

/// What a process pass did with the buffered audio.
#[derive(Debug, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Nothing buffered since the last pass.
    Empty,
    /// Chunk was under the minimum sample count and was skipped.
    TooSmall,
    /// Chunk classified as silence and discarded without an upload.
    Silence,
    /// Chunk uploaded; `merged` segments were new to the store.
    Uploaded { merged: usize },
}

/// Periodic merge-encode-upload pipeline.
///
/// Blocks are pushed from the capture feeder; `process` is invoked by the
/// session's interval timer (and once more on stop, covering the unflushed
/// tail). Uploads are serialized per session behind an async mutex, so a
/// tick that fires while a previous upload is still in flight waits instead
/// of racing it; id-based de-duplication on merge remains as a second line
/// of defense.
pub struct ChunkedTranscriptionPipeline {
    config: PipelineConfig,
    client: TranscriptionClient,
    buffer: Mutex<Vec<f32>>,
    /// Elapsed ms at which the currently buffered audio began.
    chunk_start_ms: AtomicU64,
    upload_gate: AsyncMutex<()>,
    chunks_uploaded: AtomicU64,
}

impl ChunkedTranscriptionPipeline {
    pub fn new(config: PipelineConfig, client: TranscriptionClient) -> Self {
        Self {
            config,
            client,
            buffer: Mutex::new(Vec::new()),
            chunk_start_ms: AtomicU64::new(0),
            upload_gate: AsyncMutex::new(()),
            chunks_uploaded: AtomicU64::new(0),
        }
    }

    /// Buffer one block of captured samples.
    pub fn push_block(&self, samples: &[f32]) {
        let mut buffer = self.buffer.lock().expect("buffer lock");
        buffer.extend_from_slice(samples);
    }

    pub fn buffered_samples(&self) -> usize {
        self.buffer.lock().expect("buffer lock").len()
    }

    pub fn chunks_uploaded(&self) -> u64 {
        self.chunks_uploaded.load(Ordering::SeqCst)
    }

    /// Drain the buffer and, unless the chunk is empty, too small or
    /// silent, upload it and merge the resulting segments into `store`.
    ///
    /// `elapsed_ms` is the time since recording start at the moment of this
    /// pass; the drained chunk is stamped with the elapsed time of the
    /// previous pass, which is when its audio began.
    pub async fn process(
        &self,
        elapsed_ms: u64,
        store: &Mutex<TranscriptStore>,
    ) -> Result<ProcessOutcome> {
        let _gate = self.upload_gate.lock().await;

        let mut samples = {
            let mut buffer = self.buffer.lock().expect("buffer lock");
            if buffer.is_empty() {
                return Ok(ProcessOutcome::Empty);
            }
            std::mem::take(&mut *buffer)
        };

        // The buffered audio started when the previous pass drained.
        let offset_ms = self.chunk_start_ms.swap(elapsed_ms, Ordering::SeqCst);

        if samples.len() < self.config.min_chunk_samples {
            warn!(
                samples = samples.len(),
                "Audio chunk too small, skipping processing"
            );
            return Ok(ProcessOutcome::TooSmall);
        }

        let levels = audio::analyze(&samples);
        debug!(peak = levels.peak, rms = levels.rms, "Chunk audio levels");

        if levels.peak < self.config.silence_peak && levels.rms < self.config.silence_rms {
            info!(
                peak = levels.peak,
                rms = levels.rms,
                "Audio level too low, likely silence - skipping upload"
            );
            return Ok(ProcessOutcome::Silence);
        }

        if levels.peak < self.config.quiet_peak && levels.peak > 0.0 {
            let gain = self.config.gain_target / levels.peak;
            info!(peak = levels.peak, gain, "Quiet chunk, applying gain correction");
            audio::apply_gain(&mut samples, gain);
        }

        let wav_bytes = wav::encode_wav(&samples, self.config.sample_rate, self.config.channels)
            .context("Failed to encode audio chunk")?;

        debug!(
            bytes = wav_bytes.len(),
            offset_ms, "Sending audio chunk for transcription"
        );

        let response = self.client.transcribe_chunk(wav_bytes, offset_ms).await?;
        self.chunks_uploaded.fetch_add(1, Ordering::SeqCst);

        let segments = rebase_segments(&response, offset_ms);
        let merged = {
            let mut store = store.lock().expect("store lock");
            store.merge(segments)
        };

        info!(merged, offset_ms, "Merged transcription segments");
        Ok(ProcessOutcome::Uploaded { merged })
    }
}

/// Re-base chunk-relative segment times onto the session timeline. A
/// response with no segments but non-empty text yields one synthesized
/// segment with an offset-derived id, so repeated text-only responses from
/// different chunks never collide in the store.
fn rebase_segments(
    response: &crate::remote::TranscriptionResponse,
    offset_ms: u64,
) -> Vec<TranscriptSegment> {
    let offset_secs = offset_ms as f64 / 1000.0;

    if response.segments.is_empty() {
        let text = response.text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        debug!("No segments in response, synthesizing one from text");
        return vec![TranscriptSegment::new(
            format!("chunk-{offset_ms}-0"),
            offset_secs,
            offset_secs + 2.0,
            text,
        )];
    }

    response
        .segments
        .iter()
        .filter(|s| !s.text.trim().is_empty())
        .map(|s| {
            TranscriptSegment::new(
                s.id.clone(),
                s.start + offset_secs,
                s.end + offset_secs,
                s.text.trim(),
            )
        })
        .collect()
}
