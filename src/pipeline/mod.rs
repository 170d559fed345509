//! Chunked audio transcription pipeline
//!
//! Buffers captured sample blocks, periodically merges them into one chunk,
//! filters silence, WAV-encodes the rest, uploads it to the transcription
//! endpoint and merges the returned segments into the transcript store.

mod chunked;

pub use chunked::{ChunkedTranscriptionPipeline, PipelineConfig, ProcessOutcome};
