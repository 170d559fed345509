use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::config::{SessionConfig, TranscriptionMode};
use super::stats::SessionStats;
use crate::audio::{AudioBlock, AudioCapture};
use crate::clock::Clock;
use crate::pipeline::{ChunkedTranscriptionPipeline, ProcessOutcome};
use crate::remote::{ChatClient, ChatTurn, NotesClient, TranscriptionClient};
use crate::speech::{LiveSpeechReconciler, RecognizerError, RecognizerSignal, SpeechRecognizer};
use crate::transcript::{TranscriptSegment, TranscriptStore};

/// Assistant turn substituted when the chat endpoint fails; the raw error
/// never reaches the message list.
pub const CHAT_FALLBACK: &str = "Sorry, I encountered an error while processing your question.";

/// Transcript snapshot for display.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptView {
    pub segments: Vec<TranscriptSegment>,
    pub text: String,
    /// Tentative interim text (live mode), display-only.
    pub interim: String,
}

/// One recording session.
///
/// Owns the transcript store and the live audio resources for its lifetime.
/// Timer-driven work (reconciler flush, chunk processing) runs in spawned
/// interval tasks, but the underlying operations (`flush_live`,
/// `process_chunk`) are ordinary methods so tests can drive them
/// deterministically with a manual clock.
pub struct Session {
    config: SessionConfig,
    started_at: DateTime<Utc>,
    /// Elapsed recording time frozen at stop; `None` while recording.
    stopped_elapsed_ms: Mutex<Option<u64>>,
    clock: Arc<dyn Clock>,
    /// Clock reading at recording start; elapsed time is measured from here.
    start_ms: u64,
    is_recording: Arc<AtomicBool>,
    store: Arc<Mutex<TranscriptStore>>,
    reconciler: Arc<Mutex<LiveSpeechReconciler>>,
    pipeline: Option<Arc<ChunkedTranscriptionPipeline>>,
    recognizer: Arc<AsyncMutex<Option<Box<dyn SpeechRecognizer>>>>,
    notes: Mutex<Option<String>>,
    last_error: Arc<Mutex<Option<String>>>,
    shutdown: watch::Sender<bool>,
    tasks: AsyncMutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("started_at", &self.started_at)
            .field("start_ms", &self.start_ms)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start a chunked-transcription session.
    ///
    /// Acquires the audio input before any state transition: a capture
    /// failure (permission denied, no device) is fatal and the session
    /// never reaches the recording state.
    pub async fn start_chunked(
        config: SessionConfig,
        clock: Arc<dyn Clock>,
        client: TranscriptionClient,
        mut capture: Box<dyn AudioCapture>,
    ) -> Result<Arc<Self>> {
        info!(session_id = %config.session_id, "Starting chunked recording session");

        let blocks = capture
            .start()
            .await
            .context("Failed to acquire audio input")?;

        let pipeline = Arc::new(ChunkedTranscriptionPipeline::new(
            config.pipeline.clone(),
            client,
        ));
        let session = Arc::new(Self::init(config, clock, Some(pipeline), None));

        let feeder = {
            let session = Arc::clone(&session);
            let shutdown = session.shutdown.subscribe();
            tokio::spawn(async move { session.run_feeder(blocks, capture, shutdown).await })
        };

        let ticker = {
            let session = Arc::clone(&session);
            let mut shutdown = session.shutdown.subscribe();
            let period = session.config.process_interval;
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                interval.tick().await; // first tick completes immediately
                loop {
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        _ = interval.tick() => {
                            if let Err(e) = session.process_chunk().await {
                                error!("Chunk processing failed: {e:#}");
                            }
                        }
                    }
                }
            })
        };

        session.tasks.lock().await.extend([feeder, ticker]);
        info!(session_id = %session.config.session_id, "Recording session started");
        Ok(session)
    }

    /// Start a live-recognition session.
    ///
    /// An unavailable recognizer fails here, before recording begins.
    pub async fn start_live(
        config: SessionConfig,
        clock: Arc<dyn Clock>,
        mut recognizer: Box<dyn SpeechRecognizer>,
    ) -> Result<Arc<Self>> {
        info!(session_id = %config.session_id, "Starting live recording session");

        let signals = recognizer
            .start()
            .await
            .map_err(|e| anyhow!("Failed to start speech recognition: {e}"))?;

        let session = Arc::new(Self::init(config, clock, None, Some(recognizer)));

        let signal_task = {
            let session = Arc::clone(&session);
            let shutdown = session.shutdown.subscribe();
            tokio::spawn(async move { session.run_signals(signals, shutdown).await })
        };

        let flusher = {
            let session = Arc::clone(&session);
            let mut shutdown = session.shutdown.subscribe();
            let period = session.config.flush_interval;
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                interval.tick().await;
                loop {
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        _ = interval.tick() => session.flush_live(),
                    }
                }
            })
        };

        session.tasks.lock().await.extend([signal_task, flusher]);
        info!(session_id = %session.config.session_id, "Recording session started");
        Ok(session)
    }

    fn init(
        config: SessionConfig,
        clock: Arc<dyn Clock>,
        pipeline: Option<Arc<ChunkedTranscriptionPipeline>>,
        recognizer: Option<Box<dyn SpeechRecognizer>>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        let start_ms = clock.now_ms();
        Self {
            config,
            started_at: Utc::now(),
            stopped_elapsed_ms: Mutex::new(None),
            clock,
            start_ms,
            is_recording: Arc::new(AtomicBool::new(true)),
            store: Arc::new(Mutex::new(TranscriptStore::new())),
            reconciler: Arc::new(Mutex::new(LiveSpeechReconciler::new())),
            pipeline,
            recognizer: Arc::new(AsyncMutex::new(recognizer)),
            notes: Mutex::new(None),
            last_error: Arc::new(Mutex::new(None)),
            shutdown,
            tasks: AsyncMutex::new(Vec::new()),
        }
    }

    /// Feed captured blocks into the pipeline until shutdown, then run the
    /// final drain-and-process pass over any unflushed tail audio before
    /// releasing the capture resources.
    async fn run_feeder(
        &self,
        mut blocks: mpsc::Receiver<AudioBlock>,
        mut capture: Box<dyn AudioCapture>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let pipeline = self
            .pipeline
            .as_ref()
            .expect("feeder runs only in chunked mode");

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                block = blocks.recv() => match block {
                    Some(block) => pipeline.push_block(&block.samples),
                    None => {
                        warn!("Capture channel closed");
                        break;
                    }
                }
            }
        }

        // Tail audio that arrived between the last tick and shutdown.
        while let Ok(block) = blocks.try_recv() {
            pipeline.push_block(&block.samples);
        }
        if let Err(e) = self.process_chunk().await {
            error!("Final chunk processing failed: {e:#}");
        }

        if let Err(e) = capture.stop().await {
            warn!("Failed to stop audio capture: {e:#}");
        }
    }

    /// Consume recognizer signals: events feed the reconciler, benign ends
    /// trigger a transparent restart, fatal errors halt recognition.
    async fn run_signals(
        &self,
        mut signals: mpsc::Receiver<RecognizerSignal>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                signal = signals.recv() => match signal {
                    None => break,
                    Some(RecognizerSignal::Event(event)) => {
                        self.reconciler.lock().expect("reconciler lock").handle_event(&event);
                    }
                    Some(RecognizerSignal::Ended) => {
                        if !self.is_recording.load(Ordering::SeqCst) {
                            continue;
                        }
                        info!("Recognizer ended, attempting restart");
                        let mut guard = self.recognizer.lock().await;
                        if let Some(recognizer) = guard.as_mut() {
                            if let Err(e) = recognizer.restart().await {
                                self.record_error(format!(
                                    "Recognition failed to restart: {e}"
                                ));
                            }
                        }
                    }
                    Some(RecognizerSignal::Error(RecognizerError::NoSpeech)) => {
                        warn!("No speech detected, continuing");
                    }
                    Some(RecognizerSignal::Error(e)) => {
                        self.record_error(format!("Speech recognition error: {e}"));
                        let mut guard = self.recognizer.lock().await;
                        if let Some(recognizer) = guard.as_mut() {
                            recognizer.stop().await;
                        }
                        break;
                    }
                }
            }
        }
    }

    /// Run one pipeline pass now. Called by the interval task, by the final
    /// drain on stop, and directly by tests.
    pub async fn process_chunk(&self) -> Result<ProcessOutcome> {
        let pipeline = self
            .pipeline
            .as_ref()
            .context("session is not in chunked mode")?;
        let outcome = pipeline.process(self.elapsed_ms(), &self.store).await;
        if let Err(e) = &outcome {
            self.record_error(format!("Chunk transcription failed: {e:#}"));
        }
        outcome
    }

    /// Flush the live reconciler into the store, timestamped with the
    /// current elapsed recording time.
    pub fn flush_live(&self) {
        let elapsed_secs = self.elapsed_ms() as f64 / 1000.0;
        let segment = self
            .reconciler
            .lock()
            .expect("reconciler lock")
            .flush(elapsed_secs);
        if let Some(segment) = segment {
            info!(timestamp = %segment.timestamp, text = %segment.text, "Flushed live segment");
            self.store.lock().expect("store lock").push(segment);
        }
    }

    /// Stop recording. Idempotent; safe to call when already stopped.
    ///
    /// Runs the final reconciler flush (live) or lets the feeder run the
    /// final pipeline pass (chunked) before audio resources are released,
    /// then freezes the session. The transcript stays readable.
    pub async fn stop(&self) -> SessionStats {
        if !self.is_recording.swap(false, Ordering::SeqCst) {
            warn!(session_id = %self.config.session_id, "Recording not active");
            return self.stats();
        }

        info!(session_id = %self.config.session_id, "Stopping recording session");

        if self.config.mode == TranscriptionMode::Live {
            self.flush_live();
            let mut guard = self.recognizer.lock().await;
            if let Some(recognizer) = guard.as_mut() {
                recognizer.stop().await;
            }
        }

        let _ = self.shutdown.send(true);

        let handles: Vec<JoinHandle<()>> = self.tasks.lock().await.drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                error!("Session task panicked: {e}");
            }
        }

        *self.stopped_elapsed_ms.lock().expect("stopped lock") = Some(self.elapsed_ms());
        info!(session_id = %self.config.session_id, "Recording session stopped");
        self.stats()
    }

    /// Generate structured notes from the full transcript. Fails closed:
    /// stored notes are untouched unless the endpoint succeeds.
    pub async fn generate_notes(&self, client: &NotesClient) -> Result<String> {
        let rendered = {
            let store = self.store.lock().expect("store lock");
            if store.is_empty() {
                bail!("No transcript available to generate notes from");
            }
            store.render()
        };

        let notes = client.generate(&self.config.session_id, &rendered).await?;
        *self.notes.lock().expect("notes lock") = Some(notes.clone());
        Ok(notes)
    }

    /// Answer a question grounded in the transcript. On endpoint failure
    /// the assistant turn is a fixed apologetic message.
    pub async fn chat(&self, client: &ChatClient, message: &str, history: &[ChatTurn]) -> ChatTurn {
        let transcript = self.store.lock().expect("store lock").render();
        let content = match client.ask(message, &transcript, history).await {
            Ok(content) => content,
            Err(e) => {
                error!("Chat request failed: {e:#}");
                CHAT_FALLBACK.to_string()
            }
        };
        ChatTurn {
            role: "assistant".to_string(),
            content,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    pub fn mode(&self) -> TranscriptionMode {
        self.config.mode
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }

    pub fn notes(&self) -> Option<String> {
        self.notes.lock().expect("notes lock").clone()
    }

    pub fn stats(&self) -> SessionStats {
        let duration_ms = self
            .stopped_elapsed_ms
            .lock()
            .expect("stopped lock")
            .unwrap_or_else(|| self.elapsed_ms());

        SessionStats {
            session_id: self.config.session_id.clone(),
            is_recording: self.is_recording.load(Ordering::SeqCst),
            mode: self.config.mode,
            started_at: self.started_at,
            duration_secs: duration_ms as f64 / 1000.0,
            chunks_uploaded: self
                .pipeline
                .as_ref()
                .map(|p| p.chunks_uploaded())
                .unwrap_or(0),
            segment_count: self.store.lock().expect("store lock").len(),
            last_error: self.last_error.lock().expect("error lock").clone(),
        }
    }

    pub fn transcript(&self) -> TranscriptView {
        let (segments, text) = {
            let store = self.store.lock().expect("store lock");
            (store.segments().to_vec(), store.full_text().to_string())
        };
        let interim = self
            .reconciler
            .lock()
            .expect("reconciler lock")
            .interim_text()
            .to_string();
        TranscriptView {
            segments,
            text,
            interim,
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.clock.now_ms().saturating_sub(self.start_ms)
    }

    fn record_error(&self, message: String) {
        error!("{message}");
        *self.last_error.lock().expect("error lock") = Some(message);
    }
}
