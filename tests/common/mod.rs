// Shared test helpers: scripted mock HTTP endpoints and scripted
// capture/recognizer capabilities for driving sessions without real
// audio hardware or network services.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::Router;
use tokio::sync::mpsc;

use lectern::audio::{AudioBlock, AudioCapture};
use lectern::speech::{RecognizerError, RecognizerSignal, SpeechRecognizer};

// ============================================================================
// Mock HTTP endpoint
// ============================================================================

#[derive(Clone)]
struct MockServerState {
    responses: Arc<Mutex<VecDeque<(StatusCode, serde_json::Value)>>>,
    hits: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    response_delay: std::time::Duration,
}

/// A scripted HTTP endpoint bound to an ephemeral local port. Each request
/// pops the next scripted response; unscripted requests get a 500.
pub struct MockEndpoint {
    pub url: String,
    hits: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockEndpoint {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Highest number of requests ever in flight at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

async fn mock_handler(State(state): State<MockServerState>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let concurrent = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.max_in_flight.fetch_max(concurrent, Ordering::SeqCst);

    if !state.response_delay.is_zero() {
        tokio::time::sleep(state.response_delay).await;
    }

    let next = state.responses.lock().unwrap().pop_front();
    state.in_flight.fetch_sub(1, Ordering::SeqCst);
    match next {
        Some((status, body)) => (status, Json(body)),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "unscripted request" })),
        ),
    }
}

/// Spawn a mock endpoint serving the given responses in order.
pub async fn spawn_endpoint(responses: Vec<(StatusCode, serde_json::Value)>) -> MockEndpoint {
    spawn_slow_endpoint(responses, std::time::Duration::ZERO).await
}

/// Spawn a mock endpoint that holds every response for `delay` before
/// answering, for observing request overlap.
pub async fn spawn_slow_endpoint(
    responses: Vec<(StatusCode, serde_json::Value)>,
    delay: std::time::Duration,
) -> MockEndpoint {
    let state = MockServerState {
        responses: Arc::new(Mutex::new(responses.into())),
        hits: Arc::new(AtomicUsize::new(0)),
        in_flight: Arc::new(AtomicUsize::new(0)),
        max_in_flight: Arc::new(AtomicUsize::new(0)),
        response_delay: delay,
    };
    let hits = Arc::clone(&state.hits);
    let max_in_flight = Arc::clone(&state.max_in_flight);

    let app = Router::new().fallback(mock_handler).with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock endpoint");
    let addr = listener.local_addr().expect("mock endpoint addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock endpoint serve");
    });

    MockEndpoint {
        url: format!("http://{addr}"),
        hits,
        max_in_flight,
    }
}

// ============================================================================
// Scripted audio capture
// ============================================================================

/// Capture capability that emits a fixed list of sample blocks on start
/// and then keeps the channel open until stopped.
pub struct ScriptedCapture {
    blocks: Vec<Vec<f32>>,
    tx: Option<mpsc::Sender<AudioBlock>>,
    capturing: bool,
}

impl ScriptedCapture {
    pub fn new(blocks: Vec<Vec<f32>>) -> Self {
        Self {
            blocks,
            tx: None,
            capturing: false,
        }
    }
}

#[async_trait]
impl AudioCapture for ScriptedCapture {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioBlock>> {
        let (tx, rx) = mpsc::channel(64);
        for samples in std::mem::take(&mut self.blocks) {
            tx.send(AudioBlock { samples }).await?;
        }
        self.tx = Some(tx);
        self.capturing = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.tx = None;
        self.capturing = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// ============================================================================
// Scripted speech recognizer
// ============================================================================

/// Recognizer capability that replays a scripted signal sequence. A clone
/// of the live sender is parked in `handle` so tests can inject further
/// signals after start; `restarts` counts transparent restarts.
pub struct ScriptedRecognizer {
    script: Vec<RecognizerSignal>,
    tx: Option<mpsc::Sender<RecognizerSignal>>,
    pub handle: Arc<Mutex<Option<mpsc::Sender<RecognizerSignal>>>>,
    pub restarts: Arc<AtomicUsize>,
}

impl ScriptedRecognizer {
    pub fn new(script: Vec<RecognizerSignal>) -> Self {
        Self {
            script,
            tx: None,
            handle: Arc::new(Mutex::new(None)),
            restarts: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn start(&mut self) -> Result<mpsc::Receiver<RecognizerSignal>, RecognizerError> {
        let (tx, rx) = mpsc::channel(32);
        for signal in self.script.drain(..) {
            tx.send(signal)
                .await
                .map_err(|e| RecognizerError::Fatal(e.to_string()))?;
        }
        *self.handle.lock().unwrap() = Some(tx.clone());
        self.tx = Some(tx);
        Ok(rx)
    }

    async fn restart(&mut self) -> Result<(), RecognizerError> {
        self.restarts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&mut self) {
        self.tx = None;
        *self.handle.lock().unwrap() = None;
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
