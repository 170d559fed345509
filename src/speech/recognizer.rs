use tokio::sync::mpsc;

/// One recognition hypothesis within an event.
#[derive(Debug, Clone)]
pub struct RecognitionResult {
    pub text: String,
    /// Final hypotheses will not be revised further; interim ones are
    /// tentative and only suitable for display.
    pub is_final: bool,
}

/// A recognition event carrying the recognizer's cumulative result list.
///
/// `result_index` marks where the newly reported results begin; consumers
/// must only iterate `results[result_index..]`.
#[derive(Debug, Clone)]
pub struct RecognitionEvent {
    pub result_index: usize,
    pub results: Vec<RecognitionResult>,
}

/// Errors raised by a speech recognizer.
#[derive(Debug, thiserror::Error)]
pub enum RecognizerError {
    /// The recognizer heard nothing. Non-fatal; listening continues.
    #[error("no speech detected")]
    NoSpeech,

    /// No recognizer is available in this environment. Fatal at startup:
    /// a live session cannot begin without one.
    #[error("speech recognition is not supported in this environment")]
    Unsupported,

    /// Any other recognizer failure. Recognition halts and the error is
    /// surfaced to the session's error channel.
    #[error("speech recognition error: {0}")]
    Fatal(String),
}

/// Out-of-band notifications from a running recognizer.
#[derive(Debug)]
pub enum RecognizerSignal {
    Event(RecognitionEvent),
    /// The recognizer stopped on its own. Benign while a session still
    /// intends to listen; the session restarts it transparently.
    Ended,
    Error(RecognizerError),
}

/// Continuous speech recognition capability.
///
/// Modeled as an injectable interface so sessions can run against a real
/// recognizer where one exists or fail fast where none does, and so the
/// reconciler can be tested with scripted events.
#[async_trait::async_trait]
pub trait SpeechRecognizer: Send {
    /// Begin continuous recognition. Returns the signal stream; signals
    /// keep flowing on the same channel across restarts.
    async fn start(&mut self) -> Result<mpsc::Receiver<RecognizerSignal>, RecognizerError>;

    /// Restart after a benign self-stop. Events continue on the channel
    /// returned by `start`.
    async fn restart(&mut self) -> Result<(), RecognizerError>;

    /// Stop recognition and close the signal channel. Idempotent.
    async fn stop(&mut self);

    fn name(&self) -> &str;
}

/// The unavailable variant of the recognizer capability. `start` always
/// fails with [`RecognizerError::Unsupported`], which keeps live sessions
/// from ever reaching the recording state on hosts without a recognizer.
pub struct UnsupportedRecognizer;

#[async_trait::async_trait]
impl SpeechRecognizer for UnsupportedRecognizer {
    async fn start(&mut self) -> Result<mpsc::Receiver<RecognizerSignal>, RecognizerError> {
        Err(RecognizerError::Unsupported)
    }

    async fn restart(&mut self) -> Result<(), RecognizerError> {
        Err(RecognizerError::Unsupported)
    }

    async fn stop(&mut self) {}

    fn name(&self) -> &str {
        "unsupported"
    }
}
