pub mod audio;
pub mod clock;
pub mod config;
pub mod http;
pub mod notes;
pub mod pipeline;
pub mod remote;
pub mod session;
pub mod speech;
pub mod transcript;

pub use audio::{AudioBlock, AudioCapture, CaptureConfig, Levels, MicrophoneCapture};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use http::{create_router, AppState};
pub use pipeline::{ChunkedTranscriptionPipeline, PipelineConfig, ProcessOutcome};
pub use remote::RemoteClients;
pub use session::{Session, SessionConfig, SessionManager, SessionStats, TranscriptionMode};
pub use speech::{LiveSpeechReconciler, RecognizerSignal, SpeechRecognizer};
pub use transcript::{TranscriptSegment, TranscriptStore};
