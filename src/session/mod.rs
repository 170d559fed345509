//! Recording session management
//!
//! A `Session` wires the audio capture into the chunked transcription
//! pipeline (or a speech recognizer into the live reconciler), owns the
//! transcript store, and drives the periodic flush/process timers.
//! `SessionManager` enforces the single-active-session rule and carries
//! the collaborator clients.

mod config;
mod manager;
mod session;
mod stats;

pub use config::{SessionConfig, TranscriptionMode};
pub use manager::{CaptureProvider, RecognizerProvider, SessionManager};
pub use session::{Session, TranscriptView, CHAT_FALLBACK};
pub use stats::SessionStats;
