//! Continuous speech recognition and transcript reconciliation
//!
//! The recognizer is an injectable capability (real, scripted, or
//! unavailable); `LiveSpeechReconciler` turns its overlapping interim/final
//! event stream into de-duplicated timestamped transcript segments.

mod recognizer;
mod reconciler;

pub use reconciler::LiveSpeechReconciler;
pub use recognizer::{
    RecognitionEvent, RecognitionResult, RecognizerError, RecognizerSignal, SpeechRecognizer,
    UnsupportedRecognizer,
};
