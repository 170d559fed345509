pub mod capture;
pub mod levels;
pub mod microphone;
pub mod wav;

pub use capture::{AudioBlock, AudioCapture, CaptureConfig};
pub use levels::{analyze, apply_gain, Levels};
pub use microphone::MicrophoneCapture;
pub use wav::encode_wav;
