use anyhow::Result;
use tokio::sync::mpsc;

/// One fixed-size block of mono floating-point samples handed to the
/// transcription pipeline. Samples are in the nominal [-1.0, 1.0] range
/// with the configured input gain already applied.
#[derive(Debug, Clone)]
pub struct AudioBlock {
    pub samples: Vec<f32>,
}

/// Configuration for audio capture, tuned for speech input.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate (16 kHz for speech transcription).
    pub sample_rate: u32,
    /// Target channel count (1 = mono).
    pub channels: u16,
    /// Samples per emitted block.
    pub block_size: usize,
    /// Linear gain boost applied before blocks are handed off.
    pub input_gain: f32,
    /// Request echo cancellation from the device layer where supported.
    pub echo_cancellation: bool,
    /// Request noise suppression from the device layer where supported.
    pub noise_suppression: bool,
    /// Request automatic gain control from the device layer where supported.
    pub auto_gain_control: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
            block_size: 4096,
            input_gain: 1.5,
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

/// Audio capture capability.
///
/// The active session owns the underlying device stream exclusively for its
/// lifetime. Implementations must release every device resource on `stop`
/// and on any startup failure; a capture that cannot acquire its input
/// device fails fast from `start` and the session never transitions to
/// the recording state.
#[async_trait::async_trait]
pub trait AudioCapture: Send {
    /// Start capturing. Returns a receiver of fixed-size sample blocks.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioBlock>>;

    /// Stop capturing and release all A/V resources. Idempotent.
    async fn stop(&mut self) -> Result<()>;

    /// Whether the capture is currently running.
    fn is_capturing(&self) -> bool;

    /// Backend name for logging.
    fn name(&self) -> &str;
}
