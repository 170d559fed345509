use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::capture::{AudioBlock, AudioCapture, CaptureConfig};

/// Microphone capture backed by cpal.
///
/// The cpal stream is not `Send`, so it lives on a dedicated worker thread
/// for the session's lifetime. The worker converts the device format to
/// mono floats at the target rate, applies the input gain boost, and emits
/// fixed-size blocks. Dropping behind a full channel is preferred over
/// blocking the device callback.
pub struct MicrophoneCapture {
    config: CaptureConfig,
    running: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl MicrophoneCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

#[async_trait::async_trait]
impl AudioCapture for MicrophoneCapture {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioBlock>> {
        if self.running.load(Ordering::SeqCst) {
            return Err(anyhow!("microphone capture already running"));
        }

        debug!(
            echo_cancellation = self.config.echo_cancellation,
            noise_suppression = self.config.noise_suppression,
            auto_gain_control = self.config.auto_gain_control,
            "Requested speech processing hints"
        );

        let (block_tx, block_rx) = mpsc::channel(64);
        let (ready_tx, ready_rx) = oneshot::channel();

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let config = self.config.clone();

        let worker = std::thread::Builder::new()
            .name("mic-capture".into())
            .spawn(move || run_input_stream(config, running, block_tx, ready_tx))
            .context("Failed to spawn capture thread")?;
        self.worker = Some(worker);

        // Fail fast if the device cannot be acquired; the worker exits on
        // its own in that case, leaving nothing to clean up.
        match ready_rx.await {
            Ok(Ok(())) => {
                info!("Microphone capture started");
                Ok(block_rx)
            }
            Ok(Err(msg)) => {
                self.running.store(false, Ordering::SeqCst);
                self.worker = None;
                Err(anyhow!("Failed to start microphone capture: {msg}"))
            }
            Err(_) => {
                self.running.store(false, Ordering::SeqCst);
                self.worker = None;
                Err(anyhow!("Capture thread exited before signalling readiness"))
            }
        }
    }

    async fn stop(&mut self) -> Result<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        if let Some(worker) = self.worker.take() {
            tokio::task::spawn_blocking(move || {
                if worker.join().is_err() {
                    warn!("Capture thread panicked during shutdown");
                }
            })
            .await
            .context("Failed to join capture thread")?;
        }
        info!("Microphone capture stopped");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "cpal-microphone"
    }
}

fn run_input_stream(
    config: CaptureConfig,
    running: Arc<AtomicBool>,
    block_tx: mpsc::Sender<AudioBlock>,
    ready_tx: oneshot::Sender<std::result::Result<(), String>>,
) {
    let host = cpal::default_host();
    let device = match host.default_input_device() {
        Some(device) => device,
        None => {
            let _ = ready_tx.send(Err("no audio input device available".into()));
            return;
        }
    };

    let supported = match device.default_input_config() {
        Ok(supported) => supported,
        Err(e) => {
            let _ = ready_tx.send(Err(format!("cannot query input config: {e}")));
            return;
        }
    };

    let device_rate = supported.sample_rate().0;
    let device_channels = supported.channels();
    let stream_config: cpal::StreamConfig = supported.config();

    info!(
        device = %device.name().unwrap_or_else(|_| "unknown".into()),
        device_rate,
        device_channels,
        target_rate = config.sample_rate,
        "Opening input stream"
    );

    let err_running = Arc::clone(&running);
    let on_error = move |err: cpal::StreamError| {
        error!("Input stream error: {}", err);
        err_running.store(false, Ordering::SeqCst);
    };

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => {
            let mut assembler = BlockAssembler::new(&config, device_rate, device_channels);
            device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    assembler.push_interleaved(data, &block_tx);
                },
                on_error,
                None,
            )
        }
        cpal::SampleFormat::I16 => {
            let mut assembler = BlockAssembler::new(&config, device_rate, device_channels);
            let mut scratch = Vec::new();
            device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    scratch.clear();
                    scratch.extend(data.iter().map(|&s| s as f32 / 32768.0));
                    assembler.push_interleaved(&scratch, &block_tx);
                },
                on_error,
                None,
            )
        }
        other => {
            let _ = ready_tx.send(Err(format!("unsupported device sample format: {other}")));
            return;
        }
    };

    let stream = match stream {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(format!("cannot open input stream: {e}")));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(format!("cannot start input stream: {e}")));
        return;
    }

    let _ = ready_tx.send(Ok(()));

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(50));
    }

    // Stream (and with it the device handle) is released here.
    drop(stream);
    debug!("Capture worker exited");
}

/// Converts interleaved device samples into gain-boosted mono blocks at the
/// target rate. Decimation state carries across callbacks so block
/// boundaries do not drift.
struct BlockAssembler {
    channels: usize,
    gain: f32,
    block_size: usize,
    /// Input samples per output sample; 1.0 when the device already runs
    /// at the target rate. Upsampling is not attempted.
    ratio: f64,
    phase: f64,
    pending: Vec<f32>,
}

impl BlockAssembler {
    fn new(config: &CaptureConfig, device_rate: u32, device_channels: u16) -> Self {
        let ratio = if device_rate > config.sample_rate {
            device_rate as f64 / config.sample_rate as f64
        } else {
            1.0
        };
        Self {
            channels: device_channels.max(1) as usize,
            gain: config.input_gain,
            block_size: config.block_size,
            ratio,
            phase: 0.0,
            pending: Vec::with_capacity(config.block_size * 2),
        }
    }

    fn push_interleaved(&mut self, data: &[f32], tx: &mpsc::Sender<AudioBlock>) {
        for frame in data.chunks_exact(self.channels) {
            let mono = frame.iter().sum::<f32>() / self.channels as f32;
            self.phase += 1.0;
            if self.phase >= self.ratio {
                self.phase -= self.ratio;
                self.pending.push(mono * self.gain);
            }
        }

        while self.pending.len() >= self.block_size {
            let block: Vec<f32> = self.pending.drain(..self.block_size).collect();
            // A full channel means the consumer is behind; dropping a block
            // is preferable to stalling the device callback.
            let _ = tx.try_send(AudioBlock { samples: block });
        }
    }
}
