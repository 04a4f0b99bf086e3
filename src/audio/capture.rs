// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Microphone capture via cpal.
//!
//! Captures the default input device into an in-memory buffer that is
//! finalized into a `TakeAudio` on stop. The device is an exclusive
//! capability acquired on first use; this is a user-driven short-session
//! tool, so no release timeout is modeled.

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use tracing::{debug, warn};

use super::{CaptureError, TakeAudio};

/// Capture primitive behind the recorder.
///
/// `start` while already active is a no-op; `stop` finalizes the
/// capture, returning `None` when nothing was being recorded.
pub trait AudioCapture {
    /// Begin capturing from the microphone
    fn start(&self) -> Result<(), CaptureError>;

    /// Finalize the active capture into audio, if one was active
    fn stop(&self) -> Option<TakeAudio>;

    /// Whether a capture is currently active
    fn is_active(&self) -> bool;
}

struct ActiveCapture {
    /// Holding the stream keeps capture running; dropping it stops
    _stream: cpal::Stream,
    buffer: Arc<Mutex<Vec<f32>>>,
    sample_rate: u32,
    channels: u16,
}

/// Microphone capture backed by a cpal input stream
pub struct CpalCapture {
    active: Mutex<Option<ActiveCapture>>,
}

impl CpalCapture {
    /// Create a new capture. The microphone is not opened until `start`.
    pub fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }
}

impl Default for CpalCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioCapture for CpalCapture {
    fn start(&self) -> Result<(), CaptureError> {
        let mut active = self
            .active
            .lock()
            .map_err(|_| CaptureError::Stream("capture state lock poisoned".to_string()))?;
        if active.is_some() {
            // Only one recording at a time; a second start is a no-op
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| CaptureError::MicUnavailable("no input device".to_string()))?;
        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::MicUnavailable(format!("no input config: {}", e)))?;

        let stream_config = StreamConfig {
            channels: supported.channels(),
            sample_rate: supported.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        let buffer: Arc<Mutex<Vec<f32>>> = Arc::new(Mutex::new(Vec::new()));
        let write_buffer = Arc::clone(&buffer);

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = write_buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                move |err| {
                    warn!("capture stream error: {}", err);
                },
                None,
            )
            .map_err(|e| CaptureError::MicUnavailable(format!("failed to open stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| CaptureError::MicUnavailable(format!("failed to start stream: {}", e)))?;

        debug!(
            sample_rate = stream_config.sample_rate.0,
            channels = stream_config.channels,
            "recording started"
        );

        *active = Some(ActiveCapture {
            _stream: stream,
            buffer,
            sample_rate: stream_config.sample_rate.0,
            channels: stream_config.channels,
        });
        Ok(())
    }

    fn stop(&self) -> Option<TakeAudio> {
        let mut guard = self.active.lock().ok()?;
        let active = guard.take()?;
        let samples = active
            .buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default();
        debug!(samples = samples.len(), "recording stopped");
        Some(TakeAudio {
            samples,
            sample_rate: active.sample_rate,
            channels: active.channels,
        })
    }

    fn is_active(&self) -> bool {
        self.active.lock().map(|a| a.is_some()).unwrap_or(false)
    }
}
