// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio engine for PATHA.
//!
//! This module provides:
//! - The `MediaPlayer` seam the sequencing core drives
//! - WAV playback via cpal with rate scaling (`player`)
//! - Microphone capture for recorded takes (`capture`)
//! - A scripted player/capture pair for headless tests (`script`)

pub mod capture;
pub mod player;
pub mod script;

pub use capture::{AudioCapture, CpalCapture};
pub use player::CpalPlayer;
pub use script::{ScriptedCapture, ScriptedPlayer};

use std::future::Future;
use std::path::Path;

use cpal::traits::{DeviceTrait, HostTrait};
use thiserror::Error;

/// Playback failure: unreadable or undecodable source, or a rejected
/// output stream. Absence of an *optional* asset is not an error and is
/// handled with `Option` before playback is ever attempted.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Source file is missing or unreadable
    #[error("could not read audio file {path}: {reason}")]
    Unreadable { path: String, reason: String },
    /// Source file could not be decoded
    #[error("could not decode audio file {path}: {reason}")]
    Decode { path: String, reason: String },
    /// A required source has no asset at all (the full recitation of a
    /// verse is expected present whenever its repeat count is non-zero)
    #[error("audio missing for {0}")]
    SourceMissing(String),
    /// No audio output device available
    #[error("no audio output device available")]
    NoDevice,
    /// The output stream failed or was rejected by the runtime
    #[error("audio stream failed: {0}")]
    Stream(String),
}

/// Capture failure. Permission and device problems surface as
/// `MicUnavailable`; recording is never started in that case.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Microphone access could not be granted
    #[error("microphone unavailable: {0}")]
    MicUnavailable(String),
    /// The input stream failed after starting
    #[error("capture stream failed: {0}")]
    Stream(String),
}

/// Captured or decoded audio held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct TakeAudio {
    /// Interleaved samples
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channels: u16,
}

impl TakeAudio {
    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }
}

/// Single-stream playback primitive.
///
/// `play` supersedes any in-flight playback, loads the source, applies
/// the rate and resolves exactly once on natural completion. `stop`
/// halts immediately; a superseded or stopped `play` call resolves
/// without error, so callers detect cancellation through the shared run
/// token, never through the play result. The player performs no
/// sequencing of its own.
pub trait MediaPlayer {
    /// Play a source to natural completion at the given rate multiplier
    fn play(&self, source: &Path, rate: f64) -> impl Future<Output = Result<(), PlaybackError>>;

    /// Halt the current playback immediately
    fn stop(&self);
}

/// List available audio output devices
pub fn list_output_devices() -> Vec<String> {
    let host = cpal::default_host();
    host.output_devices()
        .map(|devices| devices.filter_map(|d| d.name().ok()).collect())
        .unwrap_or_default()
}

/// List available audio input devices
pub fn list_input_devices() -> Vec<String> {
    let host = cpal::default_host();
    host.input_devices()
        .map(|devices| devices.filter_map(|d| d.name().ok()).collect())
        .unwrap_or_default()
}
