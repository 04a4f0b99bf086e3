// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! WAV playback via cpal (Core Audio on macOS).
//!
//! Decodes a WAV source with hound and renders it through the default
//! output device, stepping the playhead by the configured rate with
//! linear interpolation. Completion is signalled back to the awaiting
//! caller through a oneshot channel; a stopped or superseded playback
//! resolves without error.

use std::path::Path;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use hound::{SampleFormat, WavReader};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::{MediaPlayer, PlaybackError, TakeAudio};

/// Playback rate bounds. The UI slider never leaves this range; clamping
/// here keeps a bad settings file from producing unlistenable output.
const MIN_RATE: f64 = 0.25;
const MAX_RATE: f64 = 4.0;

type Completion = oneshot::Sender<Result<(), String>>;

/// Media player backed by a cpal output stream
pub struct CpalPlayer {
    /// Currently loaded stream; dropping it halts output and resolves
    /// the in-flight play call
    active: Mutex<Option<cpal::Stream>>,
}

impl CpalPlayer {
    /// Create a new player. No device is opened until the first play.
    pub fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }

    fn clear_active(&self) {
        if let Ok(mut active) = self.active.lock() {
            *active = None;
        }
    }

    fn store_active(&self, stream: cpal::Stream) {
        if let Ok(mut active) = self.active.lock() {
            *active = Some(stream);
        }
    }
}

impl Default for CpalPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaPlayer for CpalPlayer {
    async fn play(&self, source: &Path, rate: f64) -> Result<(), PlaybackError> {
        // Supersede any in-flight playback before touching the device
        self.clear_active();

        let audio = decode_wav(source)?;
        let rate = rate.clamp(MIN_RATE, MAX_RATE);
        debug!(
            source = %source.display(),
            rate,
            duration_secs = audio.duration_secs(),
            "starting playback"
        );

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(PlaybackError::NoDevice)?;
        let supported = device
            .default_output_config()
            .map_err(|e| PlaybackError::Stream(format!("no default output config: {}", e)))?;

        let stream_config = StreamConfig {
            channels: supported.channels(),
            sample_rate: supported.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        let out_channels = stream_config.channels as usize;
        let out_rate = stream_config.sample_rate.0 as f64;
        let step = rate * audio.sample_rate as f64 / out_rate;
        let src_channels = audio.channels.max(1) as usize;
        let samples = audio.samples;
        let src_frames = samples.len() / src_channels;

        let (done_tx, done_rx) = oneshot::channel();
        let completion: Arc<Mutex<Option<Completion>>> = Arc::new(Mutex::new(Some(done_tx)));
        let data_completion = Arc::clone(&completion);
        let err_completion = Arc::clone(&completion);

        let mut pos = 0.0f64;
        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(out_channels) {
                        let base = pos as usize;
                        if base >= src_frames {
                            for sample in frame.iter_mut() {
                                *sample = 0.0;
                            }
                            continue;
                        }
                        let frac = (pos - base as f64) as f32;
                        let next = (base + 1).min(src_frames - 1);
                        for (c, sample) in frame.iter_mut().enumerate() {
                            let ch = c.min(src_channels - 1);
                            let a = samples[base * src_channels + ch];
                            let b = samples[next * src_channels + ch];
                            *sample = a + (b - a) * frac;
                        }
                        pos += step;
                    }
                    if pos as usize >= src_frames {
                        if let Ok(mut slot) = data_completion.lock() {
                            if let Some(tx) = slot.take() {
                                let _ = tx.send(Ok(()));
                            }
                        }
                    }
                },
                move |err| {
                    warn!("audio stream error: {}", err);
                    if let Ok(mut slot) = err_completion.lock() {
                        if let Some(tx) = slot.take() {
                            let _ = tx.send(Err(err.to_string()));
                        }
                    }
                },
                None,
            )
            .map_err(|e| PlaybackError::Stream(format!("failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| PlaybackError::Stream(format!("failed to start stream: {}", e)))?;

        self.store_active(stream);

        match done_rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(msg)) => Err(PlaybackError::Stream(msg)),
            // Sender dropped: the stream was stopped or superseded. Not a
            // playback outcome; callers consult the run token.
            Err(_) => Ok(()),
        }
    }

    fn stop(&self) {
        self.clear_active();
    }
}

/// Decode a WAV file into interleaved f32 samples
pub fn decode_wav(path: &Path) -> Result<TakeAudio, PlaybackError> {
    let reader = WavReader::open(path).map_err(|e| PlaybackError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let spec = reader.spec();
    let samples: Result<Vec<f32>, hound::Error> = match (spec.sample_format, spec.bits_per_sample)
    {
        (SampleFormat::Float, 32) => reader.into_samples::<f32>().collect(),
        (SampleFormat::Int, bits) if bits <= 32 => {
            let scale = (1i64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect()
        }
        (format, bits) => {
            return Err(PlaybackError::Decode {
                path: path.display().to_string(),
                reason: format!("unsupported sample format: {:?}/{} bits", format, bits),
            })
        }
    };

    let samples = samples.map_err(|e| PlaybackError::Decode {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    Ok(TakeAudio {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn write_test_wav(path: &Path, spec: WavSpec, frames: usize) {
        let mut writer = WavWriter::create(path, spec).unwrap();
        for i in 0..frames * spec.channels as usize {
            match spec.sample_format {
                SampleFormat::Float => writer.write_sample(i as f32 * 0.001).unwrap(),
                SampleFormat::Int => writer.write_sample(i as i16).unwrap(),
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_decode_int16_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        write_test_wav(&path, spec, 100);

        let audio = decode_wav(&path).unwrap();
        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.samples.len(), 100);
        // 16-bit samples normalize into [-1, 1]
        assert!(audio.samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_decode_float_stereo_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        write_test_wav(&path, spec, 50);

        let audio = decode_wav(&path).unwrap();
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.samples.len(), 100);
    }

    #[test]
    fn test_decode_missing_file() {
        let err = decode_wav(Path::new("/nonexistent/take.wav")).unwrap_err();
        assert!(matches!(err, PlaybackError::Unreadable { .. }));
    }

    #[test]
    fn test_decode_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_audio.wav");
        std::fs::write(&path, b"this is not a wav file").unwrap();

        let err = decode_wav(&path).unwrap_err();
        assert!(matches!(err, PlaybackError::Unreadable { .. }));
    }
}
