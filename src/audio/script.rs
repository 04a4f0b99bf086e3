// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scripted player and capture for headless tests.
//!
//! `ScriptedPlayer` records every play call instead of opening an audio
//! device, can fail chosen sources, and can trip the run token after a
//! given number of plays to exercise mid-run cancellation. It backs both
//! the in-crate unit tests and the integration suite, so it lives in the
//! library rather than behind `cfg(test)`.

use std::path::Path;
use std::sync::Mutex;

use super::{AudioCapture, CaptureError, MediaPlayer, PlaybackError, TakeAudio};
use crate::practice::RunToken;

#[derive(Default)]
struct PlayerState {
    plays: Vec<(String, f64)>,
    stops: usize,
    fail_on: Vec<String>,
    cancel_after: Option<(usize, RunToken)>,
}

/// Media player that records play calls instead of producing sound
#[derive(Default)]
pub struct ScriptedPlayer {
    state: Mutex<PlayerState>,
}

impl ScriptedPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any play whose source path contains the given fragment
    pub fn fail_sources_containing(&self, fragment: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_on.push(fragment.to_string());
        }
    }

    /// Cancel the token once `count` plays have completed
    pub fn cancel_after(&self, count: usize, token: RunToken) {
        if let Ok(mut state) = self.state.lock() {
            state.cancel_after = Some((count, token));
        }
    }

    /// Full source paths of every completed play, in order
    pub fn played_paths(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.plays.iter().map(|(p, _)| p.clone()).collect())
            .unwrap_or_default()
    }

    /// File names of every completed play, in order
    pub fn played_names(&self) -> Vec<String> {
        self.played_paths()
            .iter()
            .map(|p| {
                Path::new(p)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| p.clone())
            })
            .collect()
    }

    /// Rates of every completed play, in order
    pub fn played_rates(&self) -> Vec<f64> {
        self.state
            .lock()
            .map(|s| s.plays.iter().map(|(_, r)| *r).collect())
            .unwrap_or_default()
    }

    /// Number of completed plays
    pub fn play_count(&self) -> usize {
        self.state.lock().map(|s| s.plays.len()).unwrap_or(0)
    }

    /// Number of stop calls
    pub fn stop_count(&self) -> usize {
        self.state.lock().map(|s| s.stops).unwrap_or(0)
    }
}

impl MediaPlayer for ScriptedPlayer {
    async fn play(&self, source: &Path, rate: f64) -> Result<(), PlaybackError> {
        let source = source.display().to_string();
        let mut state = self
            .state
            .lock()
            .map_err(|_| PlaybackError::Stream("scripted player lock poisoned".to_string()))?;

        if state.fail_on.iter().any(|f| source.contains(f.as_str())) {
            return Err(PlaybackError::Stream(format!(
                "scripted failure for {}",
                source
            )));
        }

        state.plays.push((source, rate));
        if let Some((count, token)) = &state.cancel_after {
            if state.plays.len() >= *count {
                token.cancel();
            }
        }
        Ok(())
    }

    fn stop(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.stops += 1;
        }
    }
}

#[derive(Default)]
struct CaptureState {
    active: bool,
    mic_available: bool,
    canned: Vec<TakeAudio>,
}

/// Capture that hands out canned takes instead of opening a microphone
pub struct ScriptedCapture {
    state: Mutex<CaptureState>,
}

impl ScriptedCapture {
    /// Capture with a working scripted microphone
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CaptureState {
                active: false,
                mic_available: true,
                canned: Vec::new(),
            }),
        }
    }

    /// Capture whose microphone always fails to open
    pub fn unavailable() -> Self {
        Self {
            state: Mutex::new(CaptureState::default()),
        }
    }

    /// Queue a canned take returned by the next stop
    pub fn push_take(&self, take: TakeAudio) {
        if let Ok(mut state) = self.state.lock() {
            state.canned.push(take);
        }
    }
}

impl Default for ScriptedCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioCapture for ScriptedCapture {
    fn start(&self) -> Result<(), CaptureError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| CaptureError::Stream("scripted capture lock poisoned".to_string()))?;
        if !state.mic_available {
            return Err(CaptureError::MicUnavailable(
                "scripted microphone disabled".to_string(),
            ));
        }
        state.active = true;
        Ok(())
    }

    fn stop(&self) -> Option<TakeAudio> {
        let mut state = self.state.lock().ok()?;
        if !state.active {
            return None;
        }
        state.active = false;
        Some(state.canned.pop().unwrap_or(TakeAudio {
            samples: vec![0.0; 4410],
            sample_rate: 44100,
            channels: 1,
        }))
    }

    fn is_active(&self) -> bool {
        self.state.lock().map(|s| s.active).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_player_records_plays() {
        let player = ScriptedPlayer::new();
        player.play(Path::new("/audio/p1.wav"), 1.0).await.unwrap();
        player.play(Path::new("/audio/p2.wav"), 1.25).await.unwrap();

        assert_eq!(player.played_names(), vec!["p1.wav", "p2.wav"]);
        assert_eq!(player.played_rates(), vec![1.0, 1.25]);
    }

    #[tokio::test]
    async fn test_scripted_player_failure() {
        let player = ScriptedPlayer::new();
        player.fail_sources_containing("full");

        assert!(player.play(Path::new("/audio/p1.wav"), 1.0).await.is_ok());
        assert!(player.play(Path::new("/audio/full.wav"), 1.0).await.is_err());
        assert_eq!(player.play_count(), 1);
    }

    #[test]
    fn test_scripted_capture_round_trip() {
        let capture = ScriptedCapture::new();
        assert!(capture.stop().is_none());

        capture.start().unwrap();
        assert!(capture.is_active());
        let take = capture.stop().unwrap();
        assert!(!take.samples.is_empty());
        assert!(!capture.is_active());
    }

    #[test]
    fn test_unavailable_microphone() {
        let capture = ScriptedCapture::unavailable();
        assert!(matches!(
            capture.start(),
            Err(CaptureError::MicUnavailable(_))
        ));
    }
}
