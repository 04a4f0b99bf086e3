// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Practice sequencing core.
//!
//! This module provides the drilling state machine:
//! - Shared live-updatable practice settings
//! - The explicit cancellation token checked at every suspension point
//! - The three-stage practice sequencer (`sequencer`)
//! - The multi-verse set runner (`runner`)
//! - The practice-set selector grammar (`set_spec`)

pub mod runner;
pub mod sequencer;
pub mod set_spec;

pub use runner::SetRunner;
pub use sequencer::PracticeSequencer;
pub use set_spec::{parse_practice_set, SetSpecError};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::audio::PlaybackError;

/// Repeat counts and playback options for one practice run.
///
/// Mutable at any time; the sequencer re-reads the shared copy before
/// every individual play, so a live change lands on the very next
/// repetition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PracticeSettings {
    /// Plays per unit in the singles stage
    #[serde(default = "default_singles_repeat")]
    pub singles_repeat: u32,
    /// Plays per unit in the pairs stage
    #[serde(default = "default_pairs_repeat")]
    pub pairs_repeat: u32,
    /// Plays of the full recitation
    #[serde(default = "default_full_repeat")]
    pub full_repeat: u32,
    /// Playback-rate multiplier
    #[serde(default = "default_rate")]
    pub rate: f64,
    /// Display the practice rendering instead of the primary text.
    /// Never affects audio.
    #[serde(default)]
    pub use_practice_text: bool,
}

fn default_singles_repeat() -> u32 {
    2
}
fn default_pairs_repeat() -> u32 {
    1
}
fn default_full_repeat() -> u32 {
    1
}
fn default_rate() -> f64 {
    1.0
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            singles_repeat: default_singles_repeat(),
            pairs_repeat: default_pairs_repeat(),
            full_repeat: default_full_repeat(),
            rate: default_rate(),
            use_practice_text: false,
        }
    }
}

/// Shared handle to the live practice settings
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<PracticeSettings>>,
}

impl SharedSettings {
    pub fn new(settings: PracticeSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Copy of the current settings
    pub fn snapshot(&self) -> PracticeSettings {
        self.inner
            .read()
            .map(|s| *s)
            .unwrap_or_default()
    }

    /// Apply a mutation to the live settings
    pub fn update(&self, apply: impl FnOnce(&mut PracticeSettings)) {
        if let Ok(mut settings) = self.inner.write() {
            apply(&mut settings);
        }
    }

    /// Replace the live settings wholesale
    pub fn replace(&self, settings: PracticeSettings) {
        self.update(|s| *s = settings);
    }
}

/// Cancellation token shared across one drilling session.
///
/// Cancellation is cooperative: the sequencer and set runner check the
/// token before each play and each verse switch. A currently-playing
/// segment finishes (or is force-stopped at the player); the next unit
/// is what actually halts.
#[derive(Debug, Clone, Default)]
pub struct RunToken {
    cancelled: Arc<AtomicBool>,
}

impl RunToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the token ahead of a fresh run
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

/// Terminal state of a practice run
#[derive(Debug)]
pub enum RunOutcome {
    /// All stages completed
    Done,
    /// Cancellation was observed
    Stopped,
    /// Playback failed where an asset was expected present
    Failed(PlaybackError),
}

impl RunOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, RunOutcome::Done)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, RunOutcome::Stopped)
    }
}
