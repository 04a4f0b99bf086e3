// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Three-stage practice sequencer.
//!
//! Runs singles, pairs, then the full recitation for one verse, with
//! per-stage repeat counts re-read from the shared settings before every
//! individual play. The run token is checked before every play; missing
//! optional units are skipped silently, while a missing full recitation
//! with a non-zero repeat count aborts the run.

use std::path::Path;

use tracing::debug;

use super::{PracticeSettings, RunOutcome, RunToken, SharedSettings};
use crate::audio::{MediaPlayer, PlaybackError};
use crate::catalog::{resolve_asset, singles_sequence, SegmentKey, Verse};
use crate::status::{StatusEvent, StatusSink};

/// The three ordered stages of a verse run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Singles,
    Pairs,
    Full,
}

impl Stage {
    fn repeats(&self, settings: &PracticeSettings) -> u32 {
        match self {
            Stage::Singles => settings.singles_repeat,
            Stage::Pairs => settings.pairs_repeat,
            Stage::Full => settings.full_repeat,
        }
    }
}

/// Whether a run proceeds or observed cancellation
enum Flow {
    Continue,
    Cancelled,
}

/// Drives one verse through the repeat pattern
pub struct PracticeSequencer<'a, P: MediaPlayer> {
    player: &'a P,
    audio_base: &'a Path,
    settings: SharedSettings,
    token: RunToken,
    status: StatusSink,
}

impl<'a, P: MediaPlayer> PracticeSequencer<'a, P> {
    pub fn new(
        player: &'a P,
        audio_base: &'a Path,
        settings: SharedSettings,
        token: RunToken,
        status: StatusSink,
    ) -> Self {
        Self {
            player,
            audio_base,
            settings,
            token,
            status,
        }
    }

    /// Run all three stages for one verse
    pub async fn run(&self, verse: &Verse) -> RunOutcome {
        match self.run_stages(verse).await {
            Ok(Flow::Continue) => RunOutcome::Done,
            Ok(Flow::Cancelled) => RunOutcome::Stopped,
            Err(err) => RunOutcome::Failed(err),
        }
    }

    /// Play one logical segment a single time, at the current rate.
    ///
    /// Returns `false` when the segment has no resolvable asset.
    pub async fn play_once(&self, verse: &Verse, key: SegmentKey) -> Result<bool, PlaybackError> {
        let Some(asset) = resolve_asset(verse, key) else {
            return Ok(false);
        };
        let path = asset.resolve(self.audio_base);
        let rate = self.settings.snapshot().rate;
        self.status.emit(StatusEvent::Playing {
            source: asset.to_string(),
        });
        self.player.play(&path, rate).await?;
        Ok(true)
    }

    async fn run_stages(&self, verse: &Verse) -> Result<Flow, PlaybackError> {
        // 1) Singles: each unit repeats before the next unit starts
        for &key in singles_sequence(verse) {
            if let Flow::Cancelled = self.drill_unit(verse, key, Stage::Singles).await? {
                return Ok(Flow::Cancelled);
            }
        }

        // 2) Pairs: p12 then p34
        for key in [SegmentKey::P12, SegmentKey::P34] {
            if let Flow::Cancelled = self.drill_unit(verse, key, Stage::Pairs).await? {
                return Ok(Flow::Cancelled);
            }
        }

        // 3) Full recitation
        self.drill_unit(verse, SegmentKey::Full, Stage::Full).await
    }

    /// Play one unit `repeats` times, re-reading the count and rate
    /// before each play
    async fn drill_unit(
        &self,
        verse: &Verse,
        key: SegmentKey,
        stage: Stage,
    ) -> Result<Flow, PlaybackError> {
        if self.token.is_cancelled() {
            return Ok(Flow::Cancelled);
        }

        let Some(asset) = resolve_asset(verse, key) else {
            // Optional units are simply skipped; the full recitation is
            // the verse's defining asset and its absence is a failure
            // whenever it was going to be played
            if stage == Stage::Full && self.settings.snapshot().full_repeat > 0 {
                return Err(PlaybackError::SourceMissing(format!(
                    "{} {}",
                    verse.id, key
                )));
            }
            debug!(verse = %verse.id, %key, "no audio for unit, skipping");
            return Ok(Flow::Continue);
        };
        let path = asset.resolve(self.audio_base);

        let mut played = 0u32;
        loop {
            // Live settings land on the very next repetition
            let settings = self.settings.snapshot();
            if played >= stage.repeats(&settings) {
                break;
            }
            if self.token.is_cancelled() {
                return Ok(Flow::Cancelled);
            }
            self.status.emit(StatusEvent::Playing {
                source: asset.to_string(),
            });
            self.player.play(&path, settings.rate).await?;
            played += 1;
        }

        Ok(Flow::Continue)
    }
}
