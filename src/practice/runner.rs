// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Multi-verse set runner.
//!
//! Walks an ordered list of catalog indices, switching the active verse
//! (announced as an explicit `VerseChanged` event) and running the
//! practice sequencer for each. A stopped verse halts the whole set; a
//! failed verse is surfaced and the set continues, since one verse's
//! broken audio should not abort a drilling session.

use std::path::Path;

use tracing::warn;

use super::{RunOutcome, RunToken, SharedSettings};
use crate::audio::MediaPlayer;
use crate::catalog::Catalog;
use crate::practice::PracticeSequencer;
use crate::status::{StatusEvent, StatusSink};

/// Runs a practice set across the catalog
pub struct SetRunner<'a, P: MediaPlayer> {
    catalog: &'a Catalog,
    player: &'a P,
    audio_base: &'a Path,
    settings: SharedSettings,
    token: RunToken,
    status: StatusSink,
}

impl<'a, P: MediaPlayer> SetRunner<'a, P> {
    pub fn new(
        catalog: &'a Catalog,
        player: &'a P,
        audio_base: &'a Path,
        settings: SharedSettings,
        token: RunToken,
        status: StatusSink,
    ) -> Self {
        Self {
            catalog,
            player,
            audio_base,
            settings,
            token,
            status,
        }
    }

    /// Run the set, or just the active verse when the set is empty.
    ///
    /// `active` tracks the verse switch side effect so the caller's
    /// selection reflects wherever the run ended.
    pub async fn run(&self, set: &[usize], active: &mut usize) -> RunOutcome {
        let single = [*active];
        let indices: &[usize] = if set.is_empty() { &single } else { set };

        let sequencer = PracticeSequencer::new(
            self.player,
            self.audio_base,
            self.settings.clone(),
            self.token.clone(),
            self.status.clone(),
        );

        for &index in indices {
            if self.token.is_cancelled() {
                return RunOutcome::Stopped;
            }

            let Some(verse) = self.catalog.verse(index) else {
                warn!(index, "practice set index beyond catalog, skipping");
                continue;
            };

            *active = index;
            self.status.emit(StatusEvent::VerseChanged {
                index,
                title: verse.title.clone(),
            });

            match sequencer.run(verse).await {
                RunOutcome::Done => {}
                RunOutcome::Stopped => return RunOutcome::Stopped,
                RunOutcome::Failed(err) => {
                    // Surface and move on to the next verse
                    self.status.emit(StatusEvent::VerseFailed {
                        index,
                        message: err.to_string(),
                    });
                }
            }
        }

        RunOutcome::Done
    }
}
