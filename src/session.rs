// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Drilling session: the command surface toward the UI layer.
//!
//! Owns the catalog, the active verse selection, the practice set, the
//! shared settings, and the run token, and exposes the playback/record
//! commands. Every command emits a status notification on completion or
//! failure. Commands take `&mut self`, so a recording can never start
//! while a practice run is mid-flight on the same session.

use std::path::PathBuf;

use anyhow::{ensure, Result};

use crate::audio::{AudioCapture, MediaPlayer, PlaybackError};
use crate::catalog::{total_planned_plays, Catalog, SegmentKey, Verse};
use crate::practice::{
    parse_practice_set, PracticeSequencer, RunOutcome, RunToken, SetRunner, SetSpecError,
    SharedSettings,
};
use crate::recorder::{Recorder, RecordError, TakeStore};
use crate::status::{StatusEvent, StatusSink};

/// One learner's drilling session over a loaded catalog
pub struct DrillSession<P: MediaPlayer, C: AudioCapture> {
    catalog: Catalog,
    audio_dir: PathBuf,
    player: P,
    recorder: Recorder<C>,
    settings: SharedSettings,
    set: Vec<usize>,
    active: usize,
    token: RunToken,
    status: StatusSink,
}

impl<P: MediaPlayer, C: AudioCapture> DrillSession<P, C> {
    /// Create a session. An empty catalog is fatal: there is nothing to
    /// drill and no partial catalog is accepted.
    pub fn new(
        catalog: Catalog,
        audio_dir: PathBuf,
        player: P,
        recorder: Recorder<C>,
        settings: SharedSettings,
        status: StatusSink,
    ) -> Result<Self> {
        ensure!(!catalog.is_empty(), "verse catalog is empty");
        let session = Self {
            catalog,
            audio_dir,
            player,
            recorder,
            settings,
            set: Vec::new(),
            active: 0,
            token: RunToken::new(),
            status,
        };
        session.status.emit(StatusEvent::Ready);
        Ok(session)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The currently selected verse
    pub fn active_verse(&self) -> &Verse {
        // The index is clamped on every change and the catalog is
        // non-empty, so the lookup cannot miss
        self.catalog
            .verse(self.active)
            .unwrap_or_else(|| unreachable!("active index out of range"))
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn practice_set(&self) -> &[usize] {
        &self.set
    }

    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    /// Token handle for out-of-band cancellation (e.g. a Ctrl-C handler)
    pub fn run_token(&self) -> RunToken {
        self.token.clone()
    }

    /// Estimated plays for one run of the active verse, for display
    pub fn planned_plays(&self) -> u32 {
        total_planned_plays(self.active_verse(), &self.settings.snapshot())
    }

    /// Select a verse by 0-based index, clamped to the catalog
    pub fn select_verse(&mut self, index: usize) {
        self.active = index.min(self.catalog.len() - 1);
        let verse = self.active_verse();
        self.status.emit(StatusEvent::VerseChanged {
            index: self.active,
            title: verse.title.clone(),
        });
    }

    pub fn next_verse(&mut self) {
        if self.active + 1 < self.catalog.len() {
            self.select_verse(self.active + 1);
        }
    }

    pub fn prev_verse(&mut self) {
        if self.active > 0 {
            self.select_verse(self.active - 1);
        }
    }

    /// Apply a practice-set selector. A parse failure leaves the
    /// previous set untouched; an empty selector clears the set.
    pub fn apply_set(&mut self, text: &str) -> Result<(), SetSpecError> {
        match parse_practice_set(text, self.catalog.len()) {
            Ok(indices) if indices.is_empty() => {
                self.set.clear();
                self.status.emit(StatusEvent::SetCleared);
                Ok(())
            }
            Ok(indices) => {
                self.status.emit(StatusEvent::SetApplied {
                    count: indices.len(),
                });
                self.set = indices;
                Ok(())
            }
            Err(err) => {
                self.status.emit(StatusEvent::SetInvalid {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Clear the practice set, returning to single-verse mode
    pub fn clear_set(&mut self) {
        self.set.clear();
        self.status.emit(StatusEvent::SetCleared);
    }

    /// Play one segment of the active verse once (tap-to-play).
    ///
    /// Returns whether anything played; a missing asset is status, not
    /// an error.
    pub async fn play_segment(&mut self, key: SegmentKey) -> Result<bool, PlaybackError> {
        self.token.reset();
        let sequencer = PracticeSequencer::new(
            &self.player,
            &self.audio_dir,
            self.settings.clone(),
            self.token.clone(),
            self.status.clone(),
        );
        match sequencer.play_once(self.active_verse(), key).await {
            Ok(true) => {
                self.status.emit(StatusEvent::Ready);
                Ok(true)
            }
            Ok(false) => {
                self.status.emit(StatusEvent::AudioMissing {
                    segment: key.to_string(),
                });
                Ok(false)
            }
            Err(err) => {
                self.status.emit(StatusEvent::RunFailed {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Run the practice set, or just the active verse when no set is
    /// applied, to a terminal state
    pub async fn start_practice_run(&mut self) -> RunOutcome {
        self.token.reset();
        let runner = SetRunner::new(
            &self.catalog,
            &self.player,
            &self.audio_dir,
            self.settings.clone(),
            self.token.clone(),
            self.status.clone(),
        );
        let outcome = runner.run(&self.set, &mut self.active).await;

        match &outcome {
            RunOutcome::Done => self.status.emit(StatusEvent::Done),
            RunOutcome::Stopped => self.status.emit(StatusEvent::Stopped),
            RunOutcome::Failed(err) => self.status.emit(StatusEvent::RunFailed {
                message: err.to_string(),
            }),
        }
        outcome
    }

    /// Request cancellation and halt the current playback
    pub fn stop_practice_run(&self) {
        self.token.cancel();
        self.player.stop();
    }

    /// Begin recording a take for a segment of the active verse
    pub fn start_recording(&mut self, segment: SegmentKey) -> Result<(), RecordError> {
        let verse = self.active_verse();
        match self.recorder.start_recording(verse, segment) {
            Ok(resolved) => {
                self.status.emit(StatusEvent::RecordingStarted {
                    key: TakeStore::key(&verse.id, resolved),
                });
                Ok(())
            }
            Err(RecordError::MicUnavailable(msg)) => {
                self.status.emit(StatusEvent::MicUnavailable {
                    message: msg.clone(),
                });
                Err(RecordError::MicUnavailable(msg))
            }
            Err(err) => Err(err),
        }
    }

    /// Finalize and persist the active recording
    pub fn stop_recording(&mut self) -> Result<(), RecordError> {
        match self.recorder.stop_recording()? {
            Some(saved) => self.status.emit(StatusEvent::TakeSaved { key: saved.key }),
            None => self.status.emit(StatusEvent::Ready),
        }
        Ok(())
    }

    /// Play the stored take for a segment of the active verse
    pub async fn play_take(&mut self, segment: SegmentKey) -> Result<(), RecordError> {
        self.token.reset();
        match self
            .recorder
            .play_take(&self.player, self.active_verse(), segment)
            .await
        {
            Ok(()) => {
                self.status.emit(StatusEvent::Ready);
                Ok(())
            }
            Err(err) => {
                self.emit_record_error(&err);
                Err(err)
            }
        }
    }

    /// Delete the stored take for a segment of the active verse
    pub fn clear_take(&mut self, segment: SegmentKey) -> Result<(), RecordError> {
        let verse = self.active_verse();
        let key = TakeStore::key(
            &verse.id,
            crate::catalog::resolve_key(verse, segment),
        );
        if self.recorder.clear_take(verse, segment)? {
            self.status.emit(StatusEvent::TakeCleared { key });
        } else {
            self.status.emit(StatusEvent::Ready);
        }
        Ok(())
    }

    /// Play the reference, pause, then play the take
    pub async fn compare_ab(&mut self, segment: SegmentKey) -> Result<(), RecordError> {
        self.token.reset();
        match self
            .recorder
            .compare_ab(&self.player, self.active_verse(), segment, &self.audio_dir)
            .await
        {
            Ok(()) => {
                self.status.emit(StatusEvent::Ready);
                Ok(())
            }
            Err(err) => {
                self.emit_record_error(&err);
                Err(err)
            }
        }
    }

    fn emit_record_error(&self, err: &RecordError) {
        match err {
            RecordError::NoTake(key) => {
                self.status.emit(StatusEvent::NoTake { key: key.clone() })
            }
            RecordError::NoReference(key) => self
                .status
                .emit(StatusEvent::NoReference { key: key.clone() }),
            RecordError::MicUnavailable(msg) => self.status.emit(StatusEvent::MicUnavailable {
                message: msg.clone(),
            }),
            other => self.status.emit(StatusEvent::RunFailed {
                message: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{ScriptedCapture, ScriptedPlayer};
    use crate::catalog::{AssetRef, AudioMap, PairFlags};
    use crate::practice::PracticeSettings;

    fn verse(id: &str) -> Verse {
        Verse {
            id: id.to_string(),
            title: format!("Verse {}", id),
            meter: String::new(),
            full: String::new(),
            text: Default::default(),
            practice: None,
            gloss: Default::default(),
            needs_split_practice: false,
            available: PairFlags::default(),
            audio: AudioMap {
                p1: Some(AssetRef(format!("{}_p1.wav", id))),
                full: Some(AssetRef(format!("{}_full.wav", id))),
                ..Default::default()
            },
        }
    }

    fn session(
        verses: Vec<Verse>,
        takes_dir: &std::path::Path,
    ) -> (
        DrillSession<ScriptedPlayer, ScriptedCapture>,
        tokio::sync::mpsc::UnboundedReceiver<StatusEvent>,
    ) {
        let (status, rx) = StatusSink::channel();
        let session = DrillSession::new(
            Catalog::new(verses),
            PathBuf::from("/audio"),
            ScriptedPlayer::new(),
            Recorder::new(ScriptedCapture::new(), TakeStore::new(takes_dir)),
            SharedSettings::new(PracticeSettings {
                singles_repeat: 1,
                pairs_repeat: 1,
                full_repeat: 1,
                ..Default::default()
            }),
            status,
        )
        .unwrap();
        (session, rx)
    }

    #[test]
    fn test_empty_catalog_is_fatal() {
        let result = DrillSession::new(
            Catalog::new(Vec::new()),
            PathBuf::from("/audio"),
            ScriptedPlayer::new(),
            Recorder::new(ScriptedCapture::new(), TakeStore::new("/tmp/takes")),
            SharedSettings::default(),
            StatusSink::disconnected(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_select_verse_clamps() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _rx) = session(vec![verse("v1"), verse("v2")], dir.path());

        session.select_verse(99);
        assert_eq!(session.active_index(), 1);

        session.prev_verse();
        assert_eq!(session.active_index(), 0);
        session.prev_verse();
        assert_eq!(session.active_index(), 0);
    }

    #[test]
    fn test_invalid_set_keeps_previous() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, mut rx) = session(vec![verse("v1"), verse("v2")], dir.path());

        session.apply_set("1,2").unwrap();
        assert_eq!(session.practice_set(), &[0, 1]);

        assert!(session.apply_set("1,bogus").is_err());
        assert_eq!(session.practice_set(), &[0, 1]);

        let events: Vec<StatusEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(events
            .iter()
            .any(|e| matches!(e, StatusEvent::SetInvalid { .. })));
    }

    #[test]
    fn test_empty_selector_clears_set() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _rx) = session(vec![verse("v1"), verse("v2")], dir.path());

        session.apply_set("1-2").unwrap();
        session.apply_set("").unwrap();
        assert!(session.practice_set().is_empty());
    }

    #[tokio::test]
    async fn test_play_segment_missing_audio_is_status() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, mut rx) = session(vec![verse("v1")], dir.path());

        assert!(!session.play_segment(SegmentKey::P3).await.unwrap());
        let events: Vec<StatusEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(events.contains(&StatusEvent::AudioMissing {
            segment: "p3".to_string()
        }));
    }

    #[tokio::test]
    async fn test_single_verse_run_emits_done() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, mut rx) = session(vec![verse("v1")], dir.path());

        let outcome = session.start_practice_run().await;
        assert!(outcome.is_done());

        let events: Vec<StatusEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(events.contains(&StatusEvent::Done));
    }

    #[tokio::test]
    async fn test_record_compare_flow() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _rx) = session(vec![verse("v1")], dir.path());

        session.start_recording(SegmentKey::P1).unwrap();
        session.stop_recording().unwrap();
        session.compare_ab(SegmentKey::P1).await.unwrap();

        // No take for full: guidance, not a crash
        assert!(matches!(
            session.play_take(SegmentKey::Full).await,
            Err(RecordError::NoTake(_))
        ));
    }
}
