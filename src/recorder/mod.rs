// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Recorder/compare subsystem.
//!
//! Captures a learner's take, persists it keyed by verse and segment,
//! and plays it back alternating with the reference audio. Every
//! operation normalizes its segment through the addressor remap first,
//! so a foot selected on a split-practice verse records and plays under
//! its pair key; takes are always keyed by the resolved segment.

pub mod store;

pub use store::TakeStore;

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::audio::{AudioCapture, CaptureError, MediaPlayer, PlaybackError};
use crate::catalog::{resolve_asset, resolve_key, SegmentKey, Verse};

/// Gap between reference and take during A/B comparison, long enough
/// for the listener to mentally reset
const COMPARE_GAP: Duration = Duration::from_millis(250);

/// Recorder operation failure
#[derive(Debug, Error)]
pub enum RecordError {
    /// Microphone access could not be granted
    #[error("microphone unavailable: {0}")]
    MicUnavailable(String),
    /// No take stored for the resolved key
    #[error("no take recorded for {0}")]
    NoTake(String),
    /// No reference audio for the resolved key
    #[error("no reference audio for {0}")]
    NoReference(String),
    /// Take storage I/O failure
    #[error("take storage failed: {0}")]
    Store(String),
    /// Playback of a reference or take failed
    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

impl From<CaptureError> for RecordError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::MicUnavailable(msg) => RecordError::MicUnavailable(msg),
            CaptureError::Stream(msg) => RecordError::MicUnavailable(msg),
        }
    }
}

/// Target of the recording currently in progress
#[derive(Debug, Clone)]
struct ActiveTake {
    verse_id: String,
    segment: SegmentKey,
}

/// A finalized, persisted take
#[derive(Debug, Clone, PartialEq)]
pub struct SavedTake {
    /// Store key, `verseId::segmentKey`
    pub key: String,
    /// Backing WAV file
    pub path: PathBuf,
}

/// Captures, stores, and compares learner takes
pub struct Recorder<C: AudioCapture> {
    capture: C,
    store: TakeStore,
    active: Mutex<Option<ActiveTake>>,
}

impl<C: AudioCapture> Recorder<C> {
    pub fn new(capture: C, store: TakeStore) -> Self {
        Self {
            capture,
            store,
            active: Mutex::new(None),
        }
    }

    /// The underlying take store
    pub fn store(&self) -> &TakeStore {
        &self.store
    }

    /// Whether a recording is in progress
    pub fn is_recording(&self) -> bool {
        self.active.lock().map(|a| a.is_some()).unwrap_or(false)
    }

    /// Begin recording a take for the resolved segment.
    ///
    /// A second call while a recording is active is a no-op. Returns the
    /// resolved segment key the take will be stored under.
    pub fn start_recording(
        &self,
        verse: &Verse,
        segment: SegmentKey,
    ) -> Result<SegmentKey, RecordError> {
        let resolved = resolve_key(verse, segment);

        let mut active = self
            .active
            .lock()
            .map_err(|_| RecordError::Store("recorder state lock poisoned".to_string()))?;
        if let Some(current) = active.as_ref() {
            debug!(key = %TakeStore::key(&current.verse_id, current.segment),
                "recording already active, ignoring start");
            return Ok(current.segment);
        }

        self.capture.start()?;
        info!(key = %TakeStore::key(&verse.id, resolved), "recording started");
        *active = Some(ActiveTake {
            verse_id: verse.id.clone(),
            segment: resolved,
        });
        Ok(resolved)
    }

    /// Finalize the active recording into a stored take.
    ///
    /// Returns `None` when no recording was active or nothing was
    /// captured.
    pub fn stop_recording(&self) -> Result<Option<SavedTake>, RecordError> {
        let target = {
            let mut active = self
                .active
                .lock()
                .map_err(|_| RecordError::Store("recorder state lock poisoned".to_string()))?;
            active.take()
        };
        let Some(target) = target else {
            return Ok(None);
        };

        let Some(audio) = self.capture.stop() else {
            return Ok(None);
        };
        let path = self.store.save(&target.verse_id, target.segment, &audio)?;
        let key = TakeStore::key(&target.verse_id, target.segment);
        info!(%key, duration_secs = audio.duration_secs(), "take saved");
        Ok(Some(SavedTake { key, path }))
    }

    /// Play the stored take for the resolved segment
    pub async fn play_take<P: MediaPlayer>(
        &self,
        player: &P,
        verse: &Verse,
        segment: SegmentKey,
    ) -> Result<(), RecordError> {
        let resolved = resolve_key(verse, segment);
        let key = TakeStore::key(&verse.id, resolved);
        let path = self
            .store
            .take_path(&verse.id, resolved)
            .ok_or(RecordError::NoTake(key))?;
        player.play(&path, 1.0).await?;
        Ok(())
    }

    /// Delete the stored take for the resolved segment; returns whether
    /// one existed
    pub fn clear_take(&self, verse: &Verse, segment: SegmentKey) -> Result<bool, RecordError> {
        let resolved = resolve_key(verse, segment);
        self.store.clear(&verse.id, resolved)
    }

    /// Whether a take exists for the resolved segment
    pub fn has_take(&self, verse: &Verse, segment: SegmentKey) -> bool {
        self.store.has_take(&verse.id, resolve_key(verse, segment))
    }

    /// Play the reference, pause briefly, then play the take.
    ///
    /// Both preconditions are checked before any playback, so a missing
    /// reference or take issues zero play calls; the two failures are
    /// distinct because they call for different corrective action.
    pub async fn compare_ab<P: MediaPlayer>(
        &self,
        player: &P,
        verse: &Verse,
        segment: SegmentKey,
        audio_base: &Path,
    ) -> Result<(), RecordError> {
        let resolved = resolve_key(verse, segment);
        let key = TakeStore::key(&verse.id, resolved);

        let reference = resolve_asset(verse, resolved)
            .ok_or_else(|| RecordError::NoReference(key.clone()))?;
        let take_path = self
            .store
            .take_path(&verse.id, resolved)
            .ok_or(RecordError::NoTake(key))?;

        player.play(&reference.resolve(audio_base), 1.0).await?;
        tokio::time::sleep(COMPARE_GAP).await;
        player.play(&take_path, 1.0).await?;
        Ok(())
    }
}
