// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Persisted take storage.
//!
//! One WAV file per `verseId::segmentKey` key under the takes directory.
//! At most one take exists per key; saving again overwrites. Takes
//! persist across sessions until explicitly cleared.

use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::debug;

use super::RecordError;
use crate::audio::TakeAudio;
use crate::catalog::SegmentKey;

/// Directory-backed store of recorded takes
#[derive(Debug, Clone)]
pub struct TakeStore {
    dir: PathBuf,
}

impl TakeStore {
    /// Store rooted at the given directory. The directory is created on
    /// the first save.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Logical store key for a verse and resolved segment
    pub fn key(verse_id: &str, segment: SegmentKey) -> String {
        format!("{}::{}", verse_id, segment)
    }

    /// File path backing a key. Verse ids pass through a conservative
    /// sanitizer so an odd catalog id cannot escape the takes directory.
    pub fn path_for(&self, verse_id: &str, segment: SegmentKey) -> PathBuf {
        let safe_id: String = verse_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.dir.join(format!("{}__{}.wav", safe_id, segment))
    }

    /// Persist a take, overwriting any prior take for the key
    pub fn save(
        &self,
        verse_id: &str,
        segment: SegmentKey,
        take: &TakeAudio,
    ) -> Result<PathBuf, RecordError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| RecordError::Store(format!("could not create takes dir: {}", e)))?;

        let path = self.path_for(verse_id, segment);
        let spec = WavSpec {
            channels: take.channels.max(1),
            sample_rate: take.sample_rate.max(1),
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec)
            .map_err(|e| RecordError::Store(format!("could not create take file: {}", e)))?;
        for &sample in &take.samples {
            writer
                .write_sample(sample)
                .map_err(|e| RecordError::Store(format!("could not write take: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| RecordError::Store(format!("could not finalize take: {}", e)))?;

        debug!(key = %Self::key(verse_id, segment), path = %path.display(), "take saved");
        Ok(path)
    }

    /// Path of the stored take, if one exists
    pub fn take_path(&self, verse_id: &str, segment: SegmentKey) -> Option<PathBuf> {
        let path = self.path_for(verse_id, segment);
        path.is_file().then_some(path)
    }

    /// Whether a take exists for the key
    pub fn has_take(&self, verse_id: &str, segment: SegmentKey) -> bool {
        self.take_path(verse_id, segment).is_some()
    }

    /// Delete the stored take. Deleting a nonexistent take is not an
    /// error; returns whether anything was removed.
    pub fn clear(&self, verse_id: &str, segment: SegmentKey) -> Result<bool, RecordError> {
        match self.take_path(verse_id, segment) {
            Some(path) => {
                fs::remove_file(&path)
                    .map_err(|e| RecordError::Store(format!("could not delete take: {}", e)))?;
                debug!(key = %Self::key(verse_id, segment), "take cleared");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
