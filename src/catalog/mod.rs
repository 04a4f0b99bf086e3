// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Verse catalog for PATHA.
//!
//! This module provides the verse data model and catalog loading:
//! - Verse records with per-foot text, glosses, and audio asset references
//! - Segment keys addressing feet, foot-pairs, and the full recitation
//! - One-shot JSON catalog loading (the `data/verses.json` format)

pub mod segment;

pub use segment::{resolve_asset, resolve_key, singles_sequence, total_planned_plays};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Logical address of a playable part of a verse.
///
/// `P1`..`P4` are the four metrical feet, `P12`/`P34` the combined
/// foot-pairs, and `Full` the complete recitation. Not every key resolves
/// to an audio asset for every verse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKey {
    /// First foot
    P1,
    /// Second foot
    P2,
    /// Third foot
    P3,
    /// Fourth foot
    P4,
    /// First and second feet combined
    P12,
    /// Third and fourth feet combined
    P34,
    /// Complete verse
    Full,
}

impl SegmentKey {
    /// All keys in canonical order
    pub const ALL: [SegmentKey; 7] = [
        SegmentKey::P1,
        SegmentKey::P2,
        SegmentKey::P3,
        SegmentKey::P4,
        SegmentKey::P12,
        SegmentKey::P34,
        SegmentKey::Full,
    ];

    /// Canonical lowercase name (`p1`..`p4`, `p12`, `p34`, `full`)
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKey::P1 => "p1",
            SegmentKey::P2 => "p2",
            SegmentKey::P3 => "p3",
            SegmentKey::P4 => "p4",
            SegmentKey::P12 => "p12",
            SegmentKey::P34 => "p34",
            SegmentKey::Full => "full",
        }
    }

    /// Whether this key names one of the four individual feet
    pub fn is_foot(&self) -> bool {
        matches!(
            self,
            SegmentKey::P1 | SegmentKey::P2 | SegmentKey::P3 | SegmentKey::P4
        )
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p1" => Ok(SegmentKey::P1),
            "p2" => Ok(SegmentKey::P2),
            "p3" => Ok(SegmentKey::P3),
            "p4" => Ok(SegmentKey::P4),
            "p12" => Ok(SegmentKey::P12),
            "p34" => Ok(SegmentKey::P34),
            "full" => Ok(SegmentKey::Full),
            other => Err(format!("unknown segment key: '{}'", other)),
        }
    }
}

/// Reference to an audio asset, relative to the configured audio directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(pub String);

impl AssetRef {
    /// The raw relative path string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve against the audio base directory
    pub fn resolve(&self, base: &Path) -> PathBuf {
        base.join(&self.0)
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text of the four feet in one rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FootText {
    #[serde(default)]
    pub p1: String,
    #[serde(default)]
    pub p2: String,
    #[serde(default)]
    pub p3: String,
    #[serde(default)]
    pub p4: String,
}

impl FootText {
    /// Text for a foot key; empty string for pair/full keys
    pub fn foot(&self, key: SegmentKey) -> &str {
        match key {
            SegmentKey::P1 => &self.p1,
            SegmentKey::P2 => &self.p2,
            SegmentKey::P3 => &self.p3,
            SegmentKey::P4 => &self.p4,
            _ => "",
        }
    }
}

/// Verse gloss in the two catalog languages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gloss {
    /// Sanskrit paraphrase
    #[serde(default)]
    pub sa: String,
    /// English meaning
    #[serde(default)]
    pub en: String,
}

/// Declared availability of the pair recordings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairFlags {
    #[serde(default)]
    pub p12: bool,
    #[serde(default)]
    pub p34: bool,
}

/// Audio asset references by segment key. Any key may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioMap {
    #[serde(default)]
    pub p1: Option<AssetRef>,
    #[serde(default)]
    pub p2: Option<AssetRef>,
    #[serde(default)]
    pub p3: Option<AssetRef>,
    #[serde(default)]
    pub p4: Option<AssetRef>,
    #[serde(default)]
    pub p12: Option<AssetRef>,
    #[serde(default)]
    pub p34: Option<AssetRef>,
    #[serde(default)]
    pub full: Option<AssetRef>,
}

impl AudioMap {
    /// Asset for a segment key, if the catalog declares one
    pub fn get(&self, key: SegmentKey) -> Option<&AssetRef> {
        match key {
            SegmentKey::P1 => self.p1.as_ref(),
            SegmentKey::P2 => self.p2.as_ref(),
            SegmentKey::P3 => self.p3.as_ref(),
            SegmentKey::P4 => self.p4.as_ref(),
            SegmentKey::P12 => self.p12.as_ref(),
            SegmentKey::P34 => self.p34.as_ref(),
            SegmentKey::Full => self.full.as_ref(),
        }
    }
}

/// A single verse record.
///
/// Loaded once from the catalog at startup and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    /// Stable identity, used to key recorded takes
    pub id: String,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Meter name
    #[serde(default)]
    pub meter: String,
    /// Complete verse text
    #[serde(default)]
    pub full: String,
    /// Primary rendering of the four feet
    #[serde(default)]
    pub text: FootText,
    /// Alternative practice rendering, when the verse has one
    #[serde(default)]
    pub practice: Option<FootText>,
    /// Gloss text
    #[serde(default)]
    pub gloss: Gloss,
    /// True when the verse ships only combined-pair audio; per-foot
    /// assets are never used for playback regardless of presence
    #[serde(default, rename = "needsSplitPractice")]
    pub needs_split_practice: bool,
    /// Declared availability of pair recordings
    #[serde(default)]
    pub available: PairFlags,
    /// Audio asset references
    #[serde(default)]
    pub audio: AudioMap,
}

impl Verse {
    /// The foot rendering to display: the practice rendering when requested
    /// and present, the primary text otherwise
    pub fn display_feet(&self, use_practice: bool) -> &FootText {
        if use_practice {
            if let Some(practice) = &self.practice {
                return practice;
            }
        }
        &self.text
    }
}

/// The loaded verse catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    verses: Vec<Verse>,
}

impl Catalog {
    /// Build a catalog from already-parsed verses
    pub fn new(verses: Vec<Verse>) -> Self {
        Self { verses }
    }

    /// Load the catalog from a JSON file.
    ///
    /// Any shape failure is fatal: no partial catalog is accepted.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read catalog file: {:?}", path.as_ref()))?;
        Self::from_json(&contents)
    }

    /// Parse a catalog from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let verses: Vec<Verse> =
            serde_json::from_str(json).context("Failed to parse verse catalog JSON")?;
        Ok(Self::new(verses))
    }

    /// Number of verses
    pub fn len(&self) -> usize {
        self.verses.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    /// Verse at a 0-based index
    pub fn verse(&self, index: usize) -> Option<&Verse> {
        self.verses.get(index)
    }

    /// Iterate over all verses in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Verse> {
        self.verses.iter()
    }

    /// Index of the verse with the given id
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.verses.iter().position(|v| v.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"[
            {
                "id": "v1",
                "title": "Verse 1",
                "meter": "śārdūlavikrīḍita",
                "full": "line one line two",
                "text": {"p1": "a", "p2": "b", "p3": "c", "p4": "d"},
                "practice": {"p1": "a-", "p2": "b-", "p3": "c-", "p4": "d-"},
                "gloss": {"sa": "artha", "en": "meaning"},
                "needsSplitPractice": true,
                "available": {"p12": true, "p34": true},
                "audio": {"p12": "v1_p12.wav", "p34": "v1_p34.wav", "full": "v1_full.wav"}
            },
            {
                "id": "v2",
                "title": "Verse 2",
                "text": {"p1": "e", "p2": "f", "p3": "g", "p4": "h"},
                "audio": {"p1": "v2_p1.wav", "full": "v2_full.wav"}
            }
        ]"#
    }

    #[test]
    fn test_catalog_from_json() {
        let catalog = Catalog::from_json(sample_json()).unwrap();
        assert_eq!(catalog.len(), 2);

        let v1 = catalog.verse(0).unwrap();
        assert!(v1.needs_split_practice);
        assert!(v1.available.p12);
        assert_eq!(v1.audio.get(SegmentKey::P12).unwrap().as_str(), "v1_p12.wav");
        assert!(v1.audio.get(SegmentKey::P1).is_none());

        let v2 = catalog.verse(1).unwrap();
        assert!(!v2.needs_split_practice);
        assert!(!v2.available.p12);
        assert!(v2.practice.is_none());
    }

    #[test]
    fn test_catalog_rejects_malformed_json() {
        assert!(Catalog::from_json("{not json").is_err());
        assert!(Catalog::from_json(r#"{"id": "v1"}"#).is_err()); // not an array
    }

    #[test]
    fn test_index_of() {
        let catalog = Catalog::from_json(sample_json()).unwrap();
        assert_eq!(catalog.index_of("v2"), Some(1));
        assert_eq!(catalog.index_of("v99"), None);
    }

    #[test]
    fn test_segment_key_round_trip() {
        for key in SegmentKey::ALL {
            assert_eq!(key.as_str().parse::<SegmentKey>().unwrap(), key);
        }
        assert!("p5".parse::<SegmentKey>().is_err());
    }

    #[test]
    fn test_display_feet_prefers_practice_rendering() {
        let catalog = Catalog::from_json(sample_json()).unwrap();
        let v1 = catalog.verse(0).unwrap();
        assert_eq!(v1.display_feet(true).p1, "a-");
        assert_eq!(v1.display_feet(false).p1, "a");

        // Verse without a practice rendering falls back to text
        let v2 = catalog.verse(1).unwrap();
        assert_eq!(v2.display_feet(true).p1, "e");
    }

    #[test]
    fn test_asset_ref_resolve() {
        let asset = AssetRef("v1_full.wav".to_string());
        let path = asset.resolve(Path::new("/audio"));
        assert_eq!(path, PathBuf::from("/audio/v1_full.wav"));
    }
}
