// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Segment addressing.
//!
//! Maps a verse's logical parts onto whichever audio assets actually
//! exist for it. Split-practice verses ship no standalone per-foot
//! recordings, so foot keys remap onto the combined pairs: `p1`/`p2`
//! address `p12` and `p3`/`p4` address `p34`. This single rule lets
//! tap-to-play, drilling, and recording all address a special verse
//! by foot without caring about its audio inventory.

use super::{AssetRef, SegmentKey, Verse};
use crate::practice::PracticeSettings;

/// Singles-stage ordering for a normal verse
const SINGLES_NORMAL: [SegmentKey; 4] =
    [SegmentKey::P1, SegmentKey::P2, SegmentKey::P3, SegmentKey::P4];

/// Singles-stage ordering for a split-practice verse
const SINGLES_SPLIT: [SegmentKey; 2] = [SegmentKey::P12, SegmentKey::P34];

/// Resolve a logical segment key to the key actually used for audio
/// lookup and take storage.
///
/// Foot keys on a split-practice verse remap to their pair; every other
/// combination is the identity.
pub fn resolve_key(verse: &Verse, key: SegmentKey) -> SegmentKey {
    if !verse.needs_split_practice {
        return key;
    }
    match key {
        SegmentKey::P1 | SegmentKey::P2 => SegmentKey::P12,
        SegmentKey::P3 | SegmentKey::P4 => SegmentKey::P34,
        other => other,
    }
}

/// Resolve a logical segment key to its audio asset, if one exists
pub fn resolve_asset(verse: &Verse, key: SegmentKey) -> Option<&AssetRef> {
    verse.audio.get(resolve_key(verse, key))
}

/// The ordered unit list for the singles drilling stage.
///
/// `[p1, p2, p3, p4]` normally, `[p12, p34]` for split-practice verses.
pub fn singles_sequence(verse: &Verse) -> &'static [SegmentKey] {
    if verse.needs_split_practice {
        &SINGLES_SPLIT
    } else {
        &SINGLES_NORMAL
    }
}

/// Whether a pair unit counts for the total-plays estimate: its
/// availability flag must be set and its asset must resolve
pub fn pair_unit_present(verse: &Verse, key: SegmentKey) -> bool {
    let declared = match key {
        SegmentKey::P12 => verse.available.p12,
        SegmentKey::P34 => verse.available.p34,
        _ => return false,
    };
    declared && verse.audio.get(key).is_some()
}

/// Estimated total play count for one practice run of a verse.
///
/// Display-only: playback is driven by the sequencer, never by this
/// number.
pub fn total_planned_plays(verse: &Verse, settings: &PracticeSettings) -> u32 {
    let singles_units = singles_sequence(verse).len() as u32;
    let pair_units = [SegmentKey::P12, SegmentKey::P34]
        .into_iter()
        .filter(|&k| pair_unit_present(verse, k))
        .count() as u32;

    singles_units * settings.singles_repeat
        + pair_units * settings.pairs_repeat
        + settings.full_repeat
}
