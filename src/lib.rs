// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! PATHA - verse-recitation drilling engine.
//!
//! Sequences pre-recorded audio segments of a verse (individual feet,
//! foot-pairs, full recitation) through a configurable repetition
//! pattern, drills single verses or multi-verse practice sets, and lets
//! a learner record a take and A/B-compare it against the reference.
//!
//! Core modules:
//! - [`catalog`] - Verse data model, catalog loading, segment addressing
//! - [`practice`] - Practice sequencer, set runner, selector grammar
//! - [`audio`] - Playback and capture primitives (cpal/hound)
//! - [`recorder`] - Take capture, storage, and A/B comparison
//! - [`session`] - The command surface toward a UI layer
//! - [`config`] - Configuration file and live settings reload
//! - [`status`] - Status notifications emitted by every command

pub mod audio;
pub mod catalog;
pub mod config;
pub mod practice;
pub mod recorder;
pub mod session;
pub mod status;

pub use catalog::{Catalog, SegmentKey, Verse};
pub use practice::{parse_practice_set, PracticeSettings, RunOutcome, RunToken, SharedSettings};
pub use recorder::{Recorder, TakeStore};
pub use session::DrillSession;
pub use status::{StatusEvent, StatusSink};
