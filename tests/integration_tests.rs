// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for PATHA
//!
//! These tests drive the public session API end to end with the
//! scripted player and capture, from catalog JSON through drilling,
//! set running, and the record/compare flow.

use std::path::PathBuf;

use patha::audio::{ScriptedCapture, ScriptedPlayer};
use patha::catalog::Catalog;
use patha::practice::{parse_practice_set, PracticeSettings, SharedSettings};
use patha::recorder::{Recorder, TakeStore};
use patha::session::DrillSession;
use patha::status::{StatusEvent, StatusSink};
use patha::SegmentKey;

const CATALOG_JSON: &str = r#"[
    {
        "id": "v1",
        "title": "First verse",
        "meter": "anuṣṭubh",
        "full": "one two three four",
        "text": {"p1": "one", "p2": "two", "p3": "three", "p4": "four"},
        "needsSplitPractice": true,
        "available": {"p12": true, "p34": true},
        "audio": {"p12": "v1_p12.wav", "p34": "v1_p34.wav", "full": "v1_full.wav"}
    },
    {
        "id": "v2",
        "title": "Second verse",
        "meter": "anuṣṭubh",
        "full": "five six seven eight",
        "text": {"p1": "five", "p2": "six", "p3": "seven", "p4": "eight"},
        "available": {"p12": true, "p34": true},
        "audio": {
            "p1": "v2_p1.wav", "p2": "v2_p2.wav", "p3": "v2_p3.wav", "p4": "v2_p4.wav",
            "p12": "v2_p12.wav", "p34": "v2_p34.wav", "full": "v2_full.wav"
        }
    },
    {
        "id": "v3",
        "title": "Third verse",
        "meter": "anuṣṭubh",
        "full": "nine ten",
        "text": {"p1": "nine", "p2": "ten", "p3": "", "p4": ""},
        "audio": {"p1": "v3_p1.wav", "full": "v3_full.wav"}
    }
]"#;

fn settings(singles: u32, pairs: u32, full: u32) -> SharedSettings {
    SharedSettings::new(PracticeSettings {
        singles_repeat: singles,
        pairs_repeat: pairs,
        full_repeat: full,
        ..Default::default()
    })
}

fn build_session(
    takes_dir: &std::path::Path,
    settings: SharedSettings,
) -> (
    DrillSession<ScriptedPlayer, ScriptedCapture>,
    tokio::sync::mpsc::UnboundedReceiver<StatusEvent>,
) {
    let catalog = Catalog::from_json(CATALOG_JSON).unwrap();
    let (status, rx) = StatusSink::channel();
    let session = DrillSession::new(
        catalog,
        PathBuf::from("/audio"),
        ScriptedPlayer::new(),
        Recorder::new(ScriptedCapture::new(), TakeStore::new(takes_dir)),
        settings,
        status,
    )
    .unwrap();
    (session, rx)
}

fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<StatusEvent>) -> Vec<StatusEvent> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

/// The documented repeat pattern for a normal verse with all assets:
/// 4*2 singles + 2 pairs + 1 full, in order
#[tokio::test]
async fn test_normal_verse_drill_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _rx) = build_session(dir.path(), settings(2, 1, 1));

    session.select_verse(1);
    let outcome = session.start_practice_run().await;

    assert!(outcome.is_done());
    assert_eq!(session.planned_plays(), 11);
}

/// A split-practice verse drills pairs in the singles stage and the
/// sibling feet address the same audio
#[tokio::test]
async fn test_split_practice_drill_and_addressing() {
    let catalog = Catalog::from_json(CATALOG_JSON).unwrap();
    let v1 = catalog.verse(0).unwrap();

    assert_eq!(
        patha::catalog::singles_sequence(v1),
        &[SegmentKey::P12, SegmentKey::P34]
    );
    assert_eq!(
        patha::catalog::resolve_asset(v1, SegmentKey::P1),
        patha::catalog::resolve_asset(v1, SegmentKey::P12)
    );
    assert_eq!(
        patha::catalog::resolve_asset(v1, SegmentKey::P3),
        patha::catalog::resolve_asset(v1, SegmentKey::P34)
    );
}

/// Set run across verses: order, verse switches, and the failure policy
#[tokio::test]
async fn test_set_run_continues_past_failed_verse() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::from_json(CATALOG_JSON).unwrap();
    let player = ScriptedPlayer::new();
    // v3 has no p2..p4 audio but does have p1 and full; fail its full
    player.fail_sources_containing("v3_full");
    let (status, mut rx) = StatusSink::channel();
    let mut session = DrillSession::new(
        catalog,
        PathBuf::from("/audio"),
        player,
        Recorder::new(ScriptedCapture::new(), TakeStore::new(dir.path())),
        settings(1, 0, 1),
        status,
    )
    .unwrap();

    session.apply_set("3,2").unwrap();
    let outcome = session.start_practice_run().await;

    assert!(outcome.is_done());
    assert_eq!(session.active_index(), 1);

    let events = drain(&mut rx);
    let switches: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            StatusEvent::VerseChanged { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(switches, vec![2, 1]);
    assert!(events
        .iter()
        .any(|e| matches!(e, StatusEvent::VerseFailed { index: 2, .. })));
    assert!(events.contains(&StatusEvent::Done));
}

/// A cancellation left over from an earlier stop does not bleed into
/// the next run, and stopping cancels the shared token
#[tokio::test]
async fn test_run_resets_stale_cancellation() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, mut rx) = build_session(dir.path(), settings(2, 1, 1));

    session.select_verse(1);
    session.stop_practice_run();
    assert!(session.run_token().is_cancelled());

    session.apply_set("1-3").unwrap();
    let outcome = session.start_practice_run().await;
    assert!(outcome.is_done());

    session.stop_practice_run();
    assert!(session.run_token().is_cancelled());
    let events = drain(&mut rx);
    assert!(events.contains(&StatusEvent::Done));
}

/// The literal selector cases the grammar is defined by
#[test]
fn test_selector_literal_cases() {
    assert_eq!(
        parse_practice_set("1-3,2,5-4", 5).unwrap(),
        vec![0, 1, 2, 4, 3]
    );
    assert_eq!(parse_practice_set("", 12).unwrap(), Vec::<usize>::new());
    assert_eq!(parse_practice_set("0,7", 5).unwrap(), Vec::<usize>::new());
    assert_eq!(
        parse_practice_set("1-10, 1,7,8, 2-5, 9, 12-14", 14).unwrap(),
        vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 11, 12, 13]
    );
}

/// Takes persist across sessions sharing a store directory
#[tokio::test]
async fn test_takes_persist_across_sessions() {
    let dir = tempfile::tempdir().unwrap();

    {
        let (mut session, mut rx) = build_session(dir.path(), settings(1, 1, 1));
        session.start_recording(SegmentKey::P1).unwrap();
        session.stop_recording().unwrap();
        let events = drain(&mut rx);
        // v1 is split practice: the take lands under the pair key
        assert!(events.contains(&StatusEvent::TakeSaved {
            key: "v1::p12".to_string()
        }));
    }

    // A brand new session over the same directory still finds the take
    let (mut session, _rx) = build_session(dir.path(), settings(1, 1, 1));
    session.play_take(SegmentKey::P2).await.unwrap();
    session.compare_ab(SegmentKey::P1).await.unwrap();
}

/// Record, clear, then play reports NoTake
#[tokio::test]
async fn test_record_clear_play_take() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, mut rx) = build_session(dir.path(), settings(1, 1, 1));

    session.select_verse(1);
    session.start_recording(SegmentKey::P3).unwrap();
    session.stop_recording().unwrap();
    session.clear_take(SegmentKey::P3).unwrap();

    assert!(session.play_take(SegmentKey::P3).await.is_err());
    let events = drain(&mut rx);
    assert!(events.contains(&StatusEvent::NoTake {
        key: "v2::p3".to_string()
    }));
}

/// An unavailable microphone surfaces as status and aborts only the
/// record action
#[tokio::test]
async fn test_mic_unavailable_surfaces() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::from_json(CATALOG_JSON).unwrap();
    let (status, mut rx) = StatusSink::channel();
    let mut session = DrillSession::new(
        catalog,
        PathBuf::from("/audio"),
        ScriptedPlayer::new(),
        Recorder::new(ScriptedCapture::unavailable(), TakeStore::new(dir.path())),
        settings(1, 1, 1),
        status,
    )
    .unwrap();

    assert!(session.start_recording(SegmentKey::P1).is_err());
    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, StatusEvent::MicUnavailable { .. })));

    // The session is still usable for playback afterwards
    session.select_verse(1);
    assert!(session.play_segment(SegmentKey::P1).await.unwrap());
}

/// Settings edits through the shared handle land on the session with no
/// reload step
#[tokio::test]
async fn test_shared_settings_edits_are_live() {
    let dir = tempfile::tempdir().unwrap();
    let shared = settings(1, 0, 0);
    let (mut session, _rx) = build_session(dir.path(), shared.clone());

    session.select_verse(1);
    assert_eq!(session.planned_plays(), 4);

    shared.update(|s| s.singles_repeat = 10);
    assert_eq!(session.planned_plays(), 40);

    assert!(session.play_segment(SegmentKey::P1).await.unwrap());
}
