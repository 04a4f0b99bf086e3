// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use patha::audio::{self, CpalCapture, CpalPlayer};
use patha::catalog::{total_planned_plays, Catalog, SegmentKey};
use patha::config::{AppConfig, SettingsWatcher};
use patha::practice::SharedSettings;
use patha::recorder::{Recorder, TakeStore};
use patha::session::DrillSession;
use patha::status::StatusSink;

fn print_usage() {
    println!("PATHA - Verse Recitation Drilling");
    println!();
    println!("Usage: patha [--config FILE] COMMAND");
    println!();
    println!("Commands:");
    println!("  --list                    List the verses in the catalog");
    println!("  --show N                  Show verse N (text, gloss, planned plays)");
    println!("  --play N SEG              Play one segment of verse N (p1..p4, p12, p34, full)");
    println!("  --drill [N]               Run the practice pattern for verse N (default: 1)");
    println!("  --drill-set \"SPEC\"        Drill a practice set, e.g. \"1-10, 12, 14\"");
    println!("  --record N SEG            Record a take for verse N; Enter stops");
    println!("  --play-take N SEG         Play back your stored take");
    println!("  --clear-take N SEG        Delete your stored take");
    println!("  --compare N SEG           Play reference, then your take");
    println!("  --list-devices            List audio output and input devices");
    println!("  --help                    Show this help message");
    println!();
    println!("While drilling, Ctrl+C stops after the current unit. Edits to the");
    println!("config file take effect on the next play.");
}

type Session = DrillSession<CpalPlayer, CpalCapture>;

/// Load the catalog and assemble a session over the real audio devices
fn build_session(config: &AppConfig) -> Result<Session> {
    let catalog = Catalog::load(&config.catalog_path)?;
    let settings = SharedSettings::new(config.practice);
    let recorder = Recorder::new(CpalCapture::new(), TakeStore::new(&config.takes_dir));
    let (status, mut rx) = StatusSink::channel();

    // Surface status messages the way the web UI's status bar would
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            println!("{}", event);
        }
    });

    DrillSession::new(
        catalog,
        config.audio_dir.clone(),
        CpalPlayer::new(),
        recorder,
        settings,
        status,
    )
}

/// Cancel the run token when Ctrl+C arrives
fn arm_ctrl_c(session: &Session) {
    let token = session.run_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
}

fn parse_verse_number(arg: &str, catalog_len: usize) -> Result<usize> {
    let n: usize = arg
        .parse()
        .with_context(|| format!("verse number expected, got '{}'", arg))?;
    if n == 0 || n > catalog_len {
        bail!("verse number {} out of range 1-{}", n, catalog_len);
    }
    Ok(n - 1)
}

fn parse_segment(arg: &str) -> Result<SegmentKey> {
    arg.parse::<SegmentKey>().map_err(|e| anyhow::anyhow!(e))
}

fn list_verses(config: &AppConfig) -> Result<()> {
    let catalog = Catalog::load(&config.catalog_path)?;
    for (i, verse) in catalog.iter().enumerate() {
        let mode = if verse.needs_split_practice {
            " (split practice)"
        } else {
            ""
        };
        println!("{:3}  {:<8} {}{}", i + 1, verse.id, verse.title, mode);
    }
    Ok(())
}

fn show_verse(config: &AppConfig, arg: &str) -> Result<()> {
    let catalog = Catalog::load(&config.catalog_path)?;
    let index = parse_verse_number(arg, catalog.len())?;
    let verse = catalog
        .verse(index)
        .context("verse index out of range")?;

    println!("{} ({})", verse.title, verse.meter);
    println!();
    let feet = verse.display_feet(config.practice.use_practice_text);
    for key in [SegmentKey::P1, SegmentKey::P2, SegmentKey::P3, SegmentKey::P4] {
        println!("  {}: {}", key, feet.foot(key));
    }
    println!();
    if !verse.gloss.sa.is_empty() {
        println!("  {}", verse.gloss.sa);
    }
    if !verse.gloss.en.is_empty() {
        println!("  {}", verse.gloss.en);
    }
    println!();
    println!(
        "Planned plays per run: {}",
        total_planned_plays(verse, &config.practice)
    );
    Ok(())
}

fn list_devices() {
    println!("Output devices:");
    for name in audio::list_output_devices() {
        println!("  {}", name);
    }
    println!("Input devices:");
    for name in audio::list_input_devices() {
        println!("  {}", name);
    }
}

async fn record_take(session: &mut Session, index: usize, segment: SegmentKey) -> Result<()> {
    session.select_verse(index);
    session.start_recording(segment)?;
    println!("Recording… press Enter to stop.");

    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
    })
    .await
    .context("stdin reader failed")?;

    session.stop_recording()?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut config_path = PathBuf::from("patha.yaml");
    if args.first().map(String::as_str) == Some("--config") {
        if args.len() < 2 {
            bail!("--config requires a file path");
        }
        config_path = PathBuf::from(args.remove(1));
        args.remove(0);
    }
    let config = AppConfig::load_or_default(&config_path)?;

    match args.first().map(String::as_str) {
        None | Some("--help") => {
            print_usage();
            Ok(())
        }
        Some("--list") => list_verses(&config),
        Some("--show") => {
            let n = args.get(1).context("--show requires a verse number")?;
            show_verse(&config, n)
        }
        Some("--list-devices") => {
            list_devices();
            Ok(())
        }
        Some("--play") => {
            let (n, seg) = two_args(&args, "--play")?;
            let mut session = build_session(&config)?;
            let index = parse_verse_number(&n, session.catalog().len())?;
            session.select_verse(index);
            session.play_segment(parse_segment(&seg)?).await?;
            Ok(())
        }
        Some("--drill") => {
            let mut session = build_session(&config)?;
            let index = match args.get(1) {
                Some(n) => parse_verse_number(n, session.catalog().len())?,
                None => 0,
            };
            session.select_verse(index);
            arm_ctrl_c(&session);
            let _watcher = watch_settings(&config_path, &session);
            session.start_practice_run().await;
            Ok(())
        }
        Some("--drill-set") => {
            let spec = args.get(1).context("--drill-set requires a selector")?;
            let mut session = build_session(&config)?;
            if session.apply_set(spec).is_err() {
                bail!("invalid practice-set selector: '{}'", spec);
            }
            arm_ctrl_c(&session);
            let _watcher = watch_settings(&config_path, &session);
            session.start_practice_run().await;
            Ok(())
        }
        Some("--record") => {
            let (n, seg) = two_args(&args, "--record")?;
            let mut session = build_session(&config)?;
            let index = parse_verse_number(&n, session.catalog().len())?;
            record_take(&mut session, index, parse_segment(&seg)?).await
        }
        Some("--play-take") => {
            let (n, seg) = two_args(&args, "--play-take")?;
            let mut session = build_session(&config)?;
            let index = parse_verse_number(&n, session.catalog().len())?;
            session.select_verse(index);
            let _ = session.play_take(parse_segment(&seg)?).await;
            Ok(())
        }
        Some("--clear-take") => {
            let (n, seg) = two_args(&args, "--clear-take")?;
            let mut session = build_session(&config)?;
            let index = parse_verse_number(&n, session.catalog().len())?;
            session.select_verse(index);
            session.clear_take(parse_segment(&seg)?)?;
            Ok(())
        }
        Some("--compare") => {
            let (n, seg) = two_args(&args, "--compare")?;
            let mut session = build_session(&config)?;
            let index = parse_verse_number(&n, session.catalog().len())?;
            session.select_verse(index);
            let _ = session.compare_ab(parse_segment(&seg)?).await;
            Ok(())
        }
        Some(other) => {
            println!("Unknown option: {}", other);
            println!();
            print_usage();
            Ok(())
        }
    }
}

fn two_args(args: &[String], command: &str) -> Result<(String, String)> {
    match (args.get(1), args.get(2)) {
        (Some(n), Some(seg)) => Ok((n.clone(), seg.clone())),
        _ => bail!("{} requires a verse number and a segment key", command),
    }
}

/// Keep the settings file under watch for the duration of a drill run
fn watch_settings(config_path: &std::path::Path, session: &Session) -> Option<SettingsWatcher> {
    if !config_path.is_file() {
        return None;
    }
    match SettingsWatcher::spawn(config_path, session.settings().clone(), None) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            tracing::warn!(%err, "settings watcher unavailable");
            None
        }
    }
}
