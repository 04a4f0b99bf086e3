// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! File watcher for live practice-settings changes.
//!
//! Watches the configuration file and pushes reloaded practice settings
//! into the shared handle a running sequencer reads from, so a repeat
//! count edited mid-run lands on the very next play. Edits are debounced
//! because editors fire several modify events per save.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use super::AppConfig;
use crate::practice::SharedSettings;

/// Reload the practice settings from a config file
pub fn reload_settings(path: &Path) -> Result<crate::practice::PracticeSettings> {
    Ok(AppConfig::load(path)?.practice)
}

/// Watches one configuration file and applies settings edits live
pub struct SettingsWatcher {
    _watcher: RecommendedWatcher,
    watched_path: PathBuf,
}

impl SettingsWatcher {
    /// Watch `path` and push each successful reload into `settings`.
    ///
    /// Parse failures are logged and skipped; the previous settings stay
    /// in effect.
    pub fn spawn<P: AsRef<Path>>(
        path: P,
        settings: SharedSettings,
        debounce_ms: Option<u64>,
    ) -> Result<Self> {
        let watched_path = path.as_ref().to_path_buf();
        let debounce = Duration::from_millis(debounce_ms.unwrap_or(500));

        let (notify_tx, notify_rx): (Sender<Event>, Receiver<Event>) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            },
            Config::default(),
        )
        .map_err(|e| anyhow!("Failed to create file watcher: {}", e))?;

        watcher
            .watch(&watched_path, RecursiveMode::NonRecursive)
            .map_err(|e| anyhow!("Failed to watch path {:?}: {}", watched_path, e))?;

        // Debounce thread: coalesce modify bursts, then reload and apply
        let reload_path = watched_path.clone();
        std::thread::spawn(move || {
            let mut last_event: Option<Instant> = None;

            loop {
                match notify_rx.recv_timeout(Duration::from_millis(100)) {
                    Ok(event) => {
                        if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                            last_event = Some(Instant::now());
                        }
                    }
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        if let Some(when) = last_event {
                            if when.elapsed() >= debounce {
                                last_event = None;
                                match reload_settings(&reload_path) {
                                    Ok(new_settings) => {
                                        settings.replace(new_settings);
                                        info!(
                                            path = %reload_path.display(),
                                            "practice settings reloaded"
                                        );
                                    }
                                    Err(err) => {
                                        warn!(
                                            path = %reload_path.display(),
                                            %err,
                                            "settings reload failed, keeping previous"
                                        );
                                    }
                                }
                            }
                        }
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            watched_path: path.as_ref().to_path_buf(),
        })
    }

    /// The path under watch
    pub fn watched_path(&self) -> &Path {
        &self.watched_path
    }
}
