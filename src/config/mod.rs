// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for PATHA.
//!
//! This module provides the application configuration file: catalog and
//! audio locations, the takes directory, and the startup practice
//! settings. A file watcher (`watcher`) feeds live edits of the practice
//! settings into a running session.

pub mod watcher;

pub use watcher::SettingsWatcher;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::practice::PracticeSettings;

/// Root application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Verse catalog JSON file
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
    /// Directory audio asset references resolve against
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
    /// Directory recorded takes persist under
    #[serde(default = "default_takes_dir")]
    pub takes_dir: PathBuf,
    /// Practice settings applied at startup and on file reload
    #[serde(default)]
    pub practice: PracticeSettings,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/verses.json")
}
fn default_audio_dir() -> PathBuf {
    PathBuf::from("audio")
}
fn default_takes_dir() -> PathBuf {
    PathBuf::from("takes")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            audio_dir: default_audio_dir(),
            takes_dir: default_takes_dir(),
            practice: PracticeSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Load from a file, falling back to defaults when it does not exist.
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().is_file() {
            Self::load(path)
        } else {
            debug!(path = %path.as_ref().display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }
}
