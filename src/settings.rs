//! Player preferences
//!
//! Persisted as JSON next to the result history. Missing or unreadable
//! settings fall back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::highscores::MAX_HIGH_SCORES;
use crate::persistence::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Accessibility ===
    /// Gentler obstacle pacing
    pub reduced_motion: bool,

    // === Simulation ===
    /// Fixed RNG seed (random per run when unset)
    pub seed: Option<u64>,

    // === Leaderboard ===
    /// Rows shown on the leaderboard
    pub leaderboard_size: usize,
    /// Where session results are stored
    pub history_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            seed: None,
            leaderboard_size: MAX_HIGH_SCORES,
            history_path: PathBuf::from("flap-sim-history.json"),
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
