//! Session result storage
//!
//! The engine never touches storage; the driving layer hands finished
//! results to a `ResultStore` and reads history back for the leaderboard.
//!
//! File format: versioned JSON envelope, written to a temporary file and
//! renamed over the target so a crash mid-write leaves the old history intact.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::highscores::SessionResult;

/// Envelope version written by this build
pub const FORMAT_VERSION: u32 = 1;
/// Oldest results are dropped beyond this many
pub const MAX_HISTORY: usize = 200;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("history I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("history is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported history version {0}")]
    UnsupportedVersion(u32),
}

/// Persistence collaborator for finished sessions
pub trait ResultStore {
    fn save(&mut self, result: &SessionResult) -> Result<(), StoreError>;
    fn load_history(&self) -> Result<Vec<SessionResult>, StoreError>;
}

/// Keeps history for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    results: Vec<SessionResult>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryStore {
    fn save(&mut self, result: &SessionResult) -> Result<(), StoreError> {
        self.results.push(result.clone());
        trim_history(&mut self.results);
        Ok(())
    }

    fn load_history(&self) -> Result<Vec<SessionResult>, StoreError> {
        Ok(self.results.clone())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    results: Vec<SessionResult>,
}

/// History persisted as a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write(&self, results: Vec<SessionResult>) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let envelope = Envelope {
            version: FORMAT_VERSION,
            results,
        };
        let json = serde_json::to_string_pretty(&envelope)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ResultStore for JsonFileStore {
    fn save(&mut self, result: &SessionResult) -> Result<(), StoreError> {
        let mut results = self.load_history()?;
        results.push(result.clone());
        trim_history(&mut results);
        self.write(results)?;
        log::info!("Saved session result to {}", self.path.display());
        Ok(())
    }

    fn load_history(&self) -> Result<Vec<SessionResult>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No history at {}, starting fresh", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let envelope: Envelope = serde_json::from_str(&json)?;
        if envelope.version != FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion(envelope.version));
        }
        log::info!("Loaded {} session results", envelope.results.len());
        Ok(envelope.results)
    }
}

fn trim_history(results: &mut Vec<SessionResult>) {
    if results.len() > MAX_HISTORY {
        let excess = results.len() - MAX_HISTORY;
        results.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: u32) -> SessionResult {
        SessionResult {
            started_at: format!("2026-10-19T12:00:{:02}.000Z", score % 60),
            duration_secs: 3,
            score,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("flap-sim-test-{}-{}", std::process::id(), name))
            .join("history.json")
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        store.save(&result(4)).unwrap();
        store.save(&result(9)).unwrap();
        let history = store.load_history().unwrap();
        assert_eq!(history, vec![result(4), result(9)]);
    }

    #[test]
    fn test_history_is_capped() {
        let mut store = MemoryStore::new();
        for score in 0..(MAX_HISTORY as u32 + 5) {
            store.save(&result(score)).unwrap();
        }
        let history = store.load_history().unwrap();
        assert_eq!(history.len(), MAX_HISTORY);
        // Oldest dropped first
        assert_eq!(history[0].score, 5);
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let store = JsonFileStore::new(temp_path("missing"));
        assert!(store.load_history().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let path = temp_path("persist");
        let _ = fs::remove_file(&path);

        let mut store = JsonFileStore::new(&path);
        store.save(&result(3)).unwrap();
        store.save(&result(8)).unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.load_history().unwrap(), vec![result(3), result(8)]);
        assert!(!store.tmp_path().exists());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load_history(), Err(StoreError::Json(_))));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_future_version_is_rejected() {
        let path = temp_path("version");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"version": 99, "results": []}"#).unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.load_history(),
            Err(StoreError::UnsupportedVersion(99))
        ));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
