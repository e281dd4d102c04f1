//! Session results and leaderboard ranking
//!
//! Results are ranked by score (higher first); equal scores rank the shorter
//! session first, then the earlier one.

use std::cmp::Ordering;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::persistence::{ResultStore, StoreError};

/// Default number of leaderboard rows
pub const MAX_HIGH_SCORES: usize = 10;

/// A finished session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Session start (RFC 3339, UTC)
    pub started_at: String,
    /// Whole seconds, at least 1
    pub duration_secs: u32,
    pub score: u32,
}

impl SessionResult {
    /// Build a result from wall-clock start/end
    ///
    /// Duration is floored to whole seconds with a minimum of one second, which
    /// also absorbs a clock that went backwards.
    pub fn from_session(started: DateTime<Utc>, ended: DateTime<Utc>, score: u32) -> Self {
        let secs = (ended - started).num_seconds().clamp(1, u32::MAX as i64);
        Self {
            started_at: started.to_rfc3339_opts(SecondsFormat::Millis, true),
            duration_secs: secs as u32,
            score,
        }
    }
}

/// Leaderboard ordering: score desc, duration asc, start time asc
pub fn compare_results(a: &SessionResult, b: &SessionResult) -> Ordering {
    b.score
        .cmp(&a.score)
        .then(a.duration_secs.cmp(&b.duration_secs))
        .then_with(|| a.started_at.cmp(&b.started_at))
}

/// Top `n` results from an unordered history
pub fn rank_results(history: &[SessionResult], n: usize) -> Vec<SessionResult> {
    let mut ranked = history.to_vec();
    ranked.sort_by(compare_results);
    ranked.truncate(n);
    ranked
}

/// Ranked view over a session history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<SessionResult>,
    capacity: usize,
}

impl Leaderboard {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    pub fn from_history(history: &[SessionResult], capacity: usize) -> Self {
        Self {
            entries: rank_results(history, capacity),
            capacity,
        }
    }

    /// Rank whatever history `store` currently holds
    pub fn load(store: &impl ResultStore, capacity: usize) -> Result<Self, StoreError> {
        let history = store.load_history()?;
        Ok(Self::from_history(&history, capacity))
    }

    /// Whether `result` would earn a row, using the same ordering as `insert`
    pub fn qualifies(&self, result: &SessionResult) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.entries.len() < self.capacity {
            return true;
        }
        self.entries
            .last()
            .is_none_or(|last| compare_results(result, last) == Ordering::Less)
    }

    /// Insert a result, returning its 1-indexed rank if it made the board
    pub fn insert(&mut self, result: SessionResult) -> Option<usize> {
        if !self.qualifies(&result) {
            return None;
        }
        let pos = self
            .entries
            .iter()
            .position(|e| compare_results(&result, e) == Ordering::Less)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, result);
        self.entries.truncate(self.capacity);
        Some(pos + 1)
    }

    /// 1-indexed rank of `result` if it is on the board
    pub fn rank_of(&self, result: &SessionResult) -> Option<usize> {
        self.entries.iter().position(|e| e == result).map(|i| i + 1)
    }

    pub fn best(&self) -> Option<&SessionResult> {
        self.entries.first()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Format a duration as `m:ss`
pub fn format_duration(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
