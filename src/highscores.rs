//! Best-altitude leaderboard
//!
//! Keeps the top 10 scores in descending order. Storage is up to the host;
//! the board only converts to and from JSON.

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero score never qualifies
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a qualifying score, returning its rank (1-indexed)
    pub fn add_score(&mut self, score: u64, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(rank - 1, HighScoreEntry { score, timestamp });
        self.entries.truncate(MAX_HIGH_SCORES);
        log::info!("New high score {} at rank {}", score, rank);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut scores: Self = serde_json::from_str(json)?;
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Relative age of a timestamp, both in Unix ms
pub fn format_age(now: f64, timestamp: f64) -> String {
    let mins = ((now - timestamp) / 60_000.0).max(0.0);
    let hours = mins / 60.0;
    let days = hours / 24.0;

    if days >= 1.0 {
        match days.floor() as i64 {
            1 => "Yesterday".to_string(),
            n => format!("{} days ago", n),
        }
    } else if hours >= 1.0 {
        match hours.floor() as i64 {
            1 => "1 hour ago".to_string(),
            n => format!("{} hours ago", n),
        }
    } else if mins >= 1.0 {
        match mins.floor() as i64 {
            1 => "1 min ago".to_string(),
            n => format!("{} mins ago", n),
        }
    } else {
        "Just now".to_string()
    }
}
