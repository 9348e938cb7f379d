//! High score leaderboard system
//!
//! The simulation only tracks the best score of the session; keeping it
//! across sessions is the job of a `HighScoreStore`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Opaque key-value persistence for the best score
pub trait HighScoreStore {
    /// Best score recorded so far (0 when nothing is stored)
    fn load_high_score(&self) -> f32;
    /// Record a new best score
    fn save_high_score(&mut self, score: f32);
}

/// A single high score entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final score of the run
    pub score: f32,
    /// Distance travelled (meters)
    #[serde(default)]
    pub distance: f32,
}

/// High score leaderboard (sorted descending by score)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a run in score order. Returns the 1-based rank, or None when
    /// the run did not make the board.
    pub fn add_run(&mut self, score: f32, distance: f32) -> Option<usize> {
        if score <= 0.0 {
            return None;
        }
        // Ties rank below the run already on the board
        let index = self.entries.partition_point(|e| e.score >= score);
        if index >= MAX_HIGH_SCORES {
            return None;
        }
        self.entries.insert(index, HighScoreEntry { score, distance });
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(index + 1)
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<f32> {
        self.entries.first().map(|e| e.score)
    }
}

impl HighScoreStore for HighScores {
    fn load_high_score(&self) -> f32 {
        self.top_score().unwrap_or(0.0)
    }

    fn save_high_score(&mut self, score: f32) {
        self.add_run(score, 0.0);
    }
}

/// Leaderboard persisted as a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    board: HighScores,
}

impl JsonFileStore {
    /// Open the store, starting fresh if the file is missing or unreadable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let board = match Self::read(&path) {
            Ok(board) => {
                log::info!("Loaded {} high scores", board.entries.len());
                board
            }
            Err(e) => {
                log::info!("No high scores loaded ({}), starting fresh", e);
                HighScores::new()
            }
        };
        Self { path, board }
    }

    fn read(path: &Path) -> Result<HighScores, PersistenceError> {
        let json = fs::read_to_string(path).map_err(|e| PersistenceError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Record a finished run and write the file if it made the board
    pub fn record_run(&mut self, score: f32, distance: f32) -> Option<usize> {
        let rank = self.board.add_run(score, distance)?;
        if let Err(e) = self.persist() {
            log::warn!("Failed to save high scores: {}", e);
        }
        Some(rank)
    }

    /// Write the leaderboard to disk
    pub fn persist(&self) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(&self.board)?;
        fs::write(&self.path, json).map_err(|e| PersistenceError::io(&self.path, e))?;
        log::info!("High scores saved ({} entries)", self.board.entries.len());
        Ok(())
    }
}

impl HighScoreStore for JsonFileStore {
    fn load_high_score(&self) -> f32 {
        self.board.load_high_score()
    }

    fn save_high_score(&mut self, score: f32) {
        self.record_run(score, 0.0);
    }
}
