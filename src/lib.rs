//! Face the Arrows - a lane-based endless runner simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (streaming, threat scheduling, effects, chase)
//! - `settings`: Data-driven tunables for every simulation component
//! - `highscores`: High score leaderboard and persistence stores
//! - `presentation`: Hooks the host implements to render, play audio and drive UI

pub mod error;
pub mod highscores;
pub mod presentation;
pub mod settings;
pub mod sim;

pub use error::PersistenceError;
pub use highscores::{HighScoreStore, HighScores, JsonFileStore};
pub use presentation::{PresentationHooks, present};
pub use settings::Settings;

use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Number of lanes on the track
    pub const LANE_COUNT: u8 = 3;
    /// Lane the player starts in (middle)
    pub const START_LANE: u8 = 1;

    /// Height of the player's centre when standing on the ground
    pub const PLAYER_GROUND_Y: f32 = 1.0;
    /// Full standing height of the player's hit volume
    pub const PLAYER_HEIGHT: f32 = 2.0;
    /// Half width of the player's hit volume
    pub const PLAYER_HALF_WIDTH: f32 = 0.5;
    /// Half depth of the player's hit volume
    pub const PLAYER_HALF_DEPTH: f32 = 0.5;
}

/// World X coordinate of a lane centre (lane 1 sits on the track axis)
#[inline]
pub fn lane_x(lane: u8, lane_distance: f32) -> f32 {
    (lane as f32 - 1.0) * lane_distance
}

/// Triangle wave bouncing between 0 and `length`
#[inline]
pub fn pingpong(t: f32, length: f32) -> f32 {
    if length <= 0.0 {
        return 0.0;
    }
    let period = length * 2.0;
    let t = t.rem_euclid(period);
    length - (t - length).abs()
}

/// Uniform sample in `[lo, hi]`; collapses to `lo` for empty or inverted ranges
#[inline]
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        lo
    } else {
        rng.random_range(lo..=hi)
    }
}

/// Uniform index into a collection of `len` items (None when empty)
#[inline]
pub fn pick_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(rng.random_range(0..len))
    }
}
