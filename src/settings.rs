//! Game tunables
//!
//! Every spawn interval, difficulty rate, lane/segment dimension, effect
//! duration and projectile parameter lives here. Loaded from a JSON file;
//! missing fields take their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Player locomotion and health
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Forward speed at run start (units/s)
    pub start_speed: f32,
    /// Forward acceleration (units/s²)
    pub speed_increase_rate: f32,
    /// Forward speed cap
    pub max_speed: f32,
    /// Lateral spacing between lane centres
    pub lane_distance: f32,
    /// Lateral lerp rate toward the target lane
    pub lane_switch_speed: f32,
    /// Initial upward velocity of a jump
    pub jump_velocity: f32,
    /// Downward acceleration while airborne
    pub gravity: f32,
    /// How long a slide lasts (seconds)
    pub slide_duration: f32,
    pub max_health: i32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start_speed: 10.0,
            speed_increase_rate: 0.1,
            max_speed: 30.0,
            lane_distance: 3.0,
            lane_switch_speed: 10.0,
            jump_velocity: 10.0,
            gravity: 30.0,
            slide_duration: 1.0,
            max_health: 3,
        }
    }
}

/// Segment streaming and environment scatter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Segment templates picked at random while streaming
    pub segment_templates: Vec<String>,
    /// Fixed segment placed at the origin on warm-up
    pub start_segment: Option<String>,
    pub segment_length: f32,
    pub max_segments_active: usize,
    /// Emit a segment while the next spawn Z is closer than this
    pub spawn_distance: f32,
    /// Remove a segment once the player is this far past its start
    pub despawn_distance: f32,
    /// Seconds between streaming checks
    pub stream_interval: f32,
    pub prop_templates: Vec<String>,
    pub prop_spawn_chance: f32,
    pub min_prop_distance: f32,
    pub max_prop_distance: f32,
    /// Chance a segment carries a row of coins
    pub coin_row_chance: f32,
    pub coins_per_row: usize,
    /// Chance a segment carries a power-up
    pub power_up_chance: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            segment_templates: vec![
                "forest_path".to_string(),
                "river_bridge".to_string(),
                "ruins".to_string(),
            ],
            start_segment: Some("start_clearing".to_string()),
            segment_length: 30.0,
            max_segments_active: 5,
            spawn_distance: 100.0,
            despawn_distance: 30.0,
            stream_interval: 0.5,
            prop_templates: vec![
                "pine".to_string(),
                "boulder".to_string(),
                "bush".to_string(),
                "stump".to_string(),
            ],
            prop_spawn_chance: 0.3,
            min_prop_distance: 5.0,
            max_prop_distance: 15.0,
            coin_row_chance: 0.5,
            coins_per_row: 5,
            power_up_chance: 0.15,
        }
    }
}

/// Arrow lane-attack scheduling and projectile behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowConfig {
    /// Projectile template; `None` disables firing (warnings still show)
    pub arrow_template: Option<String>,
    /// Ground marker template; `None` skips the marker but keeps the delay
    pub warning_template: Option<String>,
    pub arrow_speed: f32,
    /// Spawn distance ahead of the player
    pub spawn_distance: f32,
    pub arrow_height: f32,
    pub min_spawn_interval: f32,
    pub max_spawn_interval: f32,
    /// Multiplicative interval decay per escalation
    pub difficulty_increase_rate: f32,
    /// Floor for the minimum interval (the maximum floors at twice this)
    pub min_interval_limit: f32,
    /// Seconds between escalations
    pub escalation_interval: f32,
    pub warning_duration: f32,
    /// Warning marker distance ahead of the player
    pub warning_lead: f32,
    /// Aim point distance ahead of the player at fire time
    pub target_lead: f32,
    pub despawn_behind_distance: f32,
    pub cleanup_interval: f32,
    /// Downward curvature added to the flight direction per second
    pub droop: f32,
    /// Safety-net lifetime of any arrow
    pub lifetime: f32,
    /// Time an arrow stays stuck to the player before fading
    pub stick_duration: f32,
    pub fade_duration: f32,
    /// Time an arrow stays embedded in terrain
    pub embed_duration: f32,
}

impl Default for ArrowConfig {
    fn default() -> Self {
        Self {
            arrow_template: Some("arrow".to_string()),
            warning_template: Some("lane_warning".to_string()),
            arrow_speed: 20.0,
            spawn_distance: 50.0,
            arrow_height: 5.0,
            min_spawn_interval: 2.0,
            max_spawn_interval: 5.0,
            difficulty_increase_rate: 0.95,
            min_interval_limit: 0.5,
            escalation_interval: 10.0,
            warning_duration: 0.5,
            warning_lead: 5.0,
            target_lead: 2.0,
            despawn_behind_distance: 20.0,
            cleanup_interval: 1.0,
            droop: 0.1,
            lifetime: 10.0,
            stick_duration: 0.5,
            fade_duration: 0.5,
            embed_duration: 3.0,
        }
    }
}

/// Ground obstacle scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    /// Obstacles that can never be avoided (logs, rocks, pits)
    pub ground_templates: Vec<String>,
    /// Low obstacles cleared by jumping
    pub jump_templates: Vec<String>,
    /// High obstacles cleared by sliding
    pub slide_templates: Vec<String>,
    pub min_spawn_distance: f32,
    pub max_spawn_distance: f32,
    pub spawn_ahead_distance: f32,
    pub despawn_behind_distance: f32,
    /// Z of the first decision point
    pub first_spawn_z: f32,
    pub initial_obstacle_chance: f32,
    pub max_obstacle_chance: f32,
    /// Additive chance growth per escalation
    pub difficulty_increase_rate: f32,
    pub escalation_interval: f32,
    pub spawn_check_interval: f32,
    pub cleanup_interval: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            ground_templates: vec!["log".to_string(), "rock".to_string(), "pit".to_string()],
            jump_templates: vec!["low_fence".to_string(), "fallen_trunk".to_string()],
            slide_templates: vec!["hanging_branch".to_string(), "rope_barrier".to_string()],
            min_spawn_distance: 10.0,
            max_spawn_distance: 20.0,
            spawn_ahead_distance: 50.0,
            despawn_behind_distance: 20.0,
            first_spawn_z: 10.0,
            initial_obstacle_chance: 0.3,
            max_obstacle_chance: 0.7,
            difficulty_increase_rate: 0.01,
            escalation_interval: 5.0,
            spawn_check_interval: 0.5,
            cleanup_interval: 1.0,
        }
    }
}

/// Power-up durations and magnitudes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub shield_duration: f32,
    pub shield_fade_duration: f32,
    /// Radius of the bubble around the player's centre
    pub shield_radius: f32,
    pub heal_amount: i32,
    pub magnet_duration: f32,
    pub magnet_range: f32,
    /// Coin pull speed (units/s)
    pub magnet_force: f32,
    pub multiplier_duration: f32,
    pub score_multiplier: f32,
    pub speed_boost_duration: f32,
    pub speed_boost_factor: f32,
    /// Contact distance for coins and power-ups
    pub pickup_radius: f32,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            shield_duration: 5.0,
            shield_fade_duration: 0.5,
            shield_radius: 1.2,
            heal_amount: 1,
            magnet_duration: 5.0,
            magnet_range: 10.0,
            magnet_force: 20.0,
            multiplier_duration: 5.0,
            score_multiplier: 2.0,
            speed_boost_duration: 5.0,
            speed_boost_factor: 1.5,
            pickup_radius: 1.0,
        }
    }
}

/// Wild animal pack chasing the player
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaseConfig {
    pub enabled: bool,
    /// Following gap the pack tries to hold
    pub chase_distance: f32,
    pub catch_up_speed: f32,
    /// Speed used when the player's speed is unknown
    pub normal_speed: f32,
    /// The player is caught below this distance
    pub catch_distance: f32,
    pub pack_size: usize,
    pub pack_spread: f32,
    pub growl_interval: f32,
    /// Per-step roar chance while catching up
    pub roar_chance: f32,
}

impl Default for ChaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            chase_distance: 5.0,
            catch_up_speed: 15.0,
            normal_speed: 10.0,
            catch_distance: 1.0,
            pack_size: 3,
            pack_spread: 2.0,
            growl_interval: 3.0,
            roar_chance: 0.1,
        }
    }
}

/// Scoring and run flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub score_per_meter: f32,
    pub coin_value: f32,
    /// Delay between death and the game over panel
    pub game_over_delay: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            score_per_meter: 10.0,
            coin_value: 10.0,
            game_over_delay: 2.0,
        }
    }
}

/// All game tunables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerConfig,
    pub level: LevelConfig,
    pub arrows: ArrowConfig,
    pub obstacles: ObstacleConfig,
    pub effects: EffectsConfig,
    pub chase: ChaseConfig,
    pub scoring: ScoringConfig,
}

impl Settings {
    /// Parse settings from JSON (missing fields keep their defaults)
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read settings from a file
    pub fn read(path: &Path) -> Result<Self, PersistenceError> {
        let json = fs::read_to_string(path).map_err(|e| PersistenceError::io(path, e))?;
        Self::from_json(&json)
    }

    /// Load settings from a file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings: {}", e);
                Self::default()
            }
        }
    }

    /// Write settings to a file
    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| PersistenceError::io(path, e))?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "arrows": { "arrow_speed": 35.0 }, "chase": { "enabled": false } }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.arrows.arrow_speed, 35.0);
        assert_eq!(settings.arrows.min_spawn_interval, 2.0);
        assert!(!settings.chase.enabled);
        assert_eq!(settings.level.segment_length, 30.0);
        assert_eq!(settings.player.max_health, 3);
    }

    #[test]
    fn test_json_round_trip_preserves_templates() {
        let mut settings = Settings::default();
        settings.level.start_segment = None;
        settings.obstacles.jump_templates.clear();
        let json = settings.to_json().unwrap();
        let parsed = Settings::from_json(&json).unwrap();
        assert_eq!(parsed.level.start_segment, None);
        assert!(parsed.obstacles.jump_templates.is_empty());
        assert_eq!(parsed.obstacles.ground_templates.len(), 3);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(PersistenceError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let settings = Settings::load(Path::new("/nonexistent/face_the_arrows.json"));
        assert_eq!(settings.scoring.score_per_meter, 10.0);
    }
}
