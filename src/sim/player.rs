//! Player locomotion and health

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::timer::Countdown;
use crate::consts::*;
use crate::lane_x;
use crate::settings::PlayerConfig;

/// Result of applying damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Player was already dead
    Ignored,
    Hurt { health: i32 },
    Killed,
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Centre of the body (y = PLAYER_GROUND_Y when standing on the track)
    pub position: Vec3,
    /// Current lane (0 = left, 1 = middle, 2 = right)
    pub lane: u8,
    /// Base forward speed, before effect modifiers
    pub forward_speed: f32,
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
    pub vertical_velocity: f32,
    pub grounded: bool,
    /// Remaining slide time (None when not sliding)
    pub slide: Option<Countdown>,
}

impl PlayerState {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            position: Vec3::new(0.0, PLAYER_GROUND_Y, 0.0),
            lane: START_LANE,
            forward_speed: config.start_speed,
            health: config.max_health,
            max_health: config.max_health,
            alive: true,
            vertical_velocity: 0.0,
            grounded: true,
            slide: None,
        }
    }

    /// Shift one lane left (-1) or right (+1); out-of-range shifts are ignored
    pub fn change_lane(&mut self, direction: i8) -> bool {
        let target = self.lane as i16 + direction as i16;
        if !(0..LANE_COUNT as i16).contains(&target) {
            return false;
        }
        self.lane = target as u8;
        true
    }

    /// Start a jump (only from the ground)
    pub fn jump(&mut self, config: &PlayerConfig) -> bool {
        if !self.grounded {
            return false;
        }
        self.grounded = false;
        self.vertical_velocity = config.jump_velocity;
        true
    }

    /// Start a slide (only from the ground, not while already sliding)
    pub fn slide(&mut self, config: &PlayerConfig) -> bool {
        if !self.grounded || self.is_sliding() {
            return false;
        }
        self.slide = Some(Countdown::from_secs(config.slide_duration));
        true
    }

    #[inline]
    pub fn is_sliding(&self) -> bool {
        self.slide.is_some()
    }

    #[inline]
    pub fn feet_y(&self) -> f32 {
        self.position.y - PLAYER_GROUND_Y
    }

    /// Height of the hit volume (halved while sliding)
    #[inline]
    pub fn hit_height(&self) -> f32 {
        if self.is_sliding() {
            PLAYER_HEIGHT * 0.5
        } else {
            PLAYER_HEIGHT
        }
    }

    /// Forward speed after the speed-boost factor
    #[inline]
    pub fn effective_speed(&self, speed_factor: f32) -> f32 {
        self.forward_speed * speed_factor
    }

    /// Advance locomotion by one tick
    pub fn step(&mut self, config: &PlayerConfig, speed_factor: f32, dt: f32) {
        if !self.alive {
            return;
        }

        // Speed ramps toward the cap
        if self.forward_speed < config.max_speed {
            self.forward_speed =
                (self.forward_speed + config.speed_increase_rate * dt).min(config.max_speed);
        }

        self.position.z += self.effective_speed(speed_factor) * dt;

        // Lane switching eases toward the lane centre
        let target_x = lane_x(self.lane, config.lane_distance);
        let t = (config.lane_switch_speed * dt).clamp(0.0, 1.0);
        self.position.x += (target_x - self.position.x) * t;

        if !self.grounded {
            self.vertical_velocity -= config.gravity * dt;
            self.position.y += self.vertical_velocity * dt;
            if self.position.y <= PLAYER_GROUND_Y {
                self.position.y = PLAYER_GROUND_Y;
                self.vertical_velocity = 0.0;
                self.grounded = true;
            }
        }

        if let Some(slide) = self.slide.as_mut() {
            if slide.tick() {
                self.slide = None;
            }
        }
    }

    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome::Ignored;
        }
        self.health -= amount;
        if self.health <= 0 {
            self.alive = false;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Hurt {
                health: self.health,
            }
        }
    }

    /// Restore health, clamped to the maximum. Returns the new health.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if self.alive {
            self.health = (self.health + amount).min(self.max_health);
        }
        self.health
    }

    /// Kill outright. Returns false if already dead.
    pub fn die(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.vertical_velocity = 0.0;
        true
    }
}
