//! Ground obstacles and the evasion contract

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::events::EntityId;
use super::player::PlayerState;

/// Obstacle categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Logs, rocks, pits: always a hit
    Ground,
    /// Low obstacle: clear it by jumping
    Jump,
    /// High obstacle: clear it by sliding
    Slide,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [ObstacleKind::Ground, ObstacleKind::Jump, ObstacleKind::Slide];

    /// Bottom and top of the hit volume above the ground
    pub fn vertical_span(&self) -> (f32, f32) {
        match self {
            ObstacleKind::Ground => (0.0, 1.0),
            ObstacleKind::Jump => (0.0, 0.5),
            ObstacleKind::Slide => (1.0, 2.0),
        }
    }

    /// Half of the square footprint
    #[inline]
    pub fn half_footprint(&self) -> f32 {
        0.5
    }

    /// Whether the player's stance at contact time clears this obstacle
    pub fn avoided_by(&self, player: &PlayerState) -> bool {
        match self {
            ObstacleKind::Ground => false,
            ObstacleKind::Jump => !player.grounded && player.feet_y() > self.vertical_span().1,
            ObstacleKind::Slide => player.is_sliding(),
        }
    }
}

/// Contact resolution state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleState {
    Standing,
    /// Contact already resolved as a hit; further contact is ignored
    Struck,
}

/// A placed obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: EntityId,
    pub kind: ObstacleKind,
    /// Index into the kind's template list
    pub template: usize,
    pub lane: u8,
    pub position: Vec3,
    pub state: ObstacleState,
}

impl Obstacle {
    /// Resolve a player contact. Returns true only for the first unavoided contact.
    pub fn resolve_contact(&mut self, player: &PlayerState) -> bool {
        if self.state == ObstacleState::Struck || self.kind.avoided_by(player) {
            return false;
        }
        self.state = ObstacleState::Struck;
        true
    }
}
