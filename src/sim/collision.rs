//! Hit volumes for players, obstacles and arrows
//!
//! Everything on the track is an axis-aligned box. Arrows are treated as a
//! point at their tip.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::obstacle::Obstacle;
use super::player::PlayerState;
use crate::consts::*;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    /// Box from a centre and half extents
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Point containment (boundary inclusive)
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Overlap test (touching faces do not count)
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmplt(other.max).all() && other.min.cmplt(self.max).all()
    }
}

/// The player's hit volume (half height while sliding)
pub fn player_volume(player: &PlayerState) -> Aabb {
    let feet = player.feet_y();
    let height = player.hit_height();
    Aabb::new(
        Vec3::new(
            player.position.x - PLAYER_HALF_WIDTH,
            feet,
            player.position.z - PLAYER_HALF_DEPTH,
        ),
        Vec3::new(
            player.position.x + PLAYER_HALF_WIDTH,
            feet + height,
            player.position.z + PLAYER_HALF_DEPTH,
        ),
    )
}

/// An obstacle's hit volume, shaped by its kind
pub fn obstacle_volume(obstacle: &Obstacle) -> Aabb {
    let (bottom, top) = obstacle.kind.vertical_span();
    let half = obstacle.kind.half_footprint();
    Aabb::new(
        Vec3::new(
            obstacle.position.x - half,
            obstacle.position.y + bottom,
            obstacle.position.z - half,
        ),
        Vec3::new(
            obstacle.position.x + half,
            obstacle.position.y + top,
            obstacle.position.z + half,
        ),
    )
}

/// Point inside the shield bubble around `center`
#[inline]
pub fn in_shield(center: Vec3, radius: f32, point: Vec3) -> bool {
    center.distance_squared(point) <= radius * radius
}

/// True once an arrow tip has reached the ground plane
#[inline]
pub fn below_ground(point: Vec3) -> bool {
    point.y <= 0.0
}

/// Horizontal (XZ) distance, used for pickups
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let d = a - b;
    (d.x * d.x + d.z * d.z).sqrt()
}
