//! Arrow projectile lifecycle
//!
//! ```text
//! Flying -> PlayerHit -> Embedded(player) -> FadingOut -> Removed
//! Flying -> SurfaceHit -> Embedded(surface) -> Removed
//! ```
//!
//! Leaving `Flying` is the only way to register a hit, so a second contact
//! in a later tick finds the arrow in another state and is ignored. A
//! lifetime cap removes the arrow from any state.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::events::EntityId;
use super::timer::Countdown;
use crate::settings::ArrowConfig;

/// What an embedded arrow is stuck in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Anchor {
    /// Rides along with the player at a fixed offset
    Player { offset: Vec3 },
    /// Fixed in terrain or an obstacle
    Surface,
}

/// Arrow state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ArrowState {
    Flying,
    /// Hit the player this tick (damage already applied)
    PlayerHit { offset: Vec3 },
    /// Hit terrain or an obstacle this tick
    SurfaceHit,
    Embedded { anchor: Anchor, remaining: Countdown },
    FadingOut { offset: Vec3, remaining: Countdown },
    Removed,
}

/// Durations captured from config at fire time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowTiming {
    pub droop: f32,
    pub stick_secs: f32,
    pub fade_secs: f32,
    pub embed_secs: f32,
}

impl From<&ArrowConfig> for ArrowTiming {
    fn from(config: &ArrowConfig) -> Self {
        Self {
            droop: config.droop,
            stick_secs: config.stick_duration,
            fade_secs: config.fade_duration,
            embed_secs: config.embed_duration,
        }
    }
}

/// An arrow in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arrow {
    pub id: EntityId,
    pub lane: u8,
    pub position: Vec3,
    /// Flight direction (not renormalised; droop bends it downward)
    pub direction: Vec3,
    pub speed: f32,
    pub state: ArrowState,
    timing: ArrowTiming,
    lifetime: Countdown,
}

impl Arrow {
    pub fn new(
        id: EntityId,
        lane: u8,
        position: Vec3,
        direction: Vec3,
        speed: f32,
        config: &ArrowConfig,
    ) -> Self {
        Self {
            id,
            lane,
            position,
            direction,
            speed,
            state: ArrowState::Flying,
            timing: ArrowTiming::from(config),
            lifetime: Countdown::from_secs(config.lifetime),
        }
    }

    #[inline]
    pub fn is_flying(&self) -> bool {
        matches!(self.state, ArrowState::Flying)
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        matches!(self.state, ArrowState::Removed)
    }

    /// Player contact. Returns true only on the first contact while flying.
    pub fn hit_player(&mut self, player_position: Vec3) -> bool {
        if !self.is_flying() {
            return false;
        }
        self.state = ArrowState::PlayerHit {
            offset: self.position - player_position,
        };
        true
    }

    /// Terrain or obstacle contact. Returns true only while flying.
    pub fn hit_surface(&mut self) -> bool {
        if !self.is_flying() {
            return false;
        }
        self.state = ArrowState::SurfaceHit;
        true
    }

    /// Destroy immediately (blocked by a shield)
    pub fn remove(&mut self) {
        self.state = ArrowState::Removed;
    }

    /// Visibility in [0, 1]; only fading arrows are translucent
    pub fn opacity(&self) -> f32 {
        match self.state {
            ArrowState::FadingOut { remaining, .. } => {
                let total = Countdown::from_secs(self.timing.fade_secs).remaining_ticks();
                remaining.remaining_ticks() as f32 / total as f32
            }
            ArrowState::Removed => 0.0,
            _ => 1.0,
        }
    }

    /// Advance one tick. `player_position` carries arrows stuck to the player.
    pub fn step(&mut self, player_position: Option<Vec3>, dt: f32) {
        if self.is_removed() {
            return;
        }
        if self.lifetime.tick() {
            self.state = ArrowState::Removed;
            return;
        }

        self.state = match self.state {
            ArrowState::Flying => {
                self.position += self.direction * self.speed * dt;
                self.direction.y -= self.timing.droop * dt;
                ArrowState::Flying
            }
            ArrowState::PlayerHit { offset } => ArrowState::Embedded {
                anchor: Anchor::Player { offset },
                remaining: Countdown::from_secs(self.timing.stick_secs),
            },
            ArrowState::SurfaceHit => ArrowState::Embedded {
                anchor: Anchor::Surface,
                remaining: Countdown::from_secs(self.timing.embed_secs),
            },
            ArrowState::Embedded {
                anchor,
                mut remaining,
            } => {
                if let (Anchor::Player { offset }, Some(p)) = (anchor, player_position) {
                    self.position = p + offset;
                }
                if remaining.tick() {
                    match anchor {
                        Anchor::Player { offset } => ArrowState::FadingOut {
                            offset,
                            remaining: Countdown::from_secs(self.timing.fade_secs),
                        },
                        Anchor::Surface => ArrowState::Removed,
                    }
                } else {
                    ArrowState::Embedded { anchor, remaining }
                }
            }
            ArrowState::FadingOut {
                offset,
                mut remaining,
            } => {
                if let Some(p) = player_position {
                    self.position = p + offset;
                }
                if remaining.tick() {
                    ArrowState::Removed
                } else {
                    ArrowState::FadingOut { offset, remaining }
                }
            }
            ArrowState::Removed => ArrowState::Removed,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn arrow() -> Arrow {
        Arrow::new(
            1,
            1,
            Vec3::new(0.0, 5.0, 50.0),
            Vec3::new(0.0, 0.0, -1.0),
            20.0,
            &ArrowConfig::default(),
        )
    }

    #[test]
    fn test_flight_advances_and_droops() {
        let mut a = arrow();
        a.step(None, SIM_DT);
        assert!((a.position.z - (50.0 - 20.0 * SIM_DT)).abs() < 1e-4);
        assert!(a.direction.y < 0.0);
        let dy_first = a.direction.y;
        a.step(None, SIM_DT);
        // Droop accumulates at a fixed rate regardless of speed
        assert!((a.direction.y - 2.0 * dy_first).abs() < 1e-6);
    }

    #[test]
    fn test_player_hit_only_once() {
        let mut a = arrow();
        let player = Vec3::new(0.0, 1.0, 49.0);
        assert!(a.hit_player(player));
        assert!(!a.hit_player(player));
        a.step(Some(player), SIM_DT);
        assert!(!a.hit_player(player));
        assert!(!a.hit_surface());
        assert!(matches!(
            a.state,
            ArrowState::Embedded {
                anchor: Anchor::Player { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_stuck_arrow_follows_player_then_fades() {
        let mut a = arrow();
        let mut player = Vec3::new(0.0, 1.0, 49.0);
        a.hit_player(player);
        let offset = a.position - player;

        // PlayerHit -> Embedded, then 30 ticks stuck
        a.step(Some(player), SIM_DT);
        for _ in 0..30 {
            player.z += 1.0;
            a.step(Some(player), SIM_DT);
        }
        assert!((a.position - (player + offset)).length() < 1e-4);
        assert!(matches!(a.state, ArrowState::FadingOut { .. }));
        assert!((a.opacity() - 1.0).abs() < 1e-6);

        for _ in 0..15 {
            a.step(Some(player), SIM_DT);
        }
        assert!((a.opacity() - 0.5).abs() < 1e-6);
        for _ in 0..15 {
            a.step(Some(player), SIM_DT);
        }
        assert!(a.is_removed());
        assert_eq!(a.opacity(), 0.0);
    }

    #[test]
    fn test_surface_hit_stops_and_expires() {
        let mut a = arrow();
        assert!(a.hit_surface());
        let at = a.position;
        a.step(None, SIM_DT);
        for _ in 0..179 {
            a.step(None, SIM_DT);
            assert_eq!(a.position, at);
        }
        assert!(!a.is_removed());
        a.step(None, SIM_DT);
        assert!(a.is_removed());
    }

    #[test]
    fn test_lifetime_cap() {
        let mut a = arrow();
        a.direction = Vec3::ZERO;
        for _ in 0..599 {
            a.step(None, SIM_DT);
        }
        assert!(a.is_flying());
        a.step(None, SIM_DT);
        assert!(a.is_removed());
    }
}
