//! World queries and the per-tick context handed to every component
//!
//! Components never reach into the simulation root. They read the player
//! through a `WorldQuery` snapshot taken once per tick and write through a
//! `Ctx` (RNG, id allocator, event queue).

use glam::Vec3;
use rand_pcg::Pcg32;

use super::events::{EntityId, EventQueue};

/// Read-only view of the world a component may depend on
pub trait WorldQuery {
    /// Player position, or None when no player exists
    fn player_position(&self) -> Option<Vec3>;
    /// Player's current effective forward speed
    fn player_forward_speed(&self) -> f32;
    /// True while a run is in progress and not paused
    fn is_gameplay_active(&self) -> bool;
}

/// Player data captured at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSnapshot {
    pub position: Vec3,
    pub forward_speed: f32,
}

/// Consistent world view shared by all continuous tasks within one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldSnapshot {
    pub player: Option<PlayerSnapshot>,
    pub gameplay_active: bool,
}

impl WorldSnapshot {
    /// Snapshot with a player at `position` moving at `forward_speed`
    pub fn with_player(position: Vec3, forward_speed: f32) -> Self {
        Self {
            player: Some(PlayerSnapshot {
                position,
                forward_speed,
            }),
            gameplay_active: true,
        }
    }

    /// Snapshot without a player (components pause)
    pub fn empty() -> Self {
        Self::default()
    }
}

impl WorldQuery for WorldSnapshot {
    fn player_position(&self) -> Option<Vec3> {
        self.player.map(|p| p.position)
    }

    fn player_forward_speed(&self) -> f32 {
        self.player.map(|p| p.forward_speed).unwrap_or(0.0)
    }

    fn is_gameplay_active(&self) -> bool {
        self.gameplay_active
    }
}

/// Monotonic entity id source
#[derive(Debug, Clone)]
pub struct EntityIds {
    next: EntityId,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next_id(&mut self) -> EntityId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Mutable services available to a component during a tick
pub struct Ctx<'a> {
    pub rng: &'a mut Pcg32,
    pub ids: &'a mut EntityIds,
    pub events: &'a mut EventQueue,
    pub dt: f32,
}

impl<'a> Ctx<'a> {
    pub fn new(
        rng: &'a mut Pcg32,
        ids: &'a mut EntityIds,
        events: &'a mut EventQueue,
        dt: f32,
    ) -> Self {
        Self {
            rng,
            ids,
            events,
            dt,
        }
    }

    #[inline]
    pub fn next_id(&mut self) -> EntityId {
        self.ids.next_id()
    }
}

/// Standalone RNG, ids and event queue for driving a component directly
#[cfg(test)]
pub(crate) struct TestHarness {
    pub rng: Pcg32,
    pub ids: EntityIds,
    pub events: EventQueue,
}

#[cfg(test)]
impl TestHarness {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self {
            rng: Pcg32::seed_from_u64(seed),
            ids: EntityIds::default(),
            events: EventQueue::new(),
        }
    }

    pub fn ctx(&mut self) -> Ctx<'_> {
        Ctx::new(
            &mut self.rng,
            &mut self.ids,
            &mut self.events,
            crate::consts::SIM_DT,
        )
    }
}
