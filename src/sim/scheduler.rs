//! Threat scheduling contract shared by the arrow and obstacle spawners

use super::events::EntityId;
use super::world::{Ctx, WorldQuery};

/// A periodic hazard emitter with a live set of spawned hazards
pub trait ThreatScheduler {
    /// Begin scheduling. No-op while already running; otherwise resets
    /// cursors and difficulty to their configured initial values.
    fn start(&mut self, world: &dyn WorldQuery, ctx: &mut Ctx<'_>);

    /// Cancel pending scheduled work. Live hazards stay in the world.
    fn stop(&mut self, ctx: &mut Ctx<'_>);

    fn is_running(&self) -> bool;

    /// Advance scheduling, escalation and cleanup by one tick
    fn update(&mut self, world: &dyn WorldQuery, ctx: &mut Ctx<'_>);

    /// Stop and remove every live hazard
    fn clear(&mut self, ctx: &mut Ctx<'_>);

    fn live_count(&self) -> usize;
}

/// A hazard tracked in a scheduler's live set
pub trait LiveHazard {
    fn id(&self) -> EntityId;
    fn z(&self) -> f32;
    /// Already finished and waiting to be dropped
    fn is_retired(&self) -> bool {
        false
    }
}

/// Drop hazards that are retired or more than `behind` units behind the
/// player, announcing each removal. Returns how many were dropped.
pub fn cleanup_live_set<H: LiveHazard>(
    live: &mut Vec<H>,
    player_z: Option<f32>,
    behind: f32,
    ctx: &mut Ctx<'_>,
) -> usize {
    let before = live.len();
    live.retain(|hazard| {
        let passed = player_z.is_some_and(|pz| hazard.z() < pz - behind);
        if passed || hazard.is_retired() {
            ctx.events.removed(hazard.id());
            false
        } else {
            true
        }
    });
    before - live.len()
}

/// Remove every hazard, announcing each removal
pub fn remove_all<H: LiveHazard>(live: &mut Vec<H>, ctx: &mut Ctx<'_>) {
    for hazard in live.drain(..) {
        ctx.events.removed(hazard.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::GameEvent;
    use crate::sim::world::TestHarness;

    struct Marker {
        id: EntityId,
        z: f32,
        retired: bool,
    }

    impl LiveHazard for Marker {
        fn id(&self) -> EntityId {
            self.id
        }
        fn z(&self) -> f32 {
            self.z
        }
        fn is_retired(&self) -> bool {
            self.retired
        }
    }

    fn live() -> Vec<Marker> {
        vec![
            Marker { id: 1, z: 0.0, retired: false },
            Marker { id: 2, z: 40.0, retired: false },
            Marker { id: 3, z: 60.0, retired: true },
            Marker { id: 4, z: 80.0, retired: false },
        ]
    }

    #[test]
    fn test_cleanup_drops_passed_and_retired() {
        let mut h = TestHarness::new(1);
        let mut set = live();
        let dropped = cleanup_live_set(&mut set, Some(50.0), 20.0, &mut h.ctx());
        assert_eq!(dropped, 2);
        let ids: Vec<EntityId> = set.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 4]);
        let removed: Vec<GameEvent> = h.events.drain();
        assert_eq!(
            removed,
            vec![GameEvent::Removed { id: 1 }, GameEvent::Removed { id: 3 }]
        );
    }

    #[test]
    fn test_cleanup_without_player_only_drops_retired() {
        let mut h = TestHarness::new(1);
        let mut set = live();
        assert_eq!(cleanup_live_set(&mut set, None, 20.0, &mut h.ctx()), 1);
        assert_eq!(set.len(), 3);
    }
}
