//! The pack of animals running the player down
//!
//! The pack holds a following gap behind the player. It sprints while it has
//! fallen behind that gap, matches the player's pace once inside it, and ends
//! the run if it ever closes to within catch distance.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::planar_distance;
use super::events::{EntityId, EntityKind, GameEvent, SoundCue};
use super::timer::Countdown;
use super::world::{Ctx, WorldQuery};
use crate::settings::ChaseConfig;
use crate::uniform;

/// One animal in the pack, offset from the pack centre
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackMember {
    pub id: EntityId,
    pub offset: Vec3,
}

/// Result of one chase step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaseOutcome {
    /// Not chasing, or no player to chase
    Idle,
    Chasing,
    /// Closed within catch distance this step; the chase is over
    Caught,
}

#[derive(Debug, Clone)]
pub struct ChaseAgent {
    config: ChaseConfig,
    position: Vec3,
    speed: f32,
    chasing: bool,
    pack: Vec<PackMember>,
    growl: Countdown,
}

impl ChaseAgent {
    pub fn new(config: ChaseConfig) -> Self {
        Self {
            speed: config.normal_speed,
            config,
            position: Vec3::ZERO,
            chasing: false,
            pack: Vec::new(),
            growl: Countdown::default(),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn is_chasing(&self) -> bool {
        self.chasing
    }

    pub fn pack(&self) -> &[PackMember] {
        &self.pack
    }

    /// World positions of every pack member
    pub fn member_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.pack.iter().map(|m| self.position + m.offset)
    }

    /// Release the pack at `from`. Disabled chases never start.
    pub fn start(&mut self, from: Vec3, ctx: &mut Ctx<'_>) {
        if !self.config.enabled {
            return;
        }
        self.despawn_pack(ctx);
        self.position = from;
        self.speed = self.config.normal_speed;
        self.chasing = true;

        let count = self.config.pack_size;
        let centre = (count as f32 - 1.0) * 0.5;
        for i in 0..count {
            let offset = Vec3::new(
                (i as f32 - centre) * self.config.pack_spread,
                0.0,
                -uniform(ctx.rng, 0.0, self.config.pack_spread),
            );
            let id = ctx.next_id();
            ctx.events
                .spawned(id, EntityKind::Chaser, self.position + offset);
            self.pack.push(PackMember { id, offset });
        }
        self.rearm_growl(ctx);
        log::info!("Chase started with a pack of {}", count);
    }

    /// Halt in place; the pack stays visible
    pub fn stop(&mut self) {
        self.chasing = false;
    }

    /// Stop and remove the pack
    pub fn clear(&mut self, ctx: &mut Ctx<'_>) {
        self.stop();
        self.despawn_pack(ctx);
    }

    fn despawn_pack(&mut self, ctx: &mut Ctx<'_>) {
        for member in self.pack.drain(..) {
            ctx.events.removed(member.id);
        }
    }

    fn rearm_growl(&mut self, ctx: &mut Ctx<'_>) {
        let interval = self.config.growl_interval;
        self.growl = Countdown::from_secs(uniform(ctx.rng, interval - 1.0, interval + 1.0));
    }

    /// One simulation tick
    pub fn update(&mut self, world: &dyn WorldQuery, ctx: &mut Ctx<'_>) -> ChaseOutcome {
        if !self.chasing {
            return ChaseOutcome::Idle;
        }
        let Some(player) = world.player_position() else {
            return ChaseOutcome::Idle;
        };

        let distance = planar_distance(self.position, player);
        if distance < self.config.catch_distance {
            self.chasing = false;
            ctx.events.sound(SoundCue::Roar);
            ctx.events.push(GameEvent::PlayerCaught);
            log::info!("Player caught by the pack");
            return ChaseOutcome::Caught;
        }

        if distance > self.config.chase_distance {
            self.speed = self.config.catch_up_speed;
            if ctx.rng.random::<f32>() < self.config.roar_chance {
                ctx.events.sound(SoundCue::Roar);
            }
        } else {
            let pace = world.player_forward_speed();
            self.speed = if pace > 0.0 {
                pace
            } else {
                self.config.normal_speed
            };
        }

        let mut target = player - Vec3::Z * self.config.chase_distance;
        target.y = self.position.y;
        let t = (self.speed * ctx.dt * 0.5).clamp(0.0, 1.0);
        self.position = self.position.lerp(target, t);

        if self.growl.tick() {
            ctx.events.sound(SoundCue::Growl);
            self.rearm_growl(ctx);
        }

        ChaseOutcome::Chasing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::world::{TestHarness, WorldSnapshot};

    fn agent() -> ChaseAgent {
        ChaseAgent::new(ChaseConfig::default())
    }

    fn cues(h: &TestHarness, cue: SoundCue) -> usize {
        h.events
            .iter()
            .filter(|e| matches!(e, GameEvent::Sound { cue: c } if *c == cue))
            .count()
    }

    #[test]
    fn test_sprints_when_far_behind() {
        let mut h = TestHarness::new(1);
        let mut chase = agent();
        chase.start(Vec3::new(0.0, 0.0, -30.0), &mut h.ctx());
        let world = WorldSnapshot::with_player(Vec3::new(0.0, 1.0, 0.0), 12.0);
        assert_eq!(chase.update(&world, &mut h.ctx()), ChaseOutcome::Chasing);
        assert_eq!(chase.speed(), 15.0);
        let expected_t = 15.0 * SIM_DT * 0.5;
        assert!((chase.position().z - (-30.0 + 25.0 * expected_t)).abs() < 1e-4);
        assert_eq!(chase.position().y, 0.0, "keeps its own height");
    }

    #[test]
    fn test_matches_pace_inside_gap() {
        let mut h = TestHarness::new(1);
        let mut chase = agent();
        chase.start(Vec3::new(0.0, 0.0, -4.0), &mut h.ctx());
        let world = WorldSnapshot::with_player(Vec3::new(0.0, 1.0, 0.0), 12.0);
        chase.update(&world, &mut h.ctx());
        assert_eq!(chase.speed(), 12.0);
    }

    #[test]
    fn test_holds_gap_behind_moving_player() {
        let mut h = TestHarness::new(1);
        let mut chase = agent();
        chase.start(Vec3::new(0.0, 0.0, -10.0), &mut h.ctx());
        let mut z = 0.0;
        for _ in 0..600 {
            z += 10.0 * SIM_DT;
            let world = WorldSnapshot::with_player(Vec3::new(0.0, 1.0, z), 10.0);
            assert_ne!(chase.update(&world, &mut h.ctx()), ChaseOutcome::Caught);
        }
        let gap = z - chase.position().z;
        assert!(gap > 5.0 && gap < 8.0, "gap {}", gap);
    }

    #[test]
    fn test_catch_is_terminal() {
        let mut h = TestHarness::new(1);
        let mut chase = agent();
        chase.start(Vec3::new(0.0, 0.0, -0.5), &mut h.ctx());
        let world = WorldSnapshot::with_player(Vec3::new(0.0, 1.0, 0.0), 0.0);
        assert_eq!(chase.update(&world, &mut h.ctx()), ChaseOutcome::Caught);
        assert!(!chase.is_chasing());
        assert_eq!(chase.update(&world, &mut h.ctx()), ChaseOutcome::Idle);
        let caught = h
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::PlayerCaught))
            .count();
        assert_eq!(caught, 1);
    }

    #[test]
    fn test_no_player_pauses() {
        let mut h = TestHarness::new(1);
        let mut chase = agent();
        chase.start(Vec3::new(0.0, 0.0, -10.0), &mut h.ctx());
        assert_eq!(chase.update(&WorldSnapshot::empty(), &mut h.ctx()), ChaseOutcome::Idle);
        assert_eq!(chase.position().z, -10.0);
    }

    #[test]
    fn test_pack_spread_and_growls() {
        let mut h = TestHarness::new(5);
        let mut chase = agent();
        chase.start(Vec3::new(0.0, 0.0, -4.0), &mut h.ctx());
        assert_eq!(chase.pack().len(), 3);
        let xs: Vec<f32> = chase.pack().iter().map(|m| m.offset.x).collect();
        assert_eq!(xs, vec![-2.0, 0.0, 2.0]);

        let world = WorldSnapshot::with_player(Vec3::new(0.0, 1.0, 0.0), 0.0);
        for _ in 0..(60 * 8) {
            chase.update(&world, &mut h.ctx());
        }
        // Growls every 2-4 seconds
        let growls = cues(&h, SoundCue::Growl);
        assert!((2..=4).contains(&growls), "growls {}", growls);

        chase.clear(&mut h.ctx());
        assert!(chase.pack().is_empty());
    }

    #[test]
    fn test_disabled_chase_never_starts() {
        let mut h = TestHarness::new(1);
        let mut chase = ChaseAgent::new(ChaseConfig {
            enabled: false,
            ..Default::default()
        });
        chase.start(Vec3::ZERO, &mut h.ctx());
        assert!(!chase.is_chasing());
        assert!(h.events.is_empty());
    }
}
