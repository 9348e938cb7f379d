//! Distance-based obstacle placement
//!
//! Decision points are spaced `[min, max]` units apart along the track.
//! Each point rolls against the current obstacle chance; the cursor moves on
//! whether or not an obstacle was placed.

use glam::Vec3;
use rand::Rng;

use super::difficulty;
use super::events::{EntityId, EntityKind, GameEvent};
use super::obstacle::{Obstacle, ObstacleKind, ObstacleState};
use super::scheduler::{LiveHazard, ThreatScheduler, cleanup_live_set, remove_all};
use super::timer::Periodic;
use super::world::{Ctx, WorldQuery};
use crate::consts::LANE_COUNT;
use crate::settings::ObstacleConfig;
use crate::{lane_x, pick_index, uniform};

/// Smallest cursor advance, so a zero spacing cannot stall the placement loop
const MIN_DECISION_GAP: f32 = 1.0;

impl LiveHazard for Obstacle {
    fn id(&self) -> EntityId {
        self.id
    }

    fn z(&self) -> f32 {
        self.position.z
    }
}

/// Places ground, jump and slide obstacles ahead of the player
#[derive(Debug, Clone)]
pub struct ObstacleSpawner {
    config: ObstacleConfig,
    lane_distance: f32,
    running: bool,
    next_spawn_z: f32,
    current_chance: f32,
    spawn_check: Periodic,
    escalation: Periodic,
    cleanup: Periodic,
    obstacles: Vec<Obstacle>,
}

impl ObstacleSpawner {
    pub fn new(config: ObstacleConfig, lane_distance: f32) -> Self {
        Self {
            next_spawn_z: config.first_spawn_z,
            current_chance: config.initial_obstacle_chance,
            spawn_check: Periodic::starting_now(config.spawn_check_interval),
            escalation: Periodic::new(config.escalation_interval),
            cleanup: Periodic::starting_now(config.cleanup_interval),
            config,
            lane_distance,
            running: false,
            obstacles: Vec::new(),
        }
    }

    #[inline]
    pub fn next_spawn_z(&self) -> f32 {
        self.next_spawn_z
    }

    #[inline]
    pub fn current_chance(&self) -> f32 {
        self.current_chance
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn obstacles_mut(&mut self) -> &mut [Obstacle] {
        &mut self.obstacles
    }

    #[cfg(test)]
    pub(crate) fn push_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    fn templates(&self, kind: ObstacleKind) -> &[String] {
        match kind {
            ObstacleKind::Ground => &self.config.ground_templates,
            ObstacleKind::Jump => &self.config.jump_templates,
            ObstacleKind::Slide => &self.config.slide_templates,
        }
    }

    fn escalate(&mut self, ctx: &mut Ctx<'_>) {
        self.current_chance = difficulty::grow(
            self.current_chance,
            self.config.difficulty_increase_rate,
            self.config.max_obstacle_chance,
        );
        log::info!(
            "Obstacle difficulty increased: chance {:.2}",
            self.current_chance
        );
        ctx.events.push(GameEvent::ObstacleDifficulty {
            chance: self.current_chance,
        });
    }

    /// Fill decision points up to `spawn_ahead_distance` past the player
    fn fill_ahead(&mut self, player_z: f32, ctx: &mut Ctx<'_>) {
        while self.next_spawn_z < player_z + self.config.spawn_ahead_distance {
            if ctx.rng.random::<f32>() < self.current_chance {
                self.place(self.next_spawn_z, ctx);
            }
            let gap = uniform(
                ctx.rng,
                self.config.min_spawn_distance,
                self.config.max_spawn_distance,
            );
            self.next_spawn_z += gap.max(MIN_DECISION_GAP);
        }
    }

    fn place(&mut self, z: f32, ctx: &mut Ctx<'_>) {
        let kind = ObstacleKind::ALL[ctx.rng.random_range(0..ObstacleKind::ALL.len())];
        let lane = ctx.rng.random_range(0..LANE_COUNT);
        let Some(template) = pick_index(ctx.rng, self.templates(kind).len()) else {
            return;
        };

        let id = ctx.next_id();
        let position = Vec3::new(lane_x(lane, self.lane_distance), 0.0, z);
        ctx.events
            .spawned(id, EntityKind::Obstacle { kind, template }, position);
        log::debug!("{:?} obstacle {} in lane {} at z={}", kind, id, lane, z);
        self.obstacles.push(Obstacle {
            id,
            kind,
            template,
            lane,
            position,
            state: ObstacleState::Standing,
        });
    }
}

impl ThreatScheduler for ObstacleSpawner {
    fn start(&mut self, world: &dyn WorldQuery, _ctx: &mut Ctx<'_>) {
        if self.running {
            return;
        }
        self.running = true;
        self.next_spawn_z = self.config.first_spawn_z;
        self.current_chance = self.config.initial_obstacle_chance;
        self.spawn_check = Periodic::starting_now(self.config.spawn_check_interval);
        self.escalation = Periodic::new(self.config.escalation_interval);
        self.cleanup = Periodic::starting_now(self.config.cleanup_interval);
        if world.player_position().is_none() {
            log::debug!("Obstacle spawner started without a player");
        }
        log::info!(
            "Obstacle spawner started: chance {:.2}, first decision at z={}",
            self.current_chance,
            self.next_spawn_z
        );
    }

    fn stop(&mut self, _ctx: &mut Ctx<'_>) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn update(&mut self, world: &dyn WorldQuery, ctx: &mut Ctx<'_>) {
        if !self.running {
            return;
        }

        if self.escalation.tick() {
            self.escalate(ctx);
        }

        let player_z = world.player_position().map(|p| p.z);

        if self.cleanup.tick() {
            cleanup_live_set(
                &mut self.obstacles,
                player_z,
                self.config.despawn_behind_distance,
                ctx,
            );
        }

        if self.spawn_check.tick() && world.is_gameplay_active() {
            if let Some(z) = player_z {
                self.fill_ahead(z, ctx);
            }
        }
    }

    fn clear(&mut self, ctx: &mut Ctx<'_>) {
        self.stop(ctx);
        remove_all(&mut self.obstacles, ctx);
        self.next_spawn_z = self.config.first_spawn_z;
    }

    fn live_count(&self) -> usize {
        self.obstacles.len()
    }
}
