//! Time-based arrow volleys
//!
//! Every random interval a volley begins: a warning on a lane, then an arrow
//! down it. The next wait starts as soon as a volley begins, so warnings can
//! overlap. The interval window tightens every escalation period
//! independently of spawning.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arrow::Arrow;
use super::difficulty;
use super::events::{EntityId, EntityKind, GameEvent, SoundCue};
use super::scheduler::{LiveHazard, ThreatScheduler, cleanup_live_set, remove_all};
use super::timer::{Countdown, Periodic};
use super::world::{Ctx, WorldQuery};
use crate::consts::LANE_COUNT;
use crate::settings::ArrowConfig;
use crate::{lane_x, pingpong, uniform};

/// Height of the warning marker above the track
const WARNING_MARKER_Y: f32 = 0.1;

impl LiveHazard for Arrow {
    fn id(&self) -> EntityId {
        self.id
    }

    fn z(&self) -> f32 {
        self.position.z
    }

    fn is_retired(&self) -> bool {
        self.is_removed()
    }
}

/// Pulsing ground marker shown on the lane about to be hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarningMarker {
    pub id: EntityId,
    pub position: Vec3,
    elapsed: f32,
}

impl WarningMarker {
    pub fn opacity(&self) -> f32 {
        pingpong(self.elapsed * 4.0, 1.0)
    }

    pub fn scale(&self) -> f32 {
        1.0 + pingpong(self.elapsed * 2.0, 0.2)
    }
}

/// A volley between its warning and the shot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingVolley {
    pub lane: u8,
    pub spawn_position: Vec3,
    /// None when no warning template is configured
    pub warning: Option<WarningMarker>,
    countdown: Countdown,
}

/// Fires arrows down random lanes at a tightening cadence
#[derive(Debug, Clone)]
pub struct ArrowSpawner {
    config: ArrowConfig,
    lane_distance: f32,
    running: bool,
    current_min_interval: f32,
    current_max_interval: f32,
    next_volley: Option<Countdown>,
    /// Volleys between warning and shot, oldest first
    pending: Vec<PendingVolley>,
    escalation: Periodic,
    cleanup: Periodic,
    arrows: Vec<Arrow>,
}

impl ArrowSpawner {
    pub fn new(config: ArrowConfig, lane_distance: f32) -> Self {
        Self {
            current_min_interval: config.min_spawn_interval,
            current_max_interval: config.max_spawn_interval,
            escalation: Periodic::new(config.escalation_interval),
            cleanup: Periodic::new(config.cleanup_interval),
            config,
            lane_distance,
            running: false,
            next_volley: None,
            pending: Vec::new(),
            arrows: Vec::new(),
        }
    }

    #[inline]
    pub fn current_min_interval(&self) -> f32 {
        self.current_min_interval
    }

    #[inline]
    pub fn current_max_interval(&self) -> f32 {
        self.current_max_interval
    }

    pub fn pending(&self) -> &[PendingVolley] {
        &self.pending
    }

    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    pub fn arrows_mut(&mut self) -> &mut [Arrow] {
        &mut self.arrows
    }

    #[cfg(test)]
    pub(crate) fn push_arrow(&mut self, arrow: Arrow) {
        self.arrows.push(arrow);
    }

    /// Step every live arrow and drop the ones that finished. Runs whether
    /// or not the scheduler is running.
    pub fn step_arrows(&mut self, player_position: Option<Vec3>, ctx: &mut Ctx<'_>) {
        for arrow in &mut self.arrows {
            arrow.step(player_position, ctx.dt);
        }
        self.arrows.retain(|arrow| {
            if arrow.is_removed() {
                ctx.events.removed(arrow.id);
                false
            } else {
                true
            }
        });
    }

    fn schedule_next(&mut self, ctx: &mut Ctx<'_>) {
        let wait = uniform(ctx.rng, self.current_min_interval, self.current_max_interval);
        self.next_volley = Some(Countdown::from_secs(wait));
    }

    fn escalate(&mut self, ctx: &mut Ctx<'_>) {
        let rate = self.config.difficulty_increase_rate;
        let limit = self.config.min_interval_limit;
        self.current_min_interval = difficulty::advance(self.current_min_interval, rate, limit);
        self.current_max_interval =
            difficulty::advance(self.current_max_interval, rate, limit * 2.0);
        log::info!(
            "Arrow difficulty increased: interval {:.2}-{:.2}s",
            self.current_min_interval,
            self.current_max_interval
        );
        ctx.events.push(GameEvent::ArrowDifficulty {
            min_interval: self.current_min_interval,
            max_interval: self.current_max_interval,
        });
    }

    /// Pick a lane and show the warning
    fn begin_volley(&mut self, player: Vec3, ctx: &mut Ctx<'_>) {
        let lane = ctx.rng.random_range(0..LANE_COUNT);
        let x = lane_x(lane, self.lane_distance);
        let spawn_position = Vec3::new(
            x,
            self.config.arrow_height,
            player.z + self.config.spawn_distance,
        );

        let warning = self.config.warning_template.as_ref().map(|_| {
            let id = ctx.next_id();
            let position = Vec3::new(x, WARNING_MARKER_Y, player.z + self.config.warning_lead);
            ctx.events.spawned(id, EntityKind::Warning { lane }, position);
            WarningMarker {
                id,
                position,
                elapsed: 0.0,
            }
        });

        self.pending.push(PendingVolley {
            lane,
            spawn_position,
            warning,
            countdown: Countdown::from_secs(self.config.warning_duration),
        });
    }

    /// Finish a volley: drop the marker and fire at the lane target
    fn fire(&mut self, volley: PendingVolley, player: Option<Vec3>, ctx: &mut Ctx<'_>) {
        if let Some(marker) = volley.warning {
            ctx.events.removed(marker.id);
        }
        let (Some(player), Some(_)) = (player, self.config.arrow_template.as_ref()) else {
            return;
        };

        let target = Vec3::new(
            lane_x(volley.lane, self.lane_distance),
            player.y,
            player.z + self.config.target_lead,
        );
        let direction = (target - volley.spawn_position).normalize_or_zero();
        let id = ctx.next_id();
        let arrow = Arrow::new(
            id,
            volley.lane,
            volley.spawn_position,
            direction,
            self.config.arrow_speed,
            &self.config,
        );
        ctx.events.spawned(
            id,
            EntityKind::Arrow { lane: volley.lane },
            volley.spawn_position,
        );
        ctx.events.sound(SoundCue::ArrowWhoosh);
        log::debug!("Arrow {} fired down lane {}", id, volley.lane);
        self.arrows.push(arrow);
    }
}

impl ThreatScheduler for ArrowSpawner {
    fn start(&mut self, world: &dyn WorldQuery, ctx: &mut Ctx<'_>) {
        if self.running {
            return;
        }
        self.running = true;
        self.current_min_interval = self.config.min_spawn_interval;
        self.current_max_interval = self.config.max_spawn_interval;
        self.escalation = Periodic::new(self.config.escalation_interval);
        self.cleanup = Periodic::new(self.config.cleanup_interval);
        self.pending.clear();
        self.schedule_next(ctx);
        if world.player_position().is_none() {
            log::debug!("Arrow spawner started without a player");
        }
        log::info!(
            "Arrow spawner started: interval {:.2}-{:.2}s",
            self.current_min_interval,
            self.current_max_interval
        );
    }

    fn stop(&mut self, ctx: &mut Ctx<'_>) {
        self.running = false;
        self.next_volley = None;
        for marker in self.pending.drain(..).filter_map(|v| v.warning) {
            ctx.events.removed(marker.id);
        }
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

        if self.cleanup.tick() {
            let player_z = world.player_position().map(|p| p.z);
            cleanup_live_set(
                &mut self.arrows,
                player_z,
                self.config.despawn_behind_distance,
                ctx,
            );
        }

        let dt = ctx.dt;
        let mut due = Vec::new();
        self.pending.retain_mut(|volley| {
            if let Some(marker) = volley.warning.as_mut() {
                marker.elapsed += dt;
            }
            if volley.countdown.tick() {
                due.push(*volley);
                false
            } else {
                true
            }
        });
        for volley in due {
            self.fire(volley, world.player_position(), ctx);
        }

        let elapsed = match self.next_volley.as_mut() {
            Some(wait) => wait.tick(),
            None => true,
        };
        if !elapsed {
            return;
        }
        if let Some(player) = world.player_position().filter(|_| world.is_gameplay_active()) {
            self.begin_volley(player, ctx);
        }
        self.schedule_next(ctx);
    }

    fn clear(&mut self, ctx: &mut Ctx<'_>) {
        self.stop(ctx);
        remove_all(&mut self.arrows, ctx);
    }

    fn live_count(&self) -> usize {
        self.arrows.len()
    }
}
