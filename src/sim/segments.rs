//! Level segment streaming
//!
//! Keeps a window of fixed-length track segments around the player. New
//! segments are emitted at `next_spawn_z` while it is closer than
//! `spawn_distance` ahead of the player; segments whose start has fallen more
//! than `despawn_distance` behind are removed together with everything on
//! them. Segments are only ever appended at the back and removed from the
//! front, so the window stays contiguous and ordered.

use std::collections::VecDeque;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::effects::EffectKind;
use super::events::{EntityId, EntityKind};
use super::pickups::{Coin, PickupState, PowerUp};
use super::timer::Periodic;
use super::world::{Ctx, WorldQuery};
use crate::consts::LANE_COUNT;
use crate::settings::LevelConfig;
use crate::{lane_x, pick_index, uniform};

/// Segment lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentPhase {
    Pending,
    Active,
    Stale,
    Removed,
}

/// Environment decoration parented to a segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prop {
    pub id: EntityId,
    pub template: usize,
    pub position: Vec3,
    /// Rotation about the vertical axis
    pub yaw_degrees: f32,
}

/// One streamed chunk of track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: EntityId,
    pub start_z: f32,
    pub length: f32,
    /// Template index (None for the fixed start segment)
    pub template: Option<usize>,
    pub phase: SegmentPhase,
    pub props: Vec<Prop>,
    pub coins: Vec<Coin>,
    pub power_ups: Vec<PowerUp>,
}

impl Segment {
    #[inline]
    pub fn end_z(&self) -> f32 {
        self.start_z + self.length
    }

    /// Stale once the player is more than `despawn_distance` past its start
    #[inline]
    pub fn is_stale(&self, player_z: f32, despawn_distance: f32) -> bool {
        player_z - self.start_z > despawn_distance
    }

    /// Every entity id owned by this segment, the segment itself last
    fn owned_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.props
            .iter()
            .map(|p| p.id)
            .chain(self.coins.iter().map(|c| c.id))
            .chain(self.power_ups.iter().map(|p| p.id))
            .chain(std::iter::once(self.id))
    }
}

/// Streams segments ahead of the player and retires them behind
#[derive(Debug, Clone)]
pub struct SegmentStreamer {
    config: LevelConfig,
    lane_distance: f32,
    segments: VecDeque<Segment>,
    next_spawn_z: f32,
    running: bool,
    check: Periodic,
}

impl SegmentStreamer {
    pub fn new(config: LevelConfig, lane_distance: f32) -> Self {
        let check = Periodic::starting_now(config.stream_interval);
        Self {
            config,
            lane_distance,
            segments: VecDeque::new(),
            next_spawn_z: 0.0,
            running: false,
            check,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn next_spawn_z(&self) -> f32 {
        self.next_spawn_z
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The most recently emitted segment
    pub fn front(&self) -> Option<&Segment> {
        self.segments.back()
    }

    pub fn coins_mut(&mut self) -> impl Iterator<Item = &mut Coin> {
        self.segments.iter_mut().flat_map(|s| s.coins.iter_mut())
    }

    pub fn power_ups_mut(&mut self) -> impl Iterator<Item = &mut PowerUp> {
        self.segments.iter_mut().flat_map(|s| s.power_ups.iter_mut())
    }

    /// Place a coin on the oldest segment
    #[cfg(test)]
    pub(crate) fn push_coin(&mut self, coin: Coin) {
        if let Some(segment) = self.segments.front_mut() {
            segment.coins.push(coin);
        }
    }

    /// Drop collected pickups from every segment
    pub fn prune_collected(&mut self) {
        for segment in &mut self.segments {
            segment.coins.retain(|c| c.state == PickupState::Available);
            segment.power_ups.retain(|p| p.state == PickupState::Available);
        }
    }

    /// Begin streaming: clear the window and warm up from the origin.
    /// No-op while already running.
    pub fn start(&mut self, ctx: &mut Ctx<'_>) {
        if self.running {
            return;
        }
        self.running = true;
        self.remove_all(ctx);
        self.next_spawn_z = 0.0;
        self.check = Periodic::starting_now(self.config.stream_interval);
        self.spawn_initial(ctx);
        log::info!(
            "Level streaming started: {} segments, next spawn at z={}",
            self.segments.len(),
            self.next_spawn_z
        );
    }

    /// Halt streaming; existing segments stay in place
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Stop and remove every segment
    pub fn clear(&mut self, ctx: &mut Ctx<'_>) {
        self.stop();
        self.remove_all(ctx);
        self.next_spawn_z = 0.0;
    }

    /// One simulation tick. Stale segments go every tick; spawning waits
    /// for the streaming check.
    pub fn update(&mut self, world: &dyn WorldQuery, ctx: &mut Ctx<'_>) {
        if !self.running {
            return;
        }
        let Some(player) = world.player_position() else {
            return;
        };
        if self.check.tick() && self.next_spawn_z - player.z < self.config.spawn_distance {
            self.spawn_segment(ctx);
        }
        self.remove_old(player.z, ctx);
    }

    fn spawn_initial(&mut self, ctx: &mut Ctx<'_>) {
        if self.config.start_segment.is_some() {
            let id = ctx.next_id();
            let segment = Segment {
                id,
                start_z: self.next_spawn_z,
                length: self.config.segment_length,
                template: None,
                phase: SegmentPhase::Pending,
                props: Vec::new(),
                coins: Vec::new(),
                power_ups: Vec::new(),
            };
            self.activate(segment, ctx);
        }

        for _ in 0..self.config.max_segments_active.saturating_sub(1) {
            self.spawn_segment(ctx);
        }
    }

    fn spawn_segment(&mut self, ctx: &mut Ctx<'_>) {
        let Some(template) = pick_index(ctx.rng, self.config.segment_templates.len()) else {
            return;
        };

        let id = ctx.next_id();
        let mut segment = Segment {
            id,
            start_z: self.next_spawn_z,
            length: self.config.segment_length,
            template: Some(template),
            phase: SegmentPhase::Pending,
            props: Vec::new(),
            coins: Vec::new(),
            power_ups: Vec::new(),
        };
        self.scatter_props(&mut segment, ctx);
        self.place_pickups(&mut segment, ctx);

        log::debug!(
            "Segment {} ({}) at z={}",
            id,
            self.config.segment_templates[template],
            segment.start_z
        );
        self.activate(segment, ctx);
    }

    fn activate(&mut self, mut segment: Segment, ctx: &mut Ctx<'_>) {
        segment.phase = SegmentPhase::Active;
        ctx.events.spawned(
            segment.id,
            EntityKind::Segment {
                template: segment.template,
            },
            Vec3::new(0.0, 0.0, segment.start_z),
        );
        self.next_spawn_z += segment.length;
        self.segments.push_back(segment);
    }

    fn scatter_props(&self, segment: &mut Segment, ctx: &mut Ctx<'_>) {
        let config = &self.config;
        if config.prop_templates.is_empty() {
            return;
        }

        for side in [-1.0_f32, 1.0] {
            if ctx.rng.random::<f32>() >= config.prop_spawn_chance {
                continue;
            }
            let Some(template) = pick_index(ctx.rng, config.prop_templates.len()) else {
                continue;
            };
            let x = uniform(ctx.rng, config.min_prop_distance, config.max_prop_distance) * side;
            let z = segment.start_z + uniform(ctx.rng, 0.0, segment.length);
            let yaw_degrees = uniform(ctx.rng, 0.0, 360.0);
            let id = ctx.next_id();
            let position = Vec3::new(x, 0.0, z);
            ctx.events
                .spawned(id, EntityKind::Prop { template }, position);
            segment.props.push(Prop {
                id,
                template,
                position,
                yaw_degrees,
            });
        }
    }

    fn place_pickups(&self, segment: &mut Segment, ctx: &mut Ctx<'_>) {
        let config = &self.config;

        if config.coins_per_row > 0 && ctx.rng.random::<f32>() < config.coin_row_chance {
            let lane = ctx.rng.random_range(0..LANE_COUNT);
            let x = lane_x(lane, self.lane_distance);
            let spacing = segment.length / (config.coins_per_row as f32 + 1.0);
            for i in 0..config.coins_per_row {
                let id = ctx.next_id();
                let position = Vec3::new(x, 1.0, segment.start_z + spacing * (i as f32 + 1.0));
                ctx.events.spawned(id, EntityKind::Coin, position);
                segment.coins.push(Coin::new(id, position));
            }
        }

        if ctx.rng.random::<f32>() < config.power_up_chance {
            let kind = EffectKind::ALL[ctx.rng.random_range(0..EffectKind::ALL.len())];
            let lane = ctx.rng.random_range(0..LANE_COUNT);
            let z = segment.start_z + uniform(ctx.rng, 0.0, segment.length);
            let id = ctx.next_id();
            let position = Vec3::new(lane_x(lane, self.lane_distance), 1.0, z);
            ctx.events.spawned(id, EntityKind::PowerUp(kind), position);
            segment.power_ups.push(PowerUp::new(id, kind, position));
        }
    }

    fn remove_old(&mut self, player_z: f32, ctx: &mut Ctx<'_>) {
        let despawn = self.config.despawn_distance;
        for segment in self.segments.iter_mut() {
            if segment.is_stale(player_z, despawn) {
                segment.phase = SegmentPhase::Stale;
            }
        }
        while self
            .segments
            .front()
            .is_some_and(|s| s.phase == SegmentPhase::Stale)
        {
            if let Some(mut segment) = self.segments.pop_front() {
                retire(&mut segment, ctx);
            }
        }
    }

    fn remove_all(&mut self, ctx: &mut Ctx<'_>) {
        for mut segment in self.segments.drain(..) {
            retire(&mut segment, ctx);
        }
    }
}

fn retire(segment: &mut Segment, ctx: &mut Ctx<'_>) {
    for id in segment.owned_ids() {
        ctx.events.removed(id);
    }
    segment.phase = SegmentPhase::Removed;
}
