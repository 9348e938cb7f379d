//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Order within a
//! tick is fixed: input, player motion, world snapshot, streaming and
//! scheduling, effects, chase, collisions, scoring, death.

use glam::Vec3;

use super::collision::{below_ground, in_shield, obstacle_volume, planar_distance, player_volume};
use super::chase::ChaseOutcome;
use super::effects::EffectKind;
use super::events::{GameEvent, Panel, SoundCue, VisualEffect};
use super::obstacle::{ObstacleKind, ObstacleState};
use super::player::DamageOutcome;
use super::scheduler::ThreatScheduler;
use super::state::{DeathCause, GamePhase, GameState};
use super::world::Ctx;

/// Damage dealt by one arrow
const ARROW_DAMAGE: i32 = 1;
/// How far ahead the autopilot looks for hazards in a lane
const AUTOPILOT_LOOKAHEAD: f32 = 14.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub slide: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start a run from the menu or game over screen
    pub start: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        state.toggle_pause();
    }

    match state.phase {
        GamePhase::MainMenu => {
            if input.start || input.idle_mode {
                state.start_run();
            }
            return;
        }
        GamePhase::Paused => return,
        GamePhase::GameOver => {
            wind_down(state, dt);
            if input.start {
                state.start_run();
            }
            return;
        }
        GamePhase::Playing => {}
    }

    state.time_ticks += 1;
    state.game_time += dt;

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }

    // Player input and locomotion
    let start_z = state.player.as_ref().map_or(0.0, |p| p.position.z);
    let speed_factor = state.effects.speed_factor();
    if let Some(player) = state.player.as_mut().filter(|p| p.alive) {
        let config = &state.settings.player;
        if input.move_left {
            player.change_lane(-1);
        }
        if input.move_right {
            player.change_lane(1);
        }
        if input.jump {
            player.jump(config);
        }
        if input.slide {
            player.slide(config);
        }
        player.step(config, speed_factor, dt);
    }

    let world = state.snapshot();
    let player_position = world.player.map(|p| p.position);

    let mut death = None;
    {
        let mut ctx = Ctx::new(&mut state.rng, &mut state.ids, &mut state.events, dt);

        state.streamer.update(&world, &mut ctx);
        state.obstacles.update(&world, &mut ctx);
        state.arrows.update(&world, &mut ctx);
        state.arrows.step_arrows(player_position, &mut ctx);
        state.effects.update(&mut ctx);
        if let Some(p) = player_position {
            state.effects.attract(state.streamer.coins_mut(), p, dt);
        }
        if state.chase.update(&world, &mut ctx) == ChaseOutcome::Caught {
            death = Some(DeathCause::Caught);
        }
    }

    if death.is_none() {
        death = resolve_collisions(state, dt);
    }

    // Distance and score
    if let Some(player) = state.player.as_ref() {
        let travelled = (player.position.z - start_z).max(0.0);
        state.distance += travelled;
        let points = travelled * state.settings.scoring.score_per_meter;
        state.add_score(points);
    }

    if let Some(cause) = death {
        state.end_run(cause);
    }
}

/// After death: in-flight hazards finish and the game over panel appears
fn wind_down(state: &mut GameState, dt: f32) {
    let player_position = state.player.as_ref().map(|p| p.position);
    let mut ctx = Ctx::new(&mut state.rng, &mut state.ids, &mut state.events, dt);
    state.arrows.step_arrows(player_position, &mut ctx);
    state.effects.update(&mut ctx);

    if let Some(delay) = state.game_over_panel.as_mut() {
        if delay.tick() {
            state.game_over_panel = None;
            state.events.push(GameEvent::Panel {
                panel: Panel::GameOver,
                visible: true,
            });
        }
    }
}

/// Arrow, obstacle and pickup contacts. Returns the cause if the player died.
fn resolve_collisions(state: &mut GameState, dt: f32) -> Option<DeathCause> {
    let Some(player) = state.player.as_mut().filter(|p| p.alive) else {
        return None;
    };
    let mut ctx = Ctx::new(&mut state.rng, &mut state.ids, &mut state.events, dt);
    let body = player_volume(player);
    let shield_radius = state.effects.config().shield_radius;
    let mut death = None;

    // Arrows against the shield, the player, obstacles and the ground
    for arrow in state.arrows.arrows_mut() {
        if !arrow.is_flying() {
            continue;
        }
        let tip = arrow.position;

        if in_shield(player.position, shield_radius, tip)
            && state.effects.try_block_arrow(tip, &mut ctx)
        {
            arrow.remove();
            continue;
        }

        if body.contains(tip) {
            if death.is_none() && arrow.hit_player(player.position) {
                ctx.events.effect(VisualEffect::ArrowImpact, tip);
                ctx.events.effect(VisualEffect::DamageFlash, player.position);
                ctx.events.sound(SoundCue::ArrowHit);
                match player.take_damage(ARROW_DAMAGE) {
                    DamageOutcome::Hurt { health } => {
                        ctx.events.push(GameEvent::HealthChanged { health });
                        log::debug!("Arrow {} hit, health {}", arrow.id, health);
                    }
                    DamageOutcome::Killed => {
                        ctx.events.push(GameEvent::HealthChanged { health: 0 });
                        death = Some(DeathCause::Arrows);
                    }
                    DamageOutcome::Ignored => {}
                }
            }
            continue;
        }

        let struck = below_ground(tip)
            || state
                .obstacles
                .obstacles()
                .iter()
                .any(|o| obstacle_volume(o).contains(tip));
        if struck && arrow.hit_surface() {
            ctx.events.effect(VisualEffect::ArrowImpact, tip);
            ctx.events.sound(SoundCue::ArrowHit);
        }
    }

    // Obstacles against the player
    if death.is_none() {
        for obstacle in state.obstacles.obstacles_mut() {
            if obstacle.state != ObstacleState::Standing
                || !body.intersects(&obstacle_volume(obstacle))
            {
                continue;
            }
            if obstacle.resolve_contact(player) {
                ctx.events
                    .effect(VisualEffect::ObstacleImpact, obstacle.position);
                ctx.events.sound(SoundCue::ObstacleHit);
                log::debug!("Hit {:?} obstacle {}", obstacle.kind, obstacle.id);
                death = Some(DeathCause::Obstacle);
                break;
            }
        }
    }

    if death.is_some() {
        return death;
    }

    // Pickups
    let radius = state.effects.config().pickup_radius;
    let mut coins = 0u32;
    for coin in state.streamer.coins_mut() {
        if planar_distance(coin.position, player.position) <= radius && coin.collect() {
            ctx.events.removed(coin.id);
            ctx.events.sound(SoundCue::CoinCollect);
            coins += 1;
        }
    }

    let mut collected: Vec<(EffectKind, Vec3)> = Vec::new();
    for power_up in state.streamer.power_ups_mut() {
        if planar_distance(power_up.position, player.position) <= radius && power_up.collect() {
            ctx.events.removed(power_up.id);
            collected.push((power_up.kind, power_up.position));
        }
    }
    for (kind, at) in collected {
        ctx.events.effect(VisualEffect::PowerUpCollect, at);
        ctx.events.sound(SoundCue::PowerUpCollect);
        state.effects.apply(kind, player, &mut ctx);
    }
    state.streamer.prune_collected();

    if coins > 0 {
        state.coins += coins;
        let value = state.settings.scoring.coin_value;
        state.add_score(value * coins as f32);
    }
    None
}

/// Steer around hazards: dodge threatened lanes, hop low obstacles, duck
/// high ones
fn autopilot(state: &GameState, input: &mut TickInput) {
    let Some(player) = state.player.as_ref().filter(|p| p.alive) else {
        return;
    };
    let z = player.position.z;
    let speed = player.effective_speed(state.effects.speed_factor());

    let lane_threatened = |lane: u8| -> bool {
        let volley = state.arrows.pending().iter().any(|v| v.lane == lane);
        let arrow = state
            .arrows
            .arrows()
            .iter()
            .any(|a| a.is_flying() && a.lane == lane && a.position.z > z);
        let wall = state.obstacles.obstacles().iter().any(|o| {
            o.lane == lane
                && o.kind == ObstacleKind::Ground
                && o.position.z > z - 1.0
                && o.position.z < z + AUTOPILOT_LOOKAHEAD
        });
        volley || arrow || wall
    };

    if lane_threatened(player.lane) && !state.effects.shield_blocks() {
        // Prefer the side with more room, middle first
        let options: [i8; 2] = if player.lane == 0 { [1, -1] } else { [-1, 1] };
        for direction in options {
            let target = player.lane as i16 + direction as i16;
            if !(0..crate::consts::LANE_COUNT as i16).contains(&target) {
                continue;
            }
            if !lane_threatened(target as u8) {
                input.move_left = direction < 0;
                input.move_right = direction > 0;
                return;
            }
        }
    }

    for obstacle in state.obstacles.obstacles() {
        if obstacle.lane != player.lane || obstacle.state != ObstacleState::Standing {
            continue;
        }
        let ahead = obstacle.position.z - z;
        if ahead <= 0.0 {
            continue;
        }
        match obstacle.kind {
            // Boxed in: a high enough jump clears a ground obstacle too
            ObstacleKind::Jump | ObstacleKind::Ground if ahead < speed * 0.35 => input.jump = true,
            ObstacleKind::Slide if ahead < speed * 0.3 => input.slide = true,
            _ => {}
        }
    }
}
