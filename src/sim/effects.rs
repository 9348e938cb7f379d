//! Power-up effects
//!
//! Each timed effect owns exactly one countdown, keyed by kind. Activating an
//! effect that is already running replaces its countdown, so overlapping
//! pickups extend rather than stack and no stale reset can end an effect
//! early.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::events::{EntityId, EntityKind, GameEvent, SoundCue, VisualEffect};
use super::pickups::{Coin, PickupState};
use super::player::PlayerState;
use super::timer::Countdown;
use super::world::Ctx;
use crate::settings::EffectsConfig;

/// Power-up categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Shield,
    Health,
    CoinMagnet,
    SpeedBoost,
    ScoreMultiplier,
}

impl EffectKind {
    pub const ALL: [EffectKind; 5] = [
        EffectKind::Shield,
        EffectKind::Health,
        EffectKind::CoinMagnet,
        EffectKind::SpeedBoost,
        EffectKind::ScoreMultiplier,
    ];

    /// Health is instant; everything else runs on a timer
    #[inline]
    pub fn is_timed(&self) -> bool {
        !matches!(self, EffectKind::Health)
    }
}

/// Shield bubble phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShieldPhase {
    /// Blocks the next arrow
    Active,
    /// Expired and fading out; blocks nothing
    Fading(Countdown),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldBubble {
    pub id: EntityId,
    pub phase: ShieldPhase,
}

/// Owns every active effect on the player
#[derive(Debug, Clone)]
pub struct EffectController {
    config: EffectsConfig,
    timers: BTreeMap<EffectKind, Countdown>,
    shield: Option<ShieldBubble>,
}

impl EffectController {
    pub fn new(config: EffectsConfig) -> Self {
        Self {
            config,
            timers: BTreeMap::new(),
            shield: None,
        }
    }

    pub fn config(&self) -> &EffectsConfig {
        &self.config
    }

    #[inline]
    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.timers.contains_key(&kind)
    }

    /// Seconds left on a timed effect (None when inactive)
    pub fn remaining_secs(&self, kind: EffectKind) -> Option<f32> {
        self.timers.get(&kind).map(Countdown::remaining_secs)
    }

    pub fn shield(&self) -> Option<&ShieldBubble> {
        self.shield.as_ref()
    }

    /// True while the shield can absorb an arrow
    pub fn shield_blocks(&self) -> bool {
        self.is_active(EffectKind::Shield)
            && matches!(
                self.shield,
                Some(ShieldBubble {
                    phase: ShieldPhase::Active,
                    ..
                })
            )
    }

    /// Score multiplier from the multiplier and speed-boost effects
    pub fn score_multiplier(&self) -> f32 {
        if self.is_active(EffectKind::ScoreMultiplier) || self.is_active(EffectKind::SpeedBoost) {
            self.config.score_multiplier
        } else {
            1.0
        }
    }

    /// Forward speed factor from the speed-boost effect
    pub fn speed_factor(&self) -> f32 {
        if self.is_active(EffectKind::SpeedBoost) {
            self.config.speed_boost_factor
        } else {
            1.0
        }
    }

    fn duration(&self, kind: EffectKind) -> f32 {
        match kind {
            EffectKind::Shield => self.config.shield_duration,
            EffectKind::Health => 0.0,
            EffectKind::CoinMagnet => self.config.magnet_duration,
            EffectKind::SpeedBoost => self.config.speed_boost_duration,
            EffectKind::ScoreMultiplier => self.config.multiplier_duration,
        }
    }

    /// Apply a collected power-up
    pub fn apply(&mut self, kind: EffectKind, player: &mut PlayerState, ctx: &mut Ctx<'_>) {
        if !kind.is_timed() {
            let health = player.heal(self.config.heal_amount);
            ctx.events.push(GameEvent::HealthChanged { health });
            ctx.events.effect(VisualEffect::HealPulse, player.position);
            log::debug!("Healed to {}", health);
            return;
        }

        let duration = self.duration(kind);
        let refreshed = self
            .timers
            .insert(kind, Countdown::from_secs(duration))
            .is_some();

        if kind == EffectKind::Shield {
            match self.shield.as_mut() {
                Some(bubble) => bubble.phase = ShieldPhase::Active,
                None => {
                    let id = ctx.next_id();
                    ctx.events.spawned(id, EntityKind::Shield, player.position);
                    self.shield = Some(ShieldBubble {
                        id,
                        phase: ShieldPhase::Active,
                    });
                }
            }
        }

        if !refreshed {
            ctx.events.push(GameEvent::EffectStarted { kind });
        }
        log::debug!(
            "{:?} {} for {}s",
            kind,
            if refreshed { "refreshed" } else { "started" },
            duration
        );
    }

    /// Absorb an arrow with the shield. The shield breaks on the first block.
    pub fn try_block_arrow(&mut self, at: Vec3, ctx: &mut Ctx<'_>) -> bool {
        if !self.shield_blocks() {
            return false;
        }
        self.timers.remove(&EffectKind::Shield);
        if let Some(bubble) = self.shield.take() {
            ctx.events.removed(bubble.id);
        }
        ctx.events.effect(VisualEffect::ShieldBreak, at);
        ctx.events.sound(SoundCue::ShieldBlock);
        ctx.events.push(GameEvent::EffectEnded {
            kind: EffectKind::Shield,
        });
        true
    }

    /// Pull available coins within range toward the player
    pub fn attract<'a>(
        &self,
        coins: impl Iterator<Item = &'a mut Coin>,
        player_position: Vec3,
        dt: f32,
    ) {
        if !self.is_active(EffectKind::CoinMagnet) {
            return;
        }
        let step = self.config.magnet_force * dt;
        for coin in coins {
            if coin.state == PickupState::Available
                && coin.position.distance(player_position) <= self.config.magnet_range
            {
                coin.attract_toward(player_position, step);
            }
        }
    }

    /// Advance every timer by one tick
    pub fn update(&mut self, ctx: &mut Ctx<'_>) {
        let mut expired = Vec::new();
        for (kind, timer) in self.timers.iter_mut() {
            if timer.tick() {
                expired.push(*kind);
            }
        }

        // Tick an existing fade before a new one can start this tick
        let faded = match self.shield.as_mut() {
            Some(ShieldBubble {
                id,
                phase: ShieldPhase::Fading(fade),
            }) => fade.tick().then_some(*id),
            _ => None,
        };
        if let Some(id) = faded {
            ctx.events.removed(id);
            self.shield = None;
        }

        for kind in expired {
            self.timers.remove(&kind);
            ctx.events.push(GameEvent::EffectEnded { kind });
            log::debug!("{:?} expired", kind);
            if kind == EffectKind::Shield {
                if let Some(bubble) = self.shield.as_mut() {
                    bubble.phase =
                        ShieldPhase::Fading(Countdown::from_secs(self.config.shield_fade_duration));
                }
            }
        }
    }

    /// Drop every effect and the shield bubble
    pub fn clear(&mut self, ctx: &mut Ctx<'_>) {
        for kind in std::mem::take(&mut self.timers).into_keys() {
            ctx.events.push(GameEvent::EffectEnded { kind });
        }
        if let Some(bubble) = self.shield.take() {
            ctx.events.removed(bubble.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PlayerConfig;
    use crate::sim::world::TestHarness;

    fn setup() -> (EffectController, PlayerState, TestHarness) {
        (
            EffectController::new(EffectsConfig::default()),
            PlayerState::new(&PlayerConfig::default()),
            TestHarness::new(1),
        )
    }

    fn run(effects: &mut EffectController, h: &mut TestHarness, ticks: u32) {
        for _ in 0..ticks {
            effects.update(&mut h.ctx());
        }
    }

    #[test]
    fn test_shield_consumes_only_first_arrow() {
        let (mut fx, mut player, mut h) = setup();
        fx.apply(EffectKind::Shield, &mut player, &mut h.ctx());
        assert!(fx.shield_blocks());
        assert!(fx.try_block_arrow(Vec3::ZERO, &mut h.ctx()));
        assert!(!fx.try_block_arrow(Vec3::ZERO, &mut h.ctx()));
        assert!(fx.shield().is_none());
        assert!(!fx.is_active(EffectKind::Shield));
    }

    #[test]
    fn test_expired_shield_blocks_nothing() {
        let (mut fx, mut player, mut h) = setup();
        fx.apply(EffectKind::Shield, &mut player, &mut h.ctx());
        run(&mut fx, &mut h, 300);
        assert!(matches!(
            fx.shield().map(|b| b.phase),
            Some(ShieldPhase::Fading(_))
        ));
        assert!(!fx.try_block_arrow(Vec3::ZERO, &mut h.ctx()));

        let id = fx.shield().map(|b| b.id);
        h.events.drain();
        run(&mut fx, &mut h, 30);
        assert!(fx.shield().is_none());
        assert!(
            h.events
                .iter()
                .any(|e| matches!(e, GameEvent::Removed { id: removed } if Some(*removed) == id))
        );
    }

    #[test]
    fn test_shield_reapplied_while_fading_revives() {
        let (mut fx, mut player, mut h) = setup();
        fx.apply(EffectKind::Shield, &mut player, &mut h.ctx());
        run(&mut fx, &mut h, 310);
        assert!(!fx.shield_blocks());
        fx.apply(EffectKind::Shield, &mut player, &mut h.ctx());
        assert!(fx.shield_blocks());
        run(&mut fx, &mut h, 100);
        assert!(fx.shield_blocks());
    }

    #[test]
    fn test_magnet_reactivation_resets_not_sums() {
        let (mut fx, mut player, mut h) = setup();
        fx.apply(EffectKind::CoinMagnet, &mut player, &mut h.ctx());
        run(&mut fx, &mut h, 180);
        fx.apply(EffectKind::CoinMagnet, &mut player, &mut h.ctx());
        assert_eq!(fx.remaining_secs(EffectKind::CoinMagnet), Some(300.0 * crate::consts::SIM_DT));
        run(&mut fx, &mut h, 299);
        assert!(fx.is_active(EffectKind::CoinMagnet));
        run(&mut fx, &mut h, 1);
        assert!(!fx.is_active(EffectKind::CoinMagnet));
    }

    #[test]
    fn test_multiplier_retrigger_is_not_cut_short() {
        let (mut fx, mut player, mut h) = setup();
        fx.apply(EffectKind::ScoreMultiplier, &mut player, &mut h.ctx());
        run(&mut fx, &mut h, 240);
        fx.apply(EffectKind::ScoreMultiplier, &mut player, &mut h.ctx());
        // Past the first activation's end
        run(&mut fx, &mut h, 120);
        assert_eq!(fx.score_multiplier(), 2.0);
        run(&mut fx, &mut h, 180);
        assert_eq!(fx.score_multiplier(), 1.0);
    }

    #[test]
    fn test_speed_boost_and_multiplier_overlap() {
        let (mut fx, mut player, mut h) = setup();
        fx.apply(EffectKind::ScoreMultiplier, &mut player, &mut h.ctx());
        run(&mut fx, &mut h, 120);
        fx.apply(EffectKind::SpeedBoost, &mut player, &mut h.ctx());
        assert_eq!(fx.speed_factor(), 1.5);
        // Multiplier expiry leaves the boost's multiplier in place
        run(&mut fx, &mut h, 180);
        assert!(!fx.is_active(EffectKind::ScoreMultiplier));
        assert_eq!(fx.score_multiplier(), 2.0);
        run(&mut fx, &mut h, 120);
        assert_eq!(fx.score_multiplier(), 1.0);
        assert_eq!(fx.speed_factor(), 1.0);
    }

    #[test]
    fn test_health_heals_and_clamps() {
        let (mut fx, mut player, mut h) = setup();
        player.take_damage(2);
        fx.apply(EffectKind::Health, &mut player, &mut h.ctx());
        assert_eq!(player.health, 2);
        fx.apply(EffectKind::Health, &mut player, &mut h.ctx());
        fx.apply(EffectKind::Health, &mut player, &mut h.ctx());
        assert_eq!(player.health, 3);
        assert!(!fx.is_active(EffectKind::Health));
    }

    #[test]
    fn test_magnet_pulls_coins_in_range() {
        let (mut fx, mut player, mut h) = setup();
        let mut coins = vec![
            Coin::new(1, Vec3::new(0.0, 1.0, 5.0)),
            Coin::new(2, Vec3::new(0.0, 1.0, 50.0)),
        ];
        fx.attract(coins.iter_mut(), player.position, 0.1);
        assert_eq!(coins[0].position.z, 5.0, "magnet inactive");

        fx.apply(EffectKind::CoinMagnet, &mut player, &mut h.ctx());
        fx.attract(coins.iter_mut(), player.position, 0.1);
        assert!((coins[0].position.z - 3.0).abs() < 1e-5);
        assert_eq!(coins[1].position.z, 50.0);
    }

    #[test]
    fn test_clear_ends_everything() {
        let (mut fx, mut player, mut h) = setup();
        for kind in EffectKind::ALL {
            fx.apply(kind, &mut player, &mut h.ctx());
        }
        h.events.drain();
        fx.clear(&mut h.ctx());
        assert!(EffectKind::ALL.iter().all(|k| !fx.is_active(*k)));
        assert!(fx.shield().is_none());
        let ended = h
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EffectEnded { .. }))
            .count();
        assert_eq!(ended, 4);
    }
}
