//! Simulation output events
//!
//! The simulation never calls into rendering, audio or UI directly. It
//! queues events during a tick and the host drains them afterwards.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::effects::EffectKind;
use super::obstacle::ObstacleKind;

/// Stable entity identifier (allocated by the simulation root)
pub type EntityId = u32;

/// What a spawned entity represents, for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Level segment (`template` is None for the start segment)
    Segment { template: Option<usize> },
    /// Environment prop parented to a segment
    Prop { template: usize },
    Coin,
    PowerUp(EffectKind),
    /// Lane warning marker shown before an arrow fires
    Warning { lane: u8 },
    Arrow { lane: u8 },
    Obstacle { kind: ObstacleKind, template: usize },
    /// Shield bubble around the player
    Shield,
    /// A member of the chasing pack
    Chaser,
}

/// One-shot visual effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualEffect {
    ArrowImpact,
    ObstacleImpact,
    PowerUpCollect,
    HealPulse,
    DamageFlash,
    ShieldBreak,
}

/// Sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    ArrowWhoosh,
    ArrowHit,
    ObstacleHit,
    PowerUpCollect,
    CoinCollect,
    ShieldBlock,
    Growl,
    Roar,
}

/// UI panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    MainMenu,
    Gameplay,
    Pause,
    GameOver,
}

/// Everything the host may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned {
        id: EntityId,
        kind: EntityKind,
        position: Vec3,
    },
    Removed {
        id: EntityId,
    },
    Effect {
        effect: VisualEffect,
        position: Vec3,
    },
    Sound {
        cue: SoundCue,
    },
    Panel {
        panel: Panel,
        visible: bool,
    },
    HealthChanged {
        health: i32,
    },
    EffectStarted {
        kind: EffectKind,
    },
    EffectEnded {
        kind: EffectKind,
    },
    /// Arrow scheduler tightened its interval window
    ArrowDifficulty {
        min_interval: f32,
        max_interval: f32,
    },
    /// Obstacle scheduler raised its spawn chance
    ObstacleDifficulty {
        chance: f32,
    },
    PlayerCaught,
    PlayerDied,
    RunEnded {
        score: f32,
        distance: f32,
        new_high_score: bool,
    },
}

/// Ordered event channel for one simulation
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    #[inline]
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn spawned(&mut self, id: EntityId, kind: EntityKind, position: Vec3) {
        self.push(GameEvent::Spawned { id, kind, position });
    }

    pub fn removed(&mut self, id: EntityId) {
        self.push(GameEvent::Removed { id });
    }

    pub fn sound(&mut self, cue: SoundCue) {
        self.push(GameEvent::Sound { cue });
    }

    pub fn effect(&mut self, effect: VisualEffect, position: Vec3) {
        self.push(GameEvent::Effect { effect, position });
    }

    /// Take every queued event, oldest first
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
