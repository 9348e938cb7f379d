//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or I/O; output is a queue of `GameEvent`s

pub mod arrow;
pub mod arrow_spawner;
pub mod chase;
pub mod collision;
pub mod difficulty;
pub mod effects;
pub mod events;
pub mod obstacle;
pub mod obstacle_spawner;
pub mod pickups;
pub mod player;
pub mod scheduler;
pub mod segments;
pub mod state;
pub mod tick;
pub mod timer;
pub mod world;

pub use arrow::{Anchor, Arrow, ArrowState};
pub use arrow_spawner::{ArrowSpawner, PendingVolley, WarningMarker};
pub use chase::{ChaseAgent, ChaseOutcome, PackMember};
pub use collision::Aabb;
pub use effects::{EffectController, EffectKind, ShieldBubble, ShieldPhase};
pub use events::{EntityId, EntityKind, EventQueue, GameEvent, Panel, SoundCue, VisualEffect};
pub use obstacle::{Obstacle, ObstacleKind, ObstacleState};
pub use obstacle_spawner::ObstacleSpawner;
pub use pickups::{Coin, PickupState, PowerUp};
pub use player::{DamageOutcome, PlayerState};
pub use scheduler::{LiveHazard, ThreatScheduler};
pub use segments::{Prop, Segment, SegmentPhase, SegmentStreamer};
pub use state::{DeathCause, GamePhase, GameState};
pub use tick::{TickInput, tick};
pub use timer::{Countdown, Periodic};
pub use world::{Ctx, EntityIds, PlayerSnapshot, WorldQuery, WorldSnapshot};
