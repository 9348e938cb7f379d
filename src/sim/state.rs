//! Game state and run flow
//!
//! `GameState` owns every simulation component outright. Nothing here is
//! global; two states never share anything.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arrow_spawner::ArrowSpawner;
use super::chase::ChaseAgent;
use super::effects::EffectController;
use super::events::{EventQueue, GameEvent, Panel};
use super::obstacle_spawner::ObstacleSpawner;
use super::player::PlayerState;
use super::scheduler::ThreatScheduler;
use super::segments::SegmentStreamer;
use super::timer::Countdown;
use super::world::{Ctx, EntityIds, WorldSnapshot};
use crate::consts::SIM_DT;
use crate::settings::Settings;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing running
    MainMenu,
    /// A run is in progress
    Playing,
    /// Run frozen; no component advances
    Paused,
    /// Player is dead; hazards already in flight finish their animations
    GameOver,
}

/// What ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Arrows,
    Obstacle,
    Caught,
}

/// Complete game state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub settings: Settings,
    pub(crate) rng: Pcg32,
    pub(crate) ids: EntityIds,
    pub(crate) events: EventQueue,
    pub phase: GamePhase,
    /// Ticks simulated in the current run
    pub time_ticks: u64,
    /// Seconds simulated in the current run
    pub game_time: f32,
    pub score: f32,
    /// Metres travelled along the track in the current run
    pub distance: f32,
    pub coins: u32,
    /// Best score known to this state (seeded from the store)
    pub high_score: f32,
    /// The current or last run beat the previous high score
    pub new_high_score: bool,
    pub death_cause: Option<DeathCause>,
    pub player: Option<PlayerState>,
    pub streamer: SegmentStreamer,
    pub arrows: ArrowSpawner,
    pub obstacles: ObstacleSpawner,
    pub effects: EffectController,
    pub chase: ChaseAgent,
    /// Delay before the game over panel appears
    pub(crate) game_over_panel: Option<Countdown>,
}

impl GameState {
    /// Create a state sitting on the main menu
    pub fn new(seed: u64, settings: Settings, high_score: f32) -> Self {
        let lane_distance = settings.player.lane_distance;
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            ids: EntityIds::default(),
            events: EventQueue::new(),
            phase: GamePhase::MainMenu,
            time_ticks: 0,
            game_time: 0.0,
            score: 0.0,
            distance: 0.0,
            coins: 0,
            high_score,
            new_high_score: false,
            death_cause: None,
            player: None,
            streamer: SegmentStreamer::new(settings.level.clone(), lane_distance),
            arrows: ArrowSpawner::new(settings.arrows.clone(), lane_distance),
            obstacles: ObstacleSpawner::new(settings.obstacles.clone(), lane_distance),
            effects: EffectController::new(settings.effects.clone()),
            chase: ChaseAgent::new(settings.chase.clone()),
            game_over_panel: None,
            settings,
        };
        state.show_only(Panel::MainMenu);
        state
    }

    /// Consistent view of the player for this tick
    pub fn snapshot(&self) -> WorldSnapshot {
        match &self.player {
            Some(player) => WorldSnapshot {
                gameplay_active: self.is_game_active(),
                ..WorldSnapshot::with_player(
                    player.position,
                    player.effective_speed(self.effects.speed_factor()),
                )
            },
            None => WorldSnapshot::empty(),
        }
    }

    /// True while a run is in progress, unpaused, with a living player
    pub fn is_game_active(&self) -> bool {
        self.phase == GamePhase::Playing && self.player.as_ref().is_some_and(|p| p.alive)
    }

    #[inline]
    pub fn score_multiplier(&self) -> f32 {
        self.effects.score_multiplier()
    }

    /// Add points scaled by the current multiplier
    pub fn add_score(&mut self, points: f32) {
        self.score += points * self.score_multiplier();
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    fn show_only(&mut self, panel: Panel) {
        for p in [Panel::MainMenu, Panel::Gameplay, Panel::Pause, Panel::GameOver] {
            self.events.push(GameEvent::Panel {
                panel: p,
                visible: p == panel,
            });
        }
    }

    /// Begin a fresh run from any phase
    pub fn start_run(&mut self) {
        {
            let mut ctx = Ctx::new(&mut self.rng, &mut self.ids, &mut self.events, SIM_DT);
            self.streamer.clear(&mut ctx);
            self.arrows.clear(&mut ctx);
            self.obstacles.clear(&mut ctx);
            self.effects.clear(&mut ctx);
            self.chase.clear(&mut ctx);
        }

        self.time_ticks = 0;
        self.game_time = 0.0;
        self.score = 0.0;
        self.distance = 0.0;
        self.coins = 0;
        self.new_high_score = false;
        self.death_cause = None;
        self.game_over_panel = None;

        let player = PlayerState::new(&self.settings.player);
        let chase_from = player.position - Vec3::Z * self.settings.chase.chase_distance * 2.0;
        self.events.push(GameEvent::HealthChanged {
            health: player.health,
        });
        self.player = Some(player);
        self.phase = GamePhase::Playing;
        self.show_only(Panel::Gameplay);

        let world = self.snapshot();
        let mut ctx = Ctx::new(&mut self.rng, &mut self.ids, &mut self.events, SIM_DT);
        self.streamer.start(&mut ctx);
        self.obstacles.start(&world, &mut ctx);
        self.arrows.start(&world, &mut ctx);
        self.chase.start(chase_from_ground(chase_from), &mut ctx);

        log::info!("Run started (seed {})", self.seed);
    }

    /// Toggle between playing and paused; ignored in other phases
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => {
                self.phase = GamePhase::Paused;
                self.events.push(GameEvent::Panel {
                    panel: Panel::Pause,
                    visible: true,
                });
                log::info!("Paused");
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Playing;
                self.events.push(GameEvent::Panel {
                    panel: Panel::Pause,
                    visible: false,
                });
                log::info!("Resumed");
            }
            GamePhase::MainMenu | GamePhase::GameOver => {}
        }
    }

    /// Return to the title screen, clearing the world
    pub fn return_to_menu(&mut self) {
        let mut ctx = Ctx::new(&mut self.rng, &mut self.ids, &mut self.events, SIM_DT);
        self.streamer.clear(&mut ctx);
        self.arrows.clear(&mut ctx);
        self.obstacles.clear(&mut ctx);
        self.effects.clear(&mut ctx);
        self.chase.clear(&mut ctx);
        self.player = None;
        self.game_over_panel = None;
        self.phase = GamePhase::MainMenu;
        self.show_only(Panel::MainMenu);
    }

    /// Kill the player and wind the run down. No-op outside a live run.
    pub(crate) fn end_run(&mut self, cause: DeathCause) {
        if self.phase != GamePhase::Playing {
            return;
        }
        if let Some(player) = self.player.as_mut() {
            player.die();
        }
        self.death_cause = Some(cause);
        self.events.push(GameEvent::PlayerDied);

        let mut ctx = Ctx::new(&mut self.rng, &mut self.ids, &mut self.events, SIM_DT);
        self.streamer.stop();
        self.arrows.stop(&mut ctx);
        self.obstacles.stop(&mut ctx);
        self.chase.stop();

        if self.score > self.high_score {
            self.high_score = self.score;
            self.new_high_score = true;
            log::info!("New high score: {:.0}", self.score);
        }
        self.events.push(GameEvent::RunEnded {
            score: self.score,
            distance: self.distance,
            new_high_score: self.new_high_score,
        });
        self.events.push(GameEvent::Panel {
            panel: Panel::Gameplay,
            visible: false,
        });

        self.phase = GamePhase::GameOver;
        self.game_over_panel = Some(Countdown::from_secs(self.settings.scoring.game_over_delay));
        log::info!(
            "Game over ({:?}): score {:.0}, distance {:.1}m, {} coins",
            cause,
            self.score,
            self.distance,
            self.coins
        );
    }
}

/// Keep the pack on the ground plane
fn chase_from_ground(mut from: Vec3) -> Vec3 {
    from.y = 0.0;
    from
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::EffectKind;

    fn state() -> GameState {
        GameState::new(42, Settings::default(), 0.0)
    }

    #[test]
    fn test_new_state_on_menu() {
        let mut s = state();
        assert_eq!(s.phase, GamePhase::MainMenu);
        assert!(s.player.is_none());
        assert!(!s.is_game_active());
        assert!(s.snapshot().player.is_none());
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::Panel {
            panel: Panel::MainMenu,
            visible: true
        }));
    }

    #[test]
    fn test_start_run_starts_everything() {
        let mut s = state();
        s.start_run();
        assert_eq!(s.phase, GamePhase::Playing);
        assert!(s.is_game_active());
        assert!(s.streamer.is_running());
        assert!(s.arrows.is_running());
        assert!(s.obstacles.is_running());
        assert!(s.chase.is_chasing());
        assert_eq!(s.streamer.len(), 5);
        let player = s.player.as_ref().unwrap();
        assert_eq!(player.position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(player.lane, 1);
        assert_eq!(s.chase.position(), Vec3::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn test_add_score_applies_multiplier() {
        let mut s = state();
        s.start_run();
        s.add_score(10.0);
        assert_eq!(s.score, 10.0);
        let mut player = s.player.take().unwrap();
        let mut ctx = Ctx::new(&mut s.rng, &mut s.ids, &mut s.events, SIM_DT);
        s.effects
            .apply(EffectKind::ScoreMultiplier, &mut player, &mut ctx);
        s.player = Some(player);
        s.add_score(10.0);
        assert_eq!(s.score, 30.0);
    }

    #[test]
    fn test_pause_toggle() {
        let mut s = state();
        s.toggle_pause();
        assert_eq!(s.phase, GamePhase::MainMenu);
        s.start_run();
        s.toggle_pause();
        assert_eq!(s.phase, GamePhase::Paused);
        assert!(!s.is_game_active());
        s.toggle_pause();
        assert_eq!(s.phase, GamePhase::Playing);
    }

    #[test]
    fn test_end_run_records_high_score_once() {
        let mut s = GameState::new(1, Settings::default(), 50.0);
        s.start_run();
        s.score = 120.0;
        s.end_run(DeathCause::Obstacle);
        assert_eq!(s.phase, GamePhase::GameOver);
        assert!(s.new_high_score);
        assert_eq!(s.high_score, 120.0);
        assert!(!s.streamer.is_running());
        assert!(!s.arrows.is_running());
        assert!(!s.obstacles.is_running());
        assert!(!s.chase.is_chasing());
        assert!(!s.player.as_ref().unwrap().alive);

        s.end_run(DeathCause::Arrows);
        let ended = s
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::RunEnded { .. }))
            .count();
        assert_eq!(ended, 1);
        assert_eq!(s.death_cause, Some(DeathCause::Obstacle));
    }

    #[test]
    fn test_restart_resets_run() {
        let mut s = state();
        s.start_run();
        s.score = 500.0;
        s.distance = 40.0;
        s.end_run(DeathCause::Caught);
        s.start_run();
        assert_eq!(s.score, 0.0);
        assert_eq!(s.distance, 0.0);
        assert!(!s.new_high_score);
        assert_eq!(s.high_score, 500.0);
        assert_eq!(s.arrows.live_count(), 0);
        assert_eq!(s.obstacles.live_count(), 0);
    }
}
