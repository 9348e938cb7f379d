//! Face the Arrows entry point
//!
//! Headless native runner: plays an autopilot run at a fixed frame rate,
//! logs what the presentation layer would show and records the result on
//! the high score board.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use glam::Vec3;

use face_the_arrows::consts::*;
use face_the_arrows::presentation::Hud;
use face_the_arrows::sim::{
    EntityId, EntityKind, GameEvent, GamePhase, GameState, Panel, SoundCue, TickInput, tick,
};
use face_the_arrows::{HighScoreStore, JsonFileStore, PresentationHooks, Settings, present};

/// Lane-based endless runner simulation
#[derive(Debug, Parser)]
#[command(name = "face-the-arrows", version)]
struct Args {
    /// Run seed (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,

    /// Seconds of game time to simulate
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    /// Host frame rate; each frame runs as many fixed ticks as have accrued
    #[arg(long, default_value_t = 30.0)]
    fps: f32,

    /// Settings JSON (missing fields take defaults)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the default settings to this path and exit
    #[arg(long)]
    dump_settings: Option<PathBuf>,

    /// High score file
    #[arg(long, default_value = "face_the_arrows_scores.json")]
    scores: PathBuf,
}

/// Presentation layer that narrates to the log
#[derive(Default)]
struct LogHooks {
    live_entities: usize,
    last_hud: Option<Hud>,
    run_ended: Option<(f32, f32, bool)>,
}

impl PresentationHooks for LogHooks {
    fn play_sound(&mut self, cue: SoundCue) {
        log::trace!("sound: {:?}", cue);
    }

    fn set_panel_visible(&mut self, panel: Panel, visible: bool) {
        if visible {
            log::debug!("panel: {:?}", panel);
        }
    }

    fn update_score_display(&mut self, hud: &Hud) {
        self.last_hud = Some(*hud);
    }

    fn entity_spawned(&mut self, id: EntityId, kind: EntityKind, position: Vec3) {
        self.live_entities += 1;
        log::trace!("spawn {} {:?} at {}", id, kind, position);
    }

    fn entity_removed(&mut self, id: EntityId) {
        self.live_entities = self.live_entities.saturating_sub(1);
        log::trace!("remove {}", id);
    }

    fn game_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::HealthChanged { health } => log::info!("Health: {}", health),
            GameEvent::EffectStarted { kind } => log::info!("{:?} active", kind),
            GameEvent::EffectEnded { kind } => log::debug!("{:?} ended", kind),
            GameEvent::PlayerCaught => log::info!("The pack caught up"),
            GameEvent::RunEnded {
                score,
                distance,
                new_high_score,
            } => self.run_ended = Some((*score, *distance, *new_high_score)),
            _ => {}
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Some(path) = args.dump_settings.as_ref() {
        if let Err(e) = Settings::default().save(path) {
            log::error!("{}", e);
            std::process::exit(1);
        }
        return;
    }

    let settings = match args.settings.as_ref() {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    });
    log::info!("Face the Arrows (headless) starting, seed {}", seed);

    let mut store = JsonFileStore::open(&args.scores);
    let mut state = GameState::new(seed, settings, store.load_high_score());
    let mut hooks = LogHooks::default();
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    let frame_dt = 1.0 / args.fps.max(1.0);
    let frames = (args.seconds / frame_dt).ceil() as u64;
    let mut accumulator = 0.0;
    for _ in 0..frames {
        accumulator += frame_dt;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }
        present(&mut state, &mut hooks);

        if state.phase == GamePhase::GameOver && hooks.run_ended.is_some() {
            break;
        }
    }

    match hooks.run_ended {
        Some((score, distance, new_high_score)) => {
            if let Some(rank) = store.record_run(score, distance) {
                log::info!("Run placed #{} on the board", rank);
            }
            println!(
                "Run over after {:.1}s: score {:.0}, distance {:.1}m, {} coins{}",
                state.game_time,
                score,
                distance,
                state.coins,
                if new_high_score { " (new high score!)" } else { "" }
            );
        }
        None => {
            let hud = hooks.last_hud.unwrap_or(Hud::from_state(&state));
            println!(
                "Still running after {:.1}s: score {:.0}, distance {:.1}m, health {}, x{} multiplier",
                state.game_time, hud.score, hud.distance, hud.health, hud.multiplier
            );
        }
    }
    log::debug!("{} entities live at exit", hooks.live_entities);
}
