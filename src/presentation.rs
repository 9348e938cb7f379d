//! Presentation hooks
//!
//! The host implements `PresentationHooks` to render, play audio and drive
//! UI. Every method defaults to a no-op, so a host only overrides what it
//! presents. `present` drains a state's event queue into the hooks.

use glam::Vec3;

use crate::sim::{EntityId, EntityKind, GameEvent, GameState, Panel, SoundCue, VisualEffect};

/// Values shown on the in-game HUD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    pub score: f32,
    pub distance: f32,
    pub multiplier: f32,
    pub health: i32,
    pub high_score: f32,
}

impl Hud {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            score: state.score,
            distance: state.distance,
            multiplier: state.score_multiplier(),
            health: state.player.as_ref().map_or(0, |p| p.health),
            high_score: state.high_score,
        }
    }
}

pub trait PresentationHooks {
    fn play_effect(&mut self, _effect: VisualEffect, _position: Vec3) {}

    fn play_sound(&mut self, _cue: SoundCue) {}

    fn set_panel_visible(&mut self, _panel: Panel, _visible: bool) {}

    fn update_score_display(&mut self, _hud: &Hud) {}

    fn entity_spawned(&mut self, _id: EntityId, _kind: EntityKind, _position: Vec3) {}

    fn entity_removed(&mut self, _id: EntityId) {}

    /// Gameplay notifications with no dedicated hook (health, effects,
    /// difficulty, death, run end)
    fn game_event(&mut self, _event: &GameEvent) {}
}

/// Drain queued events into `hooks`, then refresh the HUD
pub fn present<H: PresentationHooks + ?Sized>(state: &mut GameState, hooks: &mut H) {
    for event in state.drain_events() {
        match event {
            GameEvent::Spawned { id, kind, position } => hooks.entity_spawned(id, kind, position),
            GameEvent::Removed { id } => hooks.entity_removed(id),
            GameEvent::Effect { effect, position } => hooks.play_effect(effect, position),
            GameEvent::Sound { cue } => hooks.play_sound(cue),
            GameEvent::Panel { panel, visible } => hooks.set_panel_visible(panel, visible),
            other => hooks.game_event(&other),
        }
    }
    hooks.update_score_display(&Hud::from_state(state));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use std::collections::HashSet;

    #[derive(Default)]
    struct Recorder {
        live: HashSet<EntityId>,
        panels: Vec<(Panel, bool)>,
        sounds: usize,
        other: Vec<GameEvent>,
        hud: Option<Hud>,
    }

    impl PresentationHooks for Recorder {
        fn play_sound(&mut self, _cue: SoundCue) {
            self.sounds += 1;
        }

        fn set_panel_visible(&mut self, panel: Panel, visible: bool) {
            self.panels.push((panel, visible));
        }

        fn update_score_display(&mut self, hud: &Hud) {
            self.hud = Some(*hud);
        }

        fn entity_spawned(&mut self, id: EntityId, _kind: EntityKind, _position: Vec3) {
            assert!(self.live.insert(id), "entity {} spawned twice", id);
        }

        fn entity_removed(&mut self, id: EntityId) {
            assert!(self.live.remove(&id), "entity {} removed but not live", id);
        }

        fn game_event(&mut self, event: &GameEvent) {
            self.other.push(event.clone());
        }
    }

    struct Silent;
    impl PresentationHooks for Silent {}

    #[test]
    fn test_default_hooks_ignore_everything() {
        let mut state = GameState::new(1, Settings::default(), 0.0);
        state.start_run();
        present(&mut state, &mut Silent);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_start_run_shows_gameplay_and_health() {
        let mut state = GameState::new(1, Settings::default(), 0.0);
        let mut rec = Recorder::default();
        present(&mut state, &mut rec);
        assert!(rec.panels.contains(&(Panel::MainMenu, true)));

        state.start_run();
        present(&mut state, &mut rec);
        assert!(rec.panels.contains(&(Panel::Gameplay, true)));
        assert!(rec.panels.contains(&(Panel::MainMenu, false)));
        assert!(rec.other.contains(&GameEvent::HealthChanged { health: 3 }));
        let hud = rec.hud.unwrap();
        assert_eq!(hud.health, 3);
        assert_eq!(hud.multiplier, 1.0);
        assert!(!rec.live.is_empty());
    }

    #[test]
    fn test_entity_lifecycle_stays_balanced() {
        use crate::consts::SIM_DT;
        use crate::sim::{TickInput, tick};

        let mut state = GameState::new(99, Settings::default(), 0.0);
        let mut rec = Recorder::default();
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        // Every removal must match an earlier spawn, across runs
        for _ in 0..4 {
            for _ in 0..1800 {
                tick(&mut state, &input, SIM_DT);
                present(&mut state, &mut rec);
            }
            state.start_run();
            present(&mut state, &mut rec);
        }
        state.return_to_menu();
        present(&mut state, &mut rec);
        assert!(rec.live.is_empty(), "leaked {:?}", rec.live);
    }
}
