//! Collectables placed on segments

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::effects::EffectKind;
use super::events::EntityId;

/// Collection guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupState {
    Available,
    Collected,
}

/// A coin; attracted by the coin magnet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: EntityId,
    pub position: Vec3,
    pub state: PickupState,
}

impl Coin {
    pub fn new(id: EntityId, position: Vec3) -> Self {
        Self {
            id,
            position,
            state: PickupState::Available,
        }
    }

    /// Returns true only the first time
    pub fn collect(&mut self) -> bool {
        collect(&mut self.state)
    }

    /// Move toward `target` by at most `step` units
    pub fn attract_toward(&mut self, target: Vec3, step: f32) {
        let to_target = target - self.position;
        let dist = to_target.length();
        if dist <= step {
            self.position = target;
        } else {
            self.position += to_target / dist * step;
        }
    }
}

/// A power-up carrying one effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: EntityId,
    pub kind: EffectKind,
    pub position: Vec3,
    pub state: PickupState,
}

impl PowerUp {
    pub fn new(id: EntityId, kind: EffectKind, position: Vec3) -> Self {
        Self {
            id,
            kind,
            position,
            state: PickupState::Available,
        }
    }

    /// Returns true only the first time
    pub fn collect(&mut self) -> bool {
        collect(&mut self.state)
    }
}

fn collect(state: &mut PickupState) -> bool {
    if *state == PickupState::Collected {
        return false;
    }
    *state = PickupState::Collected;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_is_idempotent() {
        let mut p = PowerUp::new(1, EffectKind::Shield, Vec3::ZERO);
        assert!(p.collect());
        assert!(!p.collect());

        let mut c = Coin::new(2, Vec3::ZERO);
        assert!(c.collect());
        assert!(!c.collect());
    }

    #[test]
    fn test_attract_does_not_overshoot() {
        let mut c = Coin::new(1, Vec3::new(0.0, 0.0, 10.0));
        c.attract_toward(Vec3::ZERO, 4.0);
        assert!((c.position.z - 6.0).abs() < 1e-6);
        c.attract_toward(Vec3::ZERO, 100.0);
        assert_eq!(c.position, Vec3::ZERO);
    }
}
