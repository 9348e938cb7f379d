//! Tick-based suspension points
//!
//! Every "wait N seconds" in the simulation is a countdown of whole fixed
//! ticks, so timing is exact and identical across runs.

use serde::{Deserialize, Serialize};

use crate::consts::SIM_DT;

/// Convert seconds to whole simulation ticks (never less than one)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u32 {
    ((secs.max(0.0) / SIM_DT).round() as u32).max(1)
}

/// One-shot countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    pub fn from_secs(secs: f32) -> Self {
        Self::from_ticks(secs_to_ticks(secs))
    }

    pub fn from_ticks(ticks: u32) -> Self {
        Self { remaining: ticks }
    }

    /// Advance one tick. Returns true exactly once, on the tick that expires it.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }

    #[inline]
    pub fn remaining_ticks(&self) -> u32 {
        self.remaining
    }

    #[inline]
    pub fn remaining_secs(&self) -> f32 {
        self.remaining as f32 * SIM_DT
    }
}

/// Repeating timer that fires every `period` ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Periodic {
    period: u32,
    countdown: Countdown,
}

impl Periodic {
    /// First fire after one full period
    pub fn new(period_secs: f32) -> Self {
        let period = secs_to_ticks(period_secs);
        Self {
            period,
            countdown: Countdown::from_ticks(period),
        }
    }

    /// First fire on the next tick, then every period
    pub fn starting_now(period_secs: f32) -> Self {
        Self {
            period: secs_to_ticks(period_secs),
            countdown: Countdown::from_ticks(1),
        }
    }

    /// Advance one tick; returns true when the period elapses (and rearms)
    pub fn tick(&mut self) -> bool {
        if self.countdown.tick() {
            self.countdown = Countdown::from_ticks(self.period);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn period_ticks(&self) -> u32 {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_fires_once() {
        let mut c = Countdown::from_ticks(3);
        assert!(!c.tick());
        assert!(!c.tick());
        assert!(c.tick());
        assert!(c.is_done());
        assert!(!c.tick());
    }

    #[test]
    fn test_secs_to_ticks() {
        assert_eq!(secs_to_ticks(1.0), 60);
        assert_eq!(secs_to_ticks(0.5), 30);
        assert_eq!(secs_to_ticks(10.0), 600);
        // Zero-length waits still suspend for one tick
        assert_eq!(secs_to_ticks(0.0), 1);
        assert_eq!(secs_to_ticks(-3.0), 1);
    }

    #[test]
    fn test_periodic_rearms() {
        let mut p = Periodic::new(0.05); // 3 ticks
        let fires: Vec<bool> = (0..9).map(|_| p.tick()).collect();
        assert_eq!(
            fires,
            vec![false, false, true, false, false, true, false, false, true]
        );
    }

    #[test]
    fn test_periodic_starting_now() {
        let mut p = Periodic::starting_now(0.05);
        assert!(p.tick());
        assert!(!p.tick());
        assert!(!p.tick());
        assert!(p.tick());
    }
}
