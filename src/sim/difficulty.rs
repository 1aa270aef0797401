//! Time-driven spawn rate and sequence length progression
//!
//! Every `rate_tick_interval` seconds the spawn interval shrinks by the decay.
//! Once it sits at the floor, the next rate tick resets it to the base value
//! and bumps both the sequence length and the difficulty level.

use serde::{Deserialize, Serialize};

use crate::consts::{INTERVAL_EPSILON, MAX_RATE_TICKS_PER_UPDATE};
use crate::tuning::Tuning;

/// What a rate tick changed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DifficultyChange {
    /// Spawn interval shortened
    Faster { spawn_interval: f32 },
    /// Interval reset to base, sequences got longer
    LevelUp { level: u32, sequence_length: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyController {
    base_spawn_interval: f32,
    min_spawn_interval: f32,
    decay: f32,
    rate_tick_interval: f32,
    /// Decay steps applied since the last reset
    steps: u32,
    spawn_interval: f32,
    sequence_length: u32,
    level: u32,
    /// Seconds until the next rate tick
    timer: f32,
}

impl DifficultyController {
    pub fn new(tuning: &Tuning) -> Self {
        let t = tuning.clone().sanitized();
        Self {
            base_spawn_interval: t.base_spawn_interval,
            min_spawn_interval: t.min_spawn_interval,
            decay: t.spawn_interval_decay,
            rate_tick_interval: t.rate_tick_interval,
            steps: 0,
            spawn_interval: t.base_spawn_interval,
            sequence_length: t.starting_sequence_length,
            level: 0,
            timer: t.rate_tick_interval,
        }
    }

    /// Advance the rate timer, applying one change per elapsed interval
    /// (at most `MAX_RATE_TICKS_PER_UPDATE` per call)
    pub fn tick(&mut self, dt: f32) -> Vec<DifficultyChange> {
        if !dt.is_finite() || dt <= 0.0 {
            return Vec::new();
        }
        self.timer -= dt;
        if self.timer > 0.0 {
            return Vec::new();
        }

        let elapsed = ((-self.timer / self.rate_tick_interval).floor() as u32).saturating_add(1);
        let count = elapsed.min(MAX_RATE_TICKS_PER_UPDATE);
        if count < elapsed {
            log::warn!(
                "dt {} covers {} rate ticks, applying {}",
                dt,
                elapsed,
                count
            );
        }

        // Remainder lands in (0, rate_tick_interval]
        let rem = self.timer.rem_euclid(self.rate_tick_interval);
        self.timer = if rem > 0.0 { rem } else { self.rate_tick_interval };

        (0..count).map(|_| self.rate_tick()).collect()
    }

    fn rate_tick(&mut self) -> DifficultyChange {
        if !self.at_floor() {
            self.steps += 1;
            let next = self.base_spawn_interval - self.steps as f32 * self.decay;
            self.spawn_interval = if next <= self.min_spawn_interval + INTERVAL_EPSILON {
                self.min_spawn_interval
            } else {
                next
            };
            log::debug!("Spawn interval decreased to {}", self.spawn_interval);
            return DifficultyChange::Faster {
                spawn_interval: self.spawn_interval,
            };
        }

        self.steps = 0;
        self.spawn_interval = self.base_spawn_interval;
        self.sequence_length += 1;
        self.level += 1;
        log::info!(
            "Spawn rate hit the floor: interval reset to {}, sequence length {}, difficulty {}",
            self.spawn_interval,
            self.sequence_length,
            self.level
        );
        DifficultyChange::LevelUp {
            level: self.level,
            sequence_length: self.sequence_length,
        }
    }

    /// Spawn interval is at its fastest
    pub fn at_floor(&self) -> bool {
        self.spawn_interval <= self.min_spawn_interval + INTERVAL_EPSILON
    }

    pub fn spawn_interval(&self) -> f32 {
        self.spawn_interval
    }

    pub fn sequence_length(&self) -> u32 {
        self.sequence_length
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}
