//! Data-driven game balance
//!
//! Every number the designers tweak lives here. Loaded from JSON, with the
//! shipped values as defaults for any missing field.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MIN_DURATION;

/// What a wrong direction does to the active dish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MistakePolicy {
    /// Wrong input is dropped; progress stays where it was
    Ignore,
    /// Wrong input sends the dish back to its first step
    #[default]
    ResetProgress,
}

impl MistakePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MistakePolicy::Ignore => "Ignore",
            MistakePolicy::ResetProgress => "ResetProgress",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ignore" => Some(MistakePolicy::Ignore),
            "reset" | "resetprogress" | "reset_progress" => Some(MistakePolicy::ResetProgress),
            _ => None,
        }
    }
}

/// Game balance values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Stack geometry ===
    /// Horizontal lane all dishes share
    pub spawn_x: f32,
    /// Height new dishes drop in from
    pub offscreen_y: f32,
    /// Resting height of the bottom slot
    pub base_y: f32,
    /// Vertical distance between stacked dishes
    pub stack_spacing: f32,
    /// Offset added to every resting position
    pub arrival_offset: Vec2,
    /// Dish travel speed (units per second)
    pub move_speed: f32,
    /// Horizontal distance between step icons
    pub icon_spacing: f32,

    // === Rules ===
    /// Sequence length of the first dishes
    pub starting_sequence_length: u32,
    /// Stack size above this loses the game
    pub max_dishes_to_lose: usize,
    /// What a wrong input does
    pub mistake_policy: MistakePolicy,

    // === Spawn rate progression ===
    /// Starting seconds between spawns (and the value it resets to)
    pub base_spawn_interval: f32,
    /// Fastest allowed spawn interval
    pub min_spawn_interval: f32,
    /// How much each rate tick shortens the interval
    pub spawn_interval_decay: f32,
    /// Seconds between rate ticks
    pub rate_tick_interval: f32,

    // === Animation ===
    /// Correct-input shake/sponge duration
    pub feedback_duration: f32,
    /// Exit slide + shrink duration
    pub exit_duration: f32,
    /// How far a washed dish slides away
    pub exit_distance: f32,

    // === HUD ===
    /// Difficulty shown to the player is capped here
    pub max_display_difficulty: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            // Stack geometry
            spawn_x: 0.0,
            offscreen_y: 7.0,
            base_y: 1.5,
            stack_spacing: 0.6,
            arrival_offset: Vec2::ZERO,
            move_speed: 4.0,
            icon_spacing: 0.6,

            // Rules
            starting_sequence_length: 3,
            max_dishes_to_lose: 8,
            mistake_policy: MistakePolicy::ResetProgress,

            // Spawn rate progression
            base_spawn_interval: 3.0,
            min_spawn_interval: 0.5,
            spawn_interval_decay: 0.1,
            rate_tick_interval: 5.0,

            // Animation
            feedback_duration: 0.25,
            exit_duration: 0.5,
            exit_distance: 3.0,

            // HUD
            max_display_difficulty: 5,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Tuning>(json).map(Tuning::sanitized)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load tuning from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Invalid tuning in {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Clamp out-of-range values instead of rejecting them
    pub fn sanitized(mut self) -> Self {
        if self.starting_sequence_length == 0 {
            log::warn!("starting_sequence_length must be >= 1, clamping");
            self.starting_sequence_length = 1;
        }
        if self.max_dishes_to_lose == 0 {
            log::warn!("max_dishes_to_lose must be >= 1, clamping");
            self.max_dishes_to_lose = 1;
        }
        if !(self.stack_spacing > 0.0) {
            log::warn!("stack_spacing {} is not positive, using 1.0", self.stack_spacing);
            self.stack_spacing = 1.0;
        }
        if !(self.move_speed > 0.0) {
            log::warn!("move_speed {} is not positive, using 1.0", self.move_speed);
            self.move_speed = 1.0;
        }

        self.min_spawn_interval = positive_or_floor(self.min_spawn_interval, "min_spawn_interval");
        self.base_spawn_interval = positive_or_floor(self.base_spawn_interval, "base_spawn_interval");
        if self.base_spawn_interval < self.min_spawn_interval {
            log::warn!(
                "base_spawn_interval {} below min_spawn_interval {}, raising",
                self.base_spawn_interval,
                self.min_spawn_interval
            );
            self.base_spawn_interval = self.min_spawn_interval;
        }
        self.spawn_interval_decay = self.spawn_interval_decay.max(0.0);
        self.rate_tick_interval = positive_or_floor(self.rate_tick_interval, "rate_tick_interval");
        self.feedback_duration = self.feedback_duration.max(0.0);
        self.exit_duration = positive_or_floor(self.exit_duration, "exit_duration");
        self.max_display_difficulty = self.max_display_difficulty.max(1);
        self
    }

    /// Resting position of a stack slot (0 = bottom)
    pub fn slot_position(&self, slot: usize) -> Vec2 {
        Vec2::new(self.spawn_x, self.base_y + slot as f32 * self.stack_spacing) + self.arrival_offset
    }

    /// Where new dishes appear before dropping in
    pub fn spawn_position(&self) -> Vec2 {
        Vec2::new(self.spawn_x, self.offscreen_y)
    }
}

fn positive_or_floor(value: f32, name: &str) -> f32 {
    if value >= MIN_DURATION {
        value
    } else {
        log::warn!("{} {} too small, clamping to {}", name, value, MIN_DURATION);
        MIN_DURATION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_balance() {
        let t = Tuning::default();
        assert_eq!(t.starting_sequence_length, 3);
        assert_eq!(t.max_dishes_to_lose, 8);
        assert_eq!(t.base_spawn_interval, 3.0);
        assert_eq!(t.min_spawn_interval, 0.5);
        assert_eq!(t.mistake_policy, MistakePolicy::ResetProgress);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "max_dishes_to_lose": 4, "mistake_policy": "Ignore" }"#)
            .unwrap();
        assert_eq!(t.max_dishes_to_lose, 4);
        assert_eq!(t.mistake_policy, MistakePolicy::Ignore);
        assert_eq!(t.stack_spacing, 0.6);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_sanitize_clamps_config_errors() {
        let t = Tuning {
            starting_sequence_length: 0,
            stack_spacing: -2.0,
            max_dishes_to_lose: 0,
            base_spawn_interval: 0.1,
            min_spawn_interval: 0.5,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(t.starting_sequence_length, 1);
        assert_eq!(t.stack_spacing, 1.0);
        assert_eq!(t.max_dishes_to_lose, 1);
        assert_eq!(t.base_spawn_interval, 0.5);
    }

    #[test]
    fn test_slot_position_stacks_upward() {
        let t = Tuning::default();
        assert_eq!(t.slot_position(0), Vec2::new(0.0, 1.5));
        assert!((t.slot_position(2).y - 2.7).abs() < 1e-5);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let t = Tuning::load("/definitely/not/here.json");
        assert_eq!(t.max_dishes_to_lose, 8);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(MistakePolicy::from_str("reset"), Some(MistakePolicy::ResetProgress));
        assert_eq!(MistakePolicy::from_str("IGNORE"), Some(MistakePolicy::Ignore));
        assert_eq!(MistakePolicy::from_str("nope"), None);
        for policy in [MistakePolicy::Ignore, MistakePolicy::ResetProgress] {
            assert_eq!(MistakePolicy::from_str(policy.as_str()), Some(policy));
        }
    }

    #[test]
    fn test_saved_tuning_loads_back() {
        let t = Tuning {
            max_dishes_to_lose: 5,
            mistake_policy: MistakePolicy::Ignore,
            ..Default::default()
        };
        let loaded = Tuning::from_json(&t.to_json().unwrap()).unwrap();
        assert_eq!(loaded.max_dishes_to_lose, 5);
        assert_eq!(loaded.mistake_policy, MistakePolicy::Ignore);
    }
}
