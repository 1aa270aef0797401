//! Dish Dash - A dish-washing arcade game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (dish lifecycle, stack, difficulty, session)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, audio playback and input-device binding live outside this crate.
//! They consume [`sim::SessionSnapshot`] and the [`sim::GameEvent`] stream.

pub mod sim;
pub mod tuning;

pub use sim::{Direction, GameEvent, GameSession, SessionSnapshot};
pub use tuning::{MistakePolicy, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Only dishes below this slot show their sequence icons
    pub const VISIBLE_SLOTS: usize = 2;
    /// Distance at which a moving dish counts as arrived (squared: 0.0001)
    pub const ARRIVAL_EPSILON: f32 = 0.01;
    /// Spawn interval values this close to the floor are treated as the floor
    pub const INTERVAL_EPSILON: f32 = 1e-4;
    /// Most rate ticks one difficulty update applies; extra elapsed intervals are dropped
    pub const MAX_RATE_TICKS_PER_UPDATE: u32 = 64;

    /// Smallest accepted timer/duration value in tuning (seconds)
    pub const MIN_DURATION: f32 = 0.01;
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting.
#[inline]
pub fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let delta = target - current;
    let dist = delta.length();
    if dist <= max_delta || dist == 0.0 {
        target
    } else {
        current + delta / dist * max_delta
    }
}

/// Quadratic ease-out over t in [0, 1]
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}
