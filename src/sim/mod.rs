//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Driven only by the `dt` it is ticked with
//! - Seeded RNG only
//! - Stable iteration order (by stack slot, then dish ID)
//! - No rendering, audio or platform dependencies

pub mod difficulty;
pub mod dish;
pub mod sequence;
pub mod session;
pub mod stack;

pub use difficulty::{DifficultyChange, DifficultyController};
pub use dish::{
    Dish, DishEvent, DishId, DishParams, DishSnapshot, DishState, InputOutcome, StepSnapshot,
    Timer,
};
pub use sequence::{Direction, SequenceGenerator};
pub use session::{GameEvent, GameSession, SessionSnapshot};
pub use stack::{DishStack, SpawnReport};
