//! Top-level game session
//!
//! Owns the stack and the difficulty controller, schedules spawns, routes
//! input, counts washed dishes and detects the loss condition. All
//! notifications come back as [`GameEvent`]s from the call that caused them.

use serde::{Deserialize, Serialize};

use super::difficulty::{DifficultyChange, DifficultyController};
use super::dish::{DishEvent, DishId, DishSnapshot, InputOutcome};
use super::sequence::{Direction, SequenceGenerator};
use super::stack::DishStack;
use crate::tuning::Tuning;

/// Something presentation, audio or an end-of-session handler may react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned { id: DishId, slot: usize, stack_size: usize },
    Arrived { id: DishId },
    /// A dish became the one taking input
    Activated { id: DishId },
    /// Correct input; triggers step feedback
    StepCompleted { id: DishId, step: usize },
    Mistake { id: DishId, progress_reset: bool },
    Washed { id: DishId, washed_count: u64 },
    Destroyed { id: DishId },
    SpawnIntervalChanged { interval: f32 },
    DifficultyIncreased { level: u32, sequence_length: u32 },
    /// Stack overflowed; the session is over
    Lost { washed_count: u64 },
}

/// Read-only view for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub washed_count: u64,
    pub stack_size: usize,
    pub max_dishes: usize,
    pub spawned_total: u64,
    pub difficulty_level: u32,
    /// Difficulty clamped for the HUD
    pub display_difficulty: u32,
    pub spawn_interval: f32,
    pub sequence_length: u32,
    pub is_over: bool,
    /// Stacked dishes bottom first, then departing ones
    pub dishes: Vec<DishSnapshot>,
}

impl SessionSnapshot {
    pub fn washed_label(&self) -> String {
        format!("Washed: {}", self.washed_count)
    }

    pub fn dishes_label(&self) -> String {
        format!("Dishes: {} / {}", self.stack_size, self.max_dishes)
    }

    pub fn difficulty_label(&self, max_display: u32) -> String {
        format!("Difficulty: {} / {}", self.display_difficulty, max_display)
    }
}

/// One play session
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Run seed for reproducibility
    seed: u64,
    tuning: Tuning,
    stack: DishStack,
    difficulty: DifficultyController,
    /// Seconds until the next spawn
    spawn_timer: f32,
    washed_count: u64,
    is_over: bool,
    /// Simulated seconds since start
    elapsed: f64,
}

impl GameSession {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let tuning = tuning.sanitized();
        let stack = DishStack::new(&tuning, SequenceGenerator::new(seed));
        let difficulty = DifficultyController::new(&tuning);
        log::info!("New session with seed {}", seed);
        Self {
            seed,
            spawn_timer: difficulty.spawn_interval(),
            stack,
            difficulty,
            tuning,
            washed_count: 0,
            is_over: false,
            elapsed: 0.0,
        }
    }

    /// Start over with the same tuning
    pub fn reset(&mut self, seed: u64) {
        *self = Self::new(self.tuning.clone(), seed);
    }

    /// Advance the session by `dt` seconds. No-op once over.
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.is_over {
            return events;
        }
        self.elapsed += dt as f64;

        let before = self.stack.active_id();
        for event in self.stack.update(dt) {
            events.push(match event {
                DishEvent::Arrived(id) => GameEvent::Arrived { id },
                DishEvent::Destroyed(id) => GameEvent::Destroyed { id },
            });
        }
        self.push_activation(before, &mut events);

        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn(&mut events);
            self.spawn_timer = self.difficulty.spawn_interval();
            if self.is_over {
                return events;
            }
        }

        for change in self.difficulty.tick(dt) {
            events.push(match change {
                DifficultyChange::Faster { spawn_interval } => GameEvent::SpawnIntervalChanged {
                    interval: spawn_interval,
                },
                DifficultyChange::LevelUp {
                    level,
                    sequence_length,
                } => GameEvent::DifficultyIncreased {
                    level,
                    sequence_length,
                },
            });
        }

        events
    }

    fn spawn(&mut self, events: &mut Vec<GameEvent>) {
        let before = self.stack.active_id();
        let report = self.stack.spawn(self.difficulty.sequence_length());
        events.push(GameEvent::Spawned {
            id: report.id,
            slot: report.slot,
            stack_size: report.stack_size,
        });
        self.push_activation(before, events);

        if report.overflowed {
            self.on_loss_signal(events);
        }
    }

    fn on_loss_signal(&mut self, events: &mut Vec<GameEvent>) {
        if self.is_over {
            return;
        }
        self.is_over = true;
        self.stack.deactivate_all();
        log::warn!(
            "Game over: too many dishes! Washed {} after {:.1}s",
            self.washed_count,
            self.elapsed
        );
        events.push(GameEvent::Lost {
            washed_count: self.washed_count,
        });
    }

    /// Feed one direction to the active dish
    pub fn handle_input(&mut self, dir: Direction) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.is_over {
            return events;
        }

        let before = self.stack.active_id();
        let Some((id, outcome)) = self.stack.handle_input(dir) else {
            return events;
        };

        match outcome {
            InputOutcome::Ignored => {}
            InputOutcome::Advanced { step } => events.push(GameEvent::StepCompleted { id, step }),
            InputOutcome::Mistake { progress_reset } => {
                events.push(GameEvent::Mistake { id, progress_reset })
            }
            InputOutcome::Completed => {
                let step = self.stack.get(id).map_or(0, |d| d.progress().saturating_sub(1));
                events.push(GameEvent::StepCompleted { id, step });
                self.washed_count += 1;
                events.push(GameEvent::Washed {
                    id,
                    washed_count: self.washed_count,
                });
                self.push_activation(before, &mut events);
            }
        }
        events
    }

    /// Raw input code (0:left, 1:up, 2:right, 3:down); anything else is ignored
    pub fn handle_code(&mut self, code: i32) -> Vec<GameEvent> {
        match Direction::from_code(code) {
            Some(dir) => self.handle_input(dir),
            None => Vec::new(),
        }
    }

    fn push_activation(&self, before: Option<DishId>, events: &mut Vec<GameEvent>) {
        let after = self.stack.active_id();
        if after == before {
            return;
        }
        if let Some(id) = after {
            events.push(GameEvent::Activated { id });
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            washed_count: self.washed_count,
            stack_size: self.stack.len(),
            max_dishes: self.stack.max_dishes_to_lose(),
            spawned_total: self.stack.spawned_total(),
            difficulty_level: self.difficulty.level(),
            display_difficulty: self.display_difficulty(),
            spawn_interval: self.difficulty.spawn_interval(),
            sequence_length: self.difficulty.sequence_length(),
            is_over: self.is_over,
            dishes: self
                .stack
                .dishes()
                .iter()
                .chain(self.stack.departing().iter())
                .map(|d| d.snapshot())
                .collect(),
        }
    }

    pub fn display_difficulty(&self) -> u32 {
        self.difficulty.level().min(self.tuning.max_display_difficulty)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn stack(&self) -> &DishStack {
        &self.stack
    }

    pub fn difficulty(&self) -> &DifficultyController {
        &self.difficulty
    }

    pub fn washed_count(&self) -> u64 {
        self.washed_count
    }

    pub fn is_over(&self) -> bool {
        self.is_over
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}
