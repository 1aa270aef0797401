//! A single dish: its sequence, progress and lifecycle state machine
//!
//! Lifecycle:
//! `Spawning -> Arriving -> Idle <-> Active -> Completing -> Exiting -> Destroyed`
//!
//! Retargeting (`move_to`) sends Idle/Active/Arriving dishes back to Arriving.
//! Dishes never touch stack membership; they only report events upward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::sequence::Direction;
use crate::consts::ARRIVAL_EPSILON;
use crate::tuning::{MistakePolicy, Tuning};
use crate::{ease_out, move_towards};

/// Stable identity of a dish within one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DishId(pub u32);

/// Lifecycle state of a dish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DishState {
    /// Created, not yet given a sequence/target
    Spawning,
    /// Moving toward its resting position
    Arriving,
    /// At rest, not accepting input
    Idle,
    /// At rest at the bottom, accepting input
    Active,
    /// Sequence done, waiting for feedback to finish
    Completing,
    /// Sliding away and shrinking
    Exiting,
    /// Gone
    Destroyed,
}

impl DishState {
    /// Completing/Exiting/Destroyed dishes no longer belong to the stack
    pub fn is_departing(self) -> bool {
        matches!(
            self,
            DishState::Completing | DishState::Exiting | DishState::Destroyed
        )
    }
}

/// Notification produced by [`Dish::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DishEvent {
    Arrived(DishId),
    Destroyed(DishId),
}

/// Result of feeding one direction to a dish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Dish not accepting input
    Ignored,
    /// Correct direction; `step` is the index just completed
    Advanced { step: usize },
    /// Wrong direction
    Mistake { progress_reset: bool },
    /// Correct direction that finished the sequence
    Completed,
}

/// Elapsed-time animation driven by ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timer {
    pub elapsed: f32,
    pub duration: f32,
}

impl Timer {
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
        }
    }

    /// Advance; returns true once finished
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Fraction complete in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// Per-dish copy of the tuning values a dish needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DishParams {
    pub move_speed: f32,
    pub icon_spacing: f32,
    pub feedback_duration: f32,
    pub exit_duration: f32,
    pub exit_distance: f32,
    pub mistake_policy: MistakePolicy,
}

impl From<&Tuning> for DishParams {
    fn from(t: &Tuning) -> Self {
        Self {
            move_speed: t.move_speed,
            icon_spacing: t.icon_spacing,
            feedback_duration: t.feedback_duration,
            exit_duration: t.exit_duration,
            exit_distance: t.exit_distance,
            mistake_policy: t.mistake_policy,
        }
    }
}

impl Default for DishParams {
    fn default() -> Self {
        Self::from(&Tuning::default())
    }
}

/// Shake amplitude at the start of correct-input feedback
const SHAKE_AMPLITUDE: f32 = 0.05;
/// Shake oscillations per feedback animation
const SHAKE_CYCLES: f32 = 3.0;

/// Presentation view of one sequence step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSnapshot {
    pub direction: Direction,
    /// Icon rotation in degrees
    pub rotation: f32,
    /// Icon offset relative to the dish center
    pub offset: Vec2,
    /// Completed steps are drawn dimmed
    pub completed: bool,
}

/// Presentation view of one dish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishSnapshot {
    pub id: DishId,
    /// None once the dish has left the stack
    pub slot: Option<usize>,
    pub state: DishState,
    pub position: Vec2,
    pub shake_offset: Vec2,
    pub scale: f32,
    pub visible: bool,
    pub progress: usize,
    pub steps: Vec<StepSnapshot>,
}

/// A dish entity
#[derive(Debug, Clone)]
pub struct Dish {
    id: DishId,
    sequence: Vec<Direction>,
    progress: usize,
    state: DishState,
    pub(crate) slot: usize,
    pub(crate) visible: bool,
    pos: Vec2,
    target: Vec2,
    scale: f32,
    /// Input gate set by the stack; only takes effect once at rest
    input_enabled: bool,
    feedback: Option<Timer>,
    exit: Option<(Timer, Vec2)>,
    params: DishParams,
}

impl Dish {
    pub fn new(id: DishId, spawn_pos: Vec2, params: DishParams) -> Self {
        Self {
            id,
            sequence: Vec::new(),
            progress: 0,
            state: DishState::Spawning,
            slot: 0,
            visible: false,
            pos: spawn_pos,
            target: spawn_pos,
            scale: 1.0,
            input_enabled: false,
            feedback: None,
            exit: None,
            params,
        }
    }

    /// (Re)configure with a sequence and resting position; starts arriving.
    /// Empty sequences are rejected. Washed dishes keep their exit.
    pub fn init(&mut self, sequence: Vec<Direction>, target: Vec2) {
        if sequence.is_empty() {
            log::warn!("Dish {:?} given an empty sequence, ignoring", self.id);
            return;
        }
        if self.state.is_departing() {
            return;
        }
        self.sequence = sequence;
        self.progress = 0;
        self.target = target;
        self.scale = 1.0;
        self.input_enabled = false;
        self.feedback = None;
        self.exit = None;
        self.state = DishState::Arriving;
    }

    /// Open or close the input gate. Has no effect on position.
    pub fn activate(&mut self, on: bool) {
        if self.state.is_departing() {
            return;
        }
        self.input_enabled = on;
        match (on, self.state) {
            (true, DishState::Idle) => self.state = DishState::Active,
            (false, DishState::Active) => self.state = DishState::Idle,
            _ => {}
        }
    }

    /// Send the dish to a new resting position. Closes the input gate.
    pub fn move_to(&mut self, target: Vec2) {
        if self.state.is_departing() || self.state == DishState::Spawning {
            return;
        }
        self.target = target;
        self.input_enabled = false;
        self.state = DishState::Arriving;
    }

    /// Feed one direction. Only an Active dish reacts.
    pub fn handle_input(&mut self, dir: Direction) -> InputOutcome {
        if self.state != DishState::Active || self.progress >= self.sequence.len() {
            return InputOutcome::Ignored;
        }

        if self.sequence[self.progress] == dir {
            let step = self.progress;
            self.progress += 1;
            // New feedback interrupts any in-flight one
            self.feedback = Some(Timer::new(self.params.feedback_duration));

            if self.progress == self.sequence.len() {
                self.begin_completing();
                return InputOutcome::Completed;
            }
            return InputOutcome::Advanced { step };
        }

        match self.params.mistake_policy {
            MistakePolicy::Ignore => InputOutcome::Mistake {
                progress_reset: false,
            },
            MistakePolicy::ResetProgress => {
                let progress_reset = self.progress > 0;
                self.progress = 0;
                InputOutcome::Mistake { progress_reset }
            }
        }
    }

    /// Leave the stack: input off, icons hidden, exit once feedback has played out
    pub(crate) fn begin_completing(&mut self) {
        if self.state.is_departing() {
            return;
        }
        self.input_enabled = false;
        self.visible = false;
        self.state = DishState::Completing;
    }

    /// Advance movement and animations by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> Option<DishEvent> {
        let feedback_done = match self.feedback.as_mut() {
            Some(timer) => timer.advance(dt),
            None => true,
        };
        if feedback_done {
            self.feedback = None;
        }

        match self.state {
            DishState::Arriving => {
                self.pos = move_towards(self.pos, self.target, self.params.move_speed * dt);
                if self.pos.distance_squared(self.target) < ARRIVAL_EPSILON * ARRIVAL_EPSILON {
                    self.pos = self.target;
                    self.state = if self.input_enabled {
                        DishState::Active
                    } else {
                        DishState::Idle
                    };
                    log::trace!("Dish {:?} arrived at {:?}", self.id, self.pos);
                    return Some(DishEvent::Arrived(self.id));
                }
                None
            }
            DishState::Completing => {
                if self.feedback.is_none() {
                    self.state = DishState::Exiting;
                    self.exit = Some((Timer::new(self.params.exit_duration), self.pos));
                }
                None
            }
            DishState::Exiting => {
                let (timer, start) = self.exit.get_or_insert((Timer::new(self.params.exit_duration), self.pos));
                let finished = timer.advance(dt);
                let t = ease_out(timer.progress());
                self.pos = *start + Vec2::new(self.params.exit_distance * t, 0.0);
                self.scale = 1.0 - timer.progress();
                if finished {
                    self.state = DishState::Destroyed;
                    self.exit = None;
                    log::trace!("Dish {:?} destroyed", self.id);
                    return Some(DishEvent::Destroyed(self.id));
                }
                None
            }
            DishState::Spawning | DishState::Idle | DishState::Active | DishState::Destroyed => None,
        }
    }

    pub fn id(&self) -> DishId {
        self.id
    }

    pub fn state(&self) -> DishState {
        self.state
    }

    pub fn sequence(&self) -> &[Direction] {
        &self.sequence
    }

    pub fn progress(&self) -> usize {
        self.progress
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_active(&self) -> bool {
        self.state == DishState::Active
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Fraction of the current correct-input feedback, if one is playing
    pub fn feedback_progress(&self) -> Option<f32> {
        self.feedback.map(|f| f.progress())
    }

    /// Decaying horizontal wobble while feedback plays
    pub fn shake_offset(&self) -> Vec2 {
        match self.feedback {
            Some(f) => {
                let p = f.progress();
                let amp = SHAKE_AMPLITUDE * (1.0 - p);
                Vec2::new(amp * (p * std::f32::consts::TAU * SHAKE_CYCLES).sin(), 0.0)
            }
            None => Vec2::ZERO,
        }
    }

    /// Icon offsets, centered under the dish
    pub fn step_offsets(&self) -> Vec<Vec2> {
        let n = self.sequence.len();
        let start = -((n.saturating_sub(1)) as f32) * self.params.icon_spacing * 0.5;
        (0..n)
            .map(|i| Vec2::new(start + i as f32 * self.params.icon_spacing, 0.0))
            .collect()
    }

    pub fn snapshot(&self) -> DishSnapshot {
        let steps = self
            .sequence
            .iter()
            .zip(self.step_offsets())
            .enumerate()
            .map(|(i, (&direction, offset))| StepSnapshot {
                direction,
                rotation: direction.icon_rotation(),
                offset,
                completed: i < self.progress,
            })
            .collect();

        DishSnapshot {
            id: self.id,
            slot: (!self.state.is_departing()).then_some(self.slot),
            state: self.state,
            position: self.pos,
            shake_offset: self.shake_offset(),
            scale: self.scale,
            visible: self.visible,
            progress: self.progress,
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::sequence::Direction::*;

    fn arrived_dish(seq: Vec<Direction>) -> Dish {
        let mut dish = Dish::new(DishId(1), Vec2::new(0.0, 7.0), DishParams::default());
        dish.init(seq, Vec2::new(0.0, 1.5));
        // 5.5 units at 4 u/s
        for _ in 0..200 {
            if dish.tick(1.0 / 60.0).is_some() {
                break;
            }
        }
        dish
    }

    #[test]
    fn test_init_starts_arriving() {
        let mut dish = Dish::new(DishId(1), Vec2::new(0.0, 7.0), DishParams::default());
        assert_eq!(dish.state(), DishState::Spawning);
        dish.init(vec![Up, Down], Vec2::new(0.0, 1.5));
        assert_eq!(dish.state(), DishState::Arriving);
        assert_eq!(dish.progress(), 0);
    }

    #[test]
    fn test_arrival_emits_once() {
        let mut dish = Dish::new(DishId(3), Vec2::new(0.0, 7.0), DishParams::default());
        dish.init(vec![Up], Vec2::new(0.0, 1.5));
        let mut arrivals = 0;
        for _ in 0..300 {
            if dish.tick(1.0 / 60.0) == Some(DishEvent::Arrived(DishId(3))) {
                arrivals += 1;
            }
        }
        assert_eq!(arrivals, 1);
        assert_eq!(dish.state(), DishState::Idle);
        assert_eq!(dish.position(), Vec2::new(0.0, 1.5));
    }

    #[test]
    fn test_input_ignored_until_active() {
        let mut dish = Dish::new(DishId(1), Vec2::new(0.0, 7.0), DishParams::default());
        dish.init(vec![Up], Vec2::new(0.0, 1.5));
        assert_eq!(dish.handle_input(Up), InputOutcome::Ignored);

        let mut dish = arrived_dish(vec![Up]);
        assert_eq!(dish.state(), DishState::Idle);
        assert_eq!(dish.handle_input(Up), InputOutcome::Ignored);
        assert_eq!(dish.progress(), 0);
    }

    #[test]
    fn test_activation_latched_while_arriving() {
        let mut dish = Dish::new(DishId(1), Vec2::new(0.0, 7.0), DishParams::default());
        dish.init(vec![Up], Vec2::new(0.0, 1.5));
        dish.activate(true);
        assert_eq!(dish.state(), DishState::Arriving);
        while dish.tick(1.0 / 60.0).is_none() {}
        assert_eq!(dish.state(), DishState::Active);
    }

    #[test]
    fn test_full_sequence_completes() {
        let mut dish = arrived_dish(vec![Left, Up, Right]);
        dish.activate(true);
        assert_eq!(dish.handle_input(Left), InputOutcome::Advanced { step: 0 });
        assert_eq!(dish.handle_input(Up), InputOutcome::Advanced { step: 1 });
        assert_eq!(dish.handle_input(Right), InputOutcome::Completed);
        assert_eq!(dish.state(), DishState::Completing);
        assert_eq!(dish.progress(), 3);
        // Input disabled immediately
        assert_eq!(dish.handle_input(Right), InputOutcome::Ignored);
    }

    #[test]
    fn test_mistake_resets_progress() {
        let mut dish = arrived_dish(vec![Left, Up, Right]);
        dish.activate(true);
        dish.handle_input(Left);
        assert_eq!(
            dish.handle_input(Down),
            InputOutcome::Mistake {
                progress_reset: true
            }
        );
        assert_eq!(dish.progress(), 0);
    }

    #[test]
    fn test_mistake_ignored_policy() {
        let params = DishParams {
            mistake_policy: MistakePolicy::Ignore,
            ..Default::default()
        };
        let mut dish = Dish::new(DishId(1), Vec2::new(0.0, 1.5), params);
        dish.init(vec![Left, Up], Vec2::new(0.0, 1.5));
        dish.tick(0.0);
        dish.activate(true);
        dish.handle_input(Left);
        assert_eq!(
            dish.handle_input(Right),
            InputOutcome::Mistake {
                progress_reset: false
            }
        );
        assert_eq!(dish.progress(), 1);
    }

    #[test]
    fn test_move_to_deactivates() {
        let mut dish = arrived_dish(vec![Up, Up]);
        dish.activate(true);
        dish.handle_input(Up);
        dish.move_to(Vec2::new(0.0, 0.9));
        assert_eq!(dish.state(), DishState::Arriving);
        assert_eq!(dish.handle_input(Up), InputOutcome::Ignored);
        // Progress survives a reflow
        assert_eq!(dish.progress(), 1);
    }

    #[test]
    fn test_exit_waits_for_feedback_then_destroys() {
        let mut dish = arrived_dish(vec![Up]);
        dish.activate(true);
        assert_eq!(dish.handle_input(Up), InputOutcome::Completed);

        // Feedback (0.25s) still playing
        dish.tick(0.1);
        assert_eq!(dish.state(), DishState::Completing);
        dish.tick(0.2);
        assert_eq!(dish.state(), DishState::Exiting);

        let start = dish.position();
        dish.tick(0.25);
        assert!(dish.position().x > start.x);
        assert!(dish.scale() < 1.0);

        assert_eq!(dish.tick(0.3), Some(DishEvent::Destroyed(DishId(1))));
        assert_eq!(dish.state(), DishState::Destroyed);
    }

    #[test]
    fn test_init_cannot_cancel_exit() {
        let mut dish = arrived_dish(vec![Up]);
        dish.activate(true);
        assert_eq!(dish.handle_input(Up), InputOutcome::Completed);
        dish.tick(0.3);
        assert_eq!(dish.state(), DishState::Exiting);

        dish.init(vec![Up], Vec2::new(0.0, 1.5));
        assert_eq!(dish.state(), DishState::Exiting);
        assert_eq!(dish.progress(), 1);
        assert_eq!(dish.handle_input(Up), InputOutcome::Ignored);
    }

    #[test]
    fn test_move_to_ignored_while_departing() {
        let mut dish = arrived_dish(vec![Up]);
        dish.activate(true);
        dish.handle_input(Up);
        dish.move_to(Vec2::new(5.0, 5.0));
        assert_eq!(dish.state(), DishState::Completing);
        assert_eq!(dish.target(), Vec2::new(0.0, 1.5));
    }

    #[test]
    fn test_feedback_restarts_on_new_input() {
        let mut dish = arrived_dish(vec![Up, Up, Up]);
        dish.activate(true);
        dish.handle_input(Up);
        dish.tick(0.2);
        assert!(dish.feedback_progress().unwrap() > 0.5);
        dish.handle_input(Up);
        assert_eq!(dish.feedback_progress(), Some(0.0));
    }

    #[test]
    fn test_step_offsets_centered() {
        let dish = arrived_dish(vec![Up, Up, Up]);
        let offsets = dish.step_offsets();
        assert!((offsets[0].x + 0.6).abs() < 1e-5);
        assert!(offsets[1].x.abs() < 1e-5);
        assert!((offsets[2].x - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_snapshot_marks_completed_steps() {
        let mut dish = arrived_dish(vec![Left, Down]);
        dish.activate(true);
        dish.handle_input(Left);
        let snap = dish.snapshot();
        assert!(snap.steps[0].completed);
        assert!(!snap.steps[1].completed);
        assert_eq!(snap.steps[1].rotation, 180.0);
    }
}
