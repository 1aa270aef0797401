//! The dish stack: spawn, removal, reflow and the bottom-dish rules
//!
//! `dishes` is kept in slot order (index == slot, 0 = bottom). Washed dishes
//! leave it immediately and finish their exit animation in `departing`.

use super::dish::{Dish, DishEvent, DishId, DishParams, DishState, InputOutcome};
use super::sequence::{Direction, SequenceGenerator};
use crate::consts::VISIBLE_SLOTS;
use crate::tuning::Tuning;

/// What a spawn did to the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnReport {
    pub id: DishId,
    pub slot: usize,
    pub stack_size: usize,
    /// Stack is now larger than the loss threshold
    pub overflowed: bool,
}

/// Ordered collection of dishes
#[derive(Debug, Clone)]
pub struct DishStack {
    dishes: Vec<Dish>,
    departing: Vec<Dish>,
    generator: SequenceGenerator,
    tuning: Tuning,
    params: DishParams,
    next_id: u32,
    spawned_total: u64,
}

impl DishStack {
    pub fn new(tuning: &Tuning, generator: SequenceGenerator) -> Self {
        let tuning = tuning.clone().sanitized();
        Self {
            dishes: Vec::new(),
            departing: Vec::new(),
            generator,
            params: DishParams::from(&tuning),
            tuning,
            next_id: 1,
            spawned_total: 0,
        }
    }

    /// Drop a new dish on top of the stack
    pub fn spawn(&mut self, sequence_length: u32) -> SpawnReport {
        let id = DishId(self.next_id);
        self.next_id += 1;

        let slot = self.dishes.len();
        let mut dish = Dish::new(id, self.tuning.spawn_position(), self.params);
        dish.init(
            self.generator.generate(sequence_length),
            self.tuning.slot_position(slot),
        );
        dish.slot = slot;
        self.dishes.push(dish);
        self.spawned_total += 1;

        self.update_visibility();
        self.activate_bottom();

        let stack_size = self.dishes.len();
        log::debug!(
            "Spawned dish {:?} at slot {} ({} / {})",
            id,
            slot,
            stack_size,
            self.tuning.max_dishes_to_lose
        );

        SpawnReport {
            id,
            slot,
            stack_size,
            overflowed: stack_size > self.tuning.max_dishes_to_lose,
        }
    }

    /// Take a finished dish out of the stack and close the gap.
    /// Unknown or already-removed ids are ignored (returns false).
    pub fn on_dish_completed(&mut self, id: DishId) -> bool {
        let Some(index) = self.dishes.iter().position(|d| d.id() == id) else {
            return false;
        };

        let mut dish = self.dishes.remove(index);
        dish.begin_completing();
        self.departing.push(dish);

        self.reflow();
        self.update_visibility();
        self.activate_bottom();

        log::debug!("Dish {:?} washed from slot {}, {} left", id, index, self.dishes.len());
        true
    }

    /// Reassign slots 0..n-1 in order and send moved dishes to their new spot
    fn reflow(&mut self) {
        for (slot, dish) in self.dishes.iter_mut().enumerate() {
            if dish.slot != slot {
                dish.slot = slot;
                dish.move_to(self.tuning.slot_position(slot));
            }
        }
    }

    /// Only the bottom dish may take input
    pub fn activate_bottom(&mut self) {
        for dish in self.dishes.iter_mut().skip(1) {
            dish.activate(false);
        }
        if let Some(bottom) = self.dishes.first_mut() {
            bottom.activate(true);
        }
    }

    pub fn deactivate_all(&mut self) {
        for dish in &mut self.dishes {
            dish.activate(false);
        }
    }

    /// Bottom-two rule
    pub fn update_visibility(&mut self) {
        for dish in &mut self.dishes {
            dish.visible = dish.slot < VISIBLE_SLOTS;
        }
    }

    /// Advance every dish, then react to what they reported
    pub fn update(&mut self, dt: f32) -> Vec<DishEvent> {
        let mut events: Vec<DishEvent> = self
            .dishes
            .iter_mut()
            .chain(self.departing.iter_mut())
            .filter_map(|dish| dish.tick(dt))
            .collect();
        events.sort_by_key(|e| match *e {
            DishEvent::Arrived(id) | DishEvent::Destroyed(id) => id,
        });

        if events.iter().any(|e| matches!(e, DishEvent::Arrived(_))) {
            self.update_visibility();
            self.activate_bottom();
        }
        if events.iter().any(|e| matches!(e, DishEvent::Destroyed(_))) {
            self.departing.retain(|d| d.state() != DishState::Destroyed);
        }

        events
    }

    /// Route one direction to the active dish.
    /// Returns the dish that received it, if any.
    pub fn handle_input(&mut self, dir: Direction) -> Option<(DishId, InputOutcome)> {
        let bottom = self.dishes.first_mut().filter(|d| d.is_active())?;
        let id = bottom.id();
        let outcome = bottom.handle_input(dir);
        if outcome == InputOutcome::Completed {
            self.on_dish_completed(id);
        }
        Some((id, outcome))
    }

    pub fn len(&self) -> usize {
        self.dishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dishes.is_empty()
    }

    /// Stacked dishes, bottom first
    pub fn dishes(&self) -> &[Dish] {
        &self.dishes
    }

    /// Washed dishes still animating out
    pub fn departing(&self) -> &[Dish] {
        &self.departing
    }

    pub fn get(&self, id: DishId) -> Option<&Dish> {
        self.dishes
            .iter()
            .chain(self.departing.iter())
            .find(|d| d.id() == id)
    }

    pub fn active_id(&self) -> Option<DishId> {
        self.dishes.iter().find(|d| d.is_active()).map(|d| d.id())
    }

    pub fn max_dishes_to_lose(&self) -> usize {
        self.tuning.max_dishes_to_lose
    }

    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }
}
