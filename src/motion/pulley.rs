//! Pulley axis automaton.
//!
//! The pulley feeds filament forward (positive) or pulls it back
//! (negative). The filament axis has no end-stop and is never homed;
//! requests are relative feed lengths planned through the shared movement
//! machinery so driver faults and queue completion resolve the same way
//! as on the positioned axes.

use super::movable::{Movable, MovableState, OperationResult};
use super::{Axis, Motion};
use crate::config::MmuConfig;
use crate::error::MotionError;
use crate::globals::Globals;

pub struct Pulley {
    state: MovableState,
    planned_steps: i32,
}

impl Pulley {
    pub fn new() -> Self {
        Self {
            state: MovableState::Ready,
            planned_steps: 0,
        }
    }

    /// Request a relative feed; negative pulls filament back toward the
    /// unit. Resolves over subsequent ticks.
    pub fn plan_feed(
        &mut self,
        motion: &mut Motion,
        config: &MmuConfig,
        steps: i32,
    ) -> OperationResult {
        self.planned_steps = steps;
        self.init_movement(motion, config)
    }

    /// Release the pulley so filament can be pulled by hand or by the
    /// printer's extruder.
    pub fn release(&self, motion: &mut Motion) {
        motion.disable_axis(Axis::Pulley);
    }

    /// Advance by one tick.
    pub fn step(&mut self, motion: &mut Motion, _globals: &Globals) {
        match self.state {
            MovableState::Moving => self.perform_move(motion),
            // The pulley has no end-stop; a homing request would never
            // find one and is not part of its surface.
            MovableState::Homing | MovableState::Ready | MovableState::Failed(_) => {}
        }
    }
}

impl Movable for Pulley {
    const AXIS: Axis = Axis::Pulley;

    fn state(&self) -> MovableState {
        self.state
    }

    fn set_state(&mut self, state: MovableState) {
        self.state = state;
    }

    fn plan_homing_move(
        &mut self,
        _motion: &mut Motion,
        _config: &MmuConfig,
    ) -> Result<(), MotionError> {
        // Unreachable by construction; planning nothing fails the request
        // on the next tick if it is ever issued.
        Ok(())
    }

    fn prepare_move_to_planned_slot(
        &mut self,
        motion: &mut Motion,
        config: &MmuConfig,
    ) -> Result<(), MotionError> {
        motion.plan_move(Self::AXIS, self.planned_steps, config.pulley_feedrate)
    }
}
