//! Selector axis automaton.
//!
//! The selector carriage aligns the filament path with one slot (or the
//! park position past the last slot, used for service moves).

use super::movable::{Movable, MovableState, OperationResult, HOMING_RESERVE_STEPS};
use super::{Axis, Motion};
use crate::config::MmuConfig;
use crate::error::MotionError;
use crate::globals::Globals;

pub struct Selector {
    state: MovableState,
    planned_slot: u8,
    current_slot: u8,
}

impl Selector {
    pub fn new() -> Self {
        Self {
            state: MovableState::Ready,
            planned_slot: 0,
            current_slot: 0,
        }
    }

    /// Request alignment with `slot`; `slot == slot_count` parks the
    /// carriage. Resolves over subsequent ticks.
    pub fn move_to_slot(
        &mut self,
        motion: &mut Motion,
        config: &MmuConfig,
        slot: u8,
    ) -> OperationResult {
        self.planned_slot = slot;
        self.init_movement(motion, config)
    }

    pub fn plan_home_axis(&mut self, motion: &mut Motion, config: &MmuConfig) {
        self.plan_home(motion, config);
    }

    /// Slot the carriage last reached.
    pub fn slot(&self) -> u8 {
        self.current_slot
    }

    /// Advance by one tick.
    pub fn step(&mut self, motion: &mut Motion, globals: &Globals) {
        match self.state {
            MovableState::Moving => {
                self.perform_move(motion);
                if self.state == MovableState::Ready {
                    self.current_slot = self.planned_slot;
                }
            }
            MovableState::Homing => {
                self.perform_home(motion, globals);
                if self.state == MovableState::Ready {
                    self.current_slot = 0;
                }
            }
            MovableState::Ready | MovableState::Failed(_) => {}
        }
    }
}

impl Movable for Selector {
    const AXIS: Axis = Axis::Selector;

    fn state(&self) -> MovableState {
        self.state
    }

    fn set_state(&mut self, state: MovableState) {
        self.state = state;
    }

    fn plan_homing_move(
        &mut self,
        motion: &mut Motion,
        config: &MmuConfig,
    ) -> Result<(), MotionError> {
        motion.plan_move(
            Self::AXIS,
            -(config.selector_range + HOMING_RESERVE_STEPS),
            config.selector_feedrate,
        )
    }

    fn prepare_move_to_planned_slot(
        &mut self,
        motion: &mut Motion,
        config: &MmuConfig,
    ) -> Result<(), MotionError> {
        motion.plan_move_to(
            Self::AXIS,
            config.selector_slot_position(self.planned_slot),
            config.selector_feedrate,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Motion, MmuConfig, Globals) {
        let config = MmuConfig::default();
        let motion = Motion::new(&config);
        let globals = Globals::new(&config);
        (motion, config, globals)
    }

    fn settle(sel: &mut Selector, motion: &mut Motion, globals: &Globals) {
        for _ in 0..10_000 {
            if sel.state().is_terminal() {
                return;
            }
            motion.step();
            sel.step(motion, globals);
        }
        panic!("selector never settled");
    }

    #[test]
    fn move_to_slot_targets_mapped_position() {
        let (mut motion, config, globals) = fixture();
        let mut sel = Selector::new();
        assert_eq!(
            sel.move_to_slot(&mut motion, &config, 4),
            OperationResult::Accepted
        );
        assert_eq!(
            motion.target_pos(Axis::Selector),
            config.selector_slot_position(4)
        );
        settle(&mut sel, &mut motion, &globals);
        assert_eq!(sel.slot(), 4);
    }

    #[test]
    fn park_request_uses_park_position() {
        let (mut motion, config, globals) = fixture();
        let mut sel = Selector::new();
        sel.move_to_slot(&mut motion, &config, config.slot_count);
        settle(&mut sel, &mut motion, &globals);
        assert_eq!(
            motion.position(Axis::Selector),
            config.selector_park_position
        );
    }

    #[test]
    fn homing_resolves_at_end_stop() {
        let (mut motion, config, globals) = fixture();
        let mut sel = Selector::new();
        sel.move_to_slot(&mut motion, &config, 2);
        settle(&mut sel, &mut motion, &globals);

        sel.plan_home_axis(&mut motion, &config);
        settle(&mut sel, &mut motion, &globals);
        assert_eq!(sel.state(), MovableState::Ready);
        assert_eq!(motion.position(Axis::Selector), 0);
        assert_eq!(sel.slot(), 0);
    }
}
