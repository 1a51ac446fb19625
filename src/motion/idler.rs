//! Idler axis automaton.
//!
//! The idler is a rotating cam that presses the drive pulley against the
//! filament of exactly one slot at a time. Logic never touches the axis
//! hardware directly; it asks the idler to engage a slot, disengage to the
//! park position, or home, and polls the outcome.

use log::info;

use super::movable::{Movable, MovableState, OperationResult, HOMING_RESERVE_STEPS};
use super::{Axis, Motion};
use crate::config::MmuConfig;
use crate::error::MotionError;
use crate::globals::Globals;

pub struct Idler {
    state: MovableState,
    planned_slot: u8,
    planned_engage: bool,
    current_slot: u8,
    current_engage: bool,
}

impl Idler {
    pub fn new() -> Self {
        Self {
            state: MovableState::Ready,
            planned_slot: 0,
            planned_engage: false,
            current_slot: 0,
            current_engage: false,
        }
    }

    /// Request engagement with `slot`. Resolves over subsequent ticks.
    pub fn engage(&mut self, motion: &mut Motion, config: &MmuConfig, slot: u8) -> OperationResult {
        self.planned_slot = slot;
        self.planned_engage = true;
        self.init_movement(motion, config)
    }

    /// Request the park (disengaged) position.
    pub fn disengage(&mut self, motion: &mut Motion, config: &MmuConfig) -> OperationResult {
        self.planned_engage = false;
        self.init_movement(motion, config)
    }

    pub fn plan_home_axis(&mut self, motion: &mut Motion, config: &MmuConfig) {
        self.plan_home(motion, config);
    }

    /// True when the idler physically presses the planned slot — a
    /// committed position, not merely a `Ready` request state.
    pub fn engaged(&self) -> bool {
        self.current_engage
    }

    /// Slot the idler currently presses (meaningful while `engaged()`).
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
                    self.current_engage = self.planned_engage;
                    if self.current_engage {
                        info!("idler: engaged slot {}", self.current_slot);
                    }
                }
            }
            MovableState::Homing => {
                self.perform_home(motion, globals);
                if self.state == MovableState::Ready {
                    // End-stop position: cam clear of every slot.
                    self.current_engage = false;
                    self.current_slot = 0;
                }
            }
            MovableState::Ready | MovableState::Failed(_) => {}
        }
    }
}

impl Movable for Idler {
    const AXIS: Axis = Axis::Idler;

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
            -(config.idler_range + HOMING_RESERVE_STEPS),
            config.idler_feedrate,
        )
    }

    fn prepare_move_to_planned_slot(
        &mut self,
        motion: &mut Motion,
        config: &MmuConfig,
    ) -> Result<(), MotionError> {
        let target = if self.planned_engage {
            config.idler_slot_position(self.planned_slot)
        } else {
            config.idler_park_position
        };
        motion.plan_move_to(Self::AXIS, target, config.idler_feedrate)
    }
}
