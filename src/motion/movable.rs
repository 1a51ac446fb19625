//! Generic per-axis movement/homing automaton.
//!
//! Every axis automaton (idler, selector, pulley) implements [`Movable`]:
//! two planning hooks plus state accessors, in exchange for the shared
//! request machinery — "home this axis" and "move to the planned target" —
//! each resolving to a terminal `Ready`/`Failed` outcome over subsequent
//! ticks.
//!
//! ```text
//!   plan_home ──▶ Homing ──[stall guard]──▶ Ready
//!                   │
//!                   └──[queue drained, no stall]──▶ Failed
//!
//!   init_movement ─┬─▶ Moving ──[queue drained]──▶ Ready
//!                  │     │
//!                  │     └──[driver fault]──▶ Failed(flags)
//!                  └──[init refused]──▶ Failed   (synchronous)
//! ```
//!
//! State changes only inside `plan_home` / `init_movement` /
//! `perform_move` / `perform_home`, each called at most once per tick per
//! automaton. Failure is never retried here; retry policy belongs to the
//! composite operation driving the automaton.

use log::{info, warn};

use super::{Axis, Mode, Motion};
use crate::config::MmuConfig;
use crate::error::{DriverErrorFlags, MotionError};
use crate::globals::Globals;

/// Extra steps planned past the nominal travel so homing reaches the
/// end-stop from any starting position, missed steps included.
pub(crate) const HOMING_RESERVE_STEPS: i32 = 64;

/// Automaton state for the current request. `Ready` and `Failed` are
/// terminal until a new request re-enters `Homing` or `Moving`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovableState {
    Homing,
    Moving,
    Ready,
    /// The snapshot taken when the failure was discovered; `NONE` for
    /// synchronous init failures and homing-not-found.
    Failed(DriverErrorFlags),
}

impl MovableState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed(_))
    }

    pub const fn is_failed(self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The latched driver snapshot, if this is a failure state.
    pub const fn failure_flags(self) -> Option<DriverErrorFlags> {
        match self {
            Self::Failed(flags) => Some(flags),
            _ => None,
        }
    }
}

/// Synchronous outcome of a movement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    Accepted,
    Failed,
}

pub trait Movable {
    const AXIS: Axis;

    fn state(&self) -> MovableState;
    fn set_state(&mut self, state: MovableState);

    /// Enqueue the homing move: a traversal long enough to cross the full
    /// axis travel.
    fn plan_homing_move(&mut self, motion: &mut Motion, config: &MmuConfig)
        -> Result<(), MotionError>;

    /// Enqueue the move toward the previously planned slot target.
    fn prepare_move_to_planned_slot(
        &mut self,
        motion: &mut Motion,
        config: &MmuConfig,
    ) -> Result<(), MotionError>;

    /// Start a homing request. Homing always runs in Normal mode — Stealth
    /// trades away the torque the stall detector needs. Failure surfaces on
    /// a later tick via [`perform_home`](Movable::perform_home).
    fn plan_home(&mut self, motion: &mut Motion, config: &MmuConfig) {
        self.set_state(MovableState::Homing);
        let _ = motion.init_axis(Self::AXIS);
        motion.set_mode(Self::AXIS, Mode::Normal);
        motion.stall_guard_reset(Self::AXIS);
        if let Err(e) = self.plan_homing_move(motion, config) {
            // Leave state = Homing; the empty queue fails it next tick.
            warn!("{}: homing move rejected: {e}", Self::AXIS.name());
        }
        info!("{}: homing", Self::AXIS.name());
    }

    /// Start a planned-move request. The only synchronous failure path in
    /// the automaton: a refused axis init fails the request immediately.
    fn init_movement(&mut self, motion: &mut Motion, config: &MmuConfig) -> OperationResult {
        if motion.init_axis(Self::AXIS) {
            if let Err(e) = self.prepare_move_to_planned_slot(motion, config) {
                warn!("{}: move rejected: {e}", Self::AXIS.name());
                self.set_state(MovableState::Failed(DriverErrorFlags::NONE));
                return OperationResult::Failed;
            }
            self.set_state(MovableState::Moving);
            OperationResult::Accepted
        } else {
            self.set_state(MovableState::Failed(DriverErrorFlags::NONE));
            OperationResult::Failed
        }
    }

    /// Advance a `Moving` request by one tick. The fault check runs before
    /// the queue check: a faulted driver with an empty queue stopped
    /// abnormally, it did not reach the target.
    fn perform_move(&mut self, motion: &mut Motion) {
        let flags = motion.driver_for(Self::AXIS).error_flags();
        if !flags.good() {
            warn!("{}: driver fault {flags}", Self::AXIS.name());
            self.set_state(MovableState::Failed(flags));
        } else if motion.queue_empty(Self::AXIS) {
            self.set_state(MovableState::Ready);
        }
    }

    /// Advance a `Homing` request by one tick. The configured operating
    /// mode is restored on both outcomes — homing forced Normal mode and
    /// must not leave the axis that way.
    fn perform_home(&mut self, motion: &mut Motion, globals: &Globals) {
        let configured = if globals.motors_stealth() {
            Mode::Stealth
        } else {
            Mode::Normal
        };
        if motion.stall_guard(Self::AXIS) {
            motion.set_mode(Self::AXIS, configured);
            info!("{}: homed", Self::AXIS.name());
            self.set_state(MovableState::Ready);
        } else if motion.queue_empty(Self::AXIS) {
            // Ran out of planned travel without a stall event.
            motion.set_mode(Self::AXIS, configured);
            warn!("{}: homing found no end-stop", Self::AXIS.name());
            self.set_state(MovableState::Failed(DriverErrorFlags::NONE));
        }
    }
}
