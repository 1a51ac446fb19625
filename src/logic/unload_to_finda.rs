//! Unload filament back from the selector throat until the FINDA releases.
//!
//! ```text
//!   reset(n) ──[FINDA released]──▶ Ok          (nothing threaded)
//!      │
//!      ▼
//!   EngagingIdler ──[idler engaged]──▶ WaitingForFinda
//!                                         │
//!                    [FINDA releases] ────┼──▶ Ok
//!                                         │
//!          [pull exhausted, n-1 left] ────┤ retry pull
//!                                         │
//!            [pull exhausted, 0 left] ────┴──▶ Failed
//! ```
//!
//! Retry policy lives here, not in the axis automata: each exhausted or
//! failed pull consumes one attempt.

use log::{info, warn};

use super::LogicCtx;
use crate::motion::movable::{Movable, OperationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnloadToFindaState {
    /// Waiting for the idler to press the active slot.
    EngagingIdler,
    /// Pulling filament, watching for the FINDA to release.
    WaitingForFinda,
    /// Terminal: filament is clear of the FINDA (or never reached it).
    Ok,
    /// Terminal: attempts exhausted or an axis failed.
    Failed,
}

pub struct UnloadToFinda {
    state: UnloadToFindaState,
    attempts: u8,
}

impl UnloadToFinda {
    pub fn new() -> Self {
        Self {
            state: UnloadToFindaState::Ok,
            attempts: 0,
        }
    }

    /// (Re)start the operation with a bounded number of pull attempts.
    ///
    /// The sensor is consulted before any motion: a released FINDA means
    /// nothing is threaded and the operation resolves to `Ok` immediately,
    /// without issuing a single axis command.
    pub fn reset(&mut self, max_attempts: u8, ctx: &mut LogicCtx<'_>) {
        if !ctx.finda.pressed() {
            ctx.globals.set_filament_loaded(false);
            self.state = UnloadToFindaState::Ok;
            info!("unload: FINDA already clear, nothing to do");
            return;
        }

        self.attempts = max_attempts.max(1);
        let slot = ctx.globals.active_slot();
        let idler = ctx.idler.engage(ctx.motion, ctx.config, slot);
        let selector = ctx.selector.move_to_slot(ctx.motion, ctx.config, slot);
        if idler == OperationResult::Failed || selector == OperationResult::Failed {
            warn!("unload: axis refused engage command");
            self.state = UnloadToFindaState::Failed;
            return;
        }
        info!("unload: engaging idler on slot {slot}");
        self.state = UnloadToFindaState::EngagingIdler;
    }

    /// Advance by one tick.
    pub fn step(&mut self, ctx: &mut LogicCtx<'_>) {
        match self.state {
            UnloadToFindaState::EngagingIdler => {
                if ctx.idler.state().is_failed() || ctx.selector.state().is_failed() {
                    warn!("unload: engage failed");
                    self.state = UnloadToFindaState::Failed;
                } else if ctx.idler.engaged() {
                    self.issue_pull(ctx);
                }
            }
            UnloadToFindaState::WaitingForFinda => {
                if !ctx.finda.pressed() {
                    ctx.globals.set_filament_loaded(false);
                    info!("unload: FINDA released");
                    self.state = UnloadToFindaState::Ok;
                } else if ctx.pulley.state().is_terminal() {
                    // Pull finished (or the pulley failed) with filament
                    // still at the sensor — burn one attempt.
                    self.attempts -= 1;
                    if self.attempts > 0 {
                        info!("unload: retrying pull, {} attempts left", self.attempts);
                        self.issue_pull(ctx);
                    } else {
                        warn!("unload: attempts exhausted, filament still at FINDA");
                        self.state = UnloadToFindaState::Failed;
                    }
                }
            }
            UnloadToFindaState::Ok | UnloadToFindaState::Failed => {}
        }
    }

    pub fn state(&self) -> UnloadToFindaState {
        self.state
    }

    /// Attempts remaining for the current run; 0 once exhausted.
    pub fn attempts_left(&self) -> u8 {
        self.attempts
    }

    fn issue_pull(&mut self, ctx: &mut LogicCtx<'_>) {
        let pulled = ctx.pulley.plan_feed(
            ctx.motion,
            ctx.config,
            -ctx.config.unload_to_finda_steps,
        );
        if pulled == OperationResult::Failed {
            warn!("unload: pulley refused pull command");
            self.state = UnloadToFindaState::Failed;
            return;
        }
        self.state = UnloadToFindaState::WaitingForFinda;
    }
}
