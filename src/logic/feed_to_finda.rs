//! Feed filament forward from its slot until the FINDA presses.
//!
//! The loading counterpart of unload-to-FINDA: engage the idler on the
//! active slot, align the selector, then push filament and watch for the
//! sensor to trigger. A push that runs out of planned length before the
//! FINDA presses means the filament tip snagged or slipped; the push is
//! re-issued until attempts run out.

use log::{info, warn};

use super::LogicCtx;
use crate::motion::movable::{Movable, OperationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedToFindaState {
    /// Waiting for the idler to press the active slot.
    EngagingIdler,
    /// Pushing filament, watching for the FINDA to press.
    PushingFilament,
    /// Terminal: filament reached the FINDA.
    Ok,
    /// Terminal: attempts exhausted or an axis failed.
    Failed,
}

pub struct FeedToFinda {
    state: FeedToFindaState,
    attempts: u8,
}

impl FeedToFinda {
    pub fn new() -> Self {
        Self {
            state: FeedToFindaState::Ok,
            attempts: 0,
        }
    }

    /// (Re)start the operation with a bounded number of push attempts. A
    /// FINDA already pressed means filament is already at the sensor and
    /// the operation resolves to `Ok` without issuing any axis command.
    pub fn reset(&mut self, max_attempts: u8, ctx: &mut LogicCtx<'_>) {
        if ctx.finda.pressed() {
            ctx.globals.set_filament_loaded(true);
            self.state = FeedToFindaState::Ok;
            info!("feed: FINDA already pressed, nothing to do");
            return;
        }

        self.attempts = max_attempts.max(1);
        let slot = ctx.globals.active_slot();
        let idler = ctx.idler.engage(ctx.motion, ctx.config, slot);
        let selector = ctx.selector.move_to_slot(ctx.motion, ctx.config, slot);
        if idler == OperationResult::Failed || selector == OperationResult::Failed {
            warn!("feed: axis refused engage command");
            self.state = FeedToFindaState::Failed;
            return;
        }
        info!("feed: engaging idler on slot {slot}");
        self.state = FeedToFindaState::EngagingIdler;
    }

    /// Advance by one tick.
    pub fn step(&mut self, ctx: &mut LogicCtx<'_>) {
        match self.state {
            FeedToFindaState::EngagingIdler => {
                if ctx.idler.state().is_failed() || ctx.selector.state().is_failed() {
                    warn!("feed: engage failed");
                    self.state = FeedToFindaState::Failed;
                } else if ctx.idler.engaged() {
                    self.issue_push(ctx);
                }
            }
            FeedToFindaState::PushingFilament => {
                if ctx.finda.pressed() {
                    ctx.globals.set_filament_loaded(true);
                    info!("feed: FINDA pressed, filament loaded");
                    self.state = FeedToFindaState::Ok;
                } else if ctx.pulley.state().is_terminal() {
                    self.attempts -= 1;
                    if self.attempts > 0 {
                        info!("feed: retrying push, {} attempts left", self.attempts);
                        self.issue_push(ctx);
                    } else {
                        warn!("feed: attempts exhausted, FINDA never pressed");
                        self.state = FeedToFindaState::Failed;
                    }
                }
            }
            FeedToFindaState::Ok | FeedToFindaState::Failed => {}
        }
    }

    pub fn state(&self) -> FeedToFindaState {
        self.state
    }

    /// Attempts remaining for the current run; 0 once exhausted.
    pub fn attempts_left(&self) -> u8 {
        self.attempts
    }

    fn issue_push(&mut self, ctx: &mut LogicCtx<'_>) {
        let pushed =
            ctx.pulley
                .plan_feed(ctx.motion, ctx.config, ctx.config.feed_to_finda_steps);
        if pushed == OperationResult::Failed {
            warn!("feed: pulley refused push command");
            self.state = FeedToFindaState::Failed;
            return;
        }
        self.state = FeedToFindaState::PushingFilament;
    }
}
