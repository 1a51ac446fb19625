//! Composite filament operations.
//!
//! A composite operation automaton sequences the axis automata and sensor
//! state into one user-visible filament action (unload to FINDA, feed to
//! FINDA). It never touches axis hardware directly — only the axis
//! automata — so each axis keeps a single ownership chain.
//!
//! At most one composite operation runs at a time. The active one is a
//! [`Command`] variant stepped once per tick by the scheduler; `Idle`
//! means no operation in flight.

pub mod feed_to_finda;
pub mod unload_to_finda;

use feed_to_finda::FeedToFinda;
use unload_to_finda::UnloadToFinda;

use crate::config::MmuConfig;
use crate::globals::Globals;
use crate::motion::idler::Idler;
use crate::motion::pulley::Pulley;
use crate::motion::selector::Selector;
use crate::motion::Motion;
use crate::sensors::finda::Finda;

/// Everything a composite operation may see and drive during one tick.
/// Disjoint borrows of the scheduler's fields; operations go through the
/// axis automata, never through `motion` directly.
pub struct LogicCtx<'a> {
    pub motion: &'a mut Motion,
    pub idler: &'a mut Idler,
    pub selector: &'a mut Selector,
    pub pulley: &'a mut Pulley,
    pub finda: &'a Finda,
    pub globals: &'a mut Globals,
    pub config: &'a MmuConfig,
}

/// The active top-level operation.
pub enum Command {
    /// No operation in flight.
    Idle,
    UnloadToFinda(UnloadToFinda),
    FeedToFinda(FeedToFinda),
}

impl Command {
    /// Advance the active operation by one tick.
    pub fn step(&mut self, ctx: &mut LogicCtx<'_>) {
        match self {
            Self::Idle => {}
            Self::UnloadToFinda(op) => op.step(ctx),
            Self::FeedToFinda(op) => op.step(ctx),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
