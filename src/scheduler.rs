//! Cooperative tick loop.
//!
//! [`Mmu`] owns every module and automaton as plain long-lived fields and
//! advances them exactly once per tick, in a fixed order, without ever
//! blocking — the same thread services the time-critical stepping ISR
//! between ticks on hardware.
//!
//! ```text
//!   tick():
//!     1. sensors        (FINDA, fsensor: sample + debounce)
//!     2. axis automata  (idler, selector, pulley)
//!     3. motion         (execute one tick of queued moves)
//!     4. command        (the active composite operation, if any)
//!     5. tick counter   (u16, wraps)
//! ```
//!
//! The tick counter wraps; only elapsed-interval comparisons through
//! [`ticks_since`](Mmu::ticks_since) are meaningful across the wrap.

use crate::config::MmuConfig;
use crate::error::Error;
use crate::globals::Globals;
use crate::logic::feed_to_finda::FeedToFinda;
use crate::logic::unload_to_finda::UnloadToFinda;
use crate::logic::{Command, LogicCtx};
use crate::motion::idler::Idler;
use crate::motion::pulley::Pulley;
use crate::motion::selector::Selector;
use crate::motion::Motion;
use crate::sensors::finda::Finda;
use crate::sensors::fsensor::FSensor;

pub struct Mmu {
    pub config: MmuConfig,
    pub globals: Globals,
    pub motion: Motion,
    pub finda: Finda,
    pub fsensor: FSensor,
    pub idler: Idler,
    pub selector: Selector,
    pub pulley: Pulley,
    pub command: Command,
    tick: u16,
}

impl Mmu {
    pub fn new(config: MmuConfig) -> Result<Self, Error> {
        config.validate()?;
        let globals = Globals::new(&config);
        let motion = Motion::new(&config);
        let finda = Finda::new(&config);
        let fsensor = FSensor::new(&config);
        Ok(Self {
            config,
            globals,
            motion,
            finda,
            fsensor,
            idler: Idler::new(),
            selector: Selector::new(),
            pulley: Pulley::new(),
            command: Command::Idle,
            tick: 0,
        })
    }

    /// Advance the whole unit by one tick.
    pub fn tick(&mut self) {
        self.finda.step();
        self.fsensor.step();
        self.idler.step(&mut self.motion, &self.globals);
        self.selector.step(&mut self.motion, &self.globals);
        self.pulley.step(&mut self.motion, &self.globals);
        self.motion.step();

        let Self {
            config,
            globals,
            motion,
            finda,
            idler,
            selector,
            pulley,
            command,
            ..
        } = self;
        command.step(&mut LogicCtx {
            motion,
            idler,
            selector,
            pulley,
            finda,
            globals,
            config,
        });

        self.tick = self.tick.wrapping_add(1);
    }

    /// Ticks elapsed since construction or the last `reinit`, modulo 2^16.
    pub fn ticks(&self) -> u16 {
        self.tick
    }

    /// Wraparound-safe elapsed interval since `start`.
    pub fn ticks_since(&self, start: u16) -> u16 {
        self.tick.wrapping_sub(start)
    }

    /// Start an unload-to-FINDA operation with `max_attempts` pull
    /// attempts, replacing any prior (terminal) command.
    pub fn begin_unload(&mut self, max_attempts: u8) {
        let mut op = UnloadToFinda::new();
        let Self {
            config,
            globals,
            motion,
            finda,
            idler,
            selector,
            pulley,
            ..
        } = self;
        op.reset(
            max_attempts,
            &mut LogicCtx {
                motion,
                idler,
                selector,
                pulley,
                finda,
                globals,
                config,
            },
        );
        self.command = Command::UnloadToFinda(op);
    }

    /// Start a feed-to-FINDA operation with `max_attempts` push attempts.
    pub fn begin_feed(&mut self, max_attempts: u8) {
        let mut op = FeedToFinda::new();
        let Self {
            config,
            globals,
            motion,
            finda,
            idler,
            selector,
            pulley,
            ..
        } = self;
        op.reset(
            max_attempts,
            &mut LogicCtx {
                motion,
                idler,
                selector,
                pulley,
                finda,
                globals,
                config,
            },
        );
        self.command = Command::FeedToFinda(op);
    }

    /// Re-arm every module to its freshly-constructed state, in place.
    /// Test and bring-up facility; normal operation never needs it.
    pub fn reinit(&mut self) {
        self.globals = Globals::new(&self.config);
        self.motion = Motion::new(&self.config);
        self.finda = Finda::new(&self.config);
        self.fsensor = FSensor::new(&self.config);
        self.idler = Idler::new();
        self.selector = Selector::new();
        self.pulley = Pulley::new();
        self.command = Command::Idle;
        self.tick = 0;
    }
}
