//! Unit-wide runtime state.
//!
//! The mutable counterpart of [`MmuConfig`](crate::config::MmuConfig):
//! which slot is active, whether filament is currently loaded, and the
//! motor noise preference. Read by automata when planning moves, written
//! by composite operations as filament changes hands.

use log::debug;

use crate::config::MmuConfig;

pub struct Globals {
    filament_loaded: bool,
    active_slot: u8,
    motors_stealth: bool,
}

impl Globals {
    pub fn new(config: &MmuConfig) -> Self {
        Self {
            filament_loaded: false,
            active_slot: 0,
            motors_stealth: config.motors_stealth,
        }
    }

    /// True if filament is threaded at least up to the FINDA.
    pub fn filament_loaded(&self) -> bool {
        self.filament_loaded
    }

    pub fn set_filament_loaded(&mut self, loaded: bool) {
        if self.filament_loaded != loaded {
            debug!("globals: filament_loaded -> {loaded}");
        }
        self.filament_loaded = loaded;
    }

    /// The filament channel operations act on.
    pub fn active_slot(&self) -> u8 {
        self.active_slot
    }

    pub fn set_active_slot(&mut self, slot: u8) {
        self.active_slot = slot;
    }

    /// Low-noise (Stealth) mode preference applied after homing and moves.
    pub fn motors_stealth(&self) -> bool {
        self.motors_stealth
    }

    pub fn set_motors_stealth(&mut self, stealth: bool) {
        self.motors_stealth = stealth;
    }
}
