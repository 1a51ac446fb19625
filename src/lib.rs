//! MMU control core.
//!
//! Hardware-independent control logic for a multi-material filament-handling
//! unit: per-axis movement/homing automata layered on a queued-move motion
//! subsystem, debounced presence sensors, and composite filament operations
//! (unload/load to the FINDA sensor) advanced by a cooperative tick loop.
//!
//! Everything here runs on the host; board bring-up and the real-time
//! stepping ISR live in the board support crate.

#![deny(unused_must_use)]

pub mod config;
pub mod globals;
pub mod hal;
pub mod logic;
pub mod motion;
pub mod scheduler;
pub mod sensors;

mod error;

pub use error::{DriverErrorFlags, DriverFault, Error, MotionError};
