//! Unified error types for the MMU control core.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level control loop's error handling uniform. All variants are `Copy`
//! so they can be cheaply passed through automata without allocation.
//!
//! Driver faults are deliberately *not* part of `Error`: a stepper-driver
//! fault is a state observation, latched into the owning automaton's
//! `Failed` state as a [`DriverErrorFlags`] snapshot, never raised as a
//! control-flow error.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the core funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A motion-subsystem command could not be accepted.
    Motion(MotionError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Motion(e) => write!(f, "motion: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Motion errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionError {
    /// The per-axis move queue is at capacity.
    QueueFull,
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => write!(f, "move queue full"),
        }
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Self::Motion(e)
    }
}

// ---------------------------------------------------------------------------
// Stepper driver faults
// ---------------------------------------------------------------------------

/// Individual fault bits reported by a TMC-class stepper driver.
///
/// Accumulated into a [`DriverErrorFlags`] bitfield so that multiple
/// simultaneous faults can be latched and inspected together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DriverFault {
    /// Over-temperature pre-warning threshold exceeded.
    OverTemperatureWarning = 0b0000_0001,
    /// Over-temperature shutdown.
    OverTemperature = 0b0000_0010,
    /// Short to ground on coil A.
    ShortToGroundA = 0b0000_0100,
    /// Short to ground on coil B.
    ShortToGroundB = 0b0000_1000,
    /// Open load on coil A.
    OpenLoadA = 0b0001_0000,
    /// Open load on coil B.
    OpenLoadB = 0b0010_0000,
    /// Charge pump undervoltage — driver cannot energise coils.
    ChargePumpUndervoltage = 0b0100_0000,
}

impl DriverFault {
    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for DriverFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverTemperatureWarning => write!(f, "over-temperature warning"),
            Self::OverTemperature => write!(f, "over-temperature shutdown"),
            Self::ShortToGroundA => write!(f, "short to ground (coil A)"),
            Self::ShortToGroundB => write!(f, "short to ground (coil B)"),
            Self::OpenLoadA => write!(f, "open load (coil A)"),
            Self::OpenLoadB => write!(f, "open load (coil B)"),
            Self::ChargePumpUndervoltage => write!(f, "charge pump undervoltage"),
        }
    }
}

/// Snapshot of a driver's fault bits.
///
/// `good()` is true when no fault bit is set. A snapshot taken at the moment
/// an automaton fails is embedded in its `Failed` state so the cause
/// survives later driver-state changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverErrorFlags(u8);

impl DriverErrorFlags {
    /// No fault bits set.
    pub const NONE: Self = Self(0);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True when no fault bit is set.
    pub const fn good(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, fault: DriverFault) -> bool {
        self.0 & fault.mask() != 0
    }

    #[must_use]
    pub const fn with(self, fault: DriverFault) -> Self {
        Self(self.0 | fault.mask())
    }
}

impl fmt::Display for DriverErrorFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0b{:08b}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Core-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_flags_are_good() {
        assert!(DriverErrorFlags::NONE.good());
        assert!(DriverErrorFlags::default().good());
    }

    #[test]
    fn fault_bits_accumulate() {
        let flags = DriverErrorFlags::NONE
            .with(DriverFault::OverTemperature)
            .with(DriverFault::ShortToGroundA);
        assert!(!flags.good());
        assert!(flags.contains(DriverFault::OverTemperature));
        assert!(flags.contains(DriverFault::ShortToGroundA));
        assert!(!flags.contains(DriverFault::OpenLoadB));
    }

    #[test]
    fn fault_masks_are_distinct() {
        let all = [
            DriverFault::OverTemperatureWarning,
            DriverFault::OverTemperature,
            DriverFault::ShortToGroundA,
            DriverFault::ShortToGroundB,
            DriverFault::OpenLoadA,
            DriverFault::OpenLoadB,
            DriverFault::ChargePumpUndervoltage,
        ];
        let mut acc = 0u8;
        for fault in all {
            assert_eq!(acc & fault.mask(), 0, "overlapping mask: {fault}");
            acc |= fault.mask();
        }
    }
}
