//! System configuration parameters
//!
//! All tunable parameters for the MMU control core: axis geometry, move
//! feedrates, sensor thresholds and debounce windows. Values can be
//! overridden by the host printer during handshake or persisted by the
//! board support layer.
//!
//! Distances are in motor steps; feedrates are in steps per control tick.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MmuConfig {
    /// Number of filament slots (channels) on the unit.
    pub slot_count: u8,

    // --- Idler axis ---
    /// Full idler travel; the end-stop sits at position 0.
    pub idler_range: i32,
    /// Engaged position for slot 0.
    pub idler_slot0: i32,
    /// Step distance between adjacent engaged positions.
    pub idler_slot_step: i32,
    /// Parked (disengaged) position.
    pub idler_park_position: i32,
    /// Idler feedrate (steps per tick).
    pub idler_feedrate: u32,

    // --- Selector axis ---
    /// Full selector travel; the end-stop sits at position 0.
    pub selector_range: i32,
    /// Position aligned with slot 0.
    pub selector_slot0: i32,
    /// Step distance between adjacent slot positions.
    pub selector_slot_step: i32,
    /// Service/park position past the last slot.
    pub selector_park_position: i32,
    /// Selector feedrate (steps per tick).
    pub selector_feedrate: u32,

    // --- Pulley axis ---
    /// Pulley feedrate (steps per tick).
    pub pulley_feedrate: u32,
    /// Pull length for one unload-to-FINDA attempt.
    pub unload_to_finda_steps: i32,
    /// Push length for one feed-to-FINDA attempt.
    pub feed_to_finda_steps: i32,

    // --- Sensors ---
    /// Raw ADC level above which the FINDA counts as pressed (0-1023).
    pub finda_threshold: u16,
    /// Consecutive consistent samples before the FINDA output flips.
    pub finda_debounce_ticks: u16,
    /// Raw ADC level above which the filament sensor counts as pressed.
    pub fsensor_threshold: u16,
    /// Consecutive consistent samples before the fsensor output flips.
    pub fsensor_debounce_ticks: u16,

    // --- Motors ---
    /// Run axes in low-noise (Stealth) mode outside of homing.
    pub motors_stealth: bool,
}

impl Default for MmuConfig {
    fn default() -> Self {
        Self {
            slot_count: 5,

            // Idler
            idler_range: 1600,
            idler_slot0: 100,
            idler_slot_step: 290,
            idler_park_position: 1500,
            idler_feedrate: 8,

            // Selector
            selector_range: 3000,
            selector_slot0: 75,
            selector_slot_step: 570,
            selector_park_position: 2930,
            selector_feedrate: 10,

            // Pulley
            pulley_feedrate: 10,
            unload_to_finda_steps: 2000,
            feed_to_finda_steps: 1500,

            // Sensors
            finda_threshold: 512,
            finda_debounce_ticks: 10,
            fsensor_threshold: 512,
            fsensor_debounce_ticks: 10,

            // Motors
            motors_stealth: false,
        }
    }
}

impl MmuConfig {
    /// Idler engaged position for the given slot. Pure slot-to-position map.
    pub fn idler_slot_position(&self, slot: u8) -> i32 {
        self.idler_slot0 + i32::from(slot) * self.idler_slot_step
    }

    /// Selector position for the given slot. `slot == slot_count` maps to
    /// the park position past the last filament channel.
    pub fn selector_slot_position(&self, slot: u8) -> i32 {
        if slot >= self.slot_count {
            self.selector_park_position
        } else {
            self.selector_slot0 + i32::from(slot) * self.selector_slot_step
        }
    }

    /// Sanity-check the configuration before handing it to the scheduler.
    pub fn validate(&self) -> Result<(), Error> {
        if self.slot_count == 0 {
            return Err(Error::Config("slot_count must be at least 1"));
        }
        if self.idler_feedrate == 0 || self.selector_feedrate == 0 || self.pulley_feedrate == 0 {
            return Err(Error::Config("feedrates must be non-zero"));
        }
        if self.finda_debounce_ticks == 0 || self.fsensor_debounce_ticks == 0 {
            return Err(Error::Config("debounce windows must be non-zero"));
        }
        if self.unload_to_finda_steps <= 0 || self.feed_to_finda_steps <= 0 {
            return Err(Error::Config("pulley move lengths must be positive"));
        }

        let last = self.slot_count - 1;
        if self.idler_slot_position(last) >= self.idler_range
            || self.idler_park_position >= self.idler_range
        {
            return Err(Error::Config("idler positions exceed axis travel"));
        }
        if self.selector_slot_position(last) >= self.selector_range
            || self.selector_park_position >= self.selector_range
        {
            return Err(Error::Config("selector positions exceed axis travel"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = MmuConfig::default();
        assert!(c.validate().is_ok());
        assert!(c.slot_count > 0);
        assert!(c.idler_feedrate > 0 && c.selector_feedrate > 0 && c.pulley_feedrate > 0);
        assert!(c.unload_to_finda_steps > 0);
        assert!(c.finda_debounce_ticks > 0);
    }

    #[test]
    fn slot_positions_are_monotonic() {
        let c = MmuConfig::default();
        for slot in 1..c.slot_count {
            assert!(c.idler_slot_position(slot) > c.idler_slot_position(slot - 1));
            assert!(c.selector_slot_position(slot) > c.selector_slot_position(slot - 1));
        }
    }

    #[test]
    fn selector_park_is_past_last_slot() {
        let c = MmuConfig::default();
        assert!(c.selector_slot_position(c.slot_count) > c.selector_slot_position(c.slot_count - 1));
        assert_eq!(c.selector_slot_position(c.slot_count), c.selector_park_position);
    }

    #[test]
    fn positions_fit_within_travel() {
        let c = MmuConfig::default();
        assert!(c.idler_slot_position(c.slot_count - 1) < c.idler_range);
        assert!(c.idler_park_position < c.idler_range);
        assert!(c.selector_park_position < c.selector_range);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let mut c = MmuConfig::default();
        c.slot_count = 0;
        assert!(c.validate().is_err());

        let mut c = MmuConfig::default();
        c.pulley_feedrate = 0;
        assert!(c.validate().is_err());

        let mut c = MmuConfig::default();
        c.idler_park_position = c.idler_range + 1;
        assert!(c.validate().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let c = MmuConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: MmuConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.slot_count, c2.slot_count);
        assert_eq!(c.idler_slot_step, c2.idler_slot_step);
        assert_eq!(c.unload_to_finda_steps, c2.unload_to_finda_steps);
        assert_eq!(c.motors_stealth, c2.motors_stealth);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = MmuConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: MmuConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.selector_park_position, c2.selector_park_position);
        assert_eq!(c.finda_threshold, c2.finda_threshold);
    }
}
