//! FINDA filament-presence sensor.
//!
//! A spring-loaded ball pushed aside by filament in the selector throat;
//! its position is read as an analog level and thresholded, then debounced
//! into the stable `pressed()` the logic layer relies on. Pressed means
//! filament is present at the sensor.

use super::Debouncer;
use crate::config::MmuConfig;
use crate::hal::adc::AdcChannel;

pub struct Finda {
    adc: AdcChannel,
    debouncer: Debouncer,
    threshold: u16,
}

impl Finda {
    pub fn new(config: &MmuConfig) -> Self {
        Self {
            adc: AdcChannel::new(0),
            debouncer: Debouncer::new(config.finda_debounce_ticks),
            threshold: config.finda_threshold,
        }
    }

    /// Take and debounce one sample. Called once per tick.
    pub fn step(&mut self) {
        let raw = self.adc.read() > self.threshold;
        self.debouncer.sample(raw);
    }

    /// Debounced presence state.
    pub fn pressed(&self) -> bool {
        self.debouncer.stable()
    }

    /// Inject raw ADC samples (tests and bench bring-up); see
    /// [`AdcChannel::reinit`].
    pub fn sim_inject_samples(&mut self, samples: &[u16], each: u16) {
        self.adc.reinit(samples, each);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::adc::ADC_MAX;

    #[test]
    fn press_debounces_from_high_level() {
        let config = MmuConfig::default();
        let mut finda = Finda::new(&config);
        finda.sim_inject_samples(&[ADC_MAX], 1);

        for _ in 0..config.finda_debounce_ticks - 1 {
            finda.step();
            assert!(!finda.pressed());
        }
        finda.step();
        assert!(finda.pressed());
    }

    #[test]
    fn level_at_threshold_counts_as_released() {
        let config = MmuConfig::default();
        let mut finda = Finda::new(&config);
        finda.sim_inject_samples(&[config.finda_threshold], 1);
        for _ in 0..100 {
            finda.step();
        }
        assert!(!finda.pressed());
    }

    #[test]
    fn falling_sequence_releases_after_crossing_threshold() {
        let config = MmuConfig::default();
        let mut finda = Finda::new(&config);
        finda.sim_inject_samples(&[ADC_MAX], 1);
        for _ in 0..config.finda_debounce_ticks {
            finda.step();
        }
        assert!(finda.pressed());

        finda.sim_inject_samples(&[ADC_MAX, 900, 800, 500, 0], 10);
        let mut ticks = 0;
        while finda.pressed() {
            finda.step();
            ticks += 1;
            assert!(ticks < 200, "FINDA never released");
        }
        assert!(!finda.pressed());
    }
}
