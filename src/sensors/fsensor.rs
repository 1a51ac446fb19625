//! Printer-side filament sensor.
//!
//! Sits at the extruder entry on the printer and reports whether filament
//! has reached it. Same sampling contract as the FINDA: one thresholded,
//! debounced sample per tick.

use super::Debouncer;
use crate::config::MmuConfig;
use crate::hal::adc::AdcChannel;

pub struct FSensor {
    adc: AdcChannel,
    debouncer: Debouncer,
    threshold: u16,
}

impl FSensor {
    pub fn new(config: &MmuConfig) -> Self {
        Self {
            adc: AdcChannel::new(0),
            debouncer: Debouncer::new(config.fsensor_debounce_ticks),
            threshold: config.fsensor_threshold,
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

    /// Inject raw ADC samples (tests and bench bring-up).
    pub fn sim_inject_samples(&mut self, samples: &[u16], each: u16) {
        self.adc.reinit(samples, each);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::adc::ADC_MAX;

    #[test]
    fn debounces_like_the_finda() {
        let config = MmuConfig::default();
        let mut fs = FSensor::new(&config);
        fs.sim_inject_samples(&[ADC_MAX], 1);
        for _ in 0..config.fsensor_debounce_ticks {
            assert!(!fs.pressed());
            fs.step();
        }
        assert!(fs.pressed());
    }
}
