//! Sensor subsystem — debounce core and the two presence sensors.
//!
//! Raw ADC samples are noisy (mechanical bounce, analog ripple); every
//! consumer in the core sees only the debounced boolean. One sample per
//! tick, stepped by the scheduler before any automaton runs.

pub mod finda;
pub mod fsensor;

/// Debounces a raw boolean sample stream into a stable output.
///
/// The output flips only after `required` consecutive samples that agree
/// with each other and disagree with the current stable value. A single
/// sample back at the stable value restarts the count.
pub struct Debouncer {
    required: u16,
    run: u16,
    candidate: bool,
    stable: bool,
}

impl Debouncer {
    /// `required` is clamped to at least 1.
    pub fn new(required: u16) -> Self {
        Self {
            required: required.max(1),
            run: 0,
            candidate: false,
            stable: false,
        }
    }

    /// Feed one raw sample; returns the (possibly updated) stable value.
    pub fn sample(&mut self, raw: bool) -> bool {
        if raw == self.stable {
            self.run = 0;
            self.candidate = self.stable;
            return self.stable;
        }
        if raw == self.candidate {
            self.run += 1;
        } else {
            self.candidate = raw;
            self.run = 1;
        }
        if self.run >= self.required {
            self.stable = raw;
            self.run = 0;
        }
        self.stable
    }

    /// Current stable value.
    pub fn stable(&self) -> bool {
        self.stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_released() {
        assert!(!Debouncer::new(4).stable());
    }

    #[test]
    fn flips_only_after_required_consecutive_samples() {
        let mut d = Debouncer::new(4);
        for _ in 0..3 {
            assert!(!d.sample(true));
        }
        assert!(d.sample(true), "4th consistent sample must flip");
    }

    #[test]
    fn bounce_restarts_the_count() {
        let mut d = Debouncer::new(4);
        d.sample(true);
        d.sample(true);
        d.sample(false); // bounce back to stable
        for _ in 0..3 {
            assert!(!d.sample(true));
        }
        assert!(d.sample(true));
    }

    #[test]
    fn symmetric_release_debounce() {
        let mut d = Debouncer::new(3);
        for _ in 0..3 {
            d.sample(true);
        }
        assert!(d.stable());
        assert!(d.sample(false));
        assert!(d.sample(false));
        assert!(!d.sample(false), "3rd consistent sample must release");
    }

    #[test]
    fn required_of_one_follows_input() {
        let mut d = Debouncer::new(1);
        assert!(d.sample(true));
        assert!(!d.sample(false));
    }
}
