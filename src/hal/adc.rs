//! Simulated ADC channel.
//!
//! The real unit samples its analog sensors from a free-running ADC ISR;
//! here each sensor owns an `AdcChannel` that replays an injected sample
//! sequence instead. One `read()` per tick. A sequence entry is repeated
//! `each` times before advancing, and the final entry holds forever, so a
//! test can describe "1023 for 10 ticks, then 800, then 0" in one call.
//!
//! This is also the bring-up hook for feeding recorded sensor traces
//! through the debounce chain on the bench.

use heapless::Vec;

/// Full-scale raw reading (10-bit ADC).
pub const ADC_MAX: u16 = 1023;

/// Longest injectable sample sequence.
pub const ADC_SEQ_CAP: usize = 16;

pub struct AdcChannel {
    seq: Vec<u16, ADC_SEQ_CAP>,
    each: u16,
    idx: usize,
    left: u16,
}

impl AdcChannel {
    /// Channel that reads `level` forever.
    pub fn new(level: u16) -> Self {
        let mut seq = Vec::new();
        // Capacity is non-zero, a single push cannot fail.
        let _ = seq.push(level);
        Self {
            seq,
            each: 1,
            idx: 0,
            left: 1,
        }
    }

    /// Replace the sample sequence. Each entry is repeated `each` times
    /// (minimum 1); entries beyond [`ADC_SEQ_CAP`] are dropped. An empty
    /// `samples` leaves the channel reading 0.
    pub fn reinit(&mut self, samples: &[u16], each: u16) {
        self.seq.clear();
        for &s in samples.iter().take(ADC_SEQ_CAP) {
            let _ = self.seq.push(s);
        }
        if self.seq.is_empty() {
            let _ = self.seq.push(0);
        }
        self.each = each.max(1);
        self.idx = 0;
        self.left = self.each;
    }

    /// Take one sample. Advances through the sequence; the last entry is
    /// sticky.
    pub fn read(&mut self) -> u16 {
        let v = self.seq[self.idx];
        if self.left > 1 {
            self.left -= 1;
        } else if self.idx + 1 < self.seq.len() {
            self.idx += 1;
            self.left = self.each;
        }
        v
    }
}
