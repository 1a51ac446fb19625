//! Host-side stand-ins for the sampling hardware.

pub mod adc;
