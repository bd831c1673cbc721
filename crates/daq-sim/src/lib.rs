//! Instrument Simulation Library
//!
//! This crate provides a simulated ADC/DAC instrument wired to a diode in
//! series with a 220 Ω sense resistor, so the scan pipeline can run without
//! hardware. [`VirtualArduino`] answers the same command lines as the real
//! firmware and implements [`daq_protocol::Transport`] directly.
//!
//! # Example
//!
//! ```rust
//! use daq_protocol::Transport;
//! use daq_sim::VirtualArduino;
//!
//! let mut device = VirtualArduino::new("bench");
//!
//! device.query("OUT:CH0 800").unwrap();
//! assert_eq!(device.query("OUT:CH0?").unwrap(), "800");
//!
//! let resistor: u16 = device.query("MEAS:CH2?").unwrap().parse().unwrap();
//! let total: u16 = device.query("MEAS:CH1?").unwrap().parse().unwrap();
//! assert!(total > resistor);
//! ```

pub mod diode;
pub mod instrument;

pub use diode::DiodeFixture;
pub use instrument::{VirtualArduino, VirtualArduinoConfig};
