//! Diode Scan Engine
//!
//! This crate drives a diode-characterization instrument through a voltage
//! sweep and reduces repeated noisy samples into measurement points with
//! uncertainties.
//!
//! # Architecture
//!
//! - [`InstrumentChannel`] owns one session and exposes typed get/set
//!   operations over any [`daq_protocol::Transport`]
//! - [`scan`] sweeps the output, samples both inputs `repeats` times per
//!   step and always de-energizes the device afterwards
//! - [`ScanResult`] is the immutable product consumed by export and display
//!
//! Everything is synchronous: one blocking round trip at a time, no
//! pipelining, no cancellation.
//!
//! # Example
//!
//! ```rust
//! use daq_detect::Address;
//! use daq_scan::{scan, InstrumentChannel};
//! use daq_sim::VirtualArduino;
//!
//! let device = VirtualArduino::new("bench");
//! let mut channel = InstrumentChannel::new(Address::virtual_instrument("bench"), device);
//!
//! let result = scan(&mut channel, 600, 700, 3).unwrap();
//! assert_eq!(result.len(), 101);
//! assert_eq!(channel.transport().output(), 0);
//! ```

pub mod channel;
pub mod engine;
pub mod error;
pub mod export;
pub mod progress;
pub mod result;
pub mod stats;

#[cfg(test)]
mod fake;

pub use channel::{ChannelState, InstrumentChannel};
pub use engine::{scan, scan_with_progress, ScanParams, SENSE_RESISTOR_OHM};
pub use error::{ChannelError, ErrorKind, ExportError, ScanError};
pub use export::{next_free_path, save_csv, save_in_dir, write_csv, CSV_HEADER};
pub use progress::{NoProgress, ProgressReporter};
pub use result::{ScanResult, SweepPoint};
pub use stats::Summary;
