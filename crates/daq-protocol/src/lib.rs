//! Instrument Protocol Library
//!
//! This crate provides encoding and parsing for the ASCII command protocol of
//! the ADC/DAC microcontroller used to characterize diodes:
//!
//! - **Commands**: `*IDN?`, `OUT:CH0 <raw>`, `OUT:CH0?`, `MEAS:CH<n>?`
//! - **Replies**: one line per command, raw values as decimal integers in `0..=1023`
//! - **Framing**: newline-terminated in both directions, no pipelining
//!
//! # Architecture
//!
//! - [`Command`] encodes requests and parses them on the instrument side
//! - [`LineCodec`] reassembles reply lines from partial serial reads
//! - [`Transport`] is the seam between the typed instrument channel and a
//!   concrete link (serial port or simulator)
//!
//! # Example
//!
//! ```rust
//! use daq_protocol::{parse_raw_reply, raw_to_volt, Command, InputChannel, LineCodec};
//!
//! assert_eq!(Command::Measure(InputChannel::Ch2).encode(), "MEAS:CH2?");
//!
//! let mut codec = LineCodec::new();
//! codec.push_bytes(b"512\r\n");
//!
//! let raw = parse_raw_reply(&codec.next_line().unwrap()).unwrap();
//! assert!((raw_to_volt(raw) - 1.652).abs() < 1e-3);
//! ```

pub mod codec;
pub mod command;
pub mod error;
pub mod transport;
pub mod units;

pub use codec::{frame, LineCodec};
pub use command::{parse_raw_reply, Command, InputChannel};
pub use error::{ParseError, ProtocolError, TransportError};
pub use transport::Transport;
pub use units::{raw_to_volt, volt_to_raw, FULL_SCALE_VOLTS, MAX_RAW};
