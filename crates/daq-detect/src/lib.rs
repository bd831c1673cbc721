//! Instrument Detection Library
//!
//! This crate enumerates reachable instruments and resolves a user-supplied
//! search string to exactly one [`Address`].
//!
//! # Example
//!
//! ```rust
//! use daq_detect::{DeviceRegistry, StaticRegistry};
//!
//! let registry = StaticRegistry::new(["ASRL3::INSTR", "ASRL4::INSTR"]);
//!
//! let address = registry.resolve("3").unwrap();
//! assert_eq!(address.as_str(), "ASRL3::INSTR");
//!
//! let err = registry.resolve("ASRL").unwrap_err();
//! assert_eq!(err.match_count(), Some(2));
//! ```

pub mod error;
pub mod probe;
pub mod registry;
pub mod scanner;
pub mod serial;

pub use error::DetectError;
pub use probe::identify_port;
pub use registry::{Address, DeviceRegistry, StaticRegistry, VIRTUAL_PORT_PREFIX};
pub use scanner::{PortScanner, ScannerConfig, SerialPortInfo};
pub use serial::{SerialConfig, SerialTransport};
