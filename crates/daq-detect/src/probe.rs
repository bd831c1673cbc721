//! Instrument identification
//!
//! Opens an address just long enough to ask `*IDN?`, for listings where the
//! caller wants to see what is attached before committing to a scan.

use daq_protocol::{Command, Transport};
use tracing::{debug, info, warn};

use crate::error::DetectError;
use crate::registry::Address;
use crate::serial::{SerialConfig, SerialTransport};

/// Ask the instrument on a serial address for its identification string
pub fn identify_port(address: &Address, config: &SerialConfig) -> Result<String, DetectError> {
    let mut transport = SerialTransport::open(address, config)?;

    let command = Command::Identify.encode();
    let result = transport.query(&command);

    if let Err(e) = transport.close() {
        warn!("Failed to close {}: {}", address, e);
    }

    match result {
        Ok(id) if !id.trim().is_empty() => {
            info!("{} identifies as {:?}", address, id);
            Ok(id)
        }
        Ok(_) => {
            debug!("{} sent an empty identification", address);
            Err(DetectError::IoError {
                port: address.to_string(),
                reason: "empty identification".to_string(),
            })
        }
        Err(e) => Err(DetectError::IoError {
            port: address.to_string(),
            reason: e.to_string(),
        }),
    }
}
