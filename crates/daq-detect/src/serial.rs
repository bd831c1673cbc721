//! Serial-port transport
//!
//! Opens an [`Address`] as a serial port and implements the line-oriented
//! [`Transport`] on top of it.

use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use daq_protocol::{frame, LineCodec, Transport, TransportError};
use serialport::{ClearBuffer, SerialPort};
use tracing::{debug, trace};

use crate::error::DetectError;
use crate::registry::Address;

/// Serial link configuration
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Baud rate
    pub baud_rate: u32,
    /// Time allowed for one complete reply line
    pub timeout: Duration,
    /// Delay after opening before the first command
    pub settle: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            timeout: Duration::from_millis(2000),
            settle: Duration::from_millis(50),
        }
    }
}

/// Line transport over an open serial port
pub struct SerialTransport {
    port_name: String,
    port: Option<Box<dyn SerialPort>>,
    codec: LineCodec,
    timeout: Duration,
    buffer: Vec<u8>,
}

impl SerialTransport {
    /// Open the serial port behind an address
    pub fn open(address: &Address, config: &SerialConfig) -> Result<Self, DetectError> {
        debug!("Opening {} at {} baud", address, config.baud_rate);

        let port = serialport::new(address.as_str(), config.baud_rate)
            .timeout(Duration::from_millis(100))
            .open()
            .map_err(|e| DetectError::OpenFailed {
                port: address.to_string(),
                reason: e.to_string(),
            })?;

        // Give the port a moment to settle
        std::thread::sleep(config.settle);

        Ok(Self {
            port_name: address.to_string(),
            port: Some(port),
            codec: LineCodec::new(),
            timeout: config.timeout,
            buffer: vec![0; 256],
        })
    }
}

impl Transport for SerialTransport {
    fn query(&mut self, command: &str) -> Result<String, TransportError> {
        let port = self
            .port
            .as_mut()
            .ok_or_else(|| TransportError::Disconnected(format!("{} is closed", self.port_name)))?;

        // Stale bytes from an earlier exchange would desync request and reply
        self.codec.clear();
        port.clear(ClearBuffer::Input)
            .map_err(|e| TransportError::Disconnected(e.to_string()))?;

        trace!("{} <- {:?}", self.port_name, command);
        port.write_all(&frame(command))?;
        port.flush()?;

        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(line) = self.codec.next_line() {
                trace!("{} -> {:?}", self.port_name, line);
                return Ok(line);
            }

            if Instant::now() >= deadline {
                return Err(TransportError::Timeout {
                    ms: self.timeout.as_millis() as u64,
                });
            }

            match port.read(&mut self.buffer) {
                Ok(0) => {
                    return Err(TransportError::Disconnected(format!(
                        "{} returned end of stream",
                        self.port_name
                    )))
                }
                Ok(n) => self.codec.push_bytes(&self.buffer[..n]),
                Err(e) if e.kind() == ErrorKind::TimedOut => continue,
                Err(e) => return Err(TransportError::Io(e)),
            }
        }
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if self.port.take().is_some() {
            debug!("Closed {}", self.port_name);
        }
        Ok(())
    }
}
