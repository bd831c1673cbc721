//! Serial port scanner
//!
//! This module enumerates serial ports and exposes them, together with any
//! configured simulated instruments, as a [`DeviceRegistry`].

use serialport::{available_ports, SerialPortType};
use tracing::info;

use crate::error::DetectError;
use crate::registry::{Address, DeviceRegistry};

/// Information about a serial port
#[derive(Debug, Clone)]
pub struct SerialPortInfo {
    /// Port name (e.g., /dev/ttyACM0, COM3)
    pub port: String,
    /// USB Vendor ID (if USB)
    pub vid: Option<u16>,
    /// USB Product ID (if USB)
    pub pid: Option<u16>,
    /// USB manufacturer string
    pub manufacturer: Option<String>,
    /// USB product string
    pub product: Option<String>,
}

impl SerialPortInfo {
    /// Create from serialport crate's port info
    fn from_serialport(name: String, port_type: &SerialPortType) -> Self {
        match port_type {
            SerialPortType::UsbPort(usb) => Self {
                port: name,
                vid: Some(usb.vid),
                pid: Some(usb.pid),
                manufacturer: usb.manufacturer.clone(),
                product: usb.product.clone(),
            },
            _ => Self {
                port: name,
                vid: None,
                pid: None,
                manufacturer: None,
                product: None,
            },
        }
    }

    /// Label for listings: "ttyACM0 (Arduino Uno)" or just the port name
    pub fn display_label(&self) -> String {
        match &self.product {
            Some(product) => format!("{} ({})", self.port, product),
            None => self.port.clone(),
        }
    }

    /// Address of this port
    pub fn address(&self) -> Address {
        Address::new(self.port.clone())
    }
}

/// Serial port scanner configuration
#[derive(Debug, Clone, Default)]
pub struct ScannerConfig {
    /// Skip ports matching these patterns
    pub skip_patterns: Vec<String>,
    /// Simulated instruments to list alongside real ports
    pub virtual_instruments: Vec<String>,
}

/// Serial port scanner
pub struct PortScanner {
    config: ScannerConfig,
}

impl PortScanner {
    /// Create a new scanner with default configuration
    pub fn new() -> Self {
        Self {
            config: ScannerConfig {
                skip_patterns: vec![
                    // Bluetooth ports on macOS
                    "Bluetooth".to_string(),
                    // Debug/logging ports
                    "debug".to_string(),
                ],
                virtual_instruments: Vec::new(),
            },
        }
    }

    /// Create a scanner with custom configuration
    pub fn with_config(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// Also list the named simulated instruments
    pub fn with_virtual_instruments<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .virtual_instruments
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Enumerate all available serial ports
    pub fn enumerate_ports(&self) -> Result<Vec<SerialPortInfo>, DetectError> {
        info!("Enumerating serial ports...");
        let ports = available_ports().map_err(|e| DetectError::EnumerationFailed(e.to_string()))?;

        let result: Vec<_> = ports
            .into_iter()
            .map(|p| SerialPortInfo::from_serialport(p.port_name, &p.port_type))
            .filter(|p| !self.should_skip_port(p))
            .collect();

        if result.is_empty() {
            info!("No serial ports found");
        } else {
            info!("Found {} serial port(s)", result.len());
            for port in &result {
                let desc = port.product.as_deref().unwrap_or("Unknown");
                info!("  {} - {}", port.port, desc);
            }
        }

        Ok(result)
    }

    /// Addresses of the configured simulated instruments
    pub fn virtual_addresses(&self) -> Vec<Address> {
        self.config
            .virtual_instruments
            .iter()
            .map(|name| Address::virtual_instrument(name))
            .collect()
    }

    /// Check if a port should be skipped
    fn should_skip_port(&self, port: &SerialPortInfo) -> bool {
        for pattern in &self.config.skip_patterns {
            if port.port.contains(pattern) {
                return true;
            }
        }
        false
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRegistry for PortScanner {
    fn enumerate(&self) -> Result<Vec<Address>, DetectError> {
        let mut addresses: Vec<Address> = self
            .enumerate_ports()?
            .iter()
            .map(SerialPortInfo::address)
            .collect();
        addresses.extend(self.virtual_addresses());
        Ok(addresses)
    }
}
