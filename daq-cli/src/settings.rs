//! Application settings

use std::path::PathBuf;
use std::time::Duration;

use daq_detect::{PortScanner, SerialConfig};
use daq_sim::VirtualArduinoConfig;
use serde::{Deserialize, Serialize};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Search string used when no port is given on the command line
    #[serde(default)]
    pub default_port: Option<String>,
    /// Serial baud rate
    #[serde(default = "default_baud")]
    pub baud_rate: u32,
    /// Reply timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Samples per sweep step when not given on the command line
    #[serde(default = "default_repeats")]
    pub default_repeats: usize,
    /// Directory for auto-numbered CSV files
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Simulated instruments, addressable as `VSIM:<id>`
    #[serde(default)]
    pub virtual_instruments: Vec<VirtualArduinoConfig>,
}

fn default_baud() -> u32 {
    9600
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_repeats() -> usize {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_port: None,
            baud_rate: default_baud(),
            timeout_ms: default_timeout_ms(),
            default_repeats: default_repeats(),
            output_dir: None,
            virtual_instruments: Vec::new(),
        }
    }
}

impl Settings {
    /// Get the XDG config directory for diodaq
    /// Uses $XDG_CONFIG_HOME/diodaq, falls back to ~/.config/diodaq
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("diodaq"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("diodaq"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::settings_path()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|s| Self::from_json(&s))
            .unwrap_or_default()
    }

    /// Parse settings, ignoring a file that does not deserialize
    fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!("Ignoring unreadable settings file: {}", e);
                None
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<PathBuf, String> {
        let path =
            Self::settings_path().ok_or_else(|| "Could not determine settings path".to_string())?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create settings directory: {}", e))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        std::fs::write(&path, json).map_err(|e| format!("Failed to write settings: {}", e))?;

        Ok(path)
    }

    /// Serial link parameters
    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig {
            baud_rate: self.baud_rate,
            timeout: Duration::from_millis(self.timeout_ms),
            ..SerialConfig::default()
        }
    }

    /// Registry over serial ports and the configured simulated instruments
    pub fn registry(&self) -> PortScanner {
        PortScanner::new().with_virtual_instruments(
            self.virtual_instruments
                .iter()
                .map(|config| config.id.clone()),
        )
    }

    /// Configuration of a listed simulated instrument
    pub fn virtual_instrument(&self, id: &str) -> Option<&VirtualArduinoConfig> {
        self.virtual_instruments.iter().find(|config| config.id == id)
    }
}
