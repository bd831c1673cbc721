//! Virtual instrument simulation
//!
//! Provides a simulated ADC/DAC microcontroller that answers the command
//! protocol line by line, reading its inputs from a [`DiodeFixture`].

use daq_protocol::{
    raw_to_volt, Command, InputChannel, Transport, TransportError, FULL_SCALE_VOLTS, MAX_RAW,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::diode::DiodeFixture;

/// Configuration for creating a virtual instrument
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VirtualArduinoConfig {
    /// Name; the instrument is addressed as `VSIM:<id>`
    pub id: String,
    /// Reply to `*IDN?`
    #[serde(default = "default_identification")]
    pub identification: String,
    /// Peak ADC noise in raw units, applied uniformly in `-noise..=noise`
    #[serde(default = "default_noise")]
    pub noise_lsb: u16,
    /// Seed for the noise generator
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Electrical model of the device under test
    #[serde(default)]
    pub fixture: DiodeFixture,
}

fn default_identification() -> String {
    "Arduino VISA firmware v1.1.0".to_string()
}

fn default_noise() -> u16 {
    1
}

fn default_seed() -> u64 {
    0x5EED_D10D
}

impl Default for VirtualArduinoConfig {
    fn default() -> Self {
        Self {
            id: "Virtual Arduino".to_string(),
            identification: default_identification(),
            noise_lsb: default_noise(),
            seed: default_seed(),
            fixture: DiodeFixture::default(),
        }
    }
}

/// A simulated instrument that answers protocol commands
#[derive(Debug)]
pub struct VirtualArduino {
    /// Unique identifier for this virtual instrument
    id: String,
    /// Reply to `*IDN?`
    identification: String,
    /// Currently programmed DAC value
    output: u16,
    /// Peak ADC noise in raw units
    noise_lsb: u16,
    /// Seeded noise source
    rng: ChaCha8Rng,
    /// Device under test
    fixture: DiodeFixture,
    /// Every command received, in order
    history: Vec<Command>,
    /// Simulated cable pull after this many commands
    disconnect_after: Option<usize>,
    /// False once closed or disconnected
    connected: bool,
}

impl VirtualArduino {
    /// Create a new virtual instrument with default settings
    pub fn new(id: impl Into<String>) -> Self {
        Self::from_config(VirtualArduinoConfig {
            id: id.into(),
            ..Default::default()
        })
    }

    /// Create a virtual instrument from configuration
    pub fn from_config(config: VirtualArduinoConfig) -> Self {
        Self {
            id: config.id,
            identification: config.identification,
            output: 0,
            noise_lsb: config.noise_lsb,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            fixture: config.fixture,
            history: Vec::new(),
            disconnect_after: None,
            connected: true,
        }
    }

    /// Get the instrument's identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Currently programmed output value
    pub fn output(&self) -> u16 {
        self.output
    }

    /// Commands received so far
    pub fn history(&self) -> &[Command] {
        &self.history
    }

    /// Whether the link is still up
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Set noise amplitude in raw units (0 gives exact readings)
    pub fn set_noise(&mut self, noise_lsb: u16) {
        self.noise_lsb = noise_lsb;
    }

    /// Drop the link once `commands` more commands have been answered
    pub fn disconnect_after(&mut self, commands: usize) {
        self.disconnect_after = Some(self.history.len() + commands);
    }

    /// Raw reading an input would report, before noise
    pub fn ideal_reading(&self, channel: InputChannel) -> u16 {
        let applied = raw_to_volt(self.output);
        let (ch1, ch2) = self.fixture.probe_voltages(applied);
        let volts = match channel {
            InputChannel::Ch1 => ch1,
            InputChannel::Ch2 => ch2,
        };
        volts_to_reading(volts)
    }

    /// Handle one parsed command and produce its reply line
    fn respond(&mut self, command: Command) -> String {
        match command {
            Command::Identify => self.identification.clone(),
            Command::SetOutput(value) => {
                self.output = value;
                debug!("{}: output set to {}", self.id, value);
                value.to_string()
            }
            Command::GetOutput => self.output.to_string(),
            Command::Measure(channel) => {
                let reading = self.ideal_reading(channel);
                self.add_noise(reading).to_string()
            }
        }
    }

    fn add_noise(&mut self, reading: u16) -> u16 {
        if self.noise_lsb == 0 {
            return reading;
        }

        let noise = i32::from(self.noise_lsb);
        let offset = self.rng.gen_range(-noise..=noise);
        (i32::from(reading) + offset).clamp(0, i32::from(MAX_RAW)) as u16
    }
}

impl Transport for VirtualArduino {
    fn query(&mut self, command: &str) -> Result<String, TransportError> {
        if !self.connected {
            return Err(TransportError::Disconnected(format!(
                "{} is not connected",
                self.id
            )));
        }
        if self
            .disconnect_after
            .is_some_and(|limit| self.history.len() >= limit)
        {
            self.connected = false;
            return Err(TransportError::Disconnected(format!(
                "{} went away",
                self.id
            )));
        }

        trace!("{} <- {:?}", self.id, command);
        let reply = match Command::parse(command) {
            Ok(parsed) => {
                self.history.push(parsed);
                self.respond(parsed)
            }
            Err(e) => {
                warn!("{}: rejecting {:?}: {}", self.id, command, e);
                String::new()
            }
        };
        trace!("{} -> {:?}", self.id, reply);

        Ok(reply)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.connected = false;
        Ok(())
    }
}

/// Quantize a voltage the way the 10-bit ADC does
fn volts_to_reading(volts: f64) -> u16 {
    let raw = (volts / FULL_SCALE_VOLTS * f64::from(MAX_RAW)).round();
    raw.clamp(0.0, f64::from(MAX_RAW)) as u16
}
