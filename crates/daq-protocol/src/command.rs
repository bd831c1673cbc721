//! Instrument command set
//!
//! The instrument speaks a small SCPI-flavoured ASCII dialect. Every command
//! is one line and every command, including the output setter, is answered
//! with exactly one reply line.
//!
//! | Command         | Reply                 |
//! |-----------------|-----------------------|
//! | `*IDN?`         | identification string |
//! | `OUT:CH0 <raw>` | echo/acknowledgement  |
//! | `OUT:CH0?`      | programmed raw output |
//! | `MEAS:CH1?`     | raw ADC reading       |
//! | `MEAS:CH2?`     | raw ADC reading       |

use std::fmt;

use crate::error::ParseError;
use crate::units::MAX_RAW;

/// Analog input channel of the instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputChannel {
    /// Voltage across diode and sense resistor in series
    Ch1,
    /// Voltage across the sense resistor only
    Ch2,
}

impl InputChannel {
    /// Channel number as used on the wire
    pub fn number(&self) -> u8 {
        match self {
            InputChannel::Ch1 => 1,
            InputChannel::Ch2 => 2,
        }
    }

    /// Map a channel number to an input channel
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(InputChannel::Ch1),
            2 => Some(InputChannel::Ch2),
            _ => None,
        }
    }
}

/// One request line sent to the instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Query device identity: `*IDN?`
    Identify,
    /// Program the DAC output: `OUT:CH0 512`
    SetOutput(u16),
    /// Read back the programmed output: `OUT:CH0?`
    GetOutput,
    /// Read an ADC input: `MEAS:CH1?`
    Measure(InputChannel),
}

impl Command {
    /// Encode to the wire form, without line terminator
    pub fn encode(&self) -> String {
        match self {
            Command::Identify => "*IDN?".to_string(),
            Command::SetOutput(value) => format!("OUT:CH0 {}", value),
            Command::GetOutput => "OUT:CH0?".to_string(),
            Command::Measure(channel) => format!("MEAS:CH{}?", channel.number()),
        }
    }

    /// Parse a request line (instrument side)
    pub fn parse(line: &str) -> Result<Command, ParseError> {
        let line = line.trim();

        if line.eq_ignore_ascii_case("*IDN?") {
            return Ok(Command::Identify);
        }
        if line == "OUT:CH0?" {
            return Ok(Command::GetOutput);
        }
        if let Some(arg) = line.strip_prefix("OUT:CH0 ") {
            let value = arg
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|v| *v <= MAX_RAW)
                .ok_or_else(|| ParseError::InvalidArgument {
                    command: "OUT:CH0".into(),
                    argument: arg.into(),
                })?;
            return Ok(Command::SetOutput(value));
        }
        if let Some(rest) = line.strip_prefix("MEAS:CH") {
            let number = rest
                .strip_suffix('?')
                .ok_or_else(|| ParseError::UnknownCommand(line.into()))?;
            let channel = number
                .parse::<u8>()
                .ok()
                .and_then(InputChannel::from_number)
                .ok_or_else(|| ParseError::InvalidArgument {
                    command: "MEAS".into(),
                    argument: number.into(),
                })?;
            return Ok(Command::Measure(channel));
        }

        Err(ParseError::UnknownCommand(line.into()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Parse a reply as a raw 10-bit value
pub fn parse_raw_reply(reply: &str) -> Result<u16, ParseError> {
    let reply = reply.trim();
    if reply.is_empty() {
        return Err(ParseError::Empty);
    }

    let value = reply
        .parse::<i64>()
        .map_err(|_| ParseError::NotAnInteger(reply.into()))?;

    if !(0..=i64::from(MAX_RAW)).contains(&value) {
        return Err(ParseError::OutOfRange(value));
    }

    Ok(value as u16)
}
