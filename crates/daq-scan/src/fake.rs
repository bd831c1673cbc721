//! Recording transport for unit tests

use daq_protocol::{Transport, TransportError};

/// How the fake misbehaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Failure {
    /// Answer with text no parser accepts
    Garbage,
    /// Drop the link
    Disconnect,
}

/// Transport that answers with fixed readings and records every command
#[derive(Debug)]
pub(crate) struct FakeTransport {
    pub sent: Vec<String>,
    pub ch1: u16,
    pub ch2: u16,
    pub identification: String,
    pub closes: usize,
    output: u16,
    fail_on: Option<(usize, Failure)>,
}

impl FakeTransport {
    pub fn new(ch1: u16, ch2: u16) -> Self {
        Self {
            sent: Vec::new(),
            ch1,
            ch2,
            identification: "Arduino VISA firmware v1.1.0".to_string(),
            closes: 0,
            output: 0,
            fail_on: None,
        }
    }

    /// Misbehave on the command with this zero-based index
    pub fn fail_on(mut self, index: usize, failure: Failure) -> Self {
        self.fail_on = Some((index, failure));
        self
    }

    /// Value of the last `OUT:CH0 <n>` command sent
    pub fn last_output_set(&self) -> Option<u16> {
        self.sent
            .iter()
            .rev()
            .find_map(|c| c.strip_prefix("OUT:CH0 "))
            .and_then(|v| v.parse().ok())
    }

    /// Number of `OUT:CH0 <n>` commands sent
    pub fn output_sets(&self) -> usize {
        self.sent
            .iter()
            .filter(|c| c.starts_with("OUT:CH0 "))
            .count()
    }
}

impl Transport for FakeTransport {
    fn query(&mut self, command: &str) -> Result<String, TransportError> {
        let index = self.sent.len();
        self.sent.push(command.to_string());

        match self.fail_on {
            Some((n, Failure::Garbage)) if n == index => return Ok("garbage".to_string()),
            Some((n, Failure::Disconnect)) if n == index => {
                return Err(TransportError::Disconnected("cable pulled".to_string()))
            }
            _ => {}
        }

        let reply = match command {
            "*IDN?" => self.identification.clone(),
            "OUT:CH0?" => self.output.to_string(),
            "MEAS:CH1?" => self.ch1.to_string(),
            "MEAS:CH2?" => self.ch2.to_string(),
            other => match other.strip_prefix("OUT:CH0 ") {
                Some(value) => {
                    self.output = value.parse().unwrap_or(0);
                    value.to_string()
                }
                None => String::new(),
            },
        };
        Ok(reply)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.closes += 1;
        Ok(())
    }
}
