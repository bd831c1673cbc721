//! Instrument channel
//!
//! An [`InstrumentChannel`] owns one open session to one instrument and turns
//! typed operations into command round trips. Exactly one scan uses a channel
//! at a time, so the type is not `Clone`.
//!
//! # Lifecycle
//!
//! - `Open` after construction.
//! - `Closed` after [`InstrumentChannel::close`] or drop. Closing is
//!   idempotent and sends nothing.
//! - `Lost` after any transport failure. The session is released at once and
//!   every later operation fails with [`ProtocolError::NotOpen`]; callers must
//!   discard the channel.

use daq_detect::Address;
use daq_protocol::{
    parse_raw_reply, raw_to_volt, Command, InputChannel, ProtocolError, Transport, MAX_RAW,
};
use tracing::{debug, trace, warn};

use crate::error::ChannelError;

/// Session state of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Commands may be issued
    Open,
    /// Released by the owner
    Closed,
    /// Released after a transport failure
    Lost,
}

/// Typed request/response session with one instrument
#[derive(Debug)]
pub struct InstrumentChannel<T: Transport> {
    address: Address,
    transport: T,
    state: ChannelState,
}

impl<T: Transport> InstrumentChannel<T> {
    /// Wrap an open transport bound to `address`
    pub fn new(address: Address, transport: T) -> Self {
        debug!("Opened channel to {}", address);
        Self {
            address,
            transport,
            state: ChannelState::Open,
        }
    }

    /// Address this channel is bound to
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Current session state
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Whether commands may be issued
    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Query device identity with `*IDN?`
    pub fn identify(&mut self) -> Result<String, ChannelError> {
        let command = Command::Identify;
        let reply = self.round_trip(command)?;
        if reply.trim().is_empty() {
            return Err(ProtocolError::EmptyReply {
                command: command.encode(),
            }
            .into());
        }
        Ok(reply)
    }

    /// Program the DAC output and wait for the acknowledgement
    pub fn set_output(&mut self, value: i32) -> Result<(), ChannelError> {
        if !(0..=i32::from(MAX_RAW)).contains(&value) {
            return Err(ChannelError::Range {
                quantity: "output",
                value: i64::from(value),
                min: 0,
                max: i64::from(MAX_RAW),
            });
        }

        self.round_trip(Command::SetOutput(value as u16))?;
        Ok(())
    }

    /// Read back the programmed DAC output
    pub fn get_output(&mut self) -> Result<u16, ChannelError> {
        let reply = self.round_trip(Command::GetOutput)?;
        Ok(parse_raw_reply(&reply)?)
    }

    /// Read the raw ADC value on input 1 or 2
    pub fn read_raw(&mut self, channel: u8) -> Result<u16, ChannelError> {
        let input = InputChannel::from_number(channel).ok_or(ChannelError::Range {
            quantity: "input channel",
            value: i64::from(channel),
            min: 1,
            max: 2,
        })?;

        let reply = self.round_trip(Command::Measure(input))?;
        Ok(parse_raw_reply(&reply)?)
    }

    /// Read input 1 or 2 in volts
    pub fn read_voltage(&mut self, channel: u8) -> Result<f64, ChannelError> {
        self.read_raw(channel).map(raw_to_volt)
    }

    /// Release the session
    ///
    /// Safe to call any number of times; only the first call on an open
    /// channel reaches the transport.
    pub fn close(&mut self) {
        if self.state != ChannelState::Open {
            return;
        }
        self.release();
        self.state = ChannelState::Closed;
        debug!("Closed channel to {}", self.address);
    }

    /// Send one command and return its reply line
    fn round_trip(&mut self, command: Command) -> Result<String, ChannelError> {
        if self.state != ChannelState::Open {
            return Err(ProtocolError::NotOpen.into());
        }

        let line = command.encode();
        trace!("{} <- {}", self.address, line);

        match self.transport.query(&line) {
            Ok(reply) => {
                trace!("{} -> {:?}", self.address, reply);
                Ok(reply)
            }
            Err(e) => {
                warn!("Connection to {} lost during {}: {}", self.address, line, e);
                self.release();
                self.state = ChannelState::Lost;
                Err(ChannelError::ConnectionLost(e))
            }
        }
    }

    fn release(&mut self) {
        if let Err(e) = self.transport.close() {
            warn!("Failed to release {}: {}", self.address, e);
        }
    }
}

impl<T: Transport> Drop for InstrumentChannel<T> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fake::{Failure, FakeTransport};

    fn channel(transport: FakeTransport) -> InstrumentChannel<FakeTransport> {
        InstrumentChannel::new(Address::new("ASRL3::INSTR"), transport)
    }

    #[test]
    fn test_identify() {
        let mut ch = channel(FakeTransport::new(0, 0));
        assert_eq!(ch.identify().unwrap(), "Arduino VISA firmware v1.1.0");
        assert_eq!(ch.transport().sent, vec!["*IDN?"]);
    }

    #[test]
    fn test_identify_empty_reply() {
        let mut transport = FakeTransport::new(0, 0);
        transport.identification = String::new();
        let mut ch = channel(transport);

        let err = ch.identify().unwrap_err();
        assert!(matches!(
            err,
            ChannelError::Protocol(ProtocolError::EmptyReply { .. })
        ));
        assert!(ch.is_open());
    }

    #[test]
    fn test_set_output_round_trip() {
        let mut ch = channel(FakeTransport::new(0, 0));
        ch.set_output(512).unwrap();
        assert_eq!(ch.get_output().unwrap(), 512);
        assert_eq!(ch.transport().sent, vec!["OUT:CH0 512", "OUT:CH0?"]);
    }

    #[test]
    fn test_set_output_range_checked_before_sending() {
        let mut ch = channel(FakeTransport::new(0, 0));

        for value in [1024, -1] {
            let err = ch.set_output(value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Range);
        }
        assert!(ch.transport().sent.is_empty());

        ch.set_output(0).unwrap();
        ch.set_output(1023).unwrap();
        assert_eq!(ch.transport().sent.len(), 2);
    }

    #[test]
    fn test_read_raw() {
        let mut ch = channel(FakeTransport::new(700, 512));
        assert_eq!(ch.read_raw(1).unwrap(), 700);
        assert_eq!(ch.read_raw(2).unwrap(), 512);
        assert_eq!(ch.transport().sent, vec!["MEAS:CH1?", "MEAS:CH2?"]);
    }

    #[test]
    fn test_read_raw_rejects_bad_channel() {
        let mut ch = channel(FakeTransport::new(700, 512));
        for input in [0, 3] {
            assert_eq!(ch.read_raw(input).unwrap_err().kind(), ErrorKind::Range);
        }
        assert!(ch.transport().sent.is_empty());
    }

    #[test]
    fn test_read_voltage() {
        let mut ch = channel(FakeTransport::new(700, 512));
        let volts = ch.read_voltage(2).unwrap();
        assert!((volts - 1.651_613).abs() < 1e-6);
        assert_eq!(ch.transport().sent.len(), 1);
    }

    #[test]
    fn test_malformed_reply_is_protocol_error() {
        let mut ch = channel(FakeTransport::new(700, 512).fail_on(0, Failure::Garbage));
        let err = ch.read_raw(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        // Protocol errors leave the session usable for cleanup
        assert!(ch.is_open());
    }

    #[test]
    fn test_out_of_range_reply_is_protocol_error() {
        let mut ch = channel(FakeTransport::new(2000, 512));
        assert_eq!(ch.read_raw(1).unwrap_err().kind(), ErrorKind::Protocol);
    }

    #[test]
    fn test_connection_lost_poisons_channel() {
        let mut ch = channel(FakeTransport::new(700, 512).fail_on(1, Failure::Disconnect));
        ch.read_raw(1).unwrap();

        let err = ch.read_raw(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionLost);
        assert_eq!(ch.state(), ChannelState::Lost);
        assert_eq!(ch.transport().closes, 1);

        let err = ch.set_output(0).unwrap_err();
        assert!(matches!(
            err,
            ChannelError::Protocol(ProtocolError::NotOpen)
        ));
        assert_eq!(ch.transport().sent.len(), 2);

        ch.close();
        assert_eq!(ch.transport().closes, 1);
        assert_eq!(ch.state(), ChannelState::Lost);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut ch = channel(FakeTransport::new(0, 0));
        ch.close();
        ch.close();
        assert_eq!(ch.state(), ChannelState::Closed);
        assert_eq!(ch.transport().closes, 1);
        assert!(ch.transport().sent.is_empty());

        let err = ch.identify().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }
}
