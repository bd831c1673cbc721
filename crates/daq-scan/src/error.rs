//! Error types for instrument channels and scans

use daq_protocol::{ParseError, ProtocolError, TransportError};
use thiserror::Error;

/// Coarse classification for presenting failures to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Value outside protocol-accepted bounds
    Range,
    /// Malformed or unparsable reply, or channel not open
    Protocol,
    /// Transport failure; the channel is unusable
    ConnectionLost,
    /// Scan bounds outside `0 <= start <= stop <= 1023`
    InvalidScanRange,
    /// Fewer than one repeat requested
    InvalidRepeatCount,
}

/// Errors raised by an instrument channel
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Argument rejected before anything was sent
    #[error("{quantity} {value} outside {min}..={max}")]
    Range {
        /// What was out of range
        quantity: &'static str,
        /// Offending value
        value: i64,
        /// Smallest accepted value
        min: i64,
        /// Largest accepted value
        max: i64,
    },

    /// Protocol error
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Transport failed mid-command
    #[error("connection lost: {0}")]
    ConnectionLost(#[from] TransportError),
}

impl From<ParseError> for ChannelError {
    fn from(err: ParseError) -> Self {
        ChannelError::Protocol(ProtocolError::Parse(err))
    }
}

impl ChannelError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChannelError::Range { .. } => ErrorKind::Range,
            ChannelError::Protocol(_) => ErrorKind::Protocol,
            ChannelError::ConnectionLost(_) => ErrorKind::ConnectionLost,
        }
    }
}

/// Errors that abort a scan
#[derive(Debug, Error)]
pub enum ScanError {
    /// Scan bounds rejected before touching the instrument
    #[error("invalid scan range {start}..={stop}: need 0 <= start <= stop <= 1023")]
    InvalidScanRange { start: i32, stop: i32 },

    /// Scan bound given in volts is NaN or infinite
    #[error("invalid scan bound {0} V: must be a finite voltage")]
    NonFiniteVoltage(f64),

    /// Repeat count rejected before touching the instrument
    #[error("invalid repeat count {0}: need at least 1")]
    InvalidRepeatCount(usize),

    /// Channel failure during the sweep
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

impl ScanError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::InvalidScanRange { .. } | ScanError::NonFiniteVoltage(_) => {
                ErrorKind::InvalidScanRange
            }
            ScanError::InvalidRepeatCount(_) => ErrorKind::InvalidRepeatCount,
            ScanError::Channel(e) => e.kind(),
        }
    }
}

/// Errors writing scan results to disk
#[derive(Debug, Error)]
pub enum ExportError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let range = ChannelError::Range {
            quantity: "output",
            value: 1024,
            min: 0,
            max: 1023,
        };
        assert_eq!(range.kind(), ErrorKind::Range);
        assert_eq!(range.to_string(), "output 1024 outside 0..=1023");

        let parse: ChannelError = ParseError::Empty.into();
        assert_eq!(parse.kind(), ErrorKind::Protocol);

        let lost: ScanError = ChannelError::from(TransportError::Timeout { ms: 2000 }).into();
        assert_eq!(lost.kind(), ErrorKind::ConnectionLost);

        assert_eq!(
            ScanError::InvalidScanRange { start: 5, stop: 1 }.kind(),
            ErrorKind::InvalidScanRange
        );
        assert_eq!(
            ScanError::InvalidRepeatCount(0).kind(),
            ErrorKind::InvalidRepeatCount
        );
    }
}
