//! Error types for instrument protocol parsing and transport

use thiserror::Error;

/// Errors that can occur while parsing protocol text
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Reply line was empty
    #[error("empty reply")]
    Empty,

    /// Reply was expected to be an integer
    #[error("not an integer: {0:?}")]
    NotAnInteger(String),

    /// Raw value outside the 10-bit range
    #[error("raw value {0} outside 0..=1023")]
    OutOfRange(i64),

    /// Unknown or unsupported command
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Command argument missing or malformed
    #[error("invalid argument for {command}: {argument:?}")]
    InvalidArgument { command: String, argument: String },
}

/// Higher-level protocol errors
///
/// Any of these means the request/response exchange can no longer be
/// trusted; they are never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Parse error
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The session was closed or lost before the command was issued
    #[error("channel is not open")]
    NotOpen,

    /// Instrument answered with nothing where text was required
    #[error("empty reply to {command}")]
    EmptyReply { command: String },
}

/// Failures of the link underneath the protocol
#[derive(Debug, Error)]
pub enum TransportError {
    /// No complete reply line within the transport timeout
    #[error("no reply within {ms}ms")]
    Timeout { ms: u64 },

    /// The endpoint went away
    #[error("disconnected: {0}")]
    Disconnected(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
