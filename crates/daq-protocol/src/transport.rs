//! Request/response transport abstraction
//!
//! A transport carries one command line out and one reply line back per
//! call. It knows nothing about command meaning; typed operations live in
//! the instrument channel built on top of it.

use crate::error::TransportError;

/// Blocking line-oriented request/response link
pub trait Transport {
    /// Send one command line and wait for exactly one reply line
    ///
    /// The command is passed without terminator and the reply is returned
    /// without terminator.
    fn query(&mut self, command: &str) -> Result<String, TransportError>;

    /// Release the underlying session
    fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn query(&mut self, command: &str) -> Result<String, TransportError> {
        (**self).query(command)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        (**self).close()
    }
}
