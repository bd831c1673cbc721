//! Device addressing and disambiguation
//!
//! A registry lists the instrument endpoints reachable right now. Callers
//! never open an address they typed in full; they hand a search string to
//! [`DeviceRegistry::resolve`], which insists on exactly one match.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DetectError;

/// Prefix of addresses that name a simulated instrument
pub const VIRTUAL_PORT_PREFIX: &str = "VSIM:";

/// Opaque identifier of a reachable instrument endpoint
///
/// Serial ports appear as their OS name (`/dev/ttyACM0`, `COM3`), simulated
/// instruments as `VSIM:<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Wrap an endpoint name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Address for a simulated instrument
    pub fn virtual_instrument(name: &str) -> Self {
        Self(format!("{}{}", VIRTUAL_PORT_PREFIX, name))
    }

    /// The endpoint name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this names a simulated instrument
    pub fn is_virtual(&self) -> bool {
        self.0.starts_with(VIRTUAL_PORT_PREFIX)
    }

    /// Simulator name, for virtual addresses
    pub fn virtual_name(&self) -> Option<&str> {
        self.0.strip_prefix(VIRTUAL_PORT_PREFIX)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Source of reachable instrument addresses
pub trait DeviceRegistry {
    /// List the addresses reachable right now, in no particular order
    fn enumerate(&self) -> Result<Vec<Address>, DetectError>;

    /// Resolve a case-sensitive substring to exactly one address
    ///
    /// An address listed more than once counts as one device.
    fn resolve(&self, search: &str) -> Result<Address, DetectError> {
        let mut matches: BTreeSet<Address> = self
            .enumerate()?
            .into_iter()
            .filter(|address| address.as_str().contains(search))
            .collect();

        debug!("{:?} matched {} address(es)", search, matches.len());

        let count = matches.len();
        match matches.pop_first() {
            Some(address) if count == 1 => Ok(address),
            _ => Err(DetectError::AmbiguousDevice {
                search: search.to_string(),
                matches: count,
            }),
        }
    }
}

/// Registry over a fixed list of addresses
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    addresses: Vec<Address>,
}

impl StaticRegistry {
    /// Create a registry that always reports the given addresses
    pub fn new<I, A>(addresses: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Address>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
        }
    }
}

impl DeviceRegistry for StaticRegistry {
    fn enumerate(&self) -> Result<Vec<Address>, DetectError> {
        Ok(self.addresses.clone())
    }
}
