//! Transport abstraction over device enumeration
//!
//! The engine never talks to the network directly; it polls a [`Transport`]
//! once per scan cycle. The production transport browses DNS-SD
//! ([`mdns::MdnsTransport`]); tests substitute scripted in-memory
//! transports.

pub mod mdns;

use crate::error::Result;

/// One device as reported by a transport during enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    /// Transport-defined identity key, stable across cycles while the
    /// device stays visible
    pub id: String,
    /// Display name
    pub name: String,
    /// Host or address, without a port
    pub host: String,
}

/// A source of device enumerations.
///
/// `enumerate` is called from the engine's scan thread only, once per
/// cycle. It returns a snapshot of every device currently visible; the
/// engine performs the new/known diffing itself. Errors are treated as
/// transient: the engine logs them and retries on the next cycle.
pub trait Transport: Send {
    fn enumerate(&mut self) -> Result<Vec<DeviceRecord>>;
}

/// Factory producing one fresh transport per start epoch.
///
/// Constructing a transport is the only fallible part of engine startup
/// (e.g. the mDNS daemon failing to bind); deferring it into the factory
/// keeps `DiscoveryEngine::new` infallible and reports setup problems
/// lazily on `start`.
pub type TransportFactory = Box<dyn Fn() -> Result<Box<dyn Transport>> + Send + Sync>;
