//! Byte-stream transports feeding the bridge.
//!
//! The link layer only needs two things from a transport: a way to acquire
//! a handle and a blocking `read`. Everything device specific lives behind
//! [`PortProvider`] and [`TransportHandle`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  available_ports / open   ┌──────────────────┐
//! │   Producer   │──────────────────────────►│   PortProvider   │
//! │ (link layer) │                           └────────┬─────────┘
//! │              │        read / close       ┌────────▼─────────┐
//! │              │◄─────────────────────────►│ TransportHandle  │
//! └──────────────┘                           └──────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `mock` | Synthetic sine-wave source |
//! | `serial` | `serialport` backed provider |
//! | `settings` | Line settings (baud, parity, data and stop bits) |

// ============================================================================
// Submodules
// ============================================================================

/// Synthetic sine-wave source.
pub mod mock;

/// Serial port provider backed by the `serialport` crate.
pub mod serial;

/// Serial line settings.
pub mod settings;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use crate::error::{Error, Result};

// ============================================================================
// Re-exports
// ============================================================================

pub use mock::SineWaveProvider;
pub use serial::SerialPortProvider;
pub use settings::{Parity, SerialSettings};

// ============================================================================
// PortId
// ============================================================================

/// Name of a port as understood by its provider (e.g. `/dev/ttyUSB0`, `COM3`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortId(String);

impl PortId {
    /// Creates a port identifier from its name.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the port name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PortId {
    #[inline]
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PortId {
    #[inline]
    fn from(name: String) -> Self {
        Self(name)
    }
}

// ============================================================================
// Traits
// ============================================================================

/// An open byte stream.
pub trait TransportHandle: Send {
    /// Returns the port this handle reads from.
    fn port(&self) -> &PortId;

    /// Reads at least one byte into `buf`, blocking until data is available.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransportRead`] when the stream fails. The handle
    /// is unusable afterwards and should be closed.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Closes the handle.
    fn close(self: Box<Self>) {}
}

/// Source of [`TransportHandle`]s.
pub trait PortProvider: Send + Sync {
    /// Lists the ports currently available, in preference order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PortDiscovery`] if enumeration fails.
    fn available_ports(&self) -> Result<Vec<PortId>>;

    /// Opens `port` with the given line settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PortOpen`] if the port cannot be opened.
    fn open(&self, port: &PortId, settings: &SerialSettings) -> Result<Box<dyn TransportHandle>>;

    /// Picks a port and opens it.
    ///
    /// Uses [`SerialSettings::port`] when set, otherwise the first
    /// available port.
    ///
    /// # Errors
    ///
    /// - [`Error::PortDiscovery`] if enumeration fails
    /// - [`Error::NoPortsAvailable`] if no port was found
    /// - [`Error::PortOpen`] if the chosen port cannot be opened
    fn acquire(&self, settings: &SerialSettings) -> Result<Box<dyn TransportHandle>> {
        let port = match &settings.port {
            Some(port) => port.clone(),
            None => self
                .available_ports()?
                .into_iter()
                .next()
                .ok_or(Error::NoPortsAvailable)?,
        };

        self.open(&port, settings)
    }
}

// ============================================================================
// Tests
// ============================================================================
