//! Serial port provider backed by the `serialport` crate.
//!
//! Reads block until at least one byte arrives. The driver-level timeout
//! from [`SerialSettings::read_timeout`] only bounds each underlying
//! syscall; timeouts are retried so callers never see them.

// ============================================================================
// Imports
// ============================================================================

use std::io::{ErrorKind, Read};

use serialport::{SerialPort, SerialPortInfo};
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::{PortId, PortProvider, SerialSettings, TransportHandle};

// ============================================================================
// SerialPortProvider
// ============================================================================

/// Provider for physical serial ports.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialPortProvider;

impl SerialPortProvider {
    /// Creates a new provider.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PortProvider for SerialPortProvider {
    fn available_ports(&self) -> Result<Vec<PortId>> {
        let ports = serialport::available_ports().map_err(|e| Error::port_discovery(e.to_string()))?;

        let ports: Vec<PortId> = ports
            .into_iter()
            .filter(is_calling_unit)
            .map(|info| PortId::new(info.port_name))
            .collect();

        debug!(count = ports.len(), "Enumerated serial ports");
        Ok(ports)
    }

    fn open(&self, port: &PortId, settings: &SerialSettings) -> Result<Box<dyn TransportHandle>> {
        let inner = serialport::new(port.name(), settings.baud_rate)
            .data_bits(settings.serialport_data_bits())
            .stop_bits(settings.serialport_stop_bits())
            .parity(settings.serialport_parity())
            .timeout(settings.read_timeout)
            .open()
            .map_err(|e| Error::port_open(port.name(), e.to_string()))?;

        info!(port = %port, mode = %settings.summary(), "Serial port opened");

        Ok(Box::new(SerialHandle {
            port: port.clone(),
            inner,
        }))
    }
}

/// On macOS only `/dev/cu.*` devices are offered; `/dev/tty.*` blocks on
/// open waiting for carrier detect.
fn is_calling_unit(_info: &SerialPortInfo) -> bool {
    #[cfg(target_os = "macos")]
    {
        !_info.port_name.starts_with("/dev/tty.")
    }
    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}

// ============================================================================
// SerialHandle
// ============================================================================

/// An open serial port.
struct SerialHandle {
    /// Port name, for diagnostics.
    port: PortId,
    /// Driver handle.
    inner: Box<dyn SerialPort>,
}

impl TransportHandle for SerialHandle {
    fn port(&self) -> &PortId {
        &self.port
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.inner.read(buf) {
                // EOF: the device went away
                Ok(0) => return Err(Error::transport_read(self.port.name(), "port closed")),
                Ok(n) => return Ok(n),
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => {}
                Err(e) => return Err(Error::transport_read(self.port.name(), e.to_string())),
            }
        }
    }

    fn close(self: Box<Self>) {
        debug!(port = %self.port, "Serial port closed");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_port_fails() {
        let provider = SerialPortProvider::new();
        let port = PortId::new("/dev/pointlink-does-not-exist");

        let result = provider.open(&port, &SerialSettings::new());
        match result {
            Err(Error::PortOpen { port, .. }) => {
                assert_eq!(port, "/dev/pointlink-does-not-exist");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opening a missing port should fail"),
        }
    }

    #[test]
    fn test_enumeration_does_not_panic() {
        // Hosts without serial hardware return an empty list or an error.
        let _ = SerialPortProvider::new().available_ports();
    }
}
