//! Error types for the serial point bridge.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use pointlink::{Result, transport::PortProvider};
//!
//! fn first_port(provider: &dyn PortProvider) -> Result<String> {
//!     let ports = provider.available_ports()?;
//!     Ok(ports[0].name().to_string())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Transport | [`Error::PortDiscovery`], [`Error::NoPortsAvailable`], [`Error::PortOpen`], [`Error::TransportRead`] |
//! | Server | [`Error::Server`] |
//! | External | [`Error::Io`], [`Error::Json`] |
//!
//! Malformed records are not errors: the decoder skips them and only
//! counts them.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when bridge options fail validation.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// Port enumeration failed.
    #[error("Port discovery failed: {message}")]
    PortDiscovery {
        /// Description of the enumeration failure.
        message: String,
    },

    /// Enumeration succeeded but found no usable port.
    #[error("No serial ports available")]
    NoPortsAvailable,

    /// Opening a port failed.
    #[error("Failed to open {port}: {message}")]
    PortOpen {
        /// Port that failed to open.
        port: String,
        /// Description of the open failure.
        message: String,
    },

    /// Mid-stream read failure.
    ///
    /// The producer closes the handle and reacquires a port.
    #[error("Read from {port} failed: {message}")]
    TransportRead {
        /// Port the read was issued on.
        port: String,
        /// Description of the read failure.
        message: String,
    },

    // ========================================================================
    // Server Errors
    // ========================================================================
    /// HTTP server bind or serve failure.
    #[error("Server error: {message}")]
    Server {
        /// Description of the server failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a port discovery error.
    #[inline]
    pub fn port_discovery(message: impl Into<String>) -> Self {
        Self::PortDiscovery {
            message: message.into(),
        }
    }

    /// Creates a port open error.
    #[inline]
    pub fn port_open(port: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PortOpen {
            port: port.into(),
            message: message.into(),
        }
    }

    /// Creates a transport read error.
    #[inline]
    pub fn transport_read(port: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportRead {
            port: port.into(),
            message: message.into(),
        }
    }

    /// Creates a server error.
    #[inline]
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error came from the serial transport.
    #[inline]
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::PortDiscovery { .. }
                | Self::NoPortsAvailable
                | Self::PortOpen { .. }
                | Self::TransportRead { .. }
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors are retried by the producer after a backoff.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.is_transport_error()
    }
}

// ============================================================================
// Tests
// ============================================================================
