//! Bridge configuration.
//!
//! # Example
//!
//! ```
//! use pointlink::bridge::BridgeOptions;
//! use pointlink::link::DecodeMode;
//!
//! let options = BridgeOptions::new()
//!     .with_addr("127.0.0.1:9000")
//!     .with_static_dir("./viewer")
//!     .with_decode_mode(DecodeMode::OnPoll);
//!
//! assert!(options.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::link::producer::{DEFAULT_BACKOFF, DEFAULT_READ_BUFFER_SIZE};
use crate::link::{BufferLimits, DecodeMode};
use crate::transport::SerialSettings;

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP bind address.
pub const DEFAULT_ADDR: &str = "localhost:8080";

/// Default static file root.
pub const DEFAULT_STATIC_DIR: &str = "./static";

// ============================================================================
// BridgeOptions
// ============================================================================

/// Everything needed to run one bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeOptions {
    /// HTTP bind address (`host:port`).
    pub addr: String,

    /// Directory served for non-API paths.
    pub static_dir: PathBuf,

    /// Serial line settings.
    pub serial: SerialSettings,

    /// Where decoding runs.
    pub decode_mode: DecodeMode,

    /// Overflow caps on the shared buffers.
    pub limits: BufferLimits,

    /// Wait after a failed acquire or read.
    pub backoff: Duration,

    /// Producer read buffer size in bytes.
    pub read_buffer_size: usize,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl BridgeOptions {
    /// Creates options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            serial: SerialSettings::new(),
            decode_mode: DecodeMode::OnRead,
            limits: BufferLimits::new(),
            backoff: DEFAULT_BACKOFF,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl BridgeOptions {
    /// Sets the HTTP bind address.
    #[inline]
    #[must_use]
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    /// Sets the static file root.
    #[inline]
    #[must_use]
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    /// Sets the serial line settings.
    #[inline]
    #[must_use]
    pub fn with_serial(mut self, serial: SerialSettings) -> Self {
        self.serial = serial;
        self
    }

    /// Sets where decoding runs.
    #[inline]
    #[must_use]
    pub fn with_decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }

    /// Sets the buffer caps.
    #[inline]
    #[must_use]
    pub fn with_limits(mut self, limits: BufferLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the backoff after failures.
    #[inline]
    #[must_use]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets the producer read buffer size.
    #[inline]
    #[must_use]
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl BridgeOptions {
    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.addr.trim().is_empty() {
            return Err("HTTP address must not be empty".to_string());
        }
        if !self.addr.contains(':') {
            return Err(format!("HTTP address must be host:port, got '{}'", self.addr));
        }
        if self.read_buffer_size == 0 {
            return Err("Read buffer size must be greater than zero".to_string());
        }
        self.serial.validate()?;
        self.limits.validate()?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
