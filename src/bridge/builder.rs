//! Builder pattern for bridge configuration.
//!
//! # Example
//!
//! ```no_run
//! use pointlink::Bridge;
//!
//! # async fn example() -> pointlink::Result<()> {
//! let bridge = Bridge::builder()
//!     .addr("localhost:8080")
//!     .static_dir("./static")
//!     .mock()
//!     .build()?;
//!
//! bridge.run(std::future::pending()).await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::link::{BufferLimits, DecodeMode};
use crate::transport::{PortProvider, SerialPortProvider, SerialSettings, SineWaveProvider};

use super::core::Bridge;
use super::options::BridgeOptions;

// ============================================================================
// BridgeBuilder
// ============================================================================

/// Builder for configuring a [`Bridge`].
///
/// Use [`Bridge::builder()`] to create a new builder. Without an explicit
/// provider the bridge reads from real serial ports.
#[derive(Default, Clone)]
pub struct BridgeBuilder {
    /// Options collected so far.
    options: BridgeOptions,
    /// Byte source; `None` selects the serial provider.
    provider: Option<Arc<dyn PortProvider>>,
}

impl std::fmt::Debug for BridgeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeBuilder")
            .field("options", &self.options)
            .field("custom_provider", &self.provider.is_some())
            .finish()
    }
}

// ============================================================================
// BridgeBuilder Implementation
// ============================================================================

impl BridgeBuilder {
    /// Creates a builder with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all options at once.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: BridgeOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the HTTP bind address.
    #[inline]
    #[must_use]
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.options.addr = addr.into();
        self
    }

    /// Sets the static file root.
    #[inline]
    #[must_use]
    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.static_dir = dir.into();
        self
    }

    /// Sets the serial line settings.
    #[inline]
    #[must_use]
    pub fn serial(mut self, settings: SerialSettings) -> Self {
        self.options.serial = settings;
        self
    }

    /// Sets where decoding runs.
    #[inline]
    #[must_use]
    pub fn decode_mode(mut self, mode: DecodeMode) -> Self {
        self.options.decode_mode = mode;
        self
    }

    /// Sets the buffer caps.
    #[inline]
    #[must_use]
    pub fn limits(mut self, limits: BufferLimits) -> Self {
        self.options.limits = limits;
        self
    }

    /// Sets the backoff after failures.
    #[inline]
    #[must_use]
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.options.backoff = backoff;
        self
    }

    /// Reads from the synthetic sine-wave source instead of serial ports.
    #[inline]
    #[must_use]
    pub fn mock(self) -> Self {
        self.provider(Arc::new(SineWaveProvider::new()))
    }

    /// Uses a custom byte source.
    #[inline]
    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn PortProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Builds the bridge with validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the options are invalid.
    pub fn build(self) -> Result<Bridge> {
        self.options.validate().map_err(Error::config)?;

        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(SerialPortProvider::new()));

        Ok(Bridge::new(self.options, provider))
    }
}

// ============================================================================
// Tests
// ============================================================================
