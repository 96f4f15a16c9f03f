//! Synthetic sine-wave source.
//!
//! Emits `"t,sin(t)\r\n"` lines at a fixed pace, exercising the same
//! decode and buffering path as a real device. Useful for front-end work
//! without hardware attached.

// ============================================================================
// Imports
// ============================================================================

use std::thread;
use std::time::Duration;

use tracing::info;

use crate::error::Result;

use super::{PortId, PortProvider, SerialSettings, TransportHandle};

// ============================================================================
// Constants
// ============================================================================

/// Name reported for the synthetic port.
pub const MOCK_PORT: &str = "mock";

/// Default delay between samples.
const DEFAULT_INTERVAL: Duration = Duration::from_millis(10);

/// Default increment of `t` between samples.
const DEFAULT_STEP: f64 = 0.2;

// ============================================================================
// SineWaveProvider
// ============================================================================

/// Provider whose single port streams a sine wave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SineWaveProvider {
    /// Delay between samples.
    interval: Duration,
    /// Increment of `t` between samples.
    step: f64,
}

impl Default for SineWaveProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SineWaveProvider {
    /// Creates a provider sampling every 10 ms with a step of 0.2.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            step: DEFAULT_STEP,
        }
    }

    /// Sets the delay between samples.
    #[inline]
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the increment of `t` between samples.
    #[inline]
    #[must_use]
    pub const fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }
}

impl PortProvider for SineWaveProvider {
    fn available_ports(&self) -> Result<Vec<PortId>> {
        Ok(vec![PortId::new(MOCK_PORT)])
    }

    fn open(&self, port: &PortId, _settings: &SerialSettings) -> Result<Box<dyn TransportHandle>> {
        info!(port = %port, "Synthetic source opened");

        Ok(Box::new(SineWaveHandle {
            port: port.clone(),
            interval: self.interval,
            step: self.step,
            t: 0.0,
            pending: Vec::new(),
        }))
    }
}

// ============================================================================
// SineWaveHandle
// ============================================================================

/// Open synthetic stream.
struct SineWaveHandle {
    port: PortId,
    interval: Duration,
    step: f64,
    /// Next sample position.
    t: f64,
    /// Bytes of the current line not yet handed out.
    pending: Vec<u8>,
}

impl TransportHandle for SineWaveHandle {
    fn port(&self) -> &PortId {
        &self.port
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.pending.is_empty() {
            thread::sleep(self.interval);
            self.pending = format!("{},{}\r\n", self.t, self.t.sin()).into_bytes();
            self.t += self.step;
        }

        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

// ============================================================================
// Tests
// ============================================================================
