//! Serial link management.
//!
//! The link layer owns everything shared between the serial side and the
//! HTTP side:
//!
//! ```text
//! ┌──────────────┐  append_bytes    ┌─────────────┐     poll     ┌──────────────┐
//! │   Producer   │ ───────────────► │  LinkState  │ ◄─────────── │ Poll handler │
//! │ (own thread) │  mark_offline    │  (1 lock)   │              │ (tokio task) │
//! └──────┬───────┘                  └─────────────┘              └──────────────┘
//!        │ acquire / read / close
//!        ▼
//!   PortProvider
//! ```
//!
//! # Link States
//!
//! | From | Event | To |
//! |------|-------|----|
//! | `Disconnected` | first successful read after acquire | `Connected` |
//! | `Connected` | read fails | `Disconnected` |
//! | `Disconnected` | acquire fails (after backoff) | `Disconnected` |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `producer` | Reader loop with reconnect and backoff |
//! | `state` | Locked buffers and link flag |

// ============================================================================
// Submodules
// ============================================================================

/// Reader loop with reconnect and backoff.
pub mod producer;

/// Locked buffers and link flag.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use producer::Producer;
pub use state::LinkState;

// ============================================================================
// Constants
// ============================================================================

/// Default cap on records waiting for a poll.
pub const DEFAULT_MAX_PENDING: usize = 65_536;

/// Default cap on undecoded bytes held.
pub const DEFAULT_MAX_RAW_BYTES: usize = 1024 * 1024;

// ============================================================================
// LinkStatus
// ============================================================================

/// Connectivity of the serial link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkStatus {
    /// No read has succeeded since the last failure.
    #[default]
    Disconnected,
    /// The transport is delivering data.
    Connected,
}

impl LinkStatus {
    /// Returns `true` if connected.
    #[inline]
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl From<bool> for LinkStatus {
    #[inline]
    fn from(online: bool) -> Self {
        if online {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }
}

// ============================================================================
// DecodeMode
// ============================================================================

/// Where raw bytes are turned into records.
///
/// Either way each byte span is decoded exactly once, under the lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeMode {
    /// The producer decodes right after each read.
    #[default]
    OnRead,
    /// The poll handler decodes when a client asks.
    OnPoll,
}

// ============================================================================
// BufferLimits
// ============================================================================

/// Caps on the shared buffers.
///
/// Overflow drops the oldest data: whole records from the pending queue,
/// whole lines from the raw buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLimits {
    /// Maximum records waiting for a poll.
    pub max_pending: usize,
    /// Maximum undecoded bytes held.
    pub max_raw_bytes: usize,
}

impl Default for BufferLimits {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferLimits {
    /// Creates the default limits.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_pending: DEFAULT_MAX_PENDING,
            max_raw_bytes: DEFAULT_MAX_RAW_BYTES,
        }
    }

    /// Sets the pending record cap.
    #[inline]
    #[must_use]
    pub const fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }

    /// Sets the raw byte cap.
    #[inline]
    #[must_use]
    pub const fn with_max_raw_bytes(mut self, max_raw_bytes: usize) -> Self {
        self.max_raw_bytes = max_raw_bytes;
        self
    }

    /// Validates the limits.
    ///
    /// # Errors
    ///
    /// Returns error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_pending == 0 {
            return Err("Pending record cap must be greater than zero".to_string());
        }
        if self.max_raw_bytes < crate::protocol::MAX_LINE_LEN {
            return Err(format!(
                "Raw buffer cap must hold at least one line ({} bytes)",
                crate::protocol::MAX_LINE_LEN
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
