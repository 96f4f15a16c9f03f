//! Shared buffers between the serial producer and poll handlers.
//!
//! A single lock guards the raw byte buffer, the pending records and the
//! link flag as one unit. Neither side touches the fields directly; the
//! producer calls [`LinkState::append_bytes`] and [`LinkState::mark_offline`],
//! handlers call [`LinkState::poll`].
//!
//! Transport reads never happen under the lock, so a poll waits at most for
//! one buffer update, not for a serial read.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::protocol::{Point, PollResponse, decode};

use super::{BufferLimits, DecodeMode, LinkStatus};

// ============================================================================
// Buffers
// ============================================================================

/// State guarded by the lock.
#[derive(Debug, Default)]
struct Buffers {
    /// Received bytes not yet consumed by the decoder.
    raw: Vec<u8>,
    /// Decoded records awaiting the next poll.
    pending: VecDeque<Point>,
    /// Whether a read has succeeded since the last failure.
    online: bool,
    /// The front of `raw` belongs to a line already dropped; skip it up to
    /// its `\n` before decoding.
    discarding: bool,
}

impl Buffers {
    /// Runs the decoder over `raw`, keeping only the undecoded tail.
    fn decode_raw(&mut self) {
        if self.discarding {
            let Some(newline) = self.raw.iter().position(|&b| b == b'\n') else {
                self.raw.clear();
                return;
            };
            trace!(bytes = newline + 1, "Skipped rest of dropped line");
            self.raw.drain(..=newline);
            self.discarding = false;
        }

        let out = decode(&mut self.pending, &self.raw);
        let consumed = self.raw.len() - out.rest.len();
        let (records, dropped) = (out.records, out.dropped);
        self.discarding = out.discarding;
        self.raw.drain(..consumed);

        if dropped > 0 {
            debug!(records, dropped, "Dropped malformed serial lines");
        } else if records > 0 {
            trace!(records, "Decoded serial records");
        }
    }

    /// Applies the overflow policy: oldest records and leading lines go first.
    fn enforce_limits(&mut self, limits: &BufferLimits) {
        if self.pending.len() > limits.max_pending {
            let excess = self.pending.len() - limits.max_pending;
            self.pending.drain(..excess);
            warn!(
                dropped = excess,
                max = limits.max_pending,
                "Pending records overflowed, dropping oldest"
            );
        }

        if self.raw.len() > limits.max_raw_bytes {
            let excess = self.raw.len() - limits.max_raw_bytes;
            // Cut on a line boundary so no partial record survives at the front.
            let cut = match self.raw[excess - 1..].iter().position(|&b| b == b'\n') {
                Some(i) => {
                    self.discarding = false;
                    excess + i
                }
                None => {
                    self.discarding = true;
                    self.raw.len()
                }
            };
            self.raw.drain(..cut);
            warn!(
                dropped = cut,
                max = limits.max_raw_bytes,
                "Raw buffer overflowed, dropping oldest lines"
            );
        }
    }
}

// ============================================================================
// LinkState
// ============================================================================

/// Shared state of one serial link.
///
/// # Thread Safety
///
/// `LinkState` is `Send + Sync`; share it with `Arc`. Every operation
/// takes the lock once and never blocks on I/O while holding it.
///
/// # Example
///
/// ```
/// use pointlink::link::{BufferLimits, DecodeMode, LinkState};
///
/// let state = LinkState::new(DecodeMode::OnRead, BufferLimits::default());
/// state.append_bytes(b"1,2\r\n");
///
/// let response = state.poll();
/// assert_eq!(response.new_points.len(), 1);
/// assert!(response.serial_is_online);
///
/// // Records are drained by the poll.
/// assert!(state.poll().new_points.is_empty());
/// ```
#[derive(Debug)]
pub struct LinkState {
    /// Buffers and link flag, locked together.
    buffers: Mutex<Buffers>,
    /// Where decoding runs.
    mode: DecodeMode,
    /// Overflow caps.
    limits: BufferLimits,
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new(DecodeMode::default(), BufferLimits::default())
    }
}

impl LinkState {
    /// Creates an empty, offline link.
    #[must_use]
    pub fn new(mode: DecodeMode, limits: BufferLimits) -> Self {
        Self {
            buffers: Mutex::new(Buffers::default()),
            mode,
            limits,
        }
    }

    /// Returns the configured decode mode.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    /// Returns the current link status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> LinkStatus {
        LinkStatus::from(self.buffers.lock().online)
    }

    /// Returns `true` if the link is connected.
    #[inline]
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.status().is_connected()
    }

    /// Returns the number of records waiting for a poll.
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.buffers.lock().pending.len()
    }

    /// Returns the number of undecoded bytes held.
    #[inline]
    #[must_use]
    pub fn raw_len(&self) -> usize {
        self.buffers.lock().raw.len()
    }

    /// Records a successful read.
    ///
    /// Marks the link connected and appends `bytes` to the raw buffer. In
    /// [`DecodeMode::OnRead`] the buffer is decoded immediately.
    ///
    /// Returns the status before the update.
    pub fn append_bytes(&self, bytes: &[u8]) -> LinkStatus {
        let mut buffers = self.buffers.lock();
        let previous = LinkStatus::from(buffers.online);

        buffers.online = true;
        buffers.raw.extend_from_slice(bytes);
        if self.mode == DecodeMode::OnRead {
            buffers.decode_raw();
        }
        buffers.enforce_limits(&self.limits);

        previous
    }

    /// Records a transport failure.
    ///
    /// Marks the link disconnected. Complete lines still buffered are
    /// decoded; the unterminated tail belongs to the dead connection and is
    /// discarded.
    ///
    /// Returns the status before the update.
    pub fn mark_offline(&self) -> LinkStatus {
        let mut buffers = self.buffers.lock();
        let previous = LinkStatus::from(buffers.online);

        buffers.online = false;
        buffers.decode_raw();
        if !buffers.raw.is_empty() {
            debug!(bytes = buffers.raw.len(), "Discarding partial record from lost link");
            buffers.raw.clear();
        }
        buffers.discarding = false;
        buffers.enforce_limits(&self.limits);

        previous
    }

    /// Serves one poll.
    ///
    /// In [`DecodeMode::OnPoll`] the raw buffer is decoded first. Returns
    /// every pending record with the link status and leaves the pending
    /// queue empty.
    pub fn poll(&self) -> PollResponse {
        let mut buffers = self.buffers.lock();

        if self.mode == DecodeMode::OnPoll {
            buffers.decode_raw();
            buffers.enforce_limits(&self.limits);
        }

        PollResponse {
            new_points: buffers.pending.drain(..).collect(),
            serial_is_online: buffers.online,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
