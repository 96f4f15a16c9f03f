//! Reader loop feeding [`LinkState`].
//!
//! The producer runs on a dedicated OS thread because serial reads block.
//! Each iteration:
//!
//! 1. Acquires a transport if none is open; on failure waits the backoff.
//! 2. Issues one blocking read outside the lock.
//! 3. On success appends the bytes to the shared state.
//! 4. On failure closes the handle, marks the link offline and waits the
//!    backoff.
//!
//! Errors never escape the loop. It stops only when its shutdown flag is
//! raised.

// ============================================================================
// Imports
// ============================================================================

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::transport::{PortProvider, SerialSettings, TransportHandle};

use super::{LinkState, LinkStatus};

// ============================================================================
// Constants
// ============================================================================

/// Default wait after a failed acquire or read.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Default size of the read scratch buffer.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

/// Name of the producer thread.
const THREAD_NAME: &str = "pointlink-serial";

// ============================================================================
// Step
// ============================================================================

/// Outcome of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// No transport could be acquired.
    AcquireFailed,
    /// A read delivered this many bytes.
    Read(usize),
    /// The open transport failed and was closed.
    ReadFailed,
}

// ============================================================================
// Producer
// ============================================================================

/// Serial reader loop.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use pointlink::link::{LinkState, Producer};
/// use pointlink::transport::{SerialPortProvider, SerialSettings};
///
/// let state = Arc::new(LinkState::default());
/// let producer = Producer::new(
///     Arc::new(SerialPortProvider::new()),
///     SerialSettings::new(),
///     Arc::clone(&state),
/// );
///
/// let _thread = producer.spawn().expect("spawn producer");
/// ```
pub struct Producer {
    /// Source of transport handles.
    provider: Arc<dyn PortProvider>,
    /// Line settings used on every acquire.
    settings: SerialSettings,
    /// Shared buffers.
    state: Arc<LinkState>,
    /// Wait after a failed acquire or read.
    backoff: Duration,
    /// Size of the read scratch buffer.
    read_buffer_size: usize,
    /// Raised by the owner to stop the loop.
    shutdown: Arc<AtomicBool>,
}

impl Producer {
    /// Creates a producer with default backoff and buffer size.
    #[must_use]
    pub fn new(provider: Arc<dyn PortProvider>, settings: SerialSettings, state: Arc<LinkState>) -> Self {
        Self {
            provider,
            settings,
            state,
            backoff: DEFAULT_BACKOFF,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sets the wait after a failed acquire or read.
    #[inline]
    #[must_use]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets the read scratch buffer size. Zero is raised to one byte.
    #[inline]
    #[must_use]
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    /// Uses an externally owned shutdown flag.
    #[inline]
    #[must_use]
    pub fn with_shutdown_flag(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Returns the shutdown flag. Storing `true` stops the loop after the
    /// current iteration.
    #[inline]
    #[must_use]
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Runs the loop on a dedicated thread.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the thread cannot be spawned.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || self.run())
    }

    /// Runs the loop on the current thread until shutdown.
    pub fn run(self) {
        let mut transport = None;
        let mut buf = vec![0u8; self.read_buffer_size];

        info!(mode = %self.settings.summary(), "Serial producer started");

        while !self.shutdown.load(Ordering::Relaxed) {
            self.step(&mut transport, &mut buf);
        }

        if let Some(transport) = transport.take() {
            transport.close();
        }

        info!("Serial producer stopped");
    }

    /// Runs one iteration.
    fn step(&self, slot: &mut Option<Box<dyn TransportHandle>>, buf: &mut [u8]) -> Step {
        if slot.is_none() {
            match self.provider.acquire(&self.settings) {
                Ok(transport) => {
                    info!(port = %transport.port(), "Connecting to serial port");
                    *slot = Some(transport);
                }
                Err(e) => {
                    log_failure(&e, "open");
                    self.wait_backoff();
                    return Step::AcquireFailed;
                }
            }
        }

        let Some(transport) = slot.as_mut() else {
            return Step::AcquireFailed;
        };

        match transport.read(buf) {
            Ok(n) => {
                if self.state.append_bytes(&buf[..n]) == LinkStatus::Disconnected {
                    info!(port = %transport.port(), "Serial link online");
                }
                Step::Read(n)
            }
            Err(e) => {
                log_failure(&e, "read");
                if let Some(transport) = slot.take() {
                    transport.close();
                }
                if self.state.mark_offline() == LinkStatus::Connected {
                    info!("Serial link offline");
                }
                self.wait_backoff();
                Step::ReadFailed
            }
        }
    }

    /// Sleeps for the backoff interval.
    fn wait_backoff(&self) {
        if !self.backoff.is_zero() {
            debug!(backoff_ms = self.backoff.as_millis() as u64, "Backing off");
            thread::sleep(self.backoff);
        }
    }
}

/// Logs a failed open or read. Errors outside the transport are logged at
/// error level; the loop retries either way.
fn log_failure(e: &Error, action: &'static str) {
    if e.is_recoverable() {
        warn!(error = %e, action, "Serial transport failed");
    } else {
        error!(error = %e, action, "Serial producer failed");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::time::Instant;

    use parking_lot::Mutex;

    use crate::error::Result;
    use crate::link::{BufferLimits, DecodeMode};
    use crate::protocol::Point;
    use crate::transport::PortId;

    /// One scripted transport event.
    #[derive(Debug, Clone)]
    enum Event {
        Data(&'static [u8]),
        Fail,
    }

    /// Outcome of one scripted open.
    enum Open {
        Events(Vec<Event>),
        Busy,
        Misconfigured,
    }

    /// Plays back a list of opens; each successful open carries its reads.
    struct ScriptedProvider {
        opens: Mutex<VecDeque<Open>>,
    }

    impl ScriptedProvider {
        fn new(opens: Vec<Open>) -> Arc<Self> {
            Arc::new(Self {
                opens: Mutex::new(opens.into()),
            })
        }
    }

    impl PortProvider for ScriptedProvider {
        fn available_ports(&self) -> Result<Vec<PortId>> {
            Ok(vec![PortId::new("scripted")])
        }

        fn open(&self, port: &PortId, _settings: &SerialSettings) -> Result<Box<dyn TransportHandle>> {
            match self.opens.lock().pop_front() {
                Some(Open::Events(events)) => Ok(Box::new(ScriptedHandle {
                    port: port.clone(),
                    events: events.into(),
                })),
                Some(Open::Busy) => Err(Error::port_open(port.name(), "busy")),
                Some(Open::Misconfigured) => Err(Error::config("unsupported baud rate")),
                None => Err(Error::NoPortsAvailable),
            }
        }
    }

    struct ScriptedHandle {
        port: PortId,
        events: VecDeque<Event>,
    }

    impl TransportHandle for ScriptedHandle {
        fn port(&self) -> &PortId {
            &self.port
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            match self.events.pop_front() {
                Some(Event::Data(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(bytes);
                    Ok(bytes.len())
                }
                Some(Event::Fail) | None => Err(Error::transport_read(self.port.name(), "unplugged")),
            }
        }
    }

    fn producer(provider: Arc<ScriptedProvider>, state: &Arc<LinkState>) -> Producer {
        Producer::new(provider, SerialSettings::new(), Arc::clone(state)).with_backoff(Duration::ZERO)
    }

    #[test]
    fn test_read_failure_flips_status() {
        let provider = ScriptedProvider::new(vec![
            Open::Events(vec![Event::Data(b"1,2\r\n"), Event::Fail]),
            Open::Events(vec![Event::Data(b"3,4\r\n")]),
        ]);
        let state = Arc::new(LinkState::default());
        let producer = producer(provider, &state);
        let mut slot = None;
        let mut buf = vec![0u8; 64];

        assert_eq!(producer.step(&mut slot, &mut buf), Step::Read(5));
        let response = state.poll();
        assert!(response.serial_is_online);
        assert_eq!(response.new_points, vec![Point::new(1.0, 2.0)]);

        assert_eq!(producer.step(&mut slot, &mut buf), Step::ReadFailed);
        assert!(slot.is_none());
        let response = state.poll();
        assert!(!response.serial_is_online);
        assert!(response.new_points.is_empty());

        assert_eq!(producer.step(&mut slot, &mut buf), Step::Read(5));
        let response = state.poll();
        assert!(response.serial_is_online);
        assert_eq!(response.new_points, vec![Point::new(3.0, 4.0)]);
    }

    #[test]
    fn test_acquire_failure_retries() {
        let provider = ScriptedProvider::new(vec![Open::Busy, Open::Events(vec![Event::Data(b"5,6\r\n")])]);
        let state = Arc::new(LinkState::default());
        let producer = producer(provider, &state);
        let mut slot = None;
        let mut buf = vec![0u8; 64];

        assert_eq!(producer.step(&mut slot, &mut buf), Step::AcquireFailed);
        assert!(slot.is_none());
        assert!(!state.is_online());

        assert_eq!(producer.step(&mut slot, &mut buf), Step::Read(5));
        assert!(state.is_online());
    }

    #[test]
    fn test_non_transport_failure_retries() {
        let provider = ScriptedProvider::new(vec![Open::Misconfigured, Open::Events(vec![Event::Data(b"8,9\r\n")])]);
        let state = Arc::new(LinkState::default());
        let producer = producer(provider, &state);
        let mut slot = None;
        let mut buf = vec![0u8; 64];

        assert_eq!(producer.step(&mut slot, &mut buf), Step::AcquireFailed);
        assert_eq!(producer.step(&mut slot, &mut buf), Step::Read(5));
        assert_eq!(state.poll().new_points, vec![Point::new(8.0, 9.0)]);
    }

    #[test]
    fn test_open_handle_is_reused() {
        let provider = ScriptedProvider::new(vec![Open::Events(vec![Event::Data(b"12,3"), Event::Data(b"4\r\n")])]);
        let state = Arc::new(LinkState::default());
        let producer = producer(Arc::clone(&provider), &state);
        let mut slot = None;
        let mut buf = vec![0u8; 64];

        producer.step(&mut slot, &mut buf);
        producer.step(&mut slot, &mut buf);

        assert!(provider.opens.lock().is_empty());
        assert_eq!(state.poll().new_points, vec![Point::new(12.0, 34.0)]);
    }

    #[test]
    fn test_decode_on_poll_mode() {
        let provider = ScriptedProvider::new(vec![Open::Events(vec![Event::Data(b"7,8\r\n")])]);
        let state = Arc::new(LinkState::new(DecodeMode::OnPoll, BufferLimits::default()));
        let producer = producer(provider, &state);
        let mut slot = None;
        let mut buf = vec![0u8; 64];

        producer.step(&mut slot, &mut buf);
        assert_eq!(state.pending_len(), 0);
        assert_eq!(state.poll().new_points, vec![Point::new(7.0, 8.0)]);
    }

    #[test]
    fn test_run_stops_on_shutdown() {
        let provider = ScriptedProvider::new(vec![Open::Events(vec![Event::Data(b"1,1\r\n2,2\r\n")])]);
        let state = Arc::new(LinkState::default());
        let producer = Producer::new(provider, SerialSettings::new(), Arc::clone(&state))
            .with_backoff(Duration::from_millis(1));
        let shutdown = producer.shutdown_flag();
        let handle = producer.spawn().expect("spawn producer");

        let deadline = Instant::now() + Duration::from_secs(5);
        while (state.pending_len() < 2 || state.is_online()) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }

        shutdown.store(true, Ordering::Relaxed);
        handle.join().expect("producer thread");

        let response = state.poll();
        assert_eq!(
            response.new_points,
            vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)]
        );
        // Script ran out, so the link ended offline.
        assert!(!response.serial_is_online);
    }

    #[test]
    fn test_zero_read_buffer_is_raised() {
        let provider = ScriptedProvider::new(Vec::new());
        let state = Arc::new(LinkState::default());
        let producer = producer(provider, &state).with_read_buffer_size(0);
        assert_eq!(producer.read_buffer_size, 1);
    }
}
