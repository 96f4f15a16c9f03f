//! Bridge coordinator.
//!
//! The [`Bridge`] owns the shared [`LinkState`], starts the producer thread
//! and serves HTTP until told to stop.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use tracing::{debug, info};

use crate::error::Result;
use crate::link::{LinkState, Producer};
use crate::server;
use crate::transport::PortProvider;

use super::builder::BridgeBuilder;
use super::options::BridgeOptions;

// ============================================================================
// Bridge
// ============================================================================

/// Serial-to-HTTP bridge.
///
/// The bridge is responsible for:
/// - Reading the device on a dedicated thread with reconnects
/// - Buffering decoded records between polls
/// - Serving the poll endpoint and the viewer page
pub struct Bridge {
    /// Validated configuration.
    options: BridgeOptions,
    /// Byte source handed to the producer.
    provider: Arc<dyn PortProvider>,
    /// Buffers shared by producer and handlers.
    state: Arc<LinkState>,
    /// Stops the producer loop.
    shutdown: Arc<AtomicBool>,
}

// ============================================================================
// Bridge - Display
// ============================================================================

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("addr", &self.options.addr)
            .field("online", &self.state.is_online())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Bridge - Public API
// ============================================================================

impl Bridge {
    /// Creates a configuration builder for the bridge.
    #[inline]
    #[must_use]
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::new()
    }

    /// Creates a bridge from validated options.
    pub(crate) fn new(options: BridgeOptions, provider: Arc<dyn PortProvider>) -> Self {
        let state = Arc::new(LinkState::new(options.decode_mode, options.limits));

        Self {
            options,
            provider,
            state,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// Returns the shared link state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> Arc<LinkState> {
        Arc::clone(&self.state)
    }

    /// Starts the producer thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the thread cannot be spawned.
    pub fn spawn_producer(&self) -> Result<JoinHandle<()>> {
        let producer = Producer::new(
            Arc::clone(&self.provider),
            self.options.serial.clone(),
            Arc::clone(&self.state),
        )
        .with_backoff(self.options.backoff)
        .with_read_buffer_size(self.options.read_buffer_size)
        .with_shutdown_flag(Arc::clone(&self.shutdown));

        Ok(producer.spawn()?)
    }

    /// Binds the configured address and runs until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// - [`Error::Server`](crate::Error::Server) if binding or serving fails
    /// - [`Error::Io`](crate::Error::Io) if the producer cannot be started
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = server::bind(self.options.addr.as_str()).await?;
        self.serve(listener, shutdown).await
    }

    /// Runs on an already bound listener until `shutdown` resolves.
    ///
    /// The producer is signalled to stop afterwards. It exits on its next
    /// iteration and is not joined, since it may be parked in a blocking read.
    ///
    /// # Errors
    ///
    /// - [`Error::Server`](crate::Error::Server) if serving fails
    /// - [`Error::Io`](crate::Error::Io) if the producer cannot be started
    pub async fn serve<F>(self, listener: tokio::net::TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let _producer = self.spawn_producer()?;

        info!(
            addr = %self.options.addr,
            static_dir = %self.options.static_dir.display(),
            mode = ?self.options.decode_mode,
            "Bridge started"
        );

        let router = server::router(Arc::clone(&self.state), self.options.static_dir.clone());
        let result = server::serve(listener, router, shutdown).await;

        self.shutdown();
        result
    }

    /// Signals the producer to stop.
    pub fn shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::Relaxed) {
            debug!("Producer shutdown requested");
        }
    }

    /// Returns `true` once shutdown was requested.
    #[inline]
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Tests
// ============================================================================
