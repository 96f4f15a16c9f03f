//! Pointlink - serial coordinate stream to HTTP bridge.
//!
//! Reads `x,y` records from a serial device and serves them to browser
//! clients that poll over HTTP.
//!
//! # Architecture
//!
//! The bridge runs two independent activities around one shared state:
//!
//! - **Producer (thread)**: acquires a port, reads bytes, reconnects after
//!   failures with a fixed backoff
//! - **Poll handlers (tokio)**: drain decoded records with the link status
//!
//! Key design principles:
//!
//! - All shared data lives in [`LinkState`] behind a single lock
//! - Serial reads never happen under the lock
//! - Malformed input is skipped line by line, never fatal
//! - Records are delivered at most once
//!
//! # Quick Start
//!
//! ```no_run
//! use pointlink::{Bridge, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let bridge = Bridge::builder()
//!         .addr("localhost:8080")
//!         .static_dir("./static")
//!         .build()?;
//!
//!     bridge
//!         .run(async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bridge`] | Bridge assembly and configuration |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`link`] | Shared buffers and the reader loop |
//! | [`protocol`] | Line decoder and wire types |
//! | [`server`] | HTTP routes and static files |
//! | [`transport`] | Serial and synthetic byte sources |

// ============================================================================
// Modules
// ============================================================================

/// Bridge assembly and configuration.
///
/// Use [`Bridge::builder()`] to create a configured bridge.
pub mod bridge;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Shared link state and the producer loop.
pub mod link;

/// Line decoder and JSON wire types.
pub mod protocol;

/// HTTP server.
pub mod server;

/// Byte-stream transports.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Bridge types
pub use bridge::{Bridge, BridgeBuilder, BridgeOptions};

// Error types
pub use error::{Error, Result};

// Link types
pub use link::{BufferLimits, DecodeMode, LinkState, LinkStatus, Producer};

// Protocol types
pub use protocol::{Point, PollResponse};

// Transport types
pub use transport::{PortId, PortProvider, SerialPortProvider, SerialSettings, SineWaveProvider, TransportHandle};
