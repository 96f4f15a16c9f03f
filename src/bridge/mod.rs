//! Bridge assembly.
//!
//! Wires a transport provider, the shared link state and the HTTP server
//! together.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Bridge`] | Runs the producer and the server |
//! | [`BridgeBuilder`] | Fluent configuration builder |
//! | [`BridgeOptions`] | Validated configuration |
//!
//! # Example
//!
//! ```no_run
//! use pointlink::{Bridge, Result};
//!
//! # async fn example() -> Result<()> {
//! let bridge = Bridge::builder().addr("localhost:8080").build()?;
//!
//! bridge
//!     .run(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for bridge configuration.
pub mod builder;

/// Core bridge implementation.
pub mod core;

/// Bridge options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::BridgeBuilder;
pub use core::Bridge;
pub use options::BridgeOptions;
