//! Device line protocol and HTTP wire types.
//!
//! # Protocol Overview
//!
//! | Type | Direction | Purpose |
//! |------|-----------|---------|
//! | `<float>,<float>\r\n` | Device → Bridge | One record per line |
//! | [`Point`] | Bridge → Client | Decoded record |
//! | [`PollResponse`] | Bridge → Client | `GET /newpoints` body |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `decoder` | Stateless incremental line decoder |
//! | `point` | Record and poll response types |

// ============================================================================
// Submodules
// ============================================================================

/// Stateless incremental line decoder.
pub mod decoder;

/// Record and poll response types.
pub mod point;

// ============================================================================
// Re-exports
// ============================================================================

pub use decoder::{Decoded, MAX_LINE_LEN, decode};
pub use point::{Point, PollResponse};
