//! Decoded records and the poll response body.
//!
//! The JSON field names are the wire contract browser clients depend on
//! and must not change.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// Point
// ============================================================================

/// One `(x, y)` coordinate decoded from the device stream.
///
/// # Format
///
/// ```json
/// { "x": 43.0, "y": 324.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

// ============================================================================
// PollResponse
// ============================================================================

/// Body of a `GET /newpoints` response.
///
/// # Format
///
/// ```json
/// {
///   "Newpoints": [{ "x": 1.0, "y": 2.0 }],
///   "SerialIsOnline": true
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollResponse {
    /// Records decoded since the previous poll, oldest first.
    #[serde(rename = "Newpoints")]
    pub new_points: Vec<Point>,

    /// Whether the serial link is currently delivering data.
    #[serde(rename = "SerialIsOnline")]
    pub serial_is_online: bool,
}

impl PollResponse {
    /// Serializes the response to its JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_json(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
