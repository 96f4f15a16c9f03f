//! Request handlers.
//!
//! | Route | Handler | Description |
//! |-------|---------|-------------|
//! | `GET /newpoints` | [`poll_points`] | Drain pending records with link status |
//! | `HEAD /newpoints` | [`head_points`] | Headers only, records stay pending |
//! | fallback | [`static_file`] | Files below the static root |

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use tracing::{error, trace};

use crate::link::LinkState;

use super::static_files;

// ============================================================================
// AppState
// ============================================================================

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Shared link buffers.
    pub link: Arc<LinkState>,
    /// Root directory for static files.
    pub static_dir: Arc<PathBuf>,
}

impl AppState {
    /// Creates handler state.
    #[must_use]
    pub fn new(link: Arc<LinkState>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            link,
            static_dir: Arc::new(static_dir.into()),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Serves one poll: every record decoded since the previous poll plus the
/// link status, as JSON.
pub async fn poll_points(State(state): State<AppState>) -> Response {
    let response = state.link.poll();
    let count = response.new_points.len();

    match response.to_json() {
        Ok(body) => {
            trace!(points = count, online = response.serial_is_online, "Served poll");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, points = count, "Failed to serialize poll response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Answers `HEAD` on the poll route without draining pending records.
pub async fn head_points() -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")]).into_response()
}

/// Serves a file from the static root.
pub async fn static_file(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    static_files::serve_file(&state.static_dir, &method, uri.path()).await
}

// ============================================================================
// Tests
// ============================================================================
