//! HTTP surface of the bridge.
//!
//! Serves the polling endpoint and the static viewer page on one `axum`
//! router. Handlers never touch the serial side; they only call
//! [`LinkState::poll`].
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `routes` | Handlers and their shared state |
//! | `static_files` | Path resolution and file responses |

// ============================================================================
// Submodules
// ============================================================================

/// Request handlers.
pub mod routes;

/// Static file serving.
pub mod static_files;

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::link::LinkState;

// ============================================================================
// Re-exports
// ============================================================================

pub use routes::AppState;

// ============================================================================
// Constants
// ============================================================================

/// Polling endpoint path.
pub const POLL_PATH: &str = "/newpoints";

// ============================================================================
// Router
// ============================================================================

/// Builds the router for `link` with files served from `static_dir`.
#[must_use]
pub fn router(link: Arc<LinkState>, static_dir: impl Into<PathBuf>) -> Router {
    let state = AppState::new(link, static_dir);

    Router::new()
        .route(POLL_PATH, get(routes::poll_points).head(routes::head_points))
        .fallback(routes::static_file)
        .with_state(state)
}

// ============================================================================
// Serving
// ============================================================================

/// Binds a listener on `addr`.
///
/// # Errors
///
/// Returns [`Error::Server`] if the address cannot be bound.
pub async fn bind(addr: impl ToSocketAddrs) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::server(format!("bind failed: {e}")))?;

    debug!(addr = ?listener.local_addr().ok(), "HTTP listener bound");
    Ok(listener)
}

/// Serves `router` on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`Error::Server`] if the server fails.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: Option<SocketAddr> = listener.local_addr().ok();
    info!(addr = ?addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::server(e.to_string()))?;

    info!("HTTP server stopped");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
