//! Static file serving for the viewer page.
//!
//! Requests are resolved against a root directory. The path is
//! percent-decoded, split into components, and refused when any component
//! could leave the root (`..`, absolute prefixes). Directory requests map to
//! their `index.html`.

// ============================================================================
// Imports
// ============================================================================

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

// ============================================================================
// Constants
// ============================================================================

/// File served for directory requests.
const INDEX_FILE: &str = "index.html";

/// Fallback media type.
const OCTET_STREAM: &str = "application/octet-stream";

// ============================================================================
// Path Resolution
// ============================================================================

/// Maps a request path onto a file below `root`.
///
/// Returns `None` when the path cannot be decoded or would escape `root`.
#[must_use]
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(request_path).ok()?;
    let relative = decoded.trim_start_matches('/');

    let mut path = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if relative.is_empty() || relative.ends_with('/') {
        path.push(INDEX_FILE);
    }

    Some(path)
}

/// Returns the media type for `path` based on its extension.
#[must_use]
pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("wasm") => "application/wasm",
        _ => OCTET_STREAM,
    }
}

// ============================================================================
// Serving
// ============================================================================

/// Serves one static file request.
pub async fn serve_file(root: &Path, method: &Method, request_path: &str) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let Some(mut path) = resolve(root, request_path) else {
        debug!(path = request_path, "Rejected static path");
        return StatusCode::NOT_FOUND.into_response();
    };

    if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_dir()) {
        path.push(INDEX_FILE);
    }

    match tokio::fs::read(&path).await {
        Ok(body) => {
            let headers = [(header::CONTENT_TYPE, content_type(&path))];
            if method == Method::HEAD {
                (headers, Vec::new()).into_response()
            } else {
                (headers, body).into_response()
            }
        }
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            debug!(path = %path.display(), "Static file not found");
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read static file");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
