//! Access log for the HTTP surface.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, info, warn};

/// Paths logged at `debug` unless they fail.
const QUIET_PATHS: &[&str] = &["/api/health"];

/// Logs one line per request: server errors at `warn`, health checks at `debug`.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), elapsed_ms, "Request failed");
    } else if QUIET_PATHS.contains(&path.as_str()) {
        debug!(%method, %path, status = status.as_u16(), elapsed_ms, "Request served");
    } else {
        info!(%method, %path, status = status.as_u16(), elapsed_ms, "Request served");
    }

    response
}
