//! CORS layer built from `[server.cors]`.

use std::time::Duration;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use docrelay_core::config::CorsConfig;

/// Builds the CORS layer. Entries that do not parse are skipped with a warning.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_headers(Any)
        .allow_origin(allowed_origins(&config.allowed_origins))
        .allow_methods(allowed_methods(&config.allowed_methods))
        .max_age(Duration::from_secs(config.max_age_seconds))
}

fn allowed_origins(raw: &[String]) -> AllowOrigin {
    if raw.iter().any(|o| o == "*") {
        return AllowOrigin::any();
    }
    AllowOrigin::list(raw.iter().filter_map(|origin| match origin.parse::<HeaderValue>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(origin = %origin, "Ignoring invalid CORS origin");
            None
        }
    }))
}

fn allowed_methods(raw: &[String]) -> Vec<Method> {
    raw.iter()
        .filter_map(|method| match method.to_ascii_uppercase().parse::<Method>() {
            Ok(m) => Some(m),
            Err(_) => {
                warn!(method = %method, "Ignoring invalid CORS method");
                None
            }
        })
        .collect()
}
