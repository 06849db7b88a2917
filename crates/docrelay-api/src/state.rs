//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use docrelay_core::config::AppConfig;
use docrelay_database::Stores;
use docrelay_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Presence and notification stores
    pub stores: Stores,
    /// Real-time engine
    pub realtime: RealtimeEngine,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Assemble the state.
    pub fn new(config: AppConfig, stores: Stores, realtime: RealtimeEngine) -> Self {
        Self {
            config: Arc::new(config),
            stores,
            realtime,
            started_at: Instant::now(),
        }
    }
}
