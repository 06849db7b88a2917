//! Route definitions for the DocRelay HTTP API.
//!
//! REST routes are mounted under `/api`; the socket lives at `/ws`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(notification_routes())
        .merge(presence_routes())
        .route("/health", get(handlers::health::health));

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Notification feed endpoints
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            post(handlers::notification::create_notification),
        )
        .route(
            "/notifications/{user_id}",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/{user_id}/read-all",
            put(handlers::notification::mark_all_read),
        )
}

/// Presence record endpoints for the document lifecycle
fn presence_routes() -> Router<AppState> {
    Router::new().route(
        "/documents/{id}/presence",
        get(handlers::presence::get_presence).put(handlers::presence::register_presence),
    )
}
