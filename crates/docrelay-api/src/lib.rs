//! # docrelay-api
//!
//! HTTP surface for DocRelay built on Axum: the WebSocket upgrade, the
//! notification and presence REST routes, middleware, DTOs, and error
//! mapping.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
