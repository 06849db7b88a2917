//! # docrelay-realtime
//!
//! Real-time relay for DocRelay. Provides:
//!
//! - WebSocket connection management with bounded per-connection queues
//! - Viewer-action routing against the presence store
//! - Notification feeds with relative timestamps
//! - An ordered push queue in front of the delivery gateway

pub mod connection;
pub mod dispatch;
pub mod gateway;
pub mod message;
pub mod notification;
pub mod presence;
pub mod server;

pub use connection::manager::ConnectionManager;
pub use dispatch::PushDispatcher;
pub use gateway::PushGateway;
pub use notification::service::NotificationService;
pub use presence::router::PresenceRouter;
pub use server::RealtimeEngine;
