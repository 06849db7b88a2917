//! Connection manager: connection lifecycle and frame delivery.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use docrelay_core::config::RealtimeConfig;
use docrelay_core::types::UserId;

use crate::gateway::PushGateway;
use crate::message::envelope::Envelope;

use super::handle::{ConnectionHandle, ConnectionId};
use super::pool::ConnectionPool;

/// Manages all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Connection pool.
    pool: ConnectionPool,
    /// Configuration.
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            pool: ConnectionPool::new(),
            config,
        }
    }

    /// Registers a new connection.
    ///
    /// Returns the connection handle and a receiver for outbound frames.
    pub fn register(&self, user_id: UserId) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.outbound_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(user_id.clone(), tx));

        let existing = self.pool.get_user_connections(&user_id);
        if existing.len() >= self.config.max_connections_per_user {
            warn!(
                user_id = %user_id,
                count = existing.len(),
                max = self.config.max_connections_per_user,
                "User at max connections, oldest will be replaced"
            );
            if let Some(oldest) = existing.iter().min_by_key(|c| c.connected_at) {
                oldest.mark_closed();
                self.pool.remove(&oldest.id);
            }
        }

        self.pool.add(handle.clone());

        info!(
            conn_id = %handle.id,
            user_id = %user_id,
            "WebSocket connection registered"
        );

        (handle, rx)
    }

    /// Unregisters a connection.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_closed();
            info!(
                conn_id = %conn_id,
                user_id = %handle.user_id,
                "WebSocket connection unregistered"
            );
        }
    }

    /// Closes all connections.
    pub fn close_all(&self) {
        let all = self.pool.all_connections();
        for conn in &all {
            conn.mark_closed();
            self.pool.remove(&conn.id);
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns the number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.pool.user_count()
    }

    /// Checks if a user is currently connected.
    pub fn is_user_connected(&self, user_id: &UserId) -> bool {
        !self.pool.get_user_connections(user_id).is_empty()
    }

    fn deliver(&self, connections: &[Arc<ConnectionHandle>], envelope: &Envelope) -> usize {
        let frame = match envelope.to_frame() {
            Ok(f) => f,
            Err(e) => {
                error!(error = %e, destination = %envelope.destination, "Failed to serialize frame");
                return 0;
            }
        };

        let mut sent = 0;
        for conn in connections {
            if conn.send(frame.clone()) {
                sent += 1;
            } else {
                warn!(
                    conn_id = %conn.id,
                    destination = %envelope.destination,
                    "Frame dropped"
                );
            }
        }
        sent
    }
}

#[async_trait]
impl PushGateway for ConnectionManager {
    async fn send_to_user(&self, user_id: &UserId, envelope: Envelope) {
        let connections = self.pool.get_user_connections(user_id);
        if connections.is_empty() {
            debug!(user_id = %user_id, destination = %envelope.destination, "User offline, frame dropped");
            return;
        }
        let sent = self.deliver(&connections, &envelope);
        debug!(user_id = %user_id, destination = %envelope.destination, sent, "Frame delivered");
    }

    async fn broadcast(&self, envelope: Envelope) {
        let connections = self.pool.all_connections();
        let sent = self.deliver(&connections, &envelope);
        debug!(destination = %envelope.destination, sent, "Broadcast delivered");
    }
}
