//! Real-time relay configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum WebSocket connections per user.
    #[serde(default = "default_max_connections_per_user")]
    pub max_connections_per_user: usize,
    /// Outbound frame buffer per connection. Frames beyond this are dropped.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// Private destination for viewer-relay messages.
    #[serde(default = "default_action_destination")]
    pub action_destination: String,
    /// Private destination for a user's notification feed.
    #[serde(default = "default_notification_destination")]
    pub notification_destination: String,
    /// Shared destination for broadcast notifications.
    #[serde(default = "default_broadcast_destination")]
    pub broadcast_destination: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_connections_per_user: default_max_connections_per_user(),
            outbound_buffer_size: default_outbound_buffer(),
            action_destination: default_action_destination(),
            notification_destination: default_notification_destination(),
            broadcast_destination: default_broadcast_destination(),
        }
    }
}

fn default_max_connections_per_user() -> usize {
    5
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_action_destination() -> String {
    "/queue/action".to_string()
}

fn default_notification_destination() -> String {
    "/queue/notifications".to_string()
}

fn default_broadcast_destination() -> String {
    "/topic/notifications".to_string()
}
