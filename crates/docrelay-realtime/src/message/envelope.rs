//! Destination-addressed frame written to a client socket.

use serde::{Deserialize, Serialize};

/// One outbound frame: `{"destination": "...", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Logical channel, e.g. `/queue/action` or `/topic/notifications`.
    pub destination: String,
    /// The message body.
    pub payload: serde_json::Value,
}

impl Envelope {
    /// Wrap a payload for a destination.
    pub fn new(destination: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            destination: destination.into(),
            payload,
        }
    }

    /// Serialize for the socket.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
