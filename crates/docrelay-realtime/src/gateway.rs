//! The delivery seam between the relay and the transport.

use async_trait::async_trait;

use docrelay_core::types::UserId;

use crate::message::envelope::Envelope;

/// Best-effort, at-most-once delivery.
///
/// Implementations never report failure to the caller: offline users and
/// full or closed queues drop the frame.
#[async_trait]
pub trait PushGateway: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver to every session of one user.
    async fn send_to_user(&self, user_id: &UserId, envelope: Envelope);

    /// Deliver to every connected session.
    async fn broadcast(&self, envelope: Envelope);
}
