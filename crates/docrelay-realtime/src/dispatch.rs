//! Push queue between the relay logic and the gateway.
//!
//! Enqueueing never waits on delivery. A single task drains the queue in
//! order and hands each frame to the [`PushGateway`].

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use docrelay_core::types::UserId;

use crate::gateway::PushGateway;
use crate::message::envelope::Envelope;

/// A queued delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum PushCommand {
    /// Private channel of one user. `None` is dropped by the drain task.
    ToUser {
        /// Addressee.
        recipient: Option<UserId>,
        /// Frame to deliver.
        envelope: Envelope,
    },
    /// Every connected session.
    Broadcast {
        /// Frame to deliver.
        envelope: Envelope,
    },
    /// Ends the drain task once everything queued before it is delivered.
    Stop,
}

/// Cloneable handle to the push queue.
#[derive(Debug, Clone)]
pub struct PushDispatcher {
    tx: mpsc::UnboundedSender<PushCommand>,
}

impl PushDispatcher {
    /// Start the drain task for `gateway`.
    ///
    /// The task ends after [`Self::stop`], or once every dispatcher clone is
    /// dropped and the queue is empty.
    pub fn spawn(gateway: Arc<dyn PushGateway>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<PushCommand>();

        let task = tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    PushCommand::ToUser {
                        recipient: Some(user_id),
                        envelope,
                    } => gateway.send_to_user(&user_id, envelope).await,
                    PushCommand::ToUser {
                        recipient: None,
                        envelope,
                    } => {
                        debug!(destination = %envelope.destination, "No recipient, push dropped");
                    }
                    PushCommand::Broadcast { envelope } => gateway.broadcast(envelope).await,
                    PushCommand::Stop => break,
                }
            }
            info!("Push dispatcher stopped");
        });

        (Self { tx }, task)
    }

    /// Queue a frame for one user's private channel.
    pub fn to_user(&self, recipient: Option<UserId>, envelope: Envelope) {
        self.enqueue(PushCommand::ToUser { recipient, envelope });
    }

    /// Queue a frame for every session.
    pub fn broadcast(&self, envelope: Envelope) {
        self.enqueue(PushCommand::Broadcast { envelope });
    }

    /// Stop the drain task after the pushes already queued. Later pushes are
    /// dropped.
    pub fn stop(&self) {
        self.enqueue(PushCommand::Stop);
    }

    fn enqueue(&self, command: PushCommand) {
        if self.tx.send(command).is_err() {
            debug!("Push dispatcher stopped, push dropped");
        }
    }
}
