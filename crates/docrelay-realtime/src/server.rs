//! Top-level real-time engine that ties together all subsystems.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use docrelay_core::config::RealtimeConfig;
use docrelay_core::result::AppResult;
use docrelay_core::types::UserId;
use docrelay_database::Stores;
use docrelay_directory::DirectoryLookup;

use crate::connection::manager::ConnectionManager;
use crate::dispatch::PushDispatcher;
use crate::gateway::PushGateway;
use crate::message::envelope::Envelope;
use crate::message::types::{ClientFrame, ViewerAction};
use crate::notification::service::NotificationService;
use crate::presence::router::PresenceRouter;

/// Central real-time engine: connections, the presence router, the
/// notification service and the push queue between them.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Viewer-action router.
    pub router: Arc<PresenceRouter>,
    /// Notification service.
    pub notifications: Arc<NotificationService>,
    /// Push queue.
    dispatcher: PushDispatcher,
    /// Task draining the push queue; taken by [`Self::drain_pushes`].
    dispatcher_task: Arc<Mutex<Option<JoinHandle<()>>>>,
    /// Destination of relay messages.
    action_destination: String,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.connections.connection_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates an engine that delivers through its own connection manager.
    pub fn new(
        config: RealtimeConfig,
        stores: &Stores,
        directory: Arc<dyn DirectoryLookup>,
        admin_role: &str,
    ) -> Self {
        let connections = Arc::new(ConnectionManager::new(config.clone()));
        Self::build(config, connections.clone(), connections, stores, directory, admin_role)
    }

    /// Creates an engine that delivers through `gateway` instead of the
    /// connection manager.
    pub fn with_gateway(
        config: RealtimeConfig,
        gateway: Arc<dyn PushGateway>,
        stores: &Stores,
        directory: Arc<dyn DirectoryLookup>,
        admin_role: &str,
    ) -> Self {
        let connections = Arc::new(ConnectionManager::new(config.clone()));
        Self::build(config, connections, gateway, stores, directory, admin_role)
    }

    fn build(
        config: RealtimeConfig,
        connections: Arc<ConnectionManager>,
        gateway: Arc<dyn PushGateway>,
        stores: &Stores,
        directory: Arc<dyn DirectoryLookup>,
        admin_role: &str,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (dispatcher, dispatcher_task) = PushDispatcher::spawn(gateway);

        let router = Arc::new(PresenceRouter::new(
            stores.presence.clone(),
            directory,
            admin_role,
        ));
        let notifications = Arc::new(NotificationService::new(
            stores.notifications.clone(),
            dispatcher.clone(),
            &config,
        ));

        info!("Real-time engine initialized");

        Self {
            connections,
            router,
            notifications,
            dispatcher,
            dispatcher_task: Arc::new(Mutex::new(Some(dispatcher_task))),
            action_destination: config.action_destination,
            shutdown_tx,
        }
    }

    /// Route a viewer action and queue the resulting messages.
    ///
    /// Returns how many messages were queued.
    pub async fn handle_action(&self, action: &ViewerAction) -> AppResult<usize> {
        let messages = self.router.route(action).await?;
        let count = messages.len();
        for addressed in messages {
            let payload = serde_json::to_value(&addressed.message)?;
            self.dispatcher.to_user(
                addressed.recipient,
                Envelope::new(&self.action_destination, payload),
            );
        }
        Ok(count)
    }

    /// Handle one text frame from a connected user.
    ///
    /// Unparseable frames are ignored. A blank action sender is taken to be
    /// the connected user.
    pub async fn handle_frame(&self, user_id: &UserId, raw: &str) {
        let frame: ClientFrame = match serde_json::from_str(raw) {
            Ok(f) => f,
            Err(e) => {
                debug!(user_id = %user_id, error = %e, "Ignoring malformed frame");
                return;
            }
        };

        let result = match frame {
            ClientFrame::Action(mut action) => {
                if action.sender_id.is_blank() {
                    action.sender_id = user_id.clone();
                }
                self.handle_action(&action).await.map(|_| ())
            }
            ClientFrame::Notifications => self.notifications.push_feed(user_id).await,
            ClientFrame::MarkAllRead => self.notifications.mark_all_read(user_id).await.map(|_| ()),
        };

        if let Err(e) = result {
            warn!(user_id = %user_id, error = %e, "Frame handling failed");
        }
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Stop the push queue and wait up to `grace` for what is already queued
    /// to reach the gateway. Returns whether the queue drained in time.
    pub async fn drain_pushes(&self, grace: Duration) -> bool {
        self.dispatcher.stop();
        let task = match self.dispatcher_task.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(task) = task else {
            return true;
        };

        match tokio::time::timeout(grace, task).await {
            Ok(Ok(())) => {
                info!("Push queue drained");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Push dispatcher task failed");
                false
            }
            Err(_) => {
                warn!(grace_ms = grace.as_millis() as u64, "Push queue not drained in time, remaining pushes dropped");
                false
            }
        }
    }

    /// Signal every socket task to stop and drop all connections.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        let _ = self.shutdown_tx.send(());
        self.connections.close_all();
        info!("Real-time engine shut down");
    }
}
