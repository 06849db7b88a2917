//! Notification feed service.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use docrelay_core::config::RealtimeConfig;
use docrelay_core::result::AppResult;
use docrelay_core::types::UserId;
use docrelay_database::NotificationStore;
use docrelay_entity::notification::{NewNotification, Notification};

use crate::dispatch::PushDispatcher;
use crate::message::envelope::Envelope;

use super::formatter::{self, DisplayNotification};

/// What a user-addressed `create` pushes to its owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PushMode {
    /// The owner's full re-rendered feed.
    #[default]
    Feed,
    /// Only the new notification, rendered.
    Item,
}

/// Persists notifications and pushes feeds to their owners.
///
/// Every push happens after the store call it follows has succeeded.
#[derive(Debug, Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    dispatcher: PushDispatcher,
    feed_destination: String,
    broadcast_destination: String,
}

impl NotificationService {
    /// Create the service.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        dispatcher: PushDispatcher,
        config: &RealtimeConfig,
    ) -> Self {
        Self {
            store,
            dispatcher,
            feed_destination: config.notification_destination.clone(),
            broadcast_destination: config.broadcast_destination.clone(),
        }
    }

    /// A user's notifications, most recent first.
    pub async fn list_for_user(&self, user_id: &UserId) -> AppResult<Vec<Notification>> {
        self.store.list_by_user(user_id).await
    }

    /// A user's rendered feed, most recent first.
    pub async fn feed(&self, user_id: &UserId) -> AppResult<Vec<DisplayNotification>> {
        let now = Utc::now();
        Ok(self
            .list_for_user(user_id)
            .await?
            .iter()
            .map(|n| formatter::render(n, now))
            .collect())
    }

    /// Mark every notification of a user read, then push the updated feed.
    pub async fn mark_all_read(&self, user_id: &UserId) -> AppResult<u64> {
        let changed = self.store.mark_all_read(user_id).await?;
        info!(user_id = %user_id, changed, "Notifications marked read");
        self.push_feed_logged(user_id).await;
        Ok(changed)
    }

    /// Persist and push with the default [`PushMode::Feed`].
    pub async fn create(&self, notification: NewNotification) -> AppResult<Notification> {
        self.create_with(notification, PushMode::Feed).await
    }

    /// Persist, then push.
    ///
    /// A user-addressed notification goes to its owner's private channel as
    /// `mode` says; a broadcast goes to everyone as a single rendered item.
    /// Nothing is pushed when the store rejects the write.
    pub async fn create_with(
        &self,
        notification: NewNotification,
        mode: PushMode,
    ) -> AppResult<Notification> {
        let stored = self.store.insert(notification).await?;
        info!(
            id = %stored.id,
            user_id = ?stored.user_id,
            kind = %stored.notification_type,
            "Notification created"
        );

        match (&stored.user_id, mode) {
            (Some(user_id), PushMode::Feed) => self.push_feed_logged(user_id).await,
            (Some(user_id), PushMode::Item) => {
                let payload = serde_json::to_value(self.render(&stored))?;
                self.dispatcher.to_user(
                    Some(user_id.clone()),
                    Envelope::new(&self.feed_destination, payload),
                );
            }
            (None, _) => {
                let payload = serde_json::to_value(self.render(&stored))?;
                self.dispatcher
                    .broadcast(Envelope::new(&self.broadcast_destination, payload));
            }
        }

        Ok(stored)
    }

    /// Render one notification relative to now.
    pub fn render(&self, notification: &Notification) -> DisplayNotification {
        formatter::render(notification, Utc::now())
    }

    /// Push a user's current feed to their private channel.
    pub async fn push_feed(&self, user_id: &UserId) -> AppResult<()> {
        let feed = self.feed(user_id).await?;
        let payload = serde_json::to_value(feed)?;
        self.dispatcher.to_user(
            Some(user_id.clone()),
            Envelope::new(&self.feed_destination, payload),
        );
        Ok(())
    }

    /// The write already succeeded; a failed re-read only costs the push.
    async fn push_feed_logged(&self, user_id: &UserId) {
        if let Err(e) = self.push_feed(user_id).await {
            warn!(user_id = %user_id, error = %e, "Failed to push notification feed");
        }
    }
}
