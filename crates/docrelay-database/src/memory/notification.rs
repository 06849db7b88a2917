//! In-memory notification store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use docrelay_core::result::AppResult;
use docrelay_core::types::{NotificationId, UserId};
use docrelay_entity::notification::{NewNotification, Notification};

use crate::store::NotificationStore;

/// Notifications grouped per recipient in a [`DashMap`].
///
/// Broadcasts are kept apart from the per-user lists and never appear in
/// a user's feed.
#[derive(Debug, Default)]
pub struct MemoryNotificationStore {
    by_user: DashMap<UserId, Vec<Notification>>,
    broadcasts: DashMap<NotificationId, Notification>,
}

impl MemoryNotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist a notification with an explicit creation time.
    pub fn insert_with_timestamp(
        &self,
        notification: NewNotification,
        created_at: DateTime<Utc>,
    ) -> Notification {
        let stored = notification.into_notification(created_at);
        match &stored.user_id {
            Some(user_id) => self
                .by_user
                .entry(user_id.clone())
                .or_default()
                .push(stored.clone()),
            None => {
                self.broadcasts.insert(stored.id, stored.clone());
            }
        }
        stored
    }

    /// Number of stored broadcasts.
    pub fn broadcast_count(&self) -> usize {
        self.broadcasts.len()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn insert(&self, notification: NewNotification) -> AppResult<Notification> {
        Ok(self.insert_with_timestamp(notification, Utc::now()))
    }

    async fn list_by_user(&self, user_id: &UserId) -> AppResult<Vec<Notification>> {
        let mut items = self
            .by_user
            .get(user_id)
            .map(|list| list.value().clone())
            .unwrap_or_default();
        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.into_uuid().cmp(&a.id.into_uuid()))
        });
        Ok(items)
    }

    async fn mark_all_read(&self, user_id: &UserId) -> AppResult<u64> {
        let Some(mut list) = self.by_user.get_mut(user_id) else {
            return Ok(0);
        };
        let mut changed = 0;
        for item in list.iter_mut().filter(|n| !n.is_read) {
            item.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }
}
