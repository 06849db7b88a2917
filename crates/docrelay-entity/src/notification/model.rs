//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docrelay_core::types::{NotificationId, UserId};

use super::kind::NotificationType;

/// A persisted notification.
///
/// `user_id == None` marks a broadcast addressed to every user. Rows are
/// immutable except for `is_read`, which only flips through bulk mark-read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient user, or `None` for a broadcast.
    pub user_id: Option<UserId>,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Severity tag.
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    /// Whether the user has read this notification.
    pub is_read: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields of a notification; the store assigns the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    /// The recipient user, or `None` for a broadcast.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Severity tag.
    #[serde(rename = "type", default)]
    pub notification_type: NotificationType,
}

impl NewNotification {
    /// A notification for a single user.
    pub fn for_user(
        user_id: UserId,
        title: impl Into<String>,
        message: impl Into<String>,
        notification_type: NotificationType,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            title: title.into(),
            message: message.into(),
            notification_type,
        }
    }

    /// A notification for every user.
    pub fn broadcast(
        title: impl Into<String>,
        message: impl Into<String>,
        notification_type: NotificationType,
    ) -> Self {
        Self {
            user_id: None,
            title: title.into(),
            message: message.into(),
            notification_type,
        }
    }

    /// Materialise the row with a fresh id, `is_read = false` and the given
    /// creation time.
    pub fn into_notification(self, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id: NotificationId::new(),
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            notification_type: self.notification_type,
            is_read: false,
            created_at,
        }
    }
}
