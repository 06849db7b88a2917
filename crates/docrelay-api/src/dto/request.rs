//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use docrelay_core::types::UserId;
use docrelay_entity::notification::{NewNotification, NotificationType};

/// Create notification request body.
///
/// Omitting `userId` creates a broadcast.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    /// Recipient; absent for a broadcast.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Title.
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    /// Body text.
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
    /// Severity tag, `info` when omitted.
    #[serde(rename = "type", default)]
    pub notification_type: NotificationType,
    /// Push only the new item instead of the owner's full feed.
    #[serde(default)]
    pub push_item: bool,
}

impl CreateNotificationRequest {
    /// Convert into the entity the service persists.
    pub fn into_new_notification(self) -> NewNotification {
        let user_id = self
            .user_id
            .map(UserId::new)
            .filter(|id| !id.is_blank());
        NewNotification {
            user_id,
            title: self.title,
            message: self.message,
            notification_type: self.notification_type,
        }
    }
}
