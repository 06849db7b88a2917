//! Rendering notifications for the client feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docrelay_core::types::{NotificationId, UserId};
use docrelay_entity::notification::Notification;

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const WEEK: i64 = 604_800;
const MONTH: i64 = 2_592_000;
const YEAR: i64 = 31_536_000;

/// A notification as the client displays it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayNotification {
    /// Notification id.
    pub id: NotificationId,
    /// Title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Relative age, e.g. `"5 min ago"`.
    pub time: String,
    /// Lower-case type tag.
    #[serde(rename = "type")]
    pub notification_type: String,
    /// Read flag.
    pub is_read: bool,
    /// Recipient, `None` for broadcasts.
    pub user_id: Option<UserId>,
    /// Creation time (RFC 3339).
    pub created_at: DateTime<Utc>,
}

/// Render a notification relative to `now`.
pub fn render(notification: &Notification, now: DateTime<Utc>) -> DisplayNotification {
    DisplayNotification {
        id: notification.id,
        title: notification.title.clone(),
        message: notification.message.clone(),
        time: format_time_ago(notification.created_at, now),
        notification_type: notification.notification_type.as_str().to_string(),
        is_read: notification.is_read,
        user_id: notification.user_id.clone(),
        created_at: notification.created_at,
    }
}

/// Human-readable age of `created_at` as seen at `now`.
///
/// Whole seconds, floor division per band. Timestamps in the future count
/// as zero seconds.
pub fn format_time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let d = (now - created_at).num_seconds().max(0);

    match d {
        d if d < MINUTE => format!("{d} sec ago"),
        d if d < HOUR => format!("{} min ago", d / MINUTE),
        d if d < DAY => plural(d / HOUR, "hour"),
        d if d < WEEK => plural(d / DAY, "day"),
        d if d < MONTH => plural(d / WEEK, "week"),
        d if d < YEAR => plural(d / MONTH, "month"),
        d => plural(d / YEAR, "year"),
    }
}

fn plural(quantity: i64, unit: &str) -> String {
    let suffix = if quantity > 1 { "s" } else { "" };
    format!("{quantity} {unit}{suffix} ago")
}
