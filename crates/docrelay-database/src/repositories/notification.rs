//! PostgreSQL notification store.

use async_trait::async_trait;
use sqlx::PgPool;

use docrelay_core::error::{AppError, ErrorKind};
use docrelay_core::result::AppResult;
use docrelay_core::types::UserId;
use docrelay_entity::notification::{NewNotification, Notification};

use crate::store::NotificationStore;

/// Notification rows in the `notifications` table.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn insert(&self, notification: NewNotification) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, user_id, title, message, notification_type) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(docrelay_core::types::NotificationId::new())
        .bind(notification.user_id.as_ref().map(UserId::as_str))
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.notification_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create notification", e))
    }

    async fn list_by_user(&self, user_id: &UserId) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list notifications", e))
    }

    async fn mark_all_read(&self, user_id: &UserId) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }
}
