//! Store traits consumed by the presence router and notification service.

use async_trait::async_trait;

use docrelay_core::result::AppResult;
use docrelay_core::types::{DocumentId, UserId};
use docrelay_entity::notification::{NewNotification, Notification};
use docrelay_entity::presence::PresenceRecord;

/// Durable per-document presence records.
///
/// Every mutation is a single atomic operation scoped to one document, so
/// concurrent callers on the same document never lose an update.
#[async_trait]
pub trait PresenceStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load the record for a document, if one has been registered.
    async fn find(&self, document_id: DocumentId) -> AppResult<Option<PresenceRecord>>;

    /// Create an empty record for a document unless one exists, and return
    /// the current record.
    async fn register(&self, document_id: DocumentId) -> AppResult<PresenceRecord>;

    /// Add a user to a document's blocked set.
    ///
    /// Returns the updated record, or `None` when the document has no
    /// record. Adding a user already in the set leaves it unchanged.
    async fn add_blocked_viewer(
        &self,
        document_id: DocumentId,
        user_id: &UserId,
    ) -> AppResult<Option<PresenceRecord>>;
}

/// Durable notification rows with a per-user access path.
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a notification, assigning its id and creation time.
    async fn insert(&self, notification: NewNotification) -> AppResult<Notification>;

    /// All notifications addressed to a user, most recent first.
    async fn list_by_user(&self, user_id: &UserId) -> AppResult<Vec<Notification>>;

    /// Mark every unread notification of a user as read in one atomic
    /// update. Returns the number of rows that changed.
    async fn mark_all_read(&self, user_id: &UserId) -> AppResult<u64>;
}
