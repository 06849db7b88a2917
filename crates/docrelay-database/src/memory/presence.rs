//! In-memory presence store.

use async_trait::async_trait;
use dashmap::DashMap;

use docrelay_core::result::AppResult;
use docrelay_core::types::{DocumentId, UserId};
use docrelay_entity::presence::PresenceRecord;

use crate::store::PresenceStore;

/// Presence records held in a [`DashMap`].
///
/// Mutations go through the shard write lock of the entry, which makes
/// each one atomic per document.
#[derive(Debug, Default)]
pub struct MemoryPresenceStore {
    records: DashMap<DocumentId, PresenceRecord>,
}

impl MemoryPresenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no document has been registered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl PresenceStore for MemoryPresenceStore {
    async fn find(&self, document_id: DocumentId) -> AppResult<Option<PresenceRecord>> {
        Ok(self.records.get(&document_id).map(|r| r.value().clone()))
    }

    async fn register(&self, document_id: DocumentId) -> AppResult<PresenceRecord> {
        let entry = self
            .records
            .entry(document_id)
            .or_insert_with(|| PresenceRecord::new(document_id));
        Ok(entry.value().clone())
    }

    async fn add_blocked_viewer(
        &self,
        document_id: DocumentId,
        user_id: &UserId,
    ) -> AppResult<Option<PresenceRecord>> {
        Ok(self.records.get_mut(&document_id).map(|mut record| {
            record.block(user_id.clone());
            record.value().clone()
        }))
    }
}
