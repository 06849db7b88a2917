//! PostgreSQL presence store.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use docrelay_core::error::{AppError, ErrorKind};
use docrelay_core::result::AppResult;
use docrelay_core::types::{DocumentId, UserId};
use docrelay_entity::presence::PresenceRecord;

use crate::store::PresenceStore;

#[derive(Debug, FromRow)]
struct PresenceRow {
    document_id: i64,
    blocked_viewers: Vec<String>,
}

impl From<PresenceRow> for PresenceRecord {
    fn from(row: PresenceRow) -> Self {
        PresenceRecord::from_parts(DocumentId(row.document_id), row.blocked_viewers)
    }
}

/// Presence records in the `document_presence` table.
#[derive(Debug, Clone)]
pub struct PresenceRepository {
    pool: PgPool,
}

impl PresenceRepository {
    /// Create a new presence repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PresenceStore for PresenceRepository {
    async fn find(&self, document_id: DocumentId) -> AppResult<Option<PresenceRecord>> {
        let row = sqlx::query_as::<_, PresenceRow>(
            "SELECT document_id, blocked_viewers FROM document_presence WHERE document_id = $1",
        )
        .bind(document_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load presence", e))?;

        Ok(row.map(PresenceRecord::from))
    }

    async fn register(&self, document_id: DocumentId) -> AppResult<PresenceRecord> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query_as::<_, PresenceRow>(
            "INSERT INTO document_presence (document_id) VALUES ($1) \
             ON CONFLICT (document_id) DO UPDATE SET document_id = EXCLUDED.document_id \
             RETURNING document_id, blocked_viewers",
        )
        .bind(document_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to register presence", e))?;

        Ok(row.into())
    }

    async fn add_blocked_viewer(
        &self,
        document_id: DocumentId,
        user_id: &UserId,
    ) -> AppResult<Option<PresenceRecord>> {
        // Single statement under the row lock; membership is checked inside
        // the UPDATE so concurrent callers cannot overwrite each other.
        let row = sqlx::query_as::<_, PresenceRow>(
            "UPDATE document_presence SET blocked_viewers = CASE \
                 WHEN $2 = ANY(blocked_viewers) THEN blocked_viewers \
                 ELSE array_append(blocked_viewers, $2) END, \
             updated_at = NOW() \
             WHERE document_id = $1 \
             RETURNING document_id, blocked_viewers",
        )
        .bind(document_id.into_inner())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to block viewer", e))?;

        Ok(row.map(PresenceRecord::from))
    }
}
