//! Store selection from configuration.

use std::sync::Arc;

use tracing::info;

use docrelay_core::config::DatabaseConfig;
use docrelay_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::{MemoryNotificationStore, MemoryPresenceStore};
use crate::repositories::{NotificationRepository, PresenceRepository};
use crate::store::{NotificationStore, PresenceStore};

/// The pair of stores the relay runs against.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Per-document presence records.
    pub presence: Arc<dyn PresenceStore>,
    /// Per-user notifications.
    pub notifications: Arc<dyn NotificationStore>,
    /// The PostgreSQL pool, when not running in memory.
    pub pool: Option<DatabasePool>,
}

impl Stores {
    /// Build the stores named by `config.url`.
    ///
    /// `"memory"` selects the in-process stores; anything else is treated
    /// as a PostgreSQL URL, connected to and migrated.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        if config.is_memory() {
            info!("Using in-memory stores");
            return Ok(Self::memory());
        }

        let pool = DatabasePool::connect(config).await?;
        pool.migrate().await?;

        Ok(Self {
            presence: Arc::new(PresenceRepository::new(pool.pool().clone())),
            notifications: Arc::new(NotificationRepository::new(pool.pool().clone())),
            pool: Some(pool),
        })
    }

    /// Fresh in-process stores.
    pub fn memory() -> Self {
        Self {
            presence: Arc::new(MemoryPresenceStore::new()),
            notifications: Arc::new(MemoryNotificationStore::new()),
            pool: None,
        }
    }

    /// Whether the backing storage is reachable.
    pub async fn health_check(&self) -> bool {
        match &self.pool {
            Some(pool) => pool.health_check().await.unwrap_or(false),
            None => true,
        }
    }

    /// Release the connection pool, if any.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use docrelay_core::types::DocumentId;

    use super::*;

    #[tokio::test]
    async fn test_memory_url_selects_memory_stores() {
        let config = DatabaseConfig::memory();
        assert!(config.is_memory());

        let stores = Stores::connect(&config).await.unwrap();
        assert!(stores.pool.is_none());
        assert!(stores.health_check().await);

        stores.presence.register(DocumentId(1)).await.unwrap();
        assert!(stores.presence.find(DocumentId(1)).await.unwrap().is_some());
    }
}
