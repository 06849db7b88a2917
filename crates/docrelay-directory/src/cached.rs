//! Administrator id memoisation over any directory.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use docrelay_core::result::AppResult;
use docrelay_core::types::UserId;
use docrelay_entity::user::DirectoryUser;

use crate::lookup::DirectoryLookup;

/// Wraps a directory and keeps resolved administrator ids for a short TTL.
///
/// A miss (no user holds the role) is cached as well. Failures are not.
#[derive(Debug, Clone)]
pub struct CachedDirectory {
    inner: Arc<dyn DirectoryLookup>,
    admins: Option<Cache<String, Option<UserId>>>,
}

impl CachedDirectory {
    /// Cache admin resolution for `ttl`. A zero TTL passes every call through.
    pub fn new(inner: Arc<dyn DirectoryLookup>, ttl: Duration) -> Self {
        let admins = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(16)
                .time_to_live(ttl)
                .build()
        });
        Self { inner, admins }
    }
}

#[async_trait]
impl DirectoryLookup for CachedDirectory {
    async fn list_users(&self) -> AppResult<Vec<DirectoryUser>> {
        self.inner.list_users().await
    }

    async fn effective_realm_roles(&self, user_id: &UserId) -> AppResult<Vec<String>> {
        self.inner.effective_realm_roles(user_id).await
    }

    async fn find_user(&self, user_id: &UserId) -> AppResult<Option<DirectoryUser>> {
        self.inner.find_user(user_id).await
    }

    async fn resolve_admin(&self, role: &str) -> AppResult<Option<UserId>> {
        let Some(cache) = &self.admins else {
            return self.inner.resolve_admin(role).await;
        };

        let key = role.to_ascii_lowercase();
        if let Some(hit) = cache.get(&key).await {
            debug!(role, "Administrator id served from cache");
            return Ok(hit);
        }

        let resolved = self.inner.resolve_admin(role).await?;
        cache.insert(key, resolved.clone()).await;
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::StaticDirectory;

    fn directory() -> Arc<StaticDirectory> {
        Arc::new(
            StaticDirectory::new()
                .with_user(DirectoryUser::new("u1", "alice", None), ["user"])
                .with_user(DirectoryUser::new("adm", "boss", None), ["admin"]),
        )
    }

    #[tokio::test]
    async fn test_resolution_is_cached() {
        let inner = directory();
        let cached = CachedDirectory::new(inner.clone(), Duration::from_secs(60));

        assert_eq!(cached.resolve_admin("admin").await.unwrap(), Some(UserId::new("adm")));
        assert_eq!(cached.resolve_admin("ADMIN").await.unwrap(), Some(UserId::new("adm")));
        assert_eq!(inner.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_passes_through() {
        let inner = directory();
        let cached = CachedDirectory::new(inner.clone(), Duration::ZERO);

        cached.resolve_admin("admin").await.unwrap();
        cached.resolve_admin("admin").await.unwrap();
        assert_eq!(inner.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_miss_is_cached() {
        let inner = directory();
        let cached = CachedDirectory::new(inner.clone(), Duration::from_secs(60));

        assert_eq!(cached.resolve_admin("auditor").await.unwrap(), None);
        assert_eq!(cached.resolve_admin("auditor").await.unwrap(), None);
        assert_eq!(inner.list_calls(), 1);
    }
}
