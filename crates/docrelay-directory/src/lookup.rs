//! The directory abstraction consumed by the presence router.

use async_trait::async_trait;
use tracing::debug;

use docrelay_core::result::AppResult;
use docrelay_core::types::UserId;
use docrelay_entity::user::DirectoryUser;

/// Read-only view of the identity directory.
#[async_trait]
pub trait DirectoryLookup: Send + Sync + std::fmt::Debug + 'static {
    /// Every user in the directory.
    async fn list_users(&self) -> AppResult<Vec<DirectoryUser>>;

    /// Effective (composite-expanded) realm role names of a user.
    async fn effective_realm_roles(&self, user_id: &UserId) -> AppResult<Vec<String>>;

    /// Look up a single user.
    async fn find_user(&self, user_id: &UserId) -> AppResult<Option<DirectoryUser>> {
        Ok(self
            .list_users()
            .await?
            .into_iter()
            .find(|u| &u.id == user_id))
    }

    /// Id of the first user, in directory order, holding `role`.
    ///
    /// Role names compare case-insensitively. `Ok(None)` when nobody holds
    /// the role.
    async fn resolve_admin(&self, role: &str) -> AppResult<Option<UserId>> {
        for user in self.list_users().await? {
            let roles = self.effective_realm_roles(&user.id).await?;
            if has_role(&roles, role) {
                debug!(user_id = %user.id, role, "Resolved administrator");
                return Ok(Some(user.id));
            }
        }
        debug!(role, "No user holds the administrator role");
        Ok(None)
    }
}

/// Case-insensitive role membership.
pub fn has_role<S: AsRef<str>>(roles: &[S], wanted: &str) -> bool {
    roles.iter().any(|r| r.as_ref().eq_ignore_ascii_case(wanted))
}
