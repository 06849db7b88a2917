//! Directory held in memory, for development and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use docrelay_core::result::AppResult;
use docrelay_core::types::UserId;
use docrelay_entity::user::DirectoryUser;

use crate::lookup::DirectoryLookup;

/// A fixed list of users with their realm roles.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    users: Vec<DirectoryUser>,
    roles: HashMap<UserId, Vec<String>>,
    list_calls: AtomicUsize,
}

impl StaticDirectory {
    /// An empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user with the given realm roles.
    pub fn with_user<I, S>(mut self, user: DirectoryUser, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles
            .insert(user.id.clone(), roles.into_iter().map(Into::into).collect());
        self.users.push(user);
        self
    }

    /// How many times the user list has been read.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DirectoryLookup for StaticDirectory {
    async fn list_users(&self) -> AppResult<Vec<DirectoryUser>> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.users.clone())
    }

    async fn effective_realm_roles(&self, user_id: &UserId) -> AppResult<Vec<String>> {
        Ok(self.roles.get(user_id).cloned().unwrap_or_default())
    }

    async fn find_user(&self, user_id: &UserId) -> AppResult<Option<DirectoryUser>> {
        Ok(self.users.iter().find(|u| &u.id == user_id).cloned())
    }
}
