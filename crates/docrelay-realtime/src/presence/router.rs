//! Viewer-action routing.
//!
//! Turns one inbound [`ViewerAction`] into the relay messages it causes:
//!
//! | kind             | needs                      | effect            | messages                 |
//! |------------------|----------------------------|-------------------|--------------------------|
//! | `CloseViewers`   | -                          | -                 | admin                    |
//! | `DocumentViewed` | -                          | -                 | admin (with viewer if document known) |
//! | `BlockViewed`    | document with a record     | sender blocked    | sender, admin (each addressed to itself) |
//! | anything else    | -                          | -                 | none                     |
//!
//! The administrator is resolved at most once per action and only when a
//! message will actually be produced.

use std::sync::Arc;

use tracing::{debug, info, warn};

use docrelay_core::result::AppResult;
use docrelay_core::types::{DocumentId, UserId};
use docrelay_database::PresenceStore;
use docrelay_directory::DirectoryLookup;
use docrelay_entity::user::UserSummary;

use crate::message::types::{ActionKind, AddressedMessage, OutboundMessage, ViewerAction};

/// Routes viewer actions against the presence store and directory.
#[derive(Debug, Clone)]
pub struct PresenceRouter {
    presence: Arc<dyn PresenceStore>,
    directory: Arc<dyn DirectoryLookup>,
    admin_role: String,
}

impl PresenceRouter {
    /// Create a router. `admin_role` names the realm role of the
    /// administrator who receives viewer updates.
    pub fn new(
        presence: Arc<dyn PresenceStore>,
        directory: Arc<dyn DirectoryLookup>,
        admin_role: impl Into<String>,
    ) -> Self {
        Self {
            presence,
            directory,
            admin_role: admin_role.into(),
        }
    }

    /// Route one action.
    ///
    /// Malformed and unknown actions yield an empty list. Only presence
    /// store failures are errors.
    pub async fn route(&self, action: &ViewerAction) -> AppResult<Vec<AddressedMessage>> {
        if action.sender_id.is_blank() {
            debug!(kind = %action.kind, "Action without sender ignored");
            return Ok(Vec::new());
        }

        let messages = match (action.kind, action.document_id) {
            (ActionKind::CloseViewers, _) => self.close_viewers(&action.sender_id).await,
            (ActionKind::DocumentViewed, document_id) => {
                self.document_viewed(&action.sender_id, document_id).await?
            }
            (ActionKind::BlockViewed, Some(document_id)) => {
                self.block_viewed(&action.sender_id, document_id).await?
            }
            (kind, document_id) => {
                debug!(%kind, ?document_id, sender_id = %action.sender_id, "Action produces no messages");
                Vec::new()
            }
        };

        debug!(
            kind = %action.kind,
            sender_id = %action.sender_id,
            count = messages.len(),
            "Action routed"
        );
        Ok(messages)
    }

    async fn close_viewers(&self, sender_id: &UserId) -> Vec<AddressedMessage> {
        let admin = self.resolve_admin().await;
        vec![AddressedMessage::new(
            admin.clone(),
            OutboundMessage::CloseViewers {
                sender_id: sender_id.clone(),
                receiver_id: admin,
            },
        )]
    }

    async fn document_viewed(
        &self,
        sender_id: &UserId,
        document_id: Option<DocumentId>,
    ) -> AppResult<Vec<AddressedMessage>> {
        let user = match document_id {
            Some(document_id) => {
                let record = self.presence.find(document_id).await?;
                let is_blocked = record.is_some_and(|r| r.is_blocked(sender_id));
                let directory_user = self.find_user(sender_id).await;
                Some(UserSummary::new(
                    sender_id.clone(),
                    directory_user.as_ref(),
                    is_blocked,
                    document_id,
                ))
            }
            None => None,
        };

        let admin = self.resolve_admin().await;
        Ok(vec![AddressedMessage::new(
            admin.clone(),
            OutboundMessage::RequestViewers {
                sender_id: sender_id.clone(),
                receiver_id: admin,
                user,
            },
        )])
    }

    async fn block_viewed(
        &self,
        sender_id: &UserId,
        document_id: DocumentId,
    ) -> AppResult<Vec<AddressedMessage>> {
        let Some(record) = self.presence.add_blocked_viewer(document_id, sender_id).await? else {
            debug!(%document_id, sender_id = %sender_id, "No presence record, block ignored");
            return Ok(Vec::new());
        };
        info!(
            %document_id,
            sender_id = %sender_id,
            blocked = record.blocked_viewers.len(),
            "Viewer blocked"
        );

        let admin = self.resolve_admin().await;
        let confirm = |receiver_id: Option<UserId>| {
            AddressedMessage::new(
                receiver_id.clone(),
                OutboundMessage::BlockViewed {
                    sender_id: sender_id.clone(),
                    receiver_id,
                    document_id,
                },
            )
        };
        Ok(vec![confirm(Some(sender_id.clone())), confirm(admin)])
    }

    /// Directory failures degrade to "no administrator".
    async fn resolve_admin(&self) -> Option<UserId> {
        match self.directory.resolve_admin(&self.admin_role).await {
            Ok(admin) => admin,
            Err(e) => {
                warn!(error = %e, role = %self.admin_role, "Administrator resolution failed");
                None
            }
        }
    }

    async fn find_user(&self, user_id: &UserId) -> Option<docrelay_entity::user::DirectoryUser> {
        match self.directory.find_user(user_id).await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, user_id = %user_id, "Directory user lookup failed");
                None
            }
        }
    }
}
