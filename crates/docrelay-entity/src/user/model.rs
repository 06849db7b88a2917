//! Users as seen through the external identity directory.

use serde::{Deserialize, Serialize};

use docrelay_core::types::{DocumentId, UserId};

/// A user record returned by the identity directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    /// Directory-assigned identifier.
    pub id: UserId,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Email address, when the directory has one.
    #[serde(default)]
    pub email: Option<String>,
}

impl DirectoryUser {
    /// Create a directory user.
    pub fn new(id: impl Into<UserId>, username: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email,
        }
    }
}

/// A viewer as presented to the administrator, with the blocked flag for
/// one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Viewer's user id.
    pub id: UserId,
    /// Login name, when the directory knows the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Email address, when the directory knows one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether the viewer is blocked from the document.
    pub is_blocked: bool,
    /// The document being viewed.
    pub document_id: DocumentId,
}

impl UserSummary {
    /// Summarise a viewer. `user` enriches the summary when the directory
    /// returned a record for `id`.
    pub fn new(
        id: UserId,
        user: Option<&DirectoryUser>,
        is_blocked: bool,
        document_id: DocumentId,
    ) -> Self {
        Self {
            id,
            username: user.map(|u| u.username.clone()),
            email: user.and_then(|u| u.email.clone()),
            is_blocked,
            document_id,
        }
    }
}
