//! Per-document presence record.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use docrelay_core::types::{DocumentId, UserId};

/// Users flagged as blocked from viewing one document.
///
/// The set is keyed on the canonical form of [`UserId`], so a user can
/// appear at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    /// The document this record tracks.
    pub document_id: DocumentId,
    /// Users blocked from viewing the document.
    pub blocked_viewers: BTreeSet<UserId>,
}

impl PresenceRecord {
    /// An empty record for a document.
    pub fn new(document_id: DocumentId) -> Self {
        Self {
            document_id,
            blocked_viewers: BTreeSet::new(),
        }
    }

    /// Rebuild a record from its stored column values.
    pub fn from_parts<I, S>(document_id: DocumentId, viewers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            document_id,
            blocked_viewers: viewers.into_iter().map(UserId::new).collect(),
        }
    }

    /// Whether a user is blocked from viewing this document.
    pub fn is_blocked(&self, user_id: &UserId) -> bool {
        self.blocked_viewers.contains(user_id)
    }

    /// Add a user to the blocked set. Returns `false` if already present.
    pub fn block(&mut self, user_id: UserId) -> bool {
        self.blocked_viewers.insert(user_id)
    }
}
