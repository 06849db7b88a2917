//! Wire types for the viewer relay and the client socket protocol.
//!
//! The web client speaks the legacy JSON vocabulary: a `typeMessage` tag
//! (`DOCUMENT8Viewed`, `Bloc_VIEWED`, `GETBOOKSVIWER`, `CLOSEBOOKSVIWER`)
//! with camelCase fields. Inbound parsing also accepts the descriptive
//! variant names.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use docrelay_core::types::{DocumentId, UserId};
use docrelay_entity::user::UserSummary;

/// Kind of an inbound viewer action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum ActionKind {
    /// A user opened a document.
    DocumentViewed,
    /// A user is flagged as blocked from the document.
    BlockViewed,
    /// Viewer summary addressed to the administrator.
    RequestViewers,
    /// A user closed the viewer.
    CloseViewers,
    /// Any tag this relay does not know.
    #[default]
    Unknown,
}

impl ActionKind {
    /// Legacy wire tag.
    pub fn wire_tag(&self) -> &'static str {
        match self {
            Self::DocumentViewed => "DOCUMENT8Viewed",
            Self::BlockViewed => "Bloc_VIEWED",
            Self::RequestViewers => "GETBOOKSVIWER",
            Self::CloseViewers => "CLOSEBOOKSVIWER",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl From<String> for ActionKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "DOCUMENT8Viewed" | "DocumentViewed" => Self::DocumentViewed,
            "Bloc_VIEWED" | "BlockViewed" => Self::BlockViewed,
            "GETBOOKSVIWER" | "RequestViewers" => Self::RequestViewers,
            "CLOSEBOOKSVIWER" | "CloseViewers" => Self::CloseViewers,
            _ => Self::Unknown,
        }
    }
}

impl Serialize for ActionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_tag())
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_tag())
    }
}

/// An inbound viewer action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerAction {
    /// The acting user. Blank means the action is malformed.
    #[serde(default)]
    pub sender_id: UserId,
    /// Addressee named by the client; informational only.
    #[serde(default)]
    pub receiver_id: Option<UserId>,
    /// What happened.
    #[serde(rename = "typeMessage", alias = "kind", default)]
    pub kind: ActionKind,
    /// The document concerned.
    #[serde(default)]
    pub document_id: Option<DocumentId>,
}

impl ViewerAction {
    /// Build an action.
    pub fn new(sender_id: impl Into<UserId>, kind: ActionKind, document_id: Option<DocumentId>) -> Self {
        Self {
            sender_id: sender_id.into(),
            receiver_id: None,
            kind,
            document_id,
        }
    }
}

/// A relay message produced by the presence router.
///
/// Each variant carries only the fields its kind needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "typeMessage", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    /// The sender closed the viewer.
    #[serde(rename = "CLOSEBOOKSVIWER")]
    CloseViewers {
        /// Acting user.
        sender_id: UserId,
        /// Administrator, when one was resolved.
        receiver_id: Option<UserId>,
    },
    /// The sender opened a document; carries their summary when the document
    /// is known.
    #[serde(rename = "GETBOOKSVIWER")]
    RequestViewers {
        /// Acting user.
        sender_id: UserId,
        /// Administrator, when one was resolved.
        receiver_id: Option<UserId>,
        /// The viewer as seen by the administrator.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user: Option<UserSummary>,
    },
    /// The sender is now blocked from the document.
    #[serde(rename = "Bloc_VIEWED")]
    BlockViewed {
        /// Acting user.
        sender_id: UserId,
        /// Administrator, when one was resolved.
        receiver_id: Option<UserId>,
        /// The document the sender is blocked from.
        document_id: DocumentId,
    },
}

impl OutboundMessage {
    /// The action kind this message carries on the wire.
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::CloseViewers { .. } => ActionKind::CloseViewers,
            Self::RequestViewers { .. } => ActionKind::RequestViewers,
            Self::BlockViewed { .. } => ActionKind::BlockViewed,
        }
    }
}

/// An outbound message paired with the user it is addressed to.
///
/// `recipient == None` means nobody could be resolved; delivery drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressedMessage {
    /// Private channel owner.
    pub recipient: Option<UserId>,
    /// The message.
    pub message: OutboundMessage,
}

impl AddressedMessage {
    /// Address a message.
    pub fn new(recipient: Option<UserId>, message: OutboundMessage) -> Self {
        Self { recipient, message }
    }
}

/// A frame sent by a connected client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// A viewer action to route.
    Action(ViewerAction),
    /// Request the current notification feed.
    Notifications,
    /// Mark every notification of the connected user as read.
    MarkAllRead,
}
