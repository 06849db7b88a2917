//! Newtype wrappers for the identifiers that cross crate boundaries.
//!
//! User ids come from the external identity directory and are opaque
//! strings; document ids are the numeric keys of the external document
//! store; notification ids are generated locally. Keeping them as distinct
//! types prevents passing a document id where a user id is expected.
//! When the `sqlx` feature is enabled each type is `sqlx::Type` through its
//! inner representation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a user in the external identity directory.
///
/// Equality and hashing are on the canonical string form, so two ids are the
/// same user exactly when their trimmed strings match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
#[serde(from = "String")]
pub struct UserId(String);

impl UserId {
    /// Build a user id from its string form. Surrounding whitespace is
    /// stripped so that membership tests compare canonical values.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    /// Return the canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id carries no characters (a malformed sender).
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Consume the wrapper and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for UserId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a document in the external document store.
///
/// The web client sends document ids as strings, so deserialization accepts
/// both `42` and `"42"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
#[serde(transparent)]
pub struct DocumentId(pub i64);

impl DocumentId {
    /// Return the inner numeric value.
    pub fn into_inner(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl From<i64> for DocumentId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Identifier of a persisted notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
#[serde(transparent)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    /// Create a new time-ordered identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for NotificationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_is_trimmed() {
        assert_eq!(UserId::new("  a1b2 "), UserId::new("a1b2"));
        assert_eq!(UserId::new(" a1b2").as_str(), "a1b2");
    }

    #[test]
    fn test_blank_user_id() {
        assert!(UserId::new("   ").is_blank());
        assert!(!UserId::new("u").is_blank());
    }

    #[test]
    fn test_document_id_accepts_string_and_number() {
        let from_num: DocumentId = serde_json::from_str("17").expect("number");
        let from_text: DocumentId = serde_json::from_str("\"17\"").expect("string");
        assert_eq!(from_num, DocumentId(17));
        assert_eq!(from_text, DocumentId(17));
        assert!(serde_json::from_str::<DocumentId>("\"abc\"").is_err());
    }

    #[test]
    fn test_user_id_deserializes_canonical() {
        let id: UserId = serde_json::from_str("\" kc-42 \"").expect("deserialize");
        assert_eq!(id.as_str(), "kc-42");
    }

    #[test]
    fn test_user_id_serializes_transparently() {
        let json = serde_json::to_string(&UserId::new("kc-42")).expect("serialize");
        assert_eq!(json, "\"kc-42\"");
    }

    #[test]
    fn test_notification_ids_are_unique() {
        assert_ne!(NotificationId::new(), NotificationId::new());
    }
}
