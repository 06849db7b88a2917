//! Identity directory (Keycloak admin API) configuration.

use serde::{Deserialize, Serialize};

/// Identity directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Keycloak base URL, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Realm whose users are listed.
    #[serde(default = "default_realm")]
    pub realm: String,
    /// Confidential client used for the client-credentials grant.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Client secret for the client-credentials grant.
    #[serde(default)]
    pub client_secret: String,
    /// Realm role that marks the administrator.
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
    /// How long a resolved administrator id is reused. `0` disables caching.
    #[serde(default = "default_admin_cache_ttl")]
    pub admin_cache_ttl_seconds: u64,
    /// Page size when listing users.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// HTTP timeout for directory calls in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_realm() -> String {
    "master".to_string()
}

fn default_client_id() -> String {
    "docrelay-service".to_string()
}

fn default_admin_role() -> String {
    "admin".to_string()
}

fn default_admin_cache_ttl() -> u64 {
    30
}

fn default_page_size() -> u32 {
    100
}

fn default_timeout() -> u64 {
    10
}
