//! Keycloak admin REST API client.
//!
//! Authenticates with the client-credentials grant and reads users and
//! their composite realm role mappings.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use docrelay_core::config::DirectoryConfig;
use docrelay_core::error::{AppError, ErrorKind};
use docrelay_core::result::AppResult;
use docrelay_core::types::UserId;
use docrelay_entity::user::DirectoryUser;

use crate::lookup::DirectoryLookup;

/// Access tokens are reused for this long; Keycloak issues them for 60s by
/// default.
const TOKEN_TTL: Duration = Duration::from_secs(30);

const TOKEN_KEY: &str = "service-account";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct KeycloakUser {
    id: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<KeycloakUser> for DirectoryUser {
    fn from(user: KeycloakUser) -> Self {
        DirectoryUser::new(user.id, user.username, user.email)
    }
}

#[derive(Debug, Deserialize)]
struct RoleRepresentation {
    name: String,
}

/// Directory backed by a Keycloak realm.
#[derive(Debug, Clone)]
pub struct KeycloakDirectory {
    client: reqwest::Client,
    base_url: Url,
    realm: String,
    client_id: String,
    client_secret: String,
    page_size: u32,
    tokens: Cache<&'static str, String>,
}

impl KeycloakDirectory {
    /// Build a client from configuration.
    pub fn new(config: &DirectoryConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "Invalid directory base URL: {}",
                    config.base_url
                ))
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| directory_error("Failed to build HTTP client", e))?;

        Ok(Self {
            client,
            base_url,
            realm: config.realm.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            page_size: config.page_size.max(1),
            tokens: Cache::builder()
                .max_capacity(1)
                .time_to_live(TOKEN_TTL)
                .build(),
        })
    }

    /// Base URL with `segments` appended, each percent-encoded as a single
    /// path segment.
    fn url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::configuration("Directory base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn admin_url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut path = vec!["admin", "realms", self.realm.as_str()];
        path.extend_from_slice(segments);
        self.url(&path)
    }

    async fn access_token(&self) -> AppResult<String> {
        if let Some(token) = self.tokens.get(TOKEN_KEY).await {
            return Ok(token);
        }

        let url = self.url(&[
            "realms",
            self.realm.as_str(),
            "protocol",
            "openid-connect",
            "token",
        ])?;
        let response = self
            .client
            .post(url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| directory_error("Token request failed", e))?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| directory_error("Malformed token response", e))?;

        debug!(realm = %self.realm, "Obtained directory access token");
        self.tokens.insert(TOKEN_KEY, token.access_token.clone()).await;
        Ok(token.access_token)
    }

    async fn get(&self, url: Url, query: &[(&str, u32)]) -> AppResult<reqwest::Response> {
        let token = self.access_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| directory_error("Directory request failed", e))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Token revoked or expired early; the next call fetches a new one.
            self.tokens.invalidate(TOKEN_KEY).await;
            warn!("Directory rejected the cached access token");
        }
        Ok(response)
    }
}

#[async_trait]
impl DirectoryLookup for KeycloakDirectory {
    async fn list_users(&self) -> AppResult<Vec<DirectoryUser>> {
        let mut users = Vec::new();
        let mut first: u32 = 0;

        loop {
            let page: Vec<KeycloakUser> = self
                .get(
                    self.admin_url(&["users"])?,
                    &[("first", first), ("max", self.page_size)],
                )
                .await?
                .error_for_status()
                .map_err(|e| directory_error("Failed to list users", e))?
                .json()
                .await
                .map_err(|e| directory_error("Malformed user list", e))?;

            let fetched = page.len();
            users.extend(page.into_iter().map(DirectoryUser::from));
            if fetched < self.page_size as usize {
                break;
            }
            first += self.page_size;
        }

        debug!(count = users.len(), "Listed directory users");
        Ok(users)
    }

    async fn effective_realm_roles(&self, user_id: &UserId) -> AppResult<Vec<String>> {
        let Some(segment) = user_segment(user_id) else {
            return Ok(Vec::new());
        };
        let url = self.admin_url(&["users", segment, "role-mappings", "realm", "composite"])?;
        let roles: Vec<RoleRepresentation> = self
            .get(url, &[])
            .await?
            .error_for_status()
            .map_err(|e| directory_error("Failed to read role mappings", e))?
            .json()
            .await
            .map_err(|e| directory_error("Malformed role mappings", e))?;

        Ok(roles.into_iter().map(|r| r.name).collect())
    }

    async fn find_user(&self, user_id: &UserId) -> AppResult<Option<DirectoryUser>> {
        let Some(segment) = user_segment(user_id) else {
            return Ok(None);
        };
        let response = self.get(self.admin_url(&["users", segment])?, &[]).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let user: KeycloakUser = response
            .error_for_status()
            .map_err(|e| directory_error("Failed to read user", e))?
            .json()
            .await
            .map_err(|e| directory_error("Malformed user", e))?;

        if user.id != user_id.as_str() {
            warn!(requested = %user_id, returned = %user.id, "Directory returned a different user");
            return Ok(None);
        }
        Ok(Some(user.into()))
    }
}

/// Ids that cannot name a user: blank or a dot segment, which URL
/// normalisation would drop from the path.
fn user_segment(user_id: &UserId) -> Option<&str> {
    match user_id.as_str() {
        "" | "." | ".." => None,
        id => Some(id),
    }
}

/// Map a transport or status error into [`ErrorKind::ExternalService`].
fn directory_error(context: &str, err: reqwest::Error) -> AppError {
    AppError::with_source(ErrorKind::ExternalService, format!("{context}: {err}"), err)
}
