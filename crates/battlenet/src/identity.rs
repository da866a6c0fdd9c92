//! Client for the identity service that owns player sessions.
//!
//! The service validates the caller's session JWT, reports who the player
//! is, and hands out the Battle.net access token linked to the session.

use serde::Deserialize;

/// The player behind a session JWT.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub battletag: String,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    #[serde(default)]
    access: String,
}

/// Errors from the identity service.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("Identity request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The identity service refused the session.
    #[error("Identity service rejected the session ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The service answered 2xx but without a usable value.
    #[error("Identity service returned an empty {0}")]
    Empty(&'static str),
}

/// HTTP client for the identity service.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    /// * `base_url` - e.g. `http://auth_service:8080`, without a trailing slash.
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Resolve a session JWT to the player it belongs to.
    ///
    /// Sends `GET /auth/user`.
    pub async fn resolve_user(&self, jwt: &str) -> Result<UserIdentity, IdentityError> {
        let user: UserIdentity = self.get_json("/auth/user", jwt).await?;
        if user.id.trim().is_empty() {
            return Err(IdentityError::Empty("user id"));
        }
        Ok(user)
    }

    /// Exchange a session JWT for the linked Battle.net access token.
    ///
    /// Sends `GET /auth/blizzard/token`.
    pub async fn exchange_token(&self, jwt: &str) -> Result<String, IdentityError> {
        let token: AccessTokenResponse = self.get_json("/auth/blizzard/token", jwt).await?;
        if token.access.trim().is_empty() {
            return Err(IdentityError::Empty("access token"));
        }
        Ok(token.access)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        jwt: &str,
    ) -> Result<T, IdentityError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(url)
            .bearer_auth(jwt)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}
