//! REST client for the Battle.net profile API.
//!
//! Covers the three lookups the roster aggregation needs: the account
//! roster, per-character detail, and the Mythic+ keystone profile. Every
//! request carries the caller's access token as a Bearer header and the
//! configured `namespace` and `locale` query parameters.

use armory_core::roster::{CharacterDetail, CharacterSummary, MythicScore};
use reqwest::{StatusCode, Url};

use crate::config::BattleNetConfig;
use crate::dto::{AccountProfileResponse, CharacterDetailResponse, MythicProfileResponse};

/// HTTP client for the Battle.net profile API.
#[derive(Debug, Clone)]
pub struct BattleNetApi {
    client: reqwest::Client,
    base_url: Url,
    namespace: String,
    locale: String,
}

/// Errors from the Battle.net REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum BattleNetError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Battle.net returned a non-2xx status code.
    #[error("Battle.net API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The request could not be built from the given arguments.
    #[error("Invalid Battle.net request: {0}")]
    InvalidInput(String),
}

impl BattleNetApi {
    /// Create a client reusing an existing [`reqwest::Client`].
    ///
    /// Fails if `config.api_url` is not an absolute base URL.
    pub fn new(client: reqwest::Client, config: &BattleNetConfig) -> Result<Self, BattleNetError> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| BattleNetError::InvalidInput(format!("api_url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BattleNetError::InvalidInput(format!(
                "api_url is not a base URL: {}",
                config.api_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            namespace: config.namespace.clone(),
            locale: config.locale.clone(),
        })
    }

    /// List every character on every game account of the token's owner.
    ///
    /// Sends `GET /profile/user/wow` and flattens the accounts in order.
    pub async fn list_roster(
        &self,
        access_token: &str,
    ) -> Result<Vec<CharacterSummary>, BattleNetError> {
        let url = self.endpoint(&["profile", "user", "wow"])?;
        let response = self.get(url, access_token).await?;
        let profile: AccountProfileResponse = Self::parse_response(response).await?;
        Ok(profile.into_roster())
    }

    /// Fetch spec, guild and item level for one character.
    ///
    /// Sends `GET /profile/wow/character/{realm_slug}/{name}`.
    pub async fn character_detail(
        &self,
        access_token: &str,
        realm_slug: &str,
        name: &str,
    ) -> Result<CharacterDetail, BattleNetError> {
        let name = name.to_lowercase();
        let url = self.endpoint(&["profile", "wow", "character", realm_slug, &name])?;
        let response = self.get(url, access_token).await?;
        let detail: CharacterDetailResponse = Self::parse_response(response).await?;
        Ok(detail.into())
    }

    /// Fetch the current Mythic+ rating for one character.
    ///
    /// Returns `Ok(None)` when Battle.net has no keystone profile for the
    /// character (HTTP 404).
    pub async fn mythic_score(
        &self,
        access_token: &str,
        realm_slug: &str,
        name: &str,
    ) -> Result<Option<MythicScore>, BattleNetError> {
        let name = name.to_lowercase();
        let url = self.endpoint(&[
            "profile",
            "wow",
            "character",
            realm_slug,
            &name,
            "mythic-keystone-profile",
        ])?;
        let response = self.get(url, access_token).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let profile: MythicProfileResponse = Self::parse_response(response).await?;
        Ok(Some(profile.into()))
    }

    // ---- private helpers ----

    /// Build an endpoint URL from raw path segments. Segments are
    /// percent-encoded, so realm slugs and names with non-ASCII letters are
    /// safe to pass through.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BattleNetError> {
        if segments.iter().any(|s| s.is_empty()) {
            return Err(BattleNetError::InvalidInput(format!(
                "empty path segment in /{}",
                segments.join("/")
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BattleNetError::InvalidInput("api_url is not a base URL".into()))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("namespace", &self.namespace)
            .append_pair("locale", &self.locale);
        Ok(url)
    }

    async fn get(&self, url: Url, access_token: &str) -> Result<reqwest::Response, BattleNetError> {
        tracing::debug!(path = %url.path(), "Battle.net request");
        Ok(self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`BattleNetError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BattleNetError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(BattleNetError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BattleNetError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;

    use super::*;

    fn api(api_url: &str) -> BattleNetApi {
        let config = BattleNetConfig {
            api_url: api_url.to_string(),
            namespace: "profile-eu".to_string(),
            locale: "en_GB".to_string(),
            identity_url: "http://localhost:8080".to_string(),
            client_timeout: Duration::from_secs(1),
        };
        BattleNetApi::new(reqwest::Client::new(), &config).unwrap()
    }

    #[test]
    fn endpoint_encodes_segments_and_query() {
        let url = api("https://eu.api.blizzard.com")
            .endpoint(&["profile", "wow", "character", "twisting-nether", "thrâll"])
            .unwrap();

        assert_eq!(url.path(), "/profile/wow/character/twisting-nether/thr%C3%A2ll");
        assert_eq!(url.query(), Some("namespace=profile-eu&locale=en_GB"));
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let url = api("http://127.0.0.1:9000/proxy")
            .endpoint(&["profile", "user", "wow"])
            .unwrap();
        assert_eq!(url.path(), "/proxy/profile/user/wow");
    }

    #[test]
    fn endpoint_rejects_empty_segment() {
        let result = api("https://eu.api.blizzard.com").endpoint(&["profile", "wow", "character", "", "x"]);
        assert_matches!(result, Err(BattleNetError::InvalidInput(_)));
    }

    #[test]
    fn new_rejects_relative_url() {
        let config = BattleNetConfig {
            api_url: "not a url".to_string(),
            namespace: "profile-eu".to_string(),
            locale: "en_GB".to_string(),
            identity_url: "http://localhost:8080".to_string(),
            client_timeout: Duration::from_secs(1),
        };
        let result = BattleNetApi::new(reqwest::Client::new(), &config);
        assert_matches!(result, Err(BattleNetError::InvalidInput(_)));
    }
}
