//! Google OAuth token endpoints.
//!
//! Access tokens are issued by the portal's installation flow, not by this
//! crate. This module only checks whether a token is still accepted and
//! exchanges a refresh token for a new access token.

use serde::Deserialize;
use tracing::{debug, info};

use crate::api::BoxFuture;
use crate::error::{ProviderError, ProviderResult, Service};
use crate::http::{build_client, read_json, send_error, tagged};

use super::config::{DriveConfig, OAuthCredentials};

/// Google OAuth endpoints.
const GOOGLE_TOKEN_INFO_URL: &str = "https://www.googleapis.com/oauth2/v1/tokeninfo";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// What Google reports about a live access token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenInfo {
    /// Account the token belongs to, when the email scope was granted.
    #[serde(default)]
    pub email: Option<String>,
    /// Seconds until the token expires.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Space-separated granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
}

/// A freshly minted access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedToken {
    /// The new access token.
    pub access_token: String,
    /// Lifetime in seconds, if reported.
    pub expires_in: Option<i64>,
}

/// Validates and refreshes access tokens.
///
/// [`OAuthClient`] talks to Google; tests use an in-memory double.
pub trait TokenAuthority: Send + Sync {
    /// Returns token details, or an authentication error if the token is no
    /// longer valid.
    fn token_info<'a>(&'a self, access_token: &'a str) -> BoxFuture<'a, ProviderResult<TokenInfo>>;

    /// Exchanges a refresh token for a new access token.
    fn refresh<'a>(&'a self, refresh_token: &'a str)
    -> BoxFuture<'a, ProviderResult<RefreshedToken>>;
}

/// OAuth client for Google's token endpoints.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: Option<OAuthCredentials>,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Creates a new OAuth client from the Drive configuration.
    pub fn new(config: &DriveConfig) -> ProviderResult<Self> {
        Ok(Self {
            credentials: config.credentials.clone(),
            http_client: build_client(config.timeout, &config.user_agent)?,
        })
    }

    /// Asks Google whether `access_token` is still valid.
    pub async fn check_token(&self, access_token: &str) -> ProviderResult<TokenInfo> {
        let response = self
            .http_client
            .get(GOOGLE_TOKEN_INFO_URL)
            .query(&[("access_token", access_token)])
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, "token rejected by tokeninfo");
            return Err(ProviderError::authentication(format!(
                "access token rejected ({}): {}",
                status, body
            )));
        }

        read_json(response).await
    }

    /// Refreshes an expired access token using the refresh token.
    pub async fn refresh_token(&self, refresh_token: &str) -> ProviderResult<RefreshedToken> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            ProviderError::configuration("OAuth client credentials are required to refresh tokens")
        })?;

        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("token refresh request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::authentication(format!(
                "token refresh failed ({}): {}",
                status, body
            )));
        }

        let token = parse_token_response(&body)?;
        info!("successfully refreshed access token");
        Ok(token)
    }
}

impl TokenAuthority for OAuthClient {
    fn token_info<'a>(&'a self, access_token: &'a str) -> BoxFuture<'a, ProviderResult<TokenInfo>> {
        tagged(Service::OAuth, self.check_token(access_token))
    }

    fn refresh<'a>(
        &'a self,
        refresh_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<RefreshedToken>> {
        tagged(Service::OAuth, self.refresh_token(refresh_token))
    }
}

/// Token response from Google's OAuth server.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

fn parse_token_response(body: &str) -> ProviderResult<RefreshedToken> {
    let response: TokenResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::invalid_response(format!("invalid token response: {}", e)))?;

    if response.access_token.is_empty() {
        return Err(ProviderError::invalid_response(
            "token response carried an empty access token",
        ));
    }

    Ok(RefreshedToken {
        access_token: response.access_token,
        expires_in: response.expires_in,
    })
}
