//! HTTP client for the portal credentials service.

use std::time::Duration;

use tracing::{debug, info};

use crate::api::BoxFuture;
use crate::error::{ProviderError, ProviderResult, Service};
use crate::http::{build_client, check_status, send_error, tagged};

use super::credentials::{ConnectRequest, PortalCredentials};

/// Reads and writes the Drive credentials stored for a portal.
pub trait CredentialStore: Send + Sync {
    /// Fetches the credentials for `portal_id`.
    fn fetch<'a>(&'a self, portal_id: &'a str) -> BoxFuture<'a, ProviderResult<PortalCredentials>>;

    /// Registers the portal's connection, e.g. after choosing a root folder.
    fn connect<'a>(&'a self, request: &'a ConnectRequest) -> BoxFuture<'a, ProviderResult<()>>;

    /// Writes back a refreshed access token.
    fn save_token<'a>(&'a self, request: &'a ConnectRequest) -> BoxFuture<'a, ProviderResult<()>>;
}

/// Endpoints and options of the credentials service.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Endpoint returning credentials for a `{"hubId": ...}` body.
    pub credentials_url: String,
    /// Endpoint registering a [`ConnectRequest`] (sent with bearer auth).
    pub connect_url: String,
    /// Endpoint storing a refreshed token.
    pub token_save_url: String,
    /// Optional bearer token sent with save requests.
    pub bearer_token: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
}

impl PortalConfig {
    /// Default credentials endpoint.
    pub const DEFAULT_CREDENTIALS_URL: &'static str = "https://gdrive.nexce.io/fe/api/db/get";

    /// Default connect endpoint.
    pub const DEFAULT_CONNECT_URL: &'static str = "https://gdrive.nexce.io/fe/api/db/connect";

    /// Default endpoint for refreshed tokens.
    pub const DEFAULT_TOKEN_SAVE_URL: &'static str =
        "https://gdrive.nexce.io/connect-platform-app/application/save-token";

    /// Builder method to set the bearer token.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Validates that both endpoints are absolute HTTP(S) URLs.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("credentials_url", &self.credentials_url),
            ("connect_url", &self.connect_url),
            ("token_save_url", &self.token_save_url),
        ] {
            let parsed = url::Url::parse(value).map_err(|e| format!("invalid {name}: {e}"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(format!("{name} must use http or https"));
            }
        }
        Ok(())
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            credentials_url: Self::DEFAULT_CREDENTIALS_URL.to_string(),
            connect_url: Self::DEFAULT_CONNECT_URL.to_string(),
            token_save_url: Self::DEFAULT_TOKEN_SAVE_URL.to_string(),
            bearer_token: None,
            timeout: Duration::from_secs(15),
        }
    }
}

/// [`CredentialStore`] backed by the HTTP credentials service.
#[derive(Debug)]
pub struct PortalClient {
    http_client: reqwest::Client,
    config: PortalConfig,
}

impl PortalClient {
    /// Creates a new client.
    pub fn new(config: PortalConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;
        let user_agent = format!("hubdrive/{}", env!("CARGO_PKG_VERSION"));
        Ok(Self {
            http_client: build_client(config.timeout, &user_agent)?,
            config,
        })
    }

    async fn post_fetch(&self, portal_id: &str) -> ProviderResult<PortalCredentials> {
        debug!(portal_id, "fetching portal credentials");
        let response = self
            .http_client
            .post(&self.config.credentials_url)
            .json(&serde_json::json!({ "hubId": portal_id }))
            .send()
            .await
            .map_err(send_error)?;

        let body = check_status(response, "portal")
            .await?
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        PortalCredentials::from_response(&body).map_err(|e| {
            ProviderError::invalid_response(format!("invalid credentials response: {}", e))
        })
    }

    async fn post_connect(&self, request: &ConnectRequest) -> ProviderResult<()> {
        let mut builder = self.http_client.post(&self.config.connect_url).json(request);
        if let Some(token) = &self.config.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(send_error)?;
        check_status(response, "portal connection").await?;
        info!(portal_id = %request.hub_id, "registered portal connection");
        Ok(())
    }

    async fn post_token(&self, request: &ConnectRequest) -> ProviderResult<()> {
        let response = self
            .http_client
            .post(&self.config.token_save_url)
            .json(request)
            .send()
            .await
            .map_err(send_error)?;
        check_status(response, "portal token").await?;
        info!(portal_id = %request.hub_id, "saved refreshed token");
        Ok(())
    }
}

impl CredentialStore for PortalClient {
    fn fetch<'a>(&'a self, portal_id: &'a str) -> BoxFuture<'a, ProviderResult<PortalCredentials>> {
        tagged(Service::Portal, self.post_fetch(portal_id))
    }

    fn connect<'a>(&'a self, request: &'a ConnectRequest) -> BoxFuture<'a, ProviderResult<()>> {
        tagged(Service::Portal, self.post_connect(request))
    }

    fn save_token<'a>(&'a self, request: &'a ConnectRequest) -> BoxFuture<'a, ProviderResult<()>> {
        tagged(Service::Portal, self.post_token(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PortalConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.bearer_token.is_none());
        assert!(PortalClient::new(config).is_ok());
    }

    #[test]
    fn rejects_non_http_endpoints() {
        let config = PortalConfig {
            credentials_url: "ftp://example.com/get".into(),
            ..PortalConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PortalConfig {
            connect_url: "relative/path".into(),
            ..PortalConfig::default()
        };
        assert!(PortalClient::new(config).is_err());
    }

    #[test]
    fn connect_and_token_writes_use_separate_endpoints() {
        let config = PortalConfig::default();
        assert!(config.connect_url.ends_with("/fe/api/db/connect"));
        assert!(config.token_save_url.ends_with("/application/save-token"));
        assert_ne!(config.connect_url, config.token_save_url);

        let config = PortalConfig {
            token_save_url: "not a url".into(),
            ..PortalConfig::default()
        };
        assert!(config.validate().unwrap_err().contains("token_save_url"));
    }

    #[test]
    fn bearer_token_builder() {
        let config = PortalConfig::default().with_bearer_token("abc");
        assert_eq!(config.bearer_token.as_deref(), Some("abc"));
    }
}
