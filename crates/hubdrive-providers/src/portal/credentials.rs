//! Credential records exchanged with the portal credentials service.

use serde::{Deserialize, Serialize};

/// Placeholder the service stores in place of a real access token.
const PLACEHOLDER_TOKEN: &str = "default";

/// Google Drive credentials the service holds for one portal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalCredentials {
    /// Bearer token for Drive calls. `None` means unauthenticated.
    pub access_token: Option<String>,
    /// Refresh token, used only by the token checker.
    pub refresh_token: Option<String>,
    /// Root folder configured for the portal.
    pub folder_id: Option<String>,
    /// Google account that authorized the installation.
    pub email: Option<String>,
    /// When the portal installed the app, as reported by the service.
    pub installed_date: Option<String>,
}

impl PortalCredentials {
    /// Credentials carrying no token at all.
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    /// Returns true if an access token is present.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Parses the body returned by the credentials endpoint.
    ///
    /// The payload looks like
    /// `{"data": {"token": {"access_token", "refresh_token"}, "folder_id", "email", "installed_date"}}`.
    /// Missing sections produce `None` fields rather than an error; the
    /// placeholder token `"default"` and empty strings count as absent.
    pub fn from_response(body: &str) -> Result<Self, serde_json::Error> {
        let envelope: Envelope = serde_json::from_str(body)?;
        let data = envelope.data.unwrap_or_default();
        let token = data.token.unwrap_or_default();

        Ok(Self {
            access_token: non_placeholder(token.access_token),
            refresh_token: non_empty(token.refresh_token),
            folder_id: non_empty(data.folder_id),
            email: non_empty(data.email),
            installed_date: non_empty(data.installed_date),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_placeholder(value: Option<String>) -> Option<String> {
    non_empty(value).filter(|v| v != PLACEHOLDER_TOKEN)
}

#[derive(Debug, Default, Deserialize)]
struct Envelope {
    data: Option<CredentialData>,
}

#[derive(Debug, Default, Deserialize)]
struct CredentialData {
    token: Option<TokenData>,
    folder_id: Option<String>,
    email: Option<String>,
    installed_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenData {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// Body persisted by the service's save endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectRequest {
    /// Portal the credentials belong to.
    pub hub_id: String,
    /// Google account email.
    pub email: String,
    /// Installation or update timestamp (RFC 3339).
    pub installed_date: String,
    /// Token pair.
    pub token: TokenPayload,
    /// Root folder for the portal.
    pub folder_id: Option<String>,
    /// Always `"google_drive"`.
    pub platform_name: &'static str,
}

/// Token section of a [`ConnectRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPayload {
    /// Access token.
    pub access_token: String,
    /// Refresh token, when known.
    pub refresh_token: Option<String>,
    /// The service expects the literal `"default"`.
    pub expires_in: &'static str,
    /// Always `"Bearer"`.
    pub token_type: &'static str,
}

impl ConnectRequest {
    /// Builds a save request from existing credentials and a new access token.
    pub fn new(
        hub_id: impl Into<String>,
        credentials: &PortalCredentials,
        access_token: impl Into<String>,
        installed_date: impl Into<String>,
    ) -> Self {
        Self {
            hub_id: hub_id.into(),
            email: credentials
                .email
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            installed_date: installed_date.into(),
            token: TokenPayload {
                access_token: access_token.into(),
                refresh_token: credentials.refresh_token.clone(),
                expires_in: PLACEHOLDER_TOKEN,
                token_type: "Bearer",
            },
            folder_id: credentials.folder_id.clone(),
            platform_name: "google_drive",
        }
    }

    /// Builder method to point the portal at another root folder.
    pub fn with_folder_id(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }
}
