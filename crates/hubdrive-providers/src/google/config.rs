//! Google Drive client configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// OAuth 2.0 client credentials, needed only to refresh access tokens.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from Google Cloud Console.
    pub client_secret: String,
}

/// Layouts of a downloaded client secret file.
///
/// The Cloud Console nests the secret under `installed` (desktop apps) or
/// `web`; hand-written files often keep it flat.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClientSecretFile {
    Installed { installed: ClientSecret },
    Web { web: ClientSecret },
    Flat(ClientSecret),
}

#[derive(Debug, Deserialize)]
struct ClientSecret {
    client_id: String,
    client_secret: String,
}

impl OAuthCredentials {
    /// Creates new OAuth credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Reads a client secret file downloaded from the Cloud Console.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        Self::from_json(&content)
    }

    /// Parses any of the client secret layouts.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let secret = match serde_json::from_str(json) {
            Ok(ClientSecretFile::Installed { installed }) => installed,
            Ok(ClientSecretFile::Web { web }) => web,
            Ok(ClientSecretFile::Flat(flat)) => flat,
            Err(_) => {
                return Err(
                    "expected client_id and client_secret, at the root or under 'installed'/'web'"
                        .to_string(),
                );
            }
        };
        Ok(Self::new(secret.client_id, secret.client_secret))
    }

    /// Validates that the credentials appear to be correctly formatted.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// Configuration for [`super::DriveClient`] and [`super::OAuthClient`].
#[derive(Debug, Clone)]
pub struct DriveConfig {
    /// OAuth credentials, required for token refresh only.
    pub credentials: Option<OAuthCredentials>,

    /// Shared drive to scope listings to.
    ///
    /// When unset, listings search all drives.
    pub team_drive_id: Option<String>,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,

    /// Page size for `files.list`.
    pub page_size: u32,

    /// Drive v3 base URL.
    pub api_base: String,

    /// Drive v3 upload base URL.
    pub upload_base: String,
}

impl DriveConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default page size; the Drive maximum.
    pub const DEFAULT_PAGE_SIZE: u32 = 1000;

    /// Creates a configuration with defaults and no OAuth credentials.
    pub fn new() -> Self {
        Self {
            credentials: None,
            team_drive_id: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("hubdrive/{}", env!("CARGO_PKG_VERSION")),
            page_size: Self::DEFAULT_PAGE_SIZE,
            api_base: "https://www.googleapis.com/drive/v3".to_string(),
            upload_base: "https://www.googleapis.com/upload/drive/v3".to_string(),
        }
    }

    /// Builder method to set the OAuth credentials.
    pub fn with_credentials(mut self, credentials: OAuthCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Builder method to scope listings to a shared drive.
    pub fn with_team_drive(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.team_drive_id = (!id.is_empty()).then_some(id);
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder method to set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builder method to set the listing page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Builder method to point the client at another host.
    pub fn with_base_urls(mut self, api_base: impl Into<String>, upload_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.upload_base = upload_base.into();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(credentials) = &self.credentials {
            credentials
                .validate()
                .map_err(|e| format!("invalid credentials: {}", e))?;
        }

        if self.page_size == 0 || self.page_size > Self::DEFAULT_PAGE_SIZE {
            return Err(format!(
                "page size must be between 1 and {}",
                Self::DEFAULT_PAGE_SIZE
            ));
        }

        for base in [&self.api_base, &self.upload_base] {
            url::Url::parse(base).map_err(|e| format!("invalid base URL {base}: {e}"))?;
        }

        Ok(())
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self::new()
    }
}
