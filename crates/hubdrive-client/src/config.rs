//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/hubdrive/config.toml` by default:
//!
//! ```toml
//! [portal]
//! id = "1234567"
//! root_folder_id = "1AbC..."       # overrides the folder stored for the portal
//!
//! [drive]
//! team_drive_id = "0AbC..."
//! navigation = "parent_lookup"
//! view = "grid"
//!
//! [google]
//! client_id = "env::GOOGLE_CLIENT_ID"
//! client_secret = "pass::google/hubdrive"
//! ```
//!
//! Credential values (`client_id`, `client_secret`, `bearer_token`) support
//! secret references, see [`crate::secret`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use hubdrive_core::{FormatOptions, NavigationStrategy, ViewMode};
use hubdrive_providers::google::{DriveConfig, OAuthCredentials};
use hubdrive_providers::portal::PortalConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ClientError, ClientResult};

/// Configuration for the hubdrive client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Credentials service settings.
    pub portal: PortalSettings,

    /// Drive browsing settings.
    pub drive: DriveSettings,

    /// OAuth client, needed only to refresh tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google: Option<GoogleSettings>,
}

/// Credentials service settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
    /// Portal ID used when `--portal` is not given.
    pub id: Option<String>,

    /// Credentials endpoint.
    pub credentials_url: Option<String>,

    /// Connect endpoint used by `hubdrive connect`.
    pub connect_url: Option<String>,

    /// Endpoint receiving refreshed tokens from `hubdrive token check`.
    pub token_save_url: Option<String>,

    /// Root folder override.
    pub root_folder_id: Option<String>,

    /// Bearer token sent with save requests (supports secret references).
    pub bearer_token: Option<String>,
}

/// Drive browsing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveSettings {
    /// Shared drive to scope listings to.
    pub team_drive_id: Option<String>,

    /// Request timeout in seconds.
    pub timeout: u64,

    /// How `back` finds the parent folder.
    pub navigation: NavigationStrategy,

    /// Default listing view.
    pub view: ViewMode,

    /// Columns in grid view.
    pub grid_columns: usize,

    /// Show item IDs in list view.
    pub show_ids: bool,
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            team_drive_id: None,
            timeout: DriveConfig::DEFAULT_TIMEOUT_SECS,
            navigation: NavigationStrategy::default(),
            view: ViewMode::default(),
            grid_columns: 4,
            show_ids: true,
        }
    }
}

impl DriveSettings {
    /// Builds listing format options, with `view` overriding the configured one.
    pub fn format_options(&self, view: Option<ViewMode>) -> FormatOptions {
        FormatOptions::default()
            .with_view(view.unwrap_or(self.view))
            .with_grid_columns(self.grid_columns)
            .with_ids(self.show_ids)
    }
}

/// Google OAuth client settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleSettings {
    /// OAuth client ID (supports `pass::` and `env::` prefixes).
    pub client_id: Option<String>,

    /// OAuth client secret (supports `pass::` and `env::` prefixes).
    pub client_secret: Option<String>,

    /// Client secret JSON downloaded from the Cloud Console, used when the
    /// inline fields are absent.
    pub credentials_file: Option<PathBuf>,
}

impl GoogleSettings {
    /// Resolves the OAuth client from inline fields, falling back to
    /// `credentials_file`.
    pub fn resolve_credentials(&self) -> Result<OAuthCredentials, String> {
        let (Some(raw_id), Some(raw_secret)) = (&self.client_id, &self.client_secret) else {
            if let Some(file) = &self.credentials_file {
                let credentials = OAuthCredentials::from_file(file)?;
                credentials.validate()?;
                return Ok(credentials);
            }
            return Err(
                "set client_id and client_secret, or credentials_file, in [google]".to_string(),
            );
        };

        let client_id = crate::secret::resolve(raw_id)
            .map_err(|e| format!("failed to resolve client_id: {}", e))?;
        let client_secret = crate::secret::resolve(raw_secret)
            .map_err(|e| format!("failed to resolve client_secret: {}", e))?;

        let credentials = OAuthCredentials::new(client_id, client_secret);
        credentials.validate()?;
        Ok(credentials)
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if it does not exist.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hubdrive")
    }

    /// Returns the portal ID, with `cli` taking precedence.
    pub fn portal_id(&self, cli: Option<&str>) -> ClientResult<String> {
        let raw = cli.or(self.portal.id.as_deref()).unwrap_or_default();
        let id = hubdrive_core::validate::portal_id(raw).map_err(|_| {
            ClientError::Config(format!(
                "no portal ID. Pass --portal, set HUBDRIVE_PORTAL_ID, or add to {}:\n  \
                 [portal]\n  \
                 id = \"1234567\"",
                Self::default_path().display()
            ))
        })?;
        Ok(id.to_string())
    }

    /// Builds the credentials service configuration.
    pub fn portal_config(&self) -> ClientResult<PortalConfig> {
        let mut config = PortalConfig::default();
        if let Some(url) = &self.portal.credentials_url {
            config.credentials_url = url.clone();
        }
        if let Some(url) = &self.portal.connect_url {
            config.connect_url = url.clone();
        }
        if let Some(url) = &self.portal.token_save_url {
            config.token_save_url = url.clone();
        }
        if let Some(raw) = &self.portal.bearer_token {
            let token = crate::secret::resolve(raw)
                .map_err(|e| ClientError::Config(format!("failed to resolve bearer_token: {}", e)))?;
            config = config.with_bearer_token(token);
        }
        config.validate().map_err(ClientError::Config)?;
        Ok(config)
    }

    /// Builds the Drive client configuration.
    ///
    /// OAuth credentials are attached only when a `[google]` section exists.
    pub fn drive_config(&self) -> ClientResult<DriveConfig> {
        let mut config =
            DriveConfig::new().with_timeout(Duration::from_secs(self.drive.timeout.max(1)));
        if let Some(id) = &self.drive.team_drive_id {
            config = config.with_team_drive(id.clone());
        }
        if let Some(google) = &self.google {
            let credentials = google
                .resolve_credentials()
                .map_err(|e| ClientError::Config(format!("invalid Google credentials: {}", e)))?;
            config = config.with_credentials(credentials);
        }
        config.validate().map_err(ClientError::Config)?;
        Ok(config)
    }
}

/// Records the portal ID and root folder under `[portal]`, keeping the rest of the file.
pub fn save_portal_settings(path: &Path, portal_id: &str, folder_id: &str) -> ClientResult<()> {
    let content = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| ClientError::Config(format!("could not parse {}: {}", path.display(), e)))?;

    if !doc.contains_key("portal") {
        doc["portal"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    if let Some(portal) = doc["portal"].as_table_mut() {
        portal["id"] = toml_edit::value(portal_id);
        portal["root_folder_id"] = toml_edit::value(folder_id);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, doc.to_string())?;
    info!(path = %path.display(), "saved portal settings");
    Ok(())
}
