//! Wiring from configuration to a browsing session.

use hubdrive_core::{ItemFilter, NavigationStrategy};
use hubdrive_providers::google::DriveClient;
use hubdrive_providers::portal::{CredentialResolver, PortalClient};
use hubdrive_providers::{FileBrowser, Session};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Everything a command needs to reach a portal's Drive.
#[derive(Debug)]
pub struct Context {
    config: ClientConfig,
    portal_id: String,
    root_override: Option<String>,
}

impl Context {
    /// Creates a context; CLI values override the configuration file.
    pub fn new(
        config: ClientConfig,
        cli_portal: Option<&str>,
        cli_root: Option<String>,
    ) -> ClientResult<Self> {
        let portal_id = config.portal_id(cli_portal)?;
        let root_override = cli_root
            .filter(|r| !r.trim().is_empty())
            .or_else(|| config.portal.root_folder_id.clone());
        Ok(Self {
            config,
            portal_id,
            root_override,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the portal ID.
    pub fn portal_id(&self) -> &str {
        &self.portal_id
    }

    /// Creates a credentials service client.
    pub fn portal_client(&self) -> ClientResult<PortalClient> {
        Ok(PortalClient::new(self.config.portal_config()?)?)
    }

    /// Resolves the portal's credentials into a session.
    ///
    /// An unreachable service yields an unauthenticated session; commands
    /// then fail with an authentication error without calling Drive.
    pub async fn session(&self) -> ClientResult<Session> {
        let resolver = CredentialResolver::new(self.portal_client()?);
        let credentials = resolver.resolve(&self.portal_id).await;
        let session =
            Session::from_credentials(&self.portal_id, credentials, self.root_override.clone());
        debug!(
            portal_id = %self.portal_id,
            root = session.root_folder_id(),
            authenticated = session.is_authenticated(),
            "session ready"
        );
        Ok(session)
    }

    /// Opens a browser positioned at `folder`, or at the root.
    ///
    /// `strategy` overrides the configured navigation strategy.
    pub async fn browser(
        &self,
        folder: Option<&str>,
        filter: ItemFilter,
        strategy: Option<NavigationStrategy>,
    ) -> ClientResult<FileBrowser<DriveClient>> {
        let session = self.session().await?;
        let api = DriveClient::new(self.config.drive_config()?)?;
        let strategy = strategy.unwrap_or(self.config.drive.navigation);

        let browser = match folder {
            Some(folder) if folder != session.root_folder_id() => {
                FileBrowser::starting_at(api, session, strategy, folder)
            }
            _ => FileBrowser::new(api, session, strategy),
        };
        Ok(browser.with_filter(filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    #[test]
    fn cli_root_overrides_config_root() {
        let mut config = ClientConfig::default();
        config.portal.id = Some("42".into());
        config.portal.root_folder_id = Some("F-config".into());

        let ctx = Context::new(config.clone(), None, Some("F-cli".into())).unwrap();
        assert_eq!(ctx.root_override.as_deref(), Some("F-cli"));

        let ctx = Context::new(config, Some("7"), Some(" ".into())).unwrap();
        assert_eq!(ctx.portal_id(), "7");
        assert_eq!(ctx.root_override.as_deref(), Some("F-config"));
    }

    #[test]
    fn missing_portal_is_a_config_error() {
        let err = Context::new(ClientConfig::default(), None, None).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
