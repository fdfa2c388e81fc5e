//! Validating a portal's stored token and refreshing it when Google rejects it.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::google::TokenAuthority;

use super::client::CredentialStore;
use super::credentials::{ConnectRequest, PortalCredentials};

/// Outcome of a token check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenStatus {
    /// A token Google currently accepts.
    pub access_token: String,
    /// Root folder stored for the portal.
    pub folder_id: Option<String>,
    /// True when the stored token was replaced.
    pub refreshed: bool,
}

/// Checks a portal's access token, refreshing it at most once.
#[derive(Debug)]
pub struct TokenChecker<S, T> {
    store: S,
    authority: T,
}

impl<S: CredentialStore, T: TokenAuthority> TokenChecker<S, T> {
    /// Creates a checker.
    pub fn new(store: S, authority: T) -> Self {
        Self { store, authority }
    }

    /// Returns the credentials store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the token authority.
    pub fn authority(&self) -> &T {
        &self.authority
    }

    /// Returns a valid access token for `portal_id`.
    ///
    /// A token Google accepts is returned as is. Any other tokeninfo outcome,
    /// including a network failure, leads to exactly one exchange of the
    /// refresh token; the new token is saved back to the store
    /// (a failed save is logged, not returned).
    ///
    /// # Errors
    ///
    /// Fails when the portal has no access token, has no refresh token, or
    /// when the refresh itself is rejected.
    pub async fn check(&self, portal_id: &str) -> ProviderResult<TokenStatus> {
        let credentials = self.store.fetch(portal_id).await?;

        let access_token = credentials.access_token.clone().ok_or_else(|| {
            ProviderError::credentials_unavailable("portal has no access token")
        })?;

        match self.authority.token_info(&access_token).await {
            Ok(_) => {
                return Ok(TokenStatus {
                    access_token,
                    folder_id: credentials.folder_id,
                    refreshed: false,
                });
            }
            Err(e) => {
                warn!(portal_id, error = %e, "access token not confirmed, refreshing");
            }
        }

        let refresh_token = credentials.refresh_token.as_deref().ok_or_else(|| {
            ProviderError::credentials_unavailable("portal has no refresh token")
        })?;

        let refreshed = self.authority.refresh(refresh_token).await?;
        self.persist(portal_id, &credentials, &refreshed.access_token)
            .await;

        Ok(TokenStatus {
            access_token: refreshed.access_token,
            folder_id: credentials.folder_id,
            refreshed: true,
        })
    }

    async fn persist(&self, portal_id: &str, credentials: &PortalCredentials, access_token: &str) {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let request = ConnectRequest::new(portal_id, credentials, access_token, now);
        match self.store.save_token(&request).await {
            Ok(()) => info!(portal_id, "stored refreshed access token"),
            Err(e) => warn!(portal_id, error = %e, "failed to store refreshed access token"),
        }
    }
}
