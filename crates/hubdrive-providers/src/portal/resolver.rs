//! Resolving a portal ID into usable credentials.

use std::time::Duration;

use hubdrive_core::validate;
use tracing::{debug, warn};

use super::client::CredentialStore;
use super::credentials::PortalCredentials;

/// Longest wait before a retry, whatever the server asks for.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Fetches credentials for a portal, never failing outright.
///
/// Any failure (empty portal ID, unreachable service, malformed response,
/// placeholder token) degrades to an unauthenticated result. Transient
/// failures are retried, at most [`CredentialResolver::MAX_RETRIES`] times.
#[derive(Debug)]
pub struct CredentialResolver<S> {
    store: S,
    retry_delay: Duration,
}

impl<S: CredentialStore> CredentialResolver<S> {
    /// Upper bound on retries after the first attempt.
    pub const MAX_RETRIES: u32 = 1;

    /// Creates a resolver with a one second retry delay.
    pub fn new(store: S) -> Self {
        Self {
            store,
            retry_delay: Duration::from_secs(1),
        }
    }

    /// Builder method to set the delay before a retry.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolves the credentials of `portal_id`.
    pub async fn resolve(&self, portal_id: &str) -> PortalCredentials {
        let Ok(portal_id) = validate::portal_id(portal_id) else {
            warn!("no portal ID given; continuing unauthenticated");
            return PortalCredentials::unauthenticated();
        };

        let mut attempt = 0;
        loop {
            match self.store.fetch(portal_id).await {
                Ok(credentials) => {
                    if !credentials.is_authenticated() {
                        warn!(portal_id, "credentials service holds no usable token");
                    }
                    debug!(portal_id, folder = ?credentials.folder_id, "resolved credentials");
                    return credentials;
                }
                Err(e) if e.is_retryable() && attempt < Self::MAX_RETRIES => {
                    attempt += 1;
                    let delay = e.retry_after().unwrap_or(self.retry_delay).min(MAX_RETRY_DELAY);
                    warn!(portal_id, error = %e, attempt, ?delay, "credentials fetch failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(portal_id, error = %e, "credentials fetch failed; continuing unauthenticated");
                    return PortalCredentials::unauthenticated();
                }
            }
        }
    }
}
