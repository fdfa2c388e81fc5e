//! Per-portal session context.
//!
//! A [`Session`] is built once from the resolved credentials and handed to
//! whatever needs the token or the root folder. Nothing reads credentials
//! from ambient state.

use crate::portal::PortalCredentials;

/// Drive's alias for the user's own root folder.
pub const DRIVE_ROOT_ALIAS: &str = "root";

/// Credentials and root folder for one browsing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    portal_id: String,
    access_token: Option<String>,
    root_folder_id: String,
    email: Option<String>,
}

impl Session {
    /// Creates an unauthenticated session rooted at `root_folder_id`.
    pub fn new(portal_id: impl Into<String>, root_folder_id: impl Into<String>) -> Self {
        Self {
            portal_id: portal_id.into(),
            access_token: None,
            root_folder_id: root_folder_id.into(),
            email: None,
        }
    }

    /// Builds a session from resolved credentials.
    ///
    /// The root is `root_override` when given, else the folder stored for the
    /// portal, else the Drive root alias.
    pub fn from_credentials(
        portal_id: impl Into<String>,
        credentials: PortalCredentials,
        root_override: Option<String>,
    ) -> Self {
        let root_folder_id = root_override
            .filter(|r| !r.is_empty())
            .or(credentials.folder_id)
            .unwrap_or_else(|| DRIVE_ROOT_ALIAS.to_string());

        Self {
            portal_id: portal_id.into(),
            access_token: credentials.access_token,
            root_folder_id,
            email: credentials.email,
        }
    }

    /// Builder method to set the access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.set_access_token(token);
        self
    }

    /// Returns the portal ID.
    pub fn portal_id(&self) -> &str {
        &self.portal_id
    }

    /// Returns the access token, if one is held.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Returns the root folder ID.
    pub fn root_folder_id(&self) -> &str {
        &self.root_folder_id
    }

    /// Returns the account email, if known.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns true if an access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Drops the access token.
    pub fn clear_token(&mut self) {
        self.access_token = None;
    }

    /// Supplies a new access token. Empty tokens are ignored.
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        if !token.is_empty() {
            self.access_token = Some(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(folder: Option<&str>) -> PortalCredentials {
        PortalCredentials {
            access_token: Some("T".into()),
            folder_id: folder.map(String::from),
            email: Some("owner@example.com".into()),
            ..PortalCredentials::default()
        }
    }

    #[test]
    fn root_prefers_override_then_stored_folder() {
        let session = Session::from_credentials("1", credentials(Some("F1")), Some("X".into()));
        assert_eq!(session.root_folder_id(), "X");

        let session = Session::from_credentials("1", credentials(Some("F1")), None);
        assert_eq!(session.root_folder_id(), "F1");

        let session = Session::from_credentials("1", credentials(None), Some(String::new()));
        assert_eq!(session.root_folder_id(), DRIVE_ROOT_ALIAS);
    }

    #[test]
    fn token_lifecycle() {
        let mut session = Session::from_credentials("1", credentials(None), None);
        assert!(session.is_authenticated());
        assert_eq!(session.email(), Some("owner@example.com"));

        session.clear_token();
        assert!(!session.is_authenticated());

        session.set_access_token("");
        assert!(!session.is_authenticated());

        session.set_access_token("T2");
        assert_eq!(session.access_token(), Some("T2"));
    }

    #[test]
    fn new_session_is_unauthenticated() {
        let session = Session::new("1", "F1");
        assert!(!session.is_authenticated());
        assert_eq!(session.portal_id(), "1");
        assert!(Session::new("1", "F1").with_access_token("T").is_authenticated());
    }
}
