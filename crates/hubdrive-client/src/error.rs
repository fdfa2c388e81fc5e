//! Client error types.

use std::fmt;

use hubdrive_core::ValidationError;
use hubdrive_providers::{BrowserError, ProviderError};

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Remote call failed outside a browsing session.
    Provider(ProviderError),
    /// A browsing operation failed.
    Browser(BrowserError),
    /// IO error.
    Io(std::io::Error),
    /// No usable Drive credentials.
    AuthRequired(String),
    /// Action failed (open in browser, etc).
    Action(String),
    /// The user declined a confirmation prompt.
    Aborted,
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Provider(err) => write!(f, "{}", err),
            Self::Browser(err) => write!(f, "{}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::AuthRequired(msg) => write!(f, "authentication required: {}", msg),
            Self::Action(msg) => write!(f, "action failed: {}", msg),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Provider(err) => Some(err),
            Self::Browser(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

impl From<BrowserError> for ClientError {
    fn from(err: BrowserError) -> Self {
        match err {
            BrowserError::CredentialsUnavailable => Self::AuthRequired(
                "no Drive token is stored for this portal; connect the portal first".to_string(),
            ),
            other => Self::Browser(other),
        }
    }
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        Self::Browser(BrowserError::Validation(err))
    }
}
