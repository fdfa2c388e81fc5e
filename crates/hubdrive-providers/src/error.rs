//! Errors from Drive, the OAuth token endpoint and the credentials service.
//!
//! All three report a [`ProviderError`]: a [`ProviderErrorCode`] used for
//! retry decisions and for the browser's error mapping, a message, and the
//! [`Service`] that failed. A 401 from any of them is
//! [`ProviderErrorCode::AuthenticationFailed`]; the browser turns that into
//! "access expired" and drops the token.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Which remote service produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Google Drive v3.
    Drive,
    /// Google's OAuth token and tokeninfo endpoints.
    OAuth,
    /// The portal credentials service.
    Portal,
}

impl Service {
    /// Short lowercase name used in messages and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drive => "drive",
            Self::OAuth => "oauth",
            Self::Portal => "portal",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// HTTP 401: the access token is missing, expired or revoked.
    AuthenticationFailed,
    /// HTTP 403: the token is valid but lacks access to the item.
    AuthorizationFailed,
    /// The request never got a response (DNS, connect, timeout).
    NetworkError,
    /// HTTP 429.
    RateLimited,
    /// Any other non-success status.
    ServerError,
    /// A success status with a body that could not be understood.
    InvalidResponse,
    /// HTTP 404.
    NotFound,
    /// HTTP 400.
    BadRequest,
    /// Local configuration prevents the call (bad URL, no OAuth client).
    ConfigurationError,
    /// The credentials service holds no usable token for the portal.
    CredentialsUnavailable,
    /// Failure inside this crate, e.g. the HTTP client could not be built.
    InternalError,
}

impl ProviderErrorCode {
    /// Classifies a non-success HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::AuthenticationFailed,
            403 => Self::AuthorizationFailed,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            _ => Self::ServerError,
        }
    }

    /// Transient failures: the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    /// Snake-case name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::ConfigurationError => "configuration_error",
            Self::CredentialsUnavailable => "credentials_unavailable",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed remote operation.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    service: Option<Service>,
    retry_after: Option<Duration>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

macro_rules! code_constructors {
    ($($(#[$doc:meta])* $name:ident => $code:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ProviderErrorCode::$code, message)
            }
        )*
    };
}

impl ProviderError {
    /// Creates an error with an explicit code.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            service: None,
            retry_after: None,
            source: None,
        }
    }

    code_constructors! {
        /// The token was rejected (401).
        authentication => AuthenticationFailed;
        /// Access to the item was denied (403).
        authorization => AuthorizationFailed;
        /// No response was received.
        network => NetworkError;
        /// Too many requests (429).
        rate_limited => RateLimited;
        /// Unexpected status from the service.
        server => ServerError;
        /// The response body was malformed.
        invalid_response => InvalidResponse;
        /// The item does not exist (404).
        not_found => NotFound;
        /// The request was rejected as malformed (400).
        bad_request => BadRequest;
        /// Local configuration is unusable.
        configuration => ConfigurationError;
        /// The portal has no usable token.
        credentials_unavailable => CredentialsUnavailable;
        /// Failure inside this crate.
        internal => InternalError;
    }

    /// Tags the error with the service that produced it.
    ///
    /// An existing tag is kept, so the innermost service wins.
    pub fn with_service(mut self, service: Service) -> Self {
        self.service.get_or_insert(service);
        self
    }

    /// Records the server's `Retry-After` hint.
    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }

    /// Attaches the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the service that produced the error, if tagged.
    pub fn service(&self) -> Option<Service> {
        self.service
    }

    /// Returns how long the server asked callers to wait, if it said.
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    /// See [`ProviderErrorCode::is_retryable`].
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// True for a 401: the access token must be discarded.
    pub fn is_auth_expired(&self) -> bool {
        self.code == ProviderErrorCode::AuthenticationFailed
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(service) = self.service {
            write!(f, "[{}] ", service)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Result of a remote operation.
pub type ProviderResult<T> = Result<T, ProviderError>;
