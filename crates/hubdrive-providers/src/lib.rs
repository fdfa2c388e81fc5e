//! Drive access for a CRM portal.
//!
//! This crate connects the pieces between a portal ID and a folder view:
//!
//! - [`portal`] - the credentials service: resolve, check, refresh and save tokens
//! - [`google`] - Drive v3 and Google OAuth over HTTP
//! - [`DriveApi`] - the trait every Drive backend implements
//! - [`Session`] - the token and root folder of one browsing session
//! - [`FileBrowser`] - navigation, listing and mutations over a [`DriveApi`]
//! - [`ProviderError`] - Error types for remote operations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   portal ID   ┌────────────────────┐
//! │ CredentialResolver├─────────────►│ credentials service│
//! └────────┬─────────┘               └────────────────────┘
//!          │ PortalCredentials
//!          ▼
//!   ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//!   │   Session   ├────►│ FileBrowser ├────►│  DriveClient │──► Drive v3
//!   └─────────────┘     └─────────────┘     └──────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use hubdrive_core::NavigationStrategy;
//! use hubdrive_providers::google::{DriveClient, DriveConfig};
//! use hubdrive_providers::portal::{CredentialResolver, PortalClient, PortalConfig};
//! use hubdrive_providers::{FileBrowser, Session};
//!
//! let resolver = CredentialResolver::new(PortalClient::new(PortalConfig::default())?);
//! let credentials = resolver.resolve("1234567").await;
//! let session = Session::from_credentials("1234567", credentials, None);
//!
//! let mut browser = FileBrowser::new(DriveClient::new(DriveConfig::new())?, session, NavigationStrategy::Stack);
//! browser.refresh().await?;
//! ```

pub mod api;
pub mod browser;
pub mod error;
pub mod google;
mod http;
pub mod portal;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types at crate root
pub use api::{
    BoxFuture, DriveApi, Permission, ProgressFn, Role, UploadFile, ensure_child_folder,
    parse_emails,
};
pub use browser::{Activation, BrowserError, FileBrowser, ListingTicket, ShareOutcome};
pub use error::{ProviderError, ProviderErrorCode, ProviderResult, Service};
pub use session::{DRIVE_ROOT_ALIAS, Session};
