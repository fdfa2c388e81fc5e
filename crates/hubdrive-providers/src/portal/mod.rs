//! The portal credentials service.
//!
//! A portal (a CRM account) is connected to one Google Drive installation.
//! The service stores that installation's tokens and root folder; this module
//! reads them ([`CredentialResolver`]), keeps them fresh ([`TokenChecker`]) and
//! writes them back ([`CredentialStore::save`]).

mod checker;
mod client;
mod credentials;
mod resolver;

pub use checker::{TokenChecker, TokenStatus};
pub use client::{CredentialStore, PortalClient, PortalConfig};
pub use credentials::{ConnectRequest, PortalCredentials, TokenPayload};
pub use resolver::CredentialResolver;
