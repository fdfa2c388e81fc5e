//! Google Drive and Google OAuth over HTTP.
//!
//! - [`DriveClient`]: the [`crate::DriveApi`] implementation for Drive v3
//! - [`OAuthClient`]: token validation and refresh, used by the token checker
//!
//! # Example
//!
//! ```ignore
//! use hubdrive_providers::google::{DriveClient, DriveConfig};
//! use hubdrive_providers::DriveApi;
//! use hubdrive_core::ItemFilter;
//!
//! let client = DriveClient::new(DriveConfig::new().with_team_drive("0AB..."))?;
//! let items = client.list_folder(&token, &folder_id, &ItemFilter::All).await?;
//! ```

mod client;
mod config;
mod oauth;

pub use client::DriveClient;
pub use config::{DriveConfig, OAuthCredentials};
pub use oauth::{OAuthClient, RefreshedToken, TokenAuthority, TokenInfo};
