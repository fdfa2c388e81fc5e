//! Connecting a portal to a root folder.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use hubdrive_providers::portal::{ConnectRequest, CredentialStore};
use tracing::info;

use crate::config::save_portal_settings;
use crate::context::Context;
use crate::error::{ClientError, ClientResult};

/// Stores `folder_id` as the portal's root in the credentials service.
///
/// When `config_path` is given, the portal ID and folder are also written to
/// that configuration file.
pub async fn connect(ctx: &Context, folder_id: &str, config_path: Option<&Path>) -> ClientResult<()> {
    let folder_id = folder_id.trim();
    if folder_id.is_empty() {
        return Err(ClientError::Config("--folder-id must not be empty".to_string()));
    }

    let store = ctx.portal_client()?;
    let credentials = store.fetch(ctx.portal_id()).await?;
    let access_token = credentials.access_token.clone().ok_or_else(|| {
        ClientError::AuthRequired("the portal has no Drive token to attach the folder to".to_string())
    })?;

    let installed_date = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let request = ConnectRequest::new(ctx.portal_id(), &credentials, access_token, installed_date)
        .with_folder_id(folder_id);
    store.connect(&request).await?;
    info!(portal_id = ctx.portal_id(), folder_id, "connected root folder");
    println!("Portal {} now uses folder {}.", ctx.portal_id(), folder_id);

    if let Some(path) = config_path {
        save_portal_settings(path, ctx.portal_id(), folder_id)?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}
