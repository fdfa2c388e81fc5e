//! Token commands.

use hubdrive_providers::google::OAuthClient;
use hubdrive_providers::portal::{TokenChecker, TokenStatus};

use crate::context::Context;
use crate::error::{ClientError, ClientResult};

/// Checks the portal's access token, refreshing it once if needed.
pub async fn check(ctx: &Context, json: bool) -> ClientResult<()> {
    let store = ctx.portal_client()?;
    let authority = OAuthClient::new(&ctx.config().drive_config()?)?;
    let status = TokenChecker::new(store, authority)
        .check(ctx.portal_id())
        .await?;

    if json {
        let out = serde_json::to_string_pretty(&status)
            .map_err(|e| ClientError::Action(format!("failed to serialize status: {}", e)))?;
        println!("{}", out);
    } else {
        println!("{}", describe(&status));
    }
    Ok(())
}

fn describe(status: &TokenStatus) -> String {
    let state = if status.refreshed { "refreshed" } else { "valid" };
    let folder = status.folder_id.as_deref().unwrap_or("(none)");
    format!(
        "token {}: {}\nroot folder: {}",
        state,
        mask(&status.access_token),
        folder
    )
}

/// Shows the first 8 characters of a token.
fn mask(token: &str) -> String {
    let visible: String = token.chars().take(8).collect();
    if visible.len() < token.len() {
        format!("{}…", visible)
    } else {
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_long_tokens() {
        assert_eq!(mask("ya29.a0AfH6SMBx"), "ya29.a0A…");
        assert_eq!(mask("short"), "short");
    }

    #[test]
    fn describes_refreshed_status() {
        let status = TokenStatus {
            access_token: "ya29.a0AfH6SMBx".into(),
            folder_id: None,
            refreshed: true,
        };
        assert_eq!(describe(&status), "token refreshed: ya29.a0A…\nroot folder: (none)");
    }
}
