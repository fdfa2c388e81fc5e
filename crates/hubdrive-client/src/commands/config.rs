//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.portal_config()?;
    config.drive_config()?;

    if config.drive.grid_columns == 0 {
        return Err(ClientError::Config("drive.grid_columns must be at least 1".to_string()));
    }

    match config.portal_id(None) {
        Ok(id) => println!("Portal: {}", id),
        Err(_) => println!("Portal: not set (pass --portal or set HUBDRIVE_PORTAL_ID)"),
    }
    if config.google.is_some() {
        println!("Google credentials are valid.");
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    Ok(())
}
