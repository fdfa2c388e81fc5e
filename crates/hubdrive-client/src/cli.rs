//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hubdrive_core::{ItemFilter, ViewMode};
use hubdrive_providers::Role;

/// hubdrive - Browse the Google Drive folder connected to a CRM portal
#[derive(Debug, Parser)]
#[command(name = "hubdrive")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "HUBDRIVE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Portal ID whose Drive credentials are used
    #[arg(long, short, env = "HUBDRIVE_PORTAL_ID", global = true)]
    pub portal: Option<String>,

    /// Root folder override (defaults to the folder stored for the portal)
    #[arg(long, global = true)]
    pub root: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List a folder
    Ls(LsArgs),

    /// Upload a local file into a folder
    Upload {
        /// File to upload
        path: PathBuf,

        /// Target folder (defaults to the root)
        #[arg(long)]
        folder: Option<String>,

        /// Name in Drive (defaults to the file name)
        #[arg(long)]
        name: Option<String>,

        /// Override the detected MIME type
        #[arg(long)]
        mime_type: Option<String>,
    },

    /// Delete a file or folder
    Rm {
        /// Item ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Create a folder
    Mkdir {
        /// Folder name
        name: String,

        /// Parent folder (defaults to the root)
        #[arg(long)]
        folder: Option<String>,
    },

    /// Find a folder by name, creating it if missing, and print its ID
    EnsureFolder {
        /// Folder name
        name: String,

        /// Parent folder (defaults to the root)
        #[arg(long)]
        folder: Option<String>,
    },

    /// Open an item in the default browser
    Open {
        /// Item ID
        id: String,

        /// Print the URL instead of opening it
        #[arg(long)]
        print: bool,
    },

    /// Share an item with people
    Share {
        /// Item ID
        id: String,

        /// Comma-separated email addresses (can be repeated)
        #[arg(long, short, required = true, action = clap::ArgAction::Append)]
        email: Vec<String>,

        /// Access granted: reader, commenter or writer
        #[arg(long, default_value = "reader")]
        role: Role,
    },

    /// Access token commands
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Set the root folder stored for the portal
    Connect {
        /// Folder to use as the portal's root
        #[arg(long)]
        folder_id: String,

        /// Only update the credentials service, not config.toml
        #[arg(long)]
        no_save: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options of `hubdrive ls`.
#[derive(Debug, Args)]
pub struct LsArgs {
    /// Folder to list (defaults to the root)
    #[arg(long)]
    pub folder: Option<String>,

    /// List files only
    #[arg(long, conflicts_with = "folders_only")]
    pub files_only: bool,

    /// List folders only
    #[arg(long)]
    pub folders_only: bool,

    /// Output view: list, grid or json
    #[arg(long)]
    pub view: Option<ViewMode>,

    /// List the parent of --folder instead
    #[arg(long, requires = "folder")]
    pub up: bool,
}

impl LsArgs {
    /// Returns the listing filter selected by the flags.
    pub fn filter(&self) -> ItemFilter {
        if self.files_only {
            ItemFilter::FilesOnly
        } else if self.folders_only {
            ItemFilter::FoldersOnly
        } else {
            ItemFilter::All
        }
    }
}

/// Access token actions.
#[derive(Debug, Subcommand)]
pub enum TokenAction {
    /// Validate the portal's token, refreshing it once if Google rejects it
    Check {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
