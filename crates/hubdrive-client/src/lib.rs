//! CLI, configuration and commands
//!
//! This crate provides the `hubdrive` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use context::Context;
pub use error::{ClientError, ClientResult};
