//! Subcommand implementations.

pub mod browse;
pub mod config;
pub mod connect;
pub mod token;
