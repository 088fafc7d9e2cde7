//! # Configuration
//!
//! Run configuration assembled from command-line arguments, environment
//! variables and an optional `.env` file.
//!
//! The four connection settings (`client-id`, `client-secret`, `tenant-id`,
//! `vault-uri`) have no defaults. Everything else has a sensible default that
//! can be overridden per run.

mod cli;
mod settings;

pub use cli::Cli;
pub use settings::{Credentials, DumperConfig, DuplicatePolicy, VaultLocation};

use crate::error::Result;
use clap::Parser;
use tracing::debug;

/// Load configuration from `.env`, the environment and the command line
///
/// Variables already present in the environment take precedence over `.env`.
///
/// # Errors
/// Returns `DumpError::Configuration` when a required setting is missing or malformed.
pub fn load_config() -> Result<DumperConfig> {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => debug!("Ignoring unreadable .env file: {}", e),
    }
    DumperConfig::try_from(Cli::parse())
}
