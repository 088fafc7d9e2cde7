//! # Command-Line Arguments
//!
//! Every argument can also be supplied through an environment variable;
//! a `.env` file in the working directory is loaded before parsing.

use super::settings::{Credentials, DumperConfig, DuplicatePolicy, VaultLocation};
use crate::constants::{
    DEFAULT_API_VERSION, DEFAULT_AUTHORITY_HOST, DEFAULT_FETCH_CONCURRENCY, DEFAULT_PAGE_SIZE,
    DEFAULT_REQUEST_TIMEOUT_SECS, ENV_API_VERSION, ENV_AUTHORITY_HOST, ENV_CLIENT_ID,
    ENV_CLIENT_SECRET, ENV_FETCH_CONCURRENCY, ENV_METRICS_FILE, ENV_ON_DUPLICATE, ENV_PAGE_SIZE,
    ENV_REQUEST_TIMEOUT_SECS, ENV_TENANT_ID, ENV_VAULT_URI,
};
use crate::error::{DumpError, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Print the enabled secrets of an Azure Key Vault as `name: value` lines
#[derive(Parser)]
#[command(name = "keyvault-dump")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Application (client) ID of the service principal
    #[arg(long, env = ENV_CLIENT_ID)]
    pub client_id: Option<String>,

    /// Client secret of the service principal
    #[arg(long, env = ENV_CLIENT_SECRET, hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Directory (tenant) ID
    #[arg(long, env = ENV_TENANT_ID)]
    pub tenant_id: Option<String>,

    /// Vault URL (https://{name}.vault.azure.net/) or bare vault name
    #[arg(long, env = ENV_VAULT_URI)]
    pub vault_uri: Option<String>,

    /// Entra ID authority host
    #[arg(long, env = ENV_AUTHORITY_HOST, default_value = DEFAULT_AUTHORITY_HOST)]
    pub authority_host: String,

    /// Key Vault REST API version
    #[arg(long, env = ENV_API_VERSION, default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Secrets requested per listing page (1-25)
    #[arg(long, env = ENV_PAGE_SIZE, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Maximum number of secret values fetched concurrently
    #[arg(long, env = ENV_FETCH_CONCURRENCY, default_value_t = DEFAULT_FETCH_CONCURRENCY)]
    pub fetch_concurrency: usize,

    /// HTTP request timeout in seconds
    #[arg(long, env = ENV_REQUEST_TIMEOUT_SECS, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Behaviour when the listing contains the same name twice
    #[arg(long, env = ENV_ON_DUPLICATE, value_enum, default_value_t = DuplicatePolicy::LastWins)]
    pub on_duplicate: DuplicatePolicy,

    /// Write Prometheus metrics in text format to this file after the run
    #[arg(long, env = ENV_METRICS_FILE)]
    pub metrics_file: Option<PathBuf>,
}

impl std::fmt::Debug for Cli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cli")
            .field("client_id", &self.client_id)
            .field("tenant_id", &self.tenant_id)
            .field("vault_uri", &self.vault_uri)
            .field("authority_host", &self.authority_host)
            .finish_non_exhaustive()
    }
}

impl TryFrom<Cli> for DumperConfig {
    type Error = DumpError;

    fn try_from(cli: Cli) -> Result<Self> {
        let missing: Vec<&str> = [
            ("client-id", cli.client_id.is_none()),
            ("client-secret", cli.client_secret.is_none()),
            ("tenant-id", cli.tenant_id.is_none()),
            ("vault-uri", cli.vault_uri.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();
        if !missing.is_empty() {
            return Err(DumpError::configuration(format!(
                "missing required setting(s): {}",
                missing.join(", ")
            )));
        }

        let credentials = Credentials::new(
            cli.client_id.unwrap_or_default(),
            cli.client_secret.unwrap_or_default(),
            cli.tenant_id.unwrap_or_default(),
        )?;
        let vault = VaultLocation::parse(cli.vault_uri.as_deref().unwrap_or_default())?;

        let mut config =
            DumperConfig::new(credentials, vault).with_authority_host(&cli.authority_host)?;
        config.api_version = cli.api_version;
        config.page_size = cli.page_size;
        config.fetch_concurrency = cli.fetch_concurrency;
        config.request_timeout = Duration::from_secs(cli.request_timeout_secs);
        config.duplicate_policy = cli.on_duplicate;
        config.metrics_file = cli.metrics_file;
        config.validate()?;

        Ok(config)
    }
}
