//! # Constants
//!
//! Default values and environment variable names used across the crate.

/// Default Entra ID authority host (Azure public cloud)
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com/";

/// Default Key Vault REST API version
pub const DEFAULT_API_VERSION: &str = "7.4";

/// Default number of secrets requested per listing page
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Largest `maxresults` value Key Vault accepts for secret listing
pub const MAX_PAGE_SIZE: u32 = 25;

/// Default number of concurrent secret fetches (sequential)
pub const DEFAULT_FETCH_CONCURRENCY: usize = 1;

/// Upper bound for concurrent secret fetches
pub const MAX_FETCH_CONCURRENCY: usize = 64;

/// Default HTTP request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Access tokens are refreshed this many seconds before they expire
pub const TOKEN_EXPIRY_SKEW_SECS: u64 = 60;

/// Domain suffix used when the vault is given by name only
pub const KEY_VAULT_DNS_SUFFIX: &str = "vault.azure.net";

/// Default tracing filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "keyvault_dump=info";

// Environment variables
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const ENV_VAULT_URI: &str = "AZURE_KEYVAULT_URI";
pub const ENV_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";
pub const ENV_API_VERSION: &str = "KEYVAULT_DUMP_API_VERSION";
pub const ENV_PAGE_SIZE: &str = "KEYVAULT_DUMP_PAGE_SIZE";
pub const ENV_FETCH_CONCURRENCY: &str = "KEYVAULT_DUMP_FETCH_CONCURRENCY";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "KEYVAULT_DUMP_REQUEST_TIMEOUT_SECS";
pub const ENV_ON_DUPLICATE: &str = "KEYVAULT_DUMP_ON_DUPLICATE";
pub const ENV_METRICS_FILE: &str = "KEYVAULT_DUMP_METRICS_FILE";
