//! # Dump Settings
//!
//! Validated configuration for a single dump run.

use crate::constants::{
    DEFAULT_API_VERSION, DEFAULT_AUTHORITY_HOST, DEFAULT_FETCH_CONCURRENCY, DEFAULT_PAGE_SIZE,
    DEFAULT_REQUEST_TIMEOUT_SECS, KEY_VAULT_DNS_SUFFIX, MAX_FETCH_CONCURRENCY, MAX_PAGE_SIZE,
};
use crate::error::{DumpError, Result};
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Client-credential identity used to obtain an access token
///
/// The secret is zeroized on drop and never printed by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
    tenant_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

impl Credentials {
    /// Validate and build credentials
    ///
    /// # Errors
    /// Returns `DumpError::Configuration` if any field is empty or the tenant
    /// id cannot be used as a URL path segment.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Result<Self> {
        let client_id = client_id.into().trim().to_string();
        let client_secret = client_secret.into();
        let tenant_id = tenant_id.into().trim().to_string();

        if client_id.is_empty() {
            return Err(DumpError::configuration("client-id must not be empty"));
        }
        if client_secret.trim().is_empty() {
            return Err(DumpError::configuration("client-secret must not be empty"));
        }
        if tenant_id.is_empty() {
            return Err(DumpError::configuration("tenant-id must not be empty"));
        }
        if !tenant_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        {
            return Err(DumpError::configuration(format!(
                "tenant-id '{tenant_id}' contains invalid characters"
            )));
        }

        Ok(Self {
            client_id,
            client_secret,
            tenant_id,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}

/// Endpoint of the target vault, always ending with `/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultLocation {
    uri: String,
}

impl VaultLocation {
    /// Parse a vault URL or a bare vault name
    ///
    /// A bare name expands to `https://{name}.vault.azure.net/`.
    ///
    /// # Errors
    /// Returns `DumpError::Configuration` for empty input, unparsable URLs,
    /// URLs without a host, URLs carrying a query string, or invalid vault names.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(DumpError::configuration("vault-uri must not be empty"));
        }

        if input.starts_with("https://") || input.starts_with("http://") {
            let url = Url::parse(input).map_err(|e| {
                DumpError::configuration(format!("vault-uri '{input}' is not a valid URL: {e}"))
            })?;
            if url.host_str().is_none_or(str::is_empty) {
                return Err(DumpError::configuration(format!(
                    "vault-uri '{input}' has no host"
                )));
            }
            if url.query().is_some() || url.fragment().is_some() {
                return Err(DumpError::configuration(format!(
                    "vault-uri '{input}' must not contain a query or fragment"
                )));
            }
            let mut uri = url.to_string();
            if !uri.ends_with('/') {
                uri.push('/');
            }
            return Ok(Self { uri });
        }

        // Vault names: 3-24 characters, alphanumerics and hyphens
        let valid_name = (3..=24).contains(&input.len())
            && input.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && input.starts_with(|c: char| c.is_ascii_alphabetic());
        if !valid_name {
            return Err(DumpError::configuration(format!(
                "vault-uri '{input}' is neither an http(s) URL nor a valid vault name"
            )));
        }

        Ok(Self {
            uri: format!("https://{input}.{KEY_VAULT_DNS_SUFFIX}/"),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Host name of the vault, used as a span attribute
    pub fn host(&self) -> &str {
        self.uri
            .split_once("://")
            .map_or(self.uri.as_str(), |(_, rest)| rest)
            .trim_end_matches('/')
    }

    /// Whether `link` points at this vault: same scheme, host and effective port
    ///
    /// Key Vault writes continuation links with an explicit default port
    /// (`https://{vault}.vault.azure.net:443/...`).
    pub fn is_same_origin(&self, link: &str) -> bool {
        let (Ok(vault), Ok(link)) = (Url::parse(&self.uri), Url::parse(link)) else {
            return false;
        };
        vault.scheme() == link.scheme()
            && vault.host_str() == link.host_str()
            && vault.port_or_known_default() == link.port_or_known_default()
    }
}

impl std::fmt::Display for VaultLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

/// What to do when the listing yields the same secret name more than once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DuplicatePolicy {
    /// Later value replaces the earlier one, keeping the first position
    #[default]
    LastWins,
    /// Later duplicates are ignored
    KeepFirst,
    /// Abort the run
    Error,
}

impl DuplicatePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            DuplicatePolicy::LastWins => "last-wins",
            DuplicatePolicy::KeepFirst => "keep-first",
            DuplicatePolicy::Error => "error",
        }
    }
}

/// Complete configuration for one dump run
#[derive(Debug, Clone)]
pub struct DumperConfig {
    pub credentials: Credentials,
    pub vault: VaultLocation,
    /// Entra ID authority host, ending with `/`
    pub authority_host: String,
    pub api_version: String,
    /// `maxresults` requested per listing page
    pub page_size: u32,
    /// Maximum number of fetches in flight
    pub fetch_concurrency: usize,
    pub request_timeout: Duration,
    pub duplicate_policy: DuplicatePolicy,
    /// Prometheus textfile written at the end of the run
    pub metrics_file: Option<PathBuf>,
}

impl DumperConfig {
    /// Configuration with defaults for every optional setting
    pub fn new(credentials: Credentials, vault: VaultLocation) -> Self {
        Self {
            credentials,
            vault,
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            duplicate_policy: DuplicatePolicy::default(),
            metrics_file: None,
        }
    }

    /// Override the authority host
    ///
    /// # Errors
    /// Returns `DumpError::Configuration` if the host is not an http(s) URL.
    pub fn with_authority_host(mut self, authority_host: &str) -> Result<Self> {
        self.authority_host = normalize_authority_host(authority_host)?;
        Ok(self)
    }

    /// Check the numeric settings are within the ranges the vault accepts
    ///
    /// # Errors
    /// Returns `DumpError::Configuration` describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.api_version.trim().is_empty() {
            return Err(DumpError::configuration("api-version must not be empty"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(DumpError::configuration(format!(
                "page-size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        if !(1..=MAX_FETCH_CONCURRENCY).contains(&self.fetch_concurrency) {
            return Err(DumpError::configuration(format!(
                "fetch-concurrency must be between 1 and {MAX_FETCH_CONCURRENCY}, got {}",
                self.fetch_concurrency
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(DumpError::configuration(
                "request-timeout-secs must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn normalize_authority_host(input: &str) -> Result<String> {
    let input = input.trim();
    let url = Url::parse(input).map_err(|e| {
        DumpError::configuration(format!("authority-host '{input}' is not a valid URL: {e}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(DumpError::configuration(format!(
            "authority-host '{input}' must use http or https"
        )));
    }
    let mut host = url.to_string();
    if !host.ends_with('/') {
        host.push('/');
    }
    Ok(host)
}
