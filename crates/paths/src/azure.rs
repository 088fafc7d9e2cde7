//! # Azure Paths
//!
//! Key Vault secrets API (data plane) and Entra ID OAuth2 v2.0 token endpoint.
//!
//! Key Vault paths are relative to the vault URL, which always ends with `/`:
//! `https://{vault-name}.vault.azure.net/`.

/// OAuth2 scope requested for Key Vault data plane access
pub const KEY_VAULT_SCOPE: &str = "https://vault.azure.net/.default";

/// Axum route for listing secrets
pub const ROUTE_LIST_SECRETS: &str = "/secrets";

/// Axum route for the current version of a secret
pub const ROUTE_GET_SECRET: &str = "/secrets/{name}";

/// Axum route for a specific version of a secret
pub const ROUTE_GET_SECRET_VERSION: &str = "/secrets/{name}/{version}";

/// Axum route for the tenant token endpoint
pub const ROUTE_TOKEN: &str = "/{tenant}/oauth2/v2.0/token";

/// Key Vault secrets API paths
#[derive(Debug, Clone, Copy)]
pub enum KeyVaultPath<'a> {
    /// `GET secrets`
    ListSecrets,
    /// `GET secrets/{name}` or `GET secrets/{name}/{version}`
    GetSecret {
        name: &'a str,
        version: Option<&'a str>,
    },
}

impl KeyVaultPath<'_> {
    /// Path relative to the vault URL (no leading slash)
    pub fn relative(&self) -> String {
        match self {
            KeyVaultPath::ListSecrets => "secrets".to_string(),
            KeyVaultPath::GetSecret {
                name,
                version: Some(version),
            } if !version.is_empty() => format!("secrets/{name}/{version}"),
            KeyVaultPath::GetSecret { name, .. } => format!("secrets/{name}"),
        }
    }

    /// Full URL including the `api-version` query parameter
    ///
    /// `vault_url` must end with `/`.
    pub fn url(&self, vault_url: &str, api_version: &str) -> String {
        format!(
            "{vault_url}{}?api-version={api_version}",
            self.relative()
        )
    }
}

/// Entra ID token endpoint path
#[derive(Debug, Clone, Copy)]
pub struct TokenPath<'a> {
    pub tenant_id: &'a str,
}

impl TokenPath<'_> {
    /// Path relative to the authority host (no leading slash)
    pub fn relative(&self) -> String {
        format!("{}/oauth2/v2.0/token", self.tenant_id)
    }

    /// Full URL; `authority_host` must end with `/`
    pub fn url(&self, authority_host: &str) -> String {
        format!("{authority_host}{}", self.relative())
    }
}

/// Extract `(name, version)` from a Key Vault secret identifier
///
/// Identifiers look like `https://{vault}/secrets/{name}` (list items) or
/// `https://{vault}/secrets/{name}/{version}` (get responses).
pub fn parse_secret_id(id: &str) -> Option<(String, Option<String>)> {
    let path = id.split_once("://").map_or(id, |(_, rest)| rest);
    let (_, tail) = path.split_once("/secrets/")?;
    let tail = tail.split(['?', '#']).next().unwrap_or_default();
    let mut segments = tail.split('/').filter(|s| !s.is_empty());
    let name = segments.next()?.to_string();
    let version = segments.next().map(ToString::to_string);
    Some((name, version))
}
