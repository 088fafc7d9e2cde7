//! # Response Types
//!
//! Azure Key Vault and Entra ID REST payloads.
//!
//! Only the fields the dumper reads are modelled; everything else is ignored.
//! API Reference: https://learn.microsoft.com/en-us/rest/api/keyvault/secrets

use serde::Deserialize;
use zeroize::Zeroizing;

/// `GET secrets` response page
#[derive(Debug, Deserialize)]
pub struct SecretListResponse {
    #[serde(default)]
    pub value: Vec<SecretItem>,
    /// Continuation link, `null` or absent on the last page
    #[serde(rename = "nextLink", default)]
    pub next_link: Option<String>,
}

/// Secret list item (`SecretItem` in the REST reference)
#[derive(Debug, Deserialize)]
pub struct SecretItem {
    /// `https://{vault}/secrets/{name}`
    pub id: String,
    #[serde(default)]
    pub attributes: Option<SecretAttributes>,
}

impl SecretItem {
    /// Items without an explicit `enabled` attribute are treated as enabled
    pub fn is_enabled(&self) -> bool {
        self.attributes
            .as_ref()
            .and_then(|a| a.enabled)
            .unwrap_or(true)
    }
}

#[derive(Debug, Deserialize)]
pub struct SecretAttributes {
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// `GET secrets/{name}/{version}` response (`SecretBundle`)
#[derive(Deserialize)]
pub struct SecretBundle {
    #[serde(default)]
    pub value: Option<Zeroizing<String>>,
    #[serde(default)]
    pub id: Option<String>,
}

impl std::fmt::Debug for SecretBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretBundle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Key Vault error body: `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Deserialize)]
pub struct KeyVaultErrorBody {
    pub error: KeyVaultErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct KeyVaultErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Entra ID OAuth2 v2.0 token response
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: Zeroizing<String>,
    #[serde(default)]
    pub expires_in: Option<ExpiresIn>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

/// `expires_in` is a number on v2.0 endpoints and a string on some v1 proxies
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ExpiresIn {
    Seconds(u64),
    Text(String),
}

impl ExpiresIn {
    pub fn as_secs(&self) -> Option<u64> {
        match self {
            ExpiresIn::Seconds(secs) => Some(*secs),
            ExpiresIn::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// Entra ID error body: `{"error": "invalid_client", "error_description": "..."}`
#[derive(Debug, Deserialize)]
pub struct TokenErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}
