//! # Azure Key Vault Authentication
//!
//! OAuth2 client-credential flow against the Entra ID v2.0 token endpoint.
//!
//! The token is requested lazily on the first vault call and cached until
//! shortly before it expires.

use super::types::{TokenErrorBody, TokenResponse};
use crate::config::Credentials;
use crate::constants::TOKEN_EXPIRY_SKEW_SECS;
use crate::error::{DumpError, Result};
use paths::azure::KEY_VAULT_SCOPE;
use paths::TokenPath;
use reqwest::Client as ReqwestClient;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};
use zeroize::Zeroizing;

/// Lifetime assumed when the token response carries no `expires_in`
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 300;

struct CachedToken {
    token: Zeroizing<String>,
    refresh_at: Instant,
}

/// Client-secret credential bound to one tenant
pub struct ClientSecretCredential {
    http_client: ReqwestClient,
    token_url: String,
    credentials: Credentials,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("token_url", &self.token_url)
            .field("client_id", &self.credentials.client_id())
            .finish_non_exhaustive()
    }
}

impl ClientSecretCredential {
    /// Create the credential; performs no network I/O
    pub fn new(http_client: ReqwestClient, authority_host: &str, credentials: Credentials) -> Self {
        let token_url = TokenPath {
            tenant_id: credentials.tenant_id(),
        }
        .url(authority_host);
        Self {
            http_client,
            token_url,
            credentials,
            cached: Mutex::new(None),
        }
    }

    /// Bearer token for Key Vault, requesting a new one when the cache is stale
    ///
    /// # Errors
    /// `Authentication` if the identity provider rejects the credential,
    /// `StoreUnavailable` if it cannot be reached or answers unexpectedly.
    pub async fn get_token(&self) -> Result<Zeroizing<String>> {
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if Instant::now() < entry.refresh_at {
                return Ok(entry.token.clone());
            }
            debug!("Cached Key Vault access token is about to expire, refreshing");
        }

        let response = self.request_token().await?;
        let lifetime = response
            .expires_in
            .as_ref()
            .and_then(super::types::ExpiresIn::as_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        let usable = lifetime.saturating_sub(TOKEN_EXPIRY_SKEW_SECS);
        info!(
            "Acquired Key Vault access token for client {} (expires in {}s)",
            self.credentials.client_id(),
            lifetime
        );

        let token = response.access_token.clone();
        *cached = Some(CachedToken {
            token: response.access_token,
            refresh_at: Instant::now() + Duration::from_secs(usable),
        });
        Ok(token)
    }

    async fn request_token(&self) -> Result<TokenResponse> {
        debug!("Requesting access token from {}", self.token_url);
        let response = self
            .http_client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id()),
                ("client_secret", self.credentials.client_secret()),
                ("scope", KEY_VAULT_SCOPE),
            ])
            .send()
            .await
            .map_err(|e| {
                DumpError::store_unavailable(format!(
                    "identity provider unreachable at {}: {e}",
                    self.token_url
                ))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            DumpError::store_unavailable(format!("failed to read token response: {e}"))
        })?;

        if status.is_success() {
            return serde_json::from_str::<TokenResponse>(&body).map_err(|e| {
                DumpError::authentication(format!("malformed token response: {e}"))
            });
        }

        let reason = serde_json::from_str::<TokenErrorBody>(&body).map_or_else(
            |_| format!("HTTP {status}"),
            |err| match err.error_description {
                Some(description) => format!("{}: {description}", err.error),
                None => err.error,
            },
        );

        if status.is_client_error() {
            Err(DumpError::authentication(format!(
                "token request for client {} rejected: {reason}",
                self.credentials.client_id()
            )))
        } else {
            Err(DumpError::store_unavailable(format!(
                "identity provider returned {status}: {reason}"
            )))
        }
    }
}
