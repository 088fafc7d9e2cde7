//! # Azure Key Vault Client
//!
//! Client for reading secrets from the Azure Key Vault Secrets REST API.
//!
//! This module provides functionality to:
//! - List secret metadata page by page, following `nextLink`
//! - Retrieve a secret value by name and version
//! - Authenticate with a service principal (client id + client secret)
//!
//! Uses a native REST implementation that:
//! - Works directly with HTTP mock servers
//! - Uses reqwest with rustls (no OpenSSL dependencies)

mod auth;
mod client;
mod types;

pub use auth::ClientSecretCredential;
pub use client::{create_http_client, error_message};

use self::client::create_client_components;
use self::types::{SecretBundle, SecretListResponse};
use crate::config::{DumperConfig, VaultLocation};
use crate::error::{DumpError, Result};
use crate::observability::metrics;
use crate::provider::{DescriptorPage, SecretDescriptor, SecretStoreClient, SecretValue};
use async_trait::async_trait;
use paths::azure::parse_secret_id;
use paths::KeyVaultPath;
use reqwest::{Client as ReqwestClient, StatusCode};
use std::time::Instant;
use tracing::{debug, field, warn, Instrument};

/// Azure Key Vault secret store
pub struct KeyVaultClient {
    http_client: ReqwestClient,
    credential: ClientSecretCredential,
    vault: VaultLocation,
    api_version: String,
    page_size: u32,
}

impl std::fmt::Debug for KeyVaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyVaultClient")
            .field("vault", &self.vault)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl KeyVaultClient {
    /// Create a new Key Vault client
    ///
    /// No network I/O happens here; the access token is requested on first use.
    ///
    /// # Errors
    /// Returns `DumpError::Configuration` if the HTTP client cannot be built.
    pub fn new(config: &DumperConfig) -> Result<Self> {
        let (http_client, credential) = create_client_components(config)?;
        Ok(Self {
            http_client,
            credential,
            vault: config.vault.clone(),
            api_version: config.api_version.clone(),
            page_size: config.page_size,
        })
    }

    fn first_page_url(&self) -> String {
        format!(
            "{}&maxresults={}",
            KeyVaultPath::ListSecrets.url(self.vault.as_str(), &self.api_version),
            self.page_size
        )
    }

    fn authorized_get(&self, url: &str, token: &str) -> reqwest::RequestBuilder {
        self.http_client.get(url).bearer_auth(token)
    }
}

fn descriptor_from_item(item: &types::SecretItem) -> Option<SecretDescriptor> {
    let (name, version) = parse_secret_id(&item.id)?;
    Some(SecretDescriptor {
        name,
        version,
        enabled: item.is_enabled(),
    })
}

#[async_trait]
impl SecretStoreClient for KeyVaultClient {
    async fn list_page(&self, next_link: Option<&str>) -> Result<DescriptorPage> {
        let span = tracing::debug_span!(
            "keyvault.secret.list_page",
            vault.name = self.vault.host(),
            page.first = next_link.is_none(),
            page.items = field::Empty,
            operation.success = field::Empty,
            operation.duration_ms = field::Empty,
        );
        let span_clone = span.clone();
        let start = Instant::now();

        async move {
            let url = match next_link {
                None => self.first_page_url(),
                // The continuation link carries the bearer token, keep it on this vault
                Some(link) if self.vault.is_same_origin(link) => link.to_string(),
                Some(link) => {
                    span_clone.record("operation.success", false);
                    return Err(DumpError::store_unavailable(format!(
                        "listing continuation link points outside the vault: {link}"
                    )));
                }
            };

            let token = self.credential.get_token().await.inspect_err(|_| {
                span_clone.record("operation.success", false);
                metrics::increment_list_page_errors();
            })?;
            let response = match self.authorized_get(&url, &token).send().await {
                Ok(response) => response,
                Err(e) => {
                    span_clone.record("operation.success", false);
                    metrics::increment_list_page_errors();
                    return Err(DumpError::store_unavailable(format!(
                        "request to {} failed: {e}",
                        self.vault.host()
                    )));
                }
            };
            let status = response.status();
            let body = response.text().await.map_err(|e| {
                span_clone.record("operation.success", false);
                metrics::increment_list_page_errors();
                DumpError::store_unavailable(format!("failed to read listing response: {e}"))
            })?;
            span_clone.record("operation.duration_ms", start.elapsed().as_millis() as u64);

            if !status.is_success() {
                span_clone.record("operation.success", false);
                metrics::increment_list_page_errors();
                return Err(DumpError::from_vault_status(
                    status,
                    format!("listing secrets failed: {}", error_message(status, &body)),
                ));
            }

            let page: SecretListResponse = serde_json::from_str(&body).map_err(|e| {
                span_clone.record("operation.success", false);
                metrics::increment_list_page_errors();
                DumpError::store_unavailable(format!("malformed listing response: {e}"))
            })?;

            let descriptors: Vec<SecretDescriptor> = page
                .value
                .iter()
                .filter_map(|item| {
                    let descriptor = descriptor_from_item(item);
                    if descriptor.is_none() {
                        warn!("Skipping list item with unrecognised id {}", item.id);
                    }
                    descriptor
                })
                .collect();

            span_clone.record("page.items", descriptors.len() as u64);
            span_clone.record("operation.success", true);
            metrics::increment_list_pages();
            debug!(
                "Listed {} secret(s), more pages: {}",
                descriptors.len(),
                page.next_link.is_some()
            );

            Ok(DescriptorPage {
                descriptors,
                next_link: page.next_link,
            })
        }
        .instrument(span)
        .await
    }

    async fn fetch_secret(&self, name: &str, version: Option<&str>) -> Result<Option<SecretValue>> {
        let span = tracing::debug_span!(
            "keyvault.secret.get",
            secret.name = name,
            secret.version = version.unwrap_or("current"),
            vault.name = self.vault.host(),
            operation.found = field::Empty,
            operation.success = field::Empty,
            operation.duration_ms = field::Empty,
        );
        let span_clone = span.clone();
        let start = Instant::now();

        async move {
            let url = KeyVaultPath::GetSecret { name, version }
                .url(self.vault.as_str(), &self.api_version);
            let token = self.credential.get_token().await.inspect_err(|_| {
                span_clone.record("operation.success", false);
                metrics::record_secret_fetch("error", start.elapsed().as_secs_f64());
            })?;
            let response = match self.authorized_get(&url, &token).send().await {
                Ok(response) => response,
                Err(e) => {
                    span_clone.record("operation.success", false);
                    metrics::record_secret_fetch("error", start.elapsed().as_secs_f64());
                    return Err(DumpError::item_fetch(name, format!("request failed: {e}")));
                }
            };
            let status = response.status();
            let body = response.text().await.map_err(|e| {
                span_clone.record("operation.success", false);
                metrics::record_secret_fetch("error", start.elapsed().as_secs_f64());
                DumpError::item_fetch(name, format!("failed to read response: {e}"))
            })?;
            span_clone.record("operation.duration_ms", start.elapsed().as_millis() as u64);

            if status == StatusCode::NOT_FOUND {
                span_clone.record("operation.success", true);
                span_clone.record("operation.found", false);
                metrics::record_secret_fetch("not_found", start.elapsed().as_secs_f64());
                return Ok(None);
            }

            if !status.is_success() {
                span_clone.record("operation.success", false);
                metrics::record_secret_fetch("error", start.elapsed().as_secs_f64());
                let message = error_message(status, &body);
                // 401/403 abort the run, anything else skips this secret
                return Err(match status {
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DumpError::from_vault_status(
                        status,
                        format!("fetching secret '{name}' failed: {message}"),
                    ),
                    _ => DumpError::item_fetch(name, message),
                });
            }

            match serde_json::from_str::<SecretBundle>(&body) {
                Ok(bundle) => {
                    span_clone.record("operation.success", true);
                    span_clone.record("operation.found", true);
                    metrics::record_secret_fetch("found", start.elapsed().as_secs_f64());
                    let value = bundle.value.as_deref().cloned().unwrap_or_default();
                    Ok(Some(SecretValue {
                        name: name.to_string(),
                        value,
                    }))
                }
                Err(e) => {
                    span_clone.record("operation.success", false);
                    metrics::record_secret_fetch("error", start.elapsed().as_secs_f64());
                    Err(DumpError::item_fetch(
                        name,
                        format!("failed to deserialize secret response: {e}"),
                    ))
                }
            }
        }
        .instrument(span)
        .await
    }
}
