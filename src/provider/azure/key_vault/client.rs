//! # Azure Key Vault Client Creation
//!
//! Handles creation of the HTTP client and decoding of Key Vault error bodies.

use super::auth::ClientSecretCredential;
use super::types::KeyVaultErrorBody;
use crate::config::DumperConfig;
use crate::error::{DumpError, Result};
use reqwest::{Client as ReqwestClient, StatusCode};
use std::time::Duration;
use tracing::info;

/// Build the shared HTTP client (rustls, request timeout)
pub fn create_http_client(timeout: Duration) -> Result<ReqwestClient> {
    ReqwestClient::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| DumpError::configuration(format!("failed to create HTTP client: {e}")))
}

/// Create Key Vault client components; no network I/O happens here
pub fn create_client_components(
    config: &DumperConfig,
) -> Result<(ReqwestClient, ClientSecretCredential)> {
    let http_client = create_http_client(config.request_timeout)?;
    let credential = ClientSecretCredential::new(
        http_client.clone(),
        &config.authority_host,
        config.credentials.clone(),
    );
    info!(
        "Key Vault client configured for {} (tenant {}, api-version {})",
        config.vault,
        config.credentials.tenant_id(),
        config.api_version
    );
    Ok((http_client, credential))
}

/// Human-readable message from a Key Vault error response
///
/// Falls back to the HTTP status when the body is not a Key Vault error.
pub fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<KeyVaultErrorBody>(body) {
        Ok(KeyVaultErrorBody { error }) => match (error.code, error.message) {
            (Some(code), Some(message)) => format!("HTTP {status} {code}: {message}"),
            (Some(code), None) => format!("HTTP {status} {code}"),
            (None, Some(message)) => format!("HTTP {status}: {message}"),
            (None, None) => format!("HTTP {status}"),
        },
        Err(_) => format!("HTTP {status}"),
    }
}
