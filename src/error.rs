//! # Dump Error Types
//!
//! Defines the error taxonomy for a dump run, with classification of fatal
//! vs per-item failures and the process exit code for each fatal category.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T, E = DumpError> = std::result::Result<T, E>;

/// Errors that can occur while dumping secrets
#[derive(Debug, Error)]
pub enum DumpError {
    /// Missing or malformed credential / vault-location input
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Credential rejected by the identity provider
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// Vault refused access to the listing call
    #[error("authorization failed: {message}")]
    Authorization { message: String },

    /// Vault cannot be reached or returned an unexpected response
    #[error("secret store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// A single secret could not be fetched (absorbed by the dumper)
    #[error("failed to fetch secret '{name}': {message}")]
    ItemFetch { name: String, message: String },

    /// Two descriptors share a name and the duplicate policy is `error`
    #[error("duplicate secret name '{name}' in listing")]
    DuplicateSecretName { name: String },

    /// Writing results failed
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl DumpError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn item_fetch(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ItemFetch {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Classify a non-success HTTP status returned by the vault
    ///
    /// 401 maps to `Authentication`, 403 to `Authorization`; anything else
    /// means the store could not serve the request.
    pub fn from_vault_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            StatusCode::UNAUTHORIZED => Self::authentication(message),
            StatusCode::FORBIDDEN => Self::authorization(message),
            _ => Self::store_unavailable(message),
        }
    }

    /// Whether this error aborts the run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DumpError::ItemFetch { .. })
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            DumpError::Output(_) | DumpError::ItemFetch { .. } => 1,
            DumpError::Configuration { .. } => 2,
            DumpError::Authentication { .. } => 3,
            DumpError::Authorization { .. } => 4,
            DumpError::StoreUnavailable { .. } => 5,
            DumpError::DuplicateSecretName { .. } => 6,
        }
    }

    /// Short reason string for metrics and structured logs
    pub fn as_str(&self) -> &'static str {
        match self {
            DumpError::Configuration { .. } => "configuration",
            DumpError::Authentication { .. } => "authentication",
            DumpError::Authorization { .. } => "authorization",
            DumpError::StoreUnavailable { .. } => "store_unavailable",
            DumpError::ItemFetch { .. } => "item_fetch",
            DumpError::DuplicateSecretName { .. } => "duplicate_secret_name",
            DumpError::Output(_) => "output",
        }
    }
}
