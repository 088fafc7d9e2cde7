//! Shared API path definitions for Azure Key Vault and the Entra ID token endpoint
//!
//! This crate centralizes all API paths to ensure consistency
//! between the dump client and the mock server used by the integration tests.
//!
//! ## Route Constants
//!
//! Route constants are provided for Axum routes, which require static string literals.
//! These constants are validated against the path builders in tests.

pub mod azure;

pub use azure::{KeyVaultPath, TokenPath};
