//! # Azure Providers
//!
//! - Key Vault: secrets listing and retrieval

pub mod key_vault;

pub use key_vault::KeyVaultClient;
