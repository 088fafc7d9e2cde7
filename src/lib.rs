//! Key Vault Dump Library
//!
//! Lists the enabled secrets of an Azure Key Vault, fetches their current
//! values and prints them as `name: value` lines.
//! Tests are included in the module files (e.g., dumper/mod.rs).

pub mod config;
pub mod constants;
pub mod dumper;
pub mod error;
pub mod observability;
pub mod provider;
pub mod runtime;

// Re-export the run entry point and its types for convenience
pub use config::DumperConfig;
pub use dumper::{run, RunSummary, SecretDumper};
pub use error::{DumpError, Result};
