//! # Initialization
//!
//! Process initialization: rustls setup, tracing and metrics registration.

use crate::constants::DEFAULT_LOG_FILTER;
use crate::observability;
use anyhow::{Context, Result};
use tracing::debug;

/// Initialize the process runtime
///
/// This function handles:
/// - rustls crypto provider setup
/// - Tracing subscriber setup (stderr only, stdout carries the secrets)
/// - Metrics registration
pub fn initialize() -> Result<()> {
    // Configure rustls crypto provider FIRST, before any other operations
    // Required for rustls 0.23+ when no default provider is set via features
    let provider_installed = rustls::crypto::ring::default_provider()
        .install_default()
        .is_ok();

    init_tracing();

    if !provider_installed {
        debug!("rustls crypto provider was already installed");
    }

    observability::metrics::register_metrics().context("Failed to register metrics")?;

    debug!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}

/// Install the global tracing subscriber
///
/// Honours `RUST_LOG`; defaults to `keyvault_dump=info`. A subscriber that is
/// already installed (tests, embedding binaries) is left in place.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
