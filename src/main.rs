//! # Key Vault Dump
//!
//! Prints every enabled secret of an Azure Key Vault as `name: value`.
//!
//! ## Overview
//!
//! 1. **Authenticate** - OAuth2 client credentials against Microsoft Entra ID
//! 2. **List** - pages through the vault's secret metadata
//! 3. **Fetch** - retrieves the current value of every enabled secret
//! 4. **Print** - one `name: value` line per secret on stdout
//!
//! Logs go to stderr so stdout can be piped. The exit status is non-zero when
//! configuration, authentication or listing fails; a secret that cannot be
//! fetched is logged and omitted.
//!
//! ## Usage
//!
//! ```text
//! keyvault-dump --client-id <ID> --client-secret <SECRET> \
//!     --tenant-id <TENANT> --vault-uri https://my-vault.vault.azure.net/
//! ```

use keyvault_dump::config::load_config;
use keyvault_dump::observability::metrics;
use keyvault_dump::runtime::error_policy::handle_fatal_error;
use keyvault_dump::runtime::initialization::initialize;
use std::io::BufWriter;
use std::process::ExitCode;
use tracing::warn;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the process runtime
    if let Err(e) = initialize() {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => return handle_fatal_error(&e),
    };

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = keyvault_dump::run(&config, &mut out).await;
    drop(out);

    if let Some(path) = &config.metrics_file {
        if let Err(e) = metrics::write_textfile(path) {
            warn!("Failed to write metrics to {}: {:#}", path.display(), e);
        }
    }

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => handle_fatal_error(&e),
    }
}
