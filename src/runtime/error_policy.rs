//! # Error Policy
//!
//! Reporting of fatal run errors: log, count, print a one-line message on
//! stderr and pick the process exit code.

use crate::error::DumpError;
use crate::observability;
use std::process::ExitCode;
use tracing::error;

/// Report a fatal error and return the exit code for it
pub fn handle_fatal_error(err: &DumpError) -> ExitCode {
    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "keyvault_dump.fatal_error",
        error.kind = err.as_str(),
        error = %err
    );
    let _error_guard = error_span.enter();

    error!("Dump aborted: {}", err);
    for hint in remediation(err) {
        error!("   {}", hint);
    }
    observability::metrics::increment_run_failures(err.as_str());

    eprintln!("error: {err}");
    ExitCode::from(err.exit_code())
}

/// Diagnostic hints for the operator, by error kind
pub fn remediation(err: &DumpError) -> &'static [&'static str] {
    match err {
        DumpError::Configuration { .. } => &[
            "Set --client-id, --client-secret, --tenant-id and --vault-uri",
            "or AZURE_CLIENT_ID, AZURE_CLIENT_SECRET, AZURE_TENANT_ID and AZURE_KEYVAULT_URI",
        ],
        DumpError::Authentication { .. } => &[
            "Verify the client secret has not expired in the app registration",
            "Verify the tenant id matches the tenant of the app registration",
        ],
        DumpError::Authorization { .. } => &[
            "Grant the service principal 'list' and 'get' secret permissions",
            "(access policy) or the 'Key Vault Secrets User' role (Azure RBAC)",
        ],
        DumpError::StoreUnavailable { .. } => &[
            "Verify the vault URI and that the vault firewall allows this network",
        ],
        DumpError::DuplicateSecretName { .. } => &[
            "Re-run with --on-duplicate last-wins or keep-first to tolerate duplicates",
        ],
        DumpError::ItemFetch { .. } | DumpError::Output(_) => &[],
    }
}
