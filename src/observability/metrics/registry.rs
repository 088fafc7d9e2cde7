//! # Metrics Registry
//!
//! Prometheus metrics registry setup, registration and export.
//!
//! Metrics are written once at the end of the run in the text exposition
//! format, for the node_exporter textfile collector.

use anyhow::{Context, Result};
use prometheus::{Encoder, Registry, TextEncoder};
use std::path::Path;
use std::sync::{LazyLock, Mutex};

/// Global Prometheus metrics registry
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static REGISTERED: Mutex<bool> = Mutex::new(false);

/// Register all metrics with the Prometheus registry
///
/// Safe to call more than once; only the first call registers.
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn register_metrics() -> Result<()> {
    let mut registered = REGISTERED
        .lock()
        .map_err(|e| anyhow::anyhow!("metrics registration lock poisoned: {e}"))?;
    if *registered {
        return Ok(());
    }
    super::dump_metrics::register_dump_metrics()?;
    *registered = true;
    Ok(())
}

/// Render all registered metrics in the Prometheus text format
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn gather_text() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not valid UTF-8")
}

/// Write all registered metrics to `path`
///
/// The file is written next to the target and renamed into place so readers
/// never observe a partial file.
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn write_textfile(path: &Path) -> Result<()> {
    let text = gather_text()?;
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    std::fs::write(tmp_path, text)
        .with_context(|| format!("Failed to write metrics to {}", tmp_path.display()))?;
    std::fs::rename(tmp_path, path)
        .with_context(|| format!("Failed to move metrics file into {}", path.display()))?;
    Ok(())
}
