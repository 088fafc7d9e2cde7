//! # Secret Dumper
//!
//! Enumerates the enabled secrets of a store, fetches their current values
//! and prints them as `name: value` lines.
//!
//! ## Flow
//!
//! 1. **List** - pages are fetched one after another and flattened
//! 2. **Filter** - disabled descriptors are dropped, listing order is kept
//! 3. **Fetch** - one fetch per enabled descriptor, optionally several in
//!    flight; a missing or failing secret is skipped, while a rejected
//!    credential or permission (`Authentication`, `Authorization`) aborts
//! 4. **Collect** - values are folded into a [`ResultMapping`] keyed by name
//! 5. **Emit** - one line per entry, in mapping order
//!
//! Listing failures abort the run before any value is fetched.

mod mapping;
mod output;

pub use mapping::{InsertOutcome, ResultMapping};
pub use output::emit;

use crate::config::{DumperConfig, DuplicatePolicy};
use crate::error::Result;
use crate::observability::metrics;
use crate::provider::azure::KeyVaultClient;
use crate::provider::{list_descriptors, SecretDescriptor, SecretStoreClient, SecretValue};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::io::Write;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

/// Counters describing one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Descriptors returned by listing
    pub listed: usize,
    /// Descriptors skipped because the secret is disabled
    pub disabled: usize,
    /// Fetches that returned a value
    pub fetched: usize,
    /// Fetches that returned NotFound or failed
    pub skipped: usize,
    /// Fetched values whose name was already collected
    pub duplicates: usize,
    /// Lines written
    pub emitted: usize,
}

/// Orchestrates listing, fetching and output over a [`SecretStoreClient`]
pub struct SecretDumper<C> {
    client: C,
    fetch_concurrency: usize,
    duplicate_policy: DuplicatePolicy,
}

impl<C> std::fmt::Debug for SecretDumper<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretDumper")
            .field("fetch_concurrency", &self.fetch_concurrency)
            .field("duplicate_policy", &self.duplicate_policy)
            .finish_non_exhaustive()
    }
}

impl<C: SecretStoreClient> SecretDumper<C> {
    /// Sequential dumper with the `last-wins` duplicate policy
    pub fn new(client: C) -> Self {
        Self {
            client,
            fetch_concurrency: 1,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    /// Allow up to `concurrency` fetches in flight (minimum 1)
    #[must_use]
    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// List, filter, fetch and collect without printing
    ///
    /// # Errors
    /// Fails if any listing page fails, if a fetch hits a fatal error (see
    /// [`crate::error::DumpError::is_fatal`]), or on a duplicate name under
    /// [`DuplicatePolicy::Error`]. Other per-secret fetch failures are absorbed.
    pub async fn collect(&self) -> Result<(ResultMapping, RunSummary)> {
        let mut summary = RunSummary::default();

        let enabled = self.list_enabled(&mut summary).await?;
        info!(
            "Listed {} secret(s), {} enabled, {} disabled",
            summary.listed,
            enabled.len(),
            summary.disabled
        );

        // buffered() keeps listing order whatever order the fetches finish in
        let fetched: Vec<Option<SecretValue>> = stream::iter(enabled.iter())
            .map(|descriptor| self.fetch_one(descriptor))
            .buffered(self.fetch_concurrency)
            .try_collect()
            .await?;

        let mut mapping = ResultMapping::new();
        for secret in fetched {
            let Some(SecretValue { name, value }) = secret else {
                summary.skipped += 1;
                continue;
            };
            summary.fetched += 1;
            match mapping.insert(name.clone(), value, self.duplicate_policy)? {
                InsertOutcome::Inserted => {}
                InsertOutcome::Replaced => {
                    summary.duplicates += 1;
                    metrics::increment_duplicate_names();
                    warn!("Secret name '{}' listed more than once, keeping the later value", name);
                }
                InsertOutcome::Ignored => {
                    summary.duplicates += 1;
                    metrics::increment_duplicate_names();
                    warn!("Secret name '{}' listed more than once, keeping the first value", name);
                }
            }
        }

        Ok((mapping, summary))
    }

    /// Collect and write every entry to `out`
    ///
    /// Nothing is written unless collection succeeds.
    ///
    /// # Errors
    /// Collection errors (see [`SecretDumper::collect`]) or `Output` if writing fails.
    pub async fn dump<W: Write + ?Sized>(&self, out: &mut W) -> Result<RunSummary> {
        let start = Instant::now();
        let (mapping, mut summary) = self.collect().await?;
        summary.emitted = emit(&mapping, out)?;
        metrics::record_run_success(summary.emitted);
        info!(
            "Printed {} secret(s) ({} skipped) in {}ms",
            summary.emitted,
            summary.skipped,
            start.elapsed().as_millis()
        );
        Ok(summary)
    }

    async fn list_enabled(&self, summary: &mut RunSummary) -> Result<Vec<SecretDescriptor>> {
        let mut enabled = Vec::new();
        let mut descriptors = std::pin::pin!(list_descriptors(&self.client));
        while let Some(descriptor) = descriptors.try_next().await? {
            summary.listed += 1;
            metrics::increment_descriptors_listed();
            if descriptor.enabled {
                enabled.push(descriptor);
            } else {
                summary.disabled += 1;
                metrics::increment_descriptors_disabled();
                debug!("Skipping disabled secret '{}'", descriptor.name);
            }
        }
        Ok(enabled)
    }

    /// Fetch one secret; `Ok(None)` skips it, `Err` aborts the run
    async fn fetch_one(&self, descriptor: &SecretDescriptor) -> Result<Option<SecretValue>> {
        match self
            .client
            .fetch_secret(&descriptor.name, descriptor.version.as_deref())
            .await
        {
            Ok(Some(secret)) => Ok(Some(secret)),
            Ok(None) => {
                debug!(
                    "Secret '{}' disappeared between listing and fetch, skipping",
                    descriptor.name
                );
                Ok(None)
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!("Skipping secret '{}': {}", descriptor.name, e);
                Ok(None)
            }
        }
    }
}

/// Dump the enabled secrets of the configured vault to `out`
///
/// # Errors
/// `Configuration` for invalid settings (before any network call), then the
/// fatal errors of [`SecretDumper::dump`].
pub async fn run<W: Write + ?Sized>(config: &DumperConfig, out: &mut W) -> Result<RunSummary> {
    config.validate()?;
    let client = KeyVaultClient::new(config)?;
    let dumper = SecretDumper::new(client)
        .with_fetch_concurrency(config.fetch_concurrency)
        .with_duplicate_policy(config.duplicate_policy);

    let span = info_span!(
        "keyvault_dump.run",
        vault.name = config.vault.host(),
        fetch.concurrency = config.fetch_concurrency,
        duplicate.policy = config.duplicate_policy.as_str(),
    );
    dumper.dump(out).instrument(span).await
}
