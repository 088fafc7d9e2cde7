//! # Dump Metrics
//!
//! Metrics for listing, secret fetches and run outcomes.

use crate::observability::metrics::registry::REGISTRY;
use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec, IntGauge};
use std::sync::LazyLock;

// Listing metrics
static LIST_PAGES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "keyvault_dump_list_pages_total",
        "Total number of listing pages fetched",
    )
    .expect("Failed to create LIST_PAGES_TOTAL metric - this should never happen")
});

static LIST_PAGE_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "keyvault_dump_list_page_errors_total",
        "Total number of listing pages the vault refused or failed to serve",
    )
    .expect("Failed to create LIST_PAGE_ERRORS_TOTAL metric - this should never happen")
});

static DESCRIPTORS_LISTED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "keyvault_dump_descriptors_listed_total",
        "Total number of secret descriptors returned by listing",
    )
    .expect("Failed to create DESCRIPTORS_LISTED_TOTAL metric - this should never happen")
});

static DESCRIPTORS_DISABLED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "keyvault_dump_descriptors_disabled_total",
        "Total number of descriptors skipped because the secret is disabled",
    )
    .expect("Failed to create DESCRIPTORS_DISABLED_TOTAL metric - this should never happen")
});

// Fetch metrics
static SECRET_FETCHES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "keyvault_dump_secret_fetches_total",
            "Total number of secret value fetches by outcome",
        ),
        &["outcome"],
    )
    .expect("Failed to create SECRET_FETCHES_TOTAL metric - this should never happen")
});

static SECRET_FETCH_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "keyvault_dump_secret_fetch_duration_seconds",
            "Duration of secret value fetches in seconds",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
    )
    .expect("Failed to create SECRET_FETCH_DURATION metric - this should never happen")
});

// Run metrics
static SECRETS_EMITTED: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "keyvault_dump_secrets_emitted",
        "Number of secrets printed by the last run",
    )
    .expect("Failed to create SECRETS_EMITTED metric - this should never happen")
});

static DUPLICATE_NAMES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "keyvault_dump_duplicate_names_total",
        "Total number of fetched secrets whose name was already collected",
    )
    .expect("Failed to create DUPLICATE_NAMES_TOTAL metric - this should never happen")
});

static RUN_FAILURES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "keyvault_dump_run_failures_total",
            "Total number of runs aborted by a fatal error",
        ),
        &["reason"],
    )
    .expect("Failed to create RUN_FAILURES_TOTAL metric - this should never happen")
});

static LAST_SUCCESS_TIMESTAMP: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "keyvault_dump_last_success_timestamp_seconds",
        "Unix timestamp of the last successful run",
    )
    .expect("Failed to create LAST_SUCCESS_TIMESTAMP metric - this should never happen")
});

/// Register dump metrics with the registry
pub(crate) fn register_dump_metrics() -> Result<()> {
    REGISTRY.register(Box::new(LIST_PAGES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(LIST_PAGE_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DESCRIPTORS_LISTED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DESCRIPTORS_DISABLED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SECRET_FETCHES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SECRET_FETCH_DURATION.clone()))?;
    REGISTRY.register(Box::new(SECRETS_EMITTED.clone()))?;
    REGISTRY.register(Box::new(DUPLICATE_NAMES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RUN_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(LAST_SUCCESS_TIMESTAMP.clone()))?;
    Ok(())
}

pub fn increment_list_pages() {
    LIST_PAGES_TOTAL.inc();
}

pub fn increment_list_page_errors() {
    LIST_PAGE_ERRORS_TOTAL.inc();
}

pub fn increment_descriptors_listed() {
    DESCRIPTORS_LISTED_TOTAL.inc();
}

pub fn increment_descriptors_disabled() {
    DESCRIPTORS_DISABLED_TOTAL.inc();
}

/// Record a fetch; `outcome` is `found`, `not_found` or `error`
pub fn record_secret_fetch(outcome: &str, duration_secs: f64) {
    SECRET_FETCHES_TOTAL.with_label_values(&[outcome]).inc();
    SECRET_FETCH_DURATION.observe(duration_secs);
}

pub fn increment_duplicate_names() {
    DUPLICATE_NAMES_TOTAL.inc();
}

pub fn record_run_success(emitted: usize) {
    SECRETS_EMITTED.set(i64::try_from(emitted).unwrap_or(i64::MAX));
    LAST_SUCCESS_TIMESTAMP.set(chrono::Utc::now().timestamp());
}

pub fn increment_run_failures(reason: &str) {
    RUN_FAILURES_TOTAL.with_label_values(&[reason]).inc();
}

#[cfg(test)]
pub(crate) fn secret_fetches(outcome: &str) -> u64 {
    SECRET_FETCHES_TOTAL.with_label_values(&[outcome]).get()
}

#[cfg(test)]
pub(crate) fn list_page_errors() -> u64 {
    LIST_PAGE_ERRORS_TOTAL.get()
}
