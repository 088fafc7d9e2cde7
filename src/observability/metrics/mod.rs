//! # Metrics Module
//!
//! Prometheus metrics for monitoring dump runs, organized by responsibility.
//!
//! ## Sub-modules
//!
//! - `registry` - Metrics registry setup, registration and textfile export
//! - `dump_metrics` - Listing, fetch and run outcome metrics

pub mod dump_metrics;
pub mod registry;

pub use dump_metrics::*;
pub use registry::*;
