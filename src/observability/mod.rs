//! # Observability
//!
//! Prometheus metrics for a dump run. Logging is plain `tracing`, initialised
//! in [`crate::runtime::initialization`].

pub mod metrics;
