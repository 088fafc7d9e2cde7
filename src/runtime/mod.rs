//! # Runtime
//!
//! Process start-up and fatal error handling for the `keyvault-dump` binary.

pub mod error_policy;
pub mod initialization;
