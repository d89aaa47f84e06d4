//! Core traits for record reconciliation
//!
//! - [`DnsProvider`]: Look up and mutate records via a provider API
//! - [`DnsProviderFactory`]: Build a provider from configuration

pub mod dns_provider;

pub use dns_provider::{DnsProvider, DnsProviderFactory};
