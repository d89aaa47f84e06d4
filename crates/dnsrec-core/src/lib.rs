// # dnsrec-core
//
// Core library for idempotent management of a single DNS record.
//
// ## Architecture Overview
//
// - **DesiredRecord**: What the record should look like (or that it should be gone)
// - **DnsProvider**: Trait for looking up and mutating records via provider APIs
// - **Reconciler**: Diffs the desired record against the provider and applies the minimum change
// - **ProviderRegistry**: Plugin-based registry for DNS providers
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Reconciliation logic is separate from provider transports
// 2. **Idempotency**: Reconciling the same desired record twice changes nothing the second time
// 3. **Plugin-Based**: Providers are registered dynamically, no hard-coded if-else
// 4. **Library-First**: The binary is a thin wrapper over this crate

pub mod config;
pub mod error;
pub mod reconciler;
pub mod record;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use config::{ProviderConfig, ReconcilerConfig};
pub use error::{Error, Result};
pub use reconciler::{ReconciliationResult, Reconciler};
pub use record::{
    DesiredRecord, NewRecord, Record, RecordQuery, RecordSnapshot, RecordState, RecordType,
    RecordUpdate, Zone,
};
pub use registry::ProviderRegistry;
pub use traits::{DnsProvider, DnsProviderFactory};
