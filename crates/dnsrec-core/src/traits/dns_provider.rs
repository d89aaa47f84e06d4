// # DNS Provider Trait
//
// Defines the interface the reconciler uses to talk to a DNS provider.
//
// ## Implementations
//
// - Rackspace Cloud DNS: `dnsrec-provider-clouddns` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsrec_core::{DnsProvider, RecordQuery, RecordType};
//
// async fn show(provider: &dyn DnsProvider) -> dnsrec_core::Result<()> {
//     let zone = provider.find_zone("example.org").await?;
//     let record = provider
//         .find_record(&zone, &RecordQuery::new(RecordType::A, "www.example.org"))
//         .await?;
//     println!("{} -> {}", record.name, record.data);
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::record::{NewRecord, Record, RecordQuery, RecordUpdate, Zone};

/// Trait for DNS provider implementations
///
/// Each method maps to one logical provider operation. Providers own
/// transport concerns (authentication, pagination, waiting for
/// asynchronous jobs) and never decide whether a change is needed; that
/// is the reconciler's job.
///
/// # Errors
///
/// Lookups report a missing entity with [`crate::Error::NotFound`] and a
/// non-unique one with [`crate::Error::AmbiguousMatch`]. Everything else
/// (transport, auth, API failures) is returned as is and is fatal to the
/// reconciliation.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Resolve a zone by its domain name
    async fn find_zone(&self, domain: &str) -> Result<Zone, crate::Error>;

    /// Find the single record in `zone` matching `query`
    ///
    /// Implementations should filter candidates with
    /// [`RecordQuery::select_unique`] so that the not-found and not-unique
    /// conditions are reported consistently.
    async fn find_record(&self, zone: &Zone, query: &RecordQuery) -> Result<Record, crate::Error>;

    /// Create a record and return it as stored by the provider
    async fn create_record(&self, zone: &Zone, record: &NewRecord) -> Result<Record, crate::Error>;

    /// Apply a field-level update to an existing record
    async fn update_record(
        &self,
        zone: &Zone,
        record: &Record,
        update: &RecordUpdate,
    ) -> Result<(), crate::Error>;

    /// Fetch the current state of a record by ID
    async fn get_record(&self, zone: &Zone, record_id: &str) -> Result<Record, crate::Error>;

    /// Delete a record
    async fn delete_record(&self, zone: &Zone, record: &Record) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
