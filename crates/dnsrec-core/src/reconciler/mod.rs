//! Record reconciler
//!
//! The Reconciler is responsible for:
//! - Validating the desired record
//! - Resolving the zone and the existing record via DnsProvider
//! - Creating, updating or deleting the record as needed
//! - Reporting whether anything changed and the final record state
//!
//! ## Flow
//!
//! ```text
//!                       ┌──────────────┐
//!   DesiredRecord ────▶ │  Reconciler  │ ────▶ ReconciliationResult
//!                       └──────────────┘
//!                              │
//!          find_zone ─ find_record ─ create / update / delete
//!                              │
//!                              ▼
//!                       ┌──────────────┐
//!                       │ DnsProvider  │
//!                       └──────────────┘
//! ```
//!
//! ## state=present
//!
//! 1. Validate (MX/SRV need a priority) before any provider call
//! 2. Resolve the zone
//! 3. Look up the record by type and name; create it when missing
//! 4. Diff comment, ttl, priority and data against the record
//! 5. Submit a non-empty diff and re-fetch the record
//!
//! ## state=absent
//!
//! 1. Resolve the zone
//! 2. Look up the record by type, name and data; missing means done
//! 3. Delete it
//!
//! Nothing is retried. The first error ends the reconciliation.

use crate::config::ReconcilerConfig;
use crate::error::{Error, Result};
use crate::record::{DesiredRecord, Record, RecordSnapshot, RecordState, RecordUpdate, Zone};
use crate::traits::DnsProvider;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Outcome of one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Whether the remote record was (or, in dry-run, would be) modified
    pub changed: bool,
    /// Final state of the record; empty when the record is absent
    pub record: RecordSnapshot,
}

impl ReconciliationResult {
    fn new(changed: bool, record: RecordSnapshot) -> Self {
        Self { changed, record }
    }
}

/// Reconciles one desired record against a provider
///
/// The reconciler holds no state between calls; each call to
/// [`Reconciler::reconcile`] resolves the zone and the record afresh.
pub struct Reconciler {
    provider: Box<dyn DnsProvider>,
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `provider`: DNS provider implementation
    /// - `config`: reconciler settings
    pub fn new(provider: Box<dyn DnsProvider>, config: ReconcilerConfig) -> Self {
        if config.dry_run {
            warn!(
                "Reconciler running in DRY-RUN mode - {} will not be modified",
                provider.provider_name()
            );
        }
        Self { provider, config }
    }

    /// Bring the remote record in line with `desired`
    ///
    /// # Returns
    ///
    /// - `Ok(ReconciliationResult)`: `changed` and the final record snapshot
    /// - `Err(Error::Validation)`: the desired record is invalid; no
    ///   provider call was made
    /// - `Err(Error::AmbiguousMatch)`: more than one record matches
    /// - `Err(Error)`: zone lookup or provider failure
    pub async fn reconcile(&self, desired: &DesiredRecord) -> Result<ReconciliationResult> {
        match desired.state {
            RecordState::Present => self.ensure_present(desired).await,
            RecordState::Absent => self.ensure_absent(desired).await,
        }
    }

    async fn ensure_present(&self, desired: &DesiredRecord) -> Result<ReconciliationResult> {
        desired.validate_for_present()?;

        let zone = self.find_zone(desired.zone_name()).await?;
        let query = desired.present_query();
        let mut changed = false;

        let record = match self.provider.find_record(&zone, &query).await {
            Ok(record) => {
                debug!("Found record {} ({})", record.id, query);
                record
            }
            Err(Error::NotFound(_)) => {
                let new_record = desired.to_new_record();
                if self.config.dry_run {
                    info!("[DRY-RUN] Would create record {} in zone {}", query, zone.name);
                    return Ok(ReconciliationResult::new(
                        true,
                        RecordSnapshot::from(&new_record),
                    ));
                }

                info!("Creating record {} in zone {}", query, zone.name);
                changed = true;
                self.provider.create_record(&zone, &new_record).await?
            }
            Err(e) => return Err(e),
        };

        let update = RecordUpdate::between(desired, &record);
        if update.is_empty() {
            debug!("Record {} is up to date", record.id);
            return Ok(ReconciliationResult::new(changed, RecordSnapshot::from(&record)));
        }

        if self.config.dry_run {
            info!(
                "[DRY-RUN] Would update record {} fields {:?}",
                record.id,
                update.fields()
            );
            let mut preview = record;
            update.apply_to(&mut preview);
            return Ok(ReconciliationResult::new(true, RecordSnapshot::from(&preview)));
        }

        info!("Updating record {} fields {:?}", record.id, update.fields());
        self.provider.update_record(&zone, &record, &update).await?;

        let refreshed = self.provider.get_record(&zone, &record.id).await?;
        Ok(ReconciliationResult::new(true, RecordSnapshot::from(&refreshed)))
    }

    async fn ensure_absent(&self, desired: &DesiredRecord) -> Result<ReconciliationResult> {
        desired.validate()?;

        let zone = self.find_zone(desired.zone_name()).await?;
        let query = desired.absent_query();

        let record = match self.provider.find_record(&zone, &query).await {
            Ok(record) => record,
            Err(Error::NotFound(_)) => {
                debug!("No record matches {}, nothing to delete", query);
                return Ok(ReconciliationResult::new(false, RecordSnapshot::empty()));
            }
            Err(e) => return Err(e),
        };

        if self.config.dry_run {
            info!("[DRY-RUN] Would delete record {} ({})", record.id, query);
        } else {
            self.delete(&zone, &record).await?;
        }

        Ok(ReconciliationResult::new(true, RecordSnapshot::empty()))
    }

    async fn find_zone(&self, domain: &str) -> Result<Zone> {
        let zone = self.provider.find_zone(domain).await?;
        debug!("Resolved zone {} (id: {})", zone.name, zone.id);
        Ok(zone)
    }

    async fn delete(&self, zone: &Zone, record: &Record) -> Result<()> {
        info!("Deleting record {} from zone {}", record.id, zone.name);
        self.provider.delete_record(zone, record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_serialization() {
        let result = ReconciliationResult::new(false, RecordSnapshot::empty());
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({ "changed": false, "record": {} })
        );
    }
}
