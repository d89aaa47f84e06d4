//! Test doubles shared by the reconciliation contract tests
//!
//! `MockDnsProvider` keeps one zone's records in memory, applies mutations
//! the way a real provider would, and counts every call so tests can assert
//! which requests the reconciler issued.

#![allow(dead_code)]

use async_trait::async_trait;
use dnsrec_core::error::{Error, Result};
use dnsrec_core::{
    DnsProvider, NewRecord, Record, RecordQuery, RecordType, RecordUpdate, Zone,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Per-operation call counters
#[derive(Debug, Default)]
pub struct CallCounts {
    pub find_zone: AtomicUsize,
    pub find_record: AtomicUsize,
    pub create: AtomicUsize,
    pub update: AtomicUsize,
    pub get: AtomicUsize,
    pub delete: AtomicUsize,
}

/// In-memory provider holding a single zone
pub struct MockDnsProvider {
    zone: Zone,
    records: Arc<Mutex<Vec<Record>>>,
    updates: Arc<Mutex<Vec<RecordUpdate>>>,
    next_id: Arc<AtomicUsize>,
    calls: Arc<CallCounts>,
}

impl MockDnsProvider {
    /// Provider serving the zone "example.org" with no records
    pub fn new() -> Self {
        Self {
            zone: Zone::new("2725233", "example.org"),
            records: Arc::new(Mutex::new(Vec::new())),
            updates: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicUsize::new(1)),
            calls: Arc::new(CallCounts::default()),
        }
    }

    /// Seed an existing record
    pub fn with_record(self, record: Record) -> Self {
        self.records.lock().unwrap().push(record);
        self
    }

    /// Create a new MockDnsProvider that shares records and counters with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            zone: other.zone.clone(),
            records: Arc::clone(&other.records),
            updates: Arc::clone(&other.updates),
            next_id: Arc::clone(&other.next_id),
            calls: Arc::clone(&other.calls),
        }
    }

    /// Boxed handle sharing state with this provider, ready for a Reconciler
    pub fn boxed_handle(&self) -> Box<dyn DnsProvider> {
        Box::new(Self::sharing_state_with(self))
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    /// Updates submitted so far, in order
    pub fn updates(&self) -> Vec<RecordUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }

    /// Total number of create, update and delete requests
    pub fn mutation_count(&self) -> usize {
        self.calls.create.load(Ordering::SeqCst)
            + self.calls.update.load(Ordering::SeqCst)
            + self.calls.delete.load(Ordering::SeqCst)
    }

    /// Total number of provider calls of any kind
    pub fn total_calls(&self) -> usize {
        self.mutation_count()
            + self.calls.find_zone.load(Ordering::SeqCst)
            + self.calls.find_record.load(Ordering::SeqCst)
            + self.calls.get.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsProvider for MockDnsProvider {
    async fn find_zone(&self, domain: &str) -> Result<Zone> {
        self.calls.find_zone.fetch_add(1, Ordering::SeqCst);
        if self.zone.name.eq_ignore_ascii_case(domain) {
            Ok(self.zone.clone())
        } else {
            Err(Error::not_found(format!("zone {}", domain)))
        }
    }

    async fn find_record(&self, _zone: &Zone, query: &RecordQuery) -> Result<Record> {
        self.calls.find_record.fetch_add(1, Ordering::SeqCst);
        query.select_unique(self.records())
    }

    async fn create_record(&self, _zone: &Zone, record: &NewRecord) -> Result<Record> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = Record {
            id: format!("{}-{}", record.record_type, id),
            name: record.name.clone(),
            record_type: record.record_type,
            data: record.data.clone(),
            ttl: Some(record.ttl),
            priority: record.priority,
            comment: record.comment.clone(),
            created: None,
            updated: None,
        };
        self.records.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_record(&self, _zone: &Zone, record: &Record, update: &RecordUpdate) -> Result<()> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        self.updates.lock().unwrap().push(update.clone());

        let mut records = self.records.lock().unwrap();
        let stored = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| Error::not_found(format!("record {}", record.id)))?;
        update.apply_to(stored);
        Ok(())
    }

    async fn get_record(&self, _zone: &Zone, record_id: &str) -> Result<Record> {
        self.calls.get.fetch_add(1, Ordering::SeqCst);
        self.records()
            .into_iter()
            .find(|r| r.id == record_id)
            .ok_or_else(|| Error::not_found(format!("record {}", record_id)))
    }

    async fn delete_record(&self, _zone: &Zone, record: &Record) -> Result<()> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != record.id);
        if records.len() == before {
            return Err(Error::not_found(format!("record {}", record.id)));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// An existing A record for www.example.org
pub fn existing_a(id: &str, data: &str, ttl: u32) -> Record {
    Record {
        id: id.to_string(),
        name: "www.example.org".to_string(),
        record_type: RecordType::A,
        data: data.to_string(),
        ttl: Some(ttl),
        priority: None,
        comment: None,
        created: None,
        updated: None,
    }
}
