//! Record data model
//!
//! Types describing the desired state of a single DNS record, the remote
//! entities a provider returns ([`Zone`], [`Record`]) and the payloads the
//! reconciler hands back to a provider ([`NewRecord`], [`RecordUpdate`]).

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a record comment, in characters
pub const MAX_COMMENT_LEN: usize = 160;

/// Default record TTL in seconds
pub const DEFAULT_TTL: u32 = 3600;

/// DNS record type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address
    #[default]
    A,
    /// IPv6 address
    Aaaa,
    /// Canonical name
    Cname,
    /// Mail exchange
    Mx,
    /// Name server
    Ns,
    /// Service locator
    Srv,
    /// Text
    Txt,
}

impl RecordType {
    /// All supported record types
    pub const ALL: [RecordType; 7] = [
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Cname,
        RecordType::Mx,
        RecordType::Ns,
        RecordType::Srv,
        RecordType::Txt,
    ];

    /// Wire name of the type (e.g. "AAAA")
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Srv => "SRV",
            RecordType::Txt => "TXT",
        }
    }

    /// Whether records of this type carry a priority
    pub fn requires_priority(&self) -> bool {
        matches!(self, RecordType::Mx | RecordType::Srv)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RecordType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::validation(format!("Unsupported record type: {}", s)))
    }
}

/// Desired presence of the record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordState {
    /// The record must exist with the desired attributes
    #[default]
    Present,
    /// The record must not exist
    Absent,
}

impl FromStr for RecordState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "present" => Ok(RecordState::Present),
            "absent" => Ok(RecordState::Absent),
            _ => Err(Error::validation(format!(
                "Unsupported state '{}', expected present or absent",
                s
            ))),
        }
    }
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_overwrite() -> bool {
    true
}

/// Desired state of a single DNS record
///
/// This is the input of [`crate::Reconciler::reconcile`]. It is never
/// mutated during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredRecord {
    /// Zone the record lives in (e.g. "example.org")
    pub domain: String,

    /// Fully-qualified record name (e.g. "www.example.org")
    pub name: String,

    /// Record type
    #[serde(rename = "type", default)]
    pub record_type: RecordType,

    /// Record data (address, target, text...)
    pub data: String,

    /// Time-to-live in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Priority, required for MX and SRV records only
    #[serde(default)]
    pub priority: Option<u16>,

    /// Free-form comment stored with the record
    #[serde(default)]
    pub comment: Option<String>,

    /// Whether the record should exist
    #[serde(default)]
    pub state: RecordState,

    /// When true, an existing record with the same type and name is
    /// rewritten in place. When false, the lookup also matches on data and
    /// a record with different data is added alongside.
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
}

impl DesiredRecord {
    /// Create a desired A record with default TTL, state present
    pub fn new(
        domain: impl Into<String>,
        name: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            record_type: RecordType::default(),
            data: data.into(),
            ttl: DEFAULT_TTL,
            priority: None,
            comment: None,
            state: RecordState::default(),
            overwrite: true,
        }
    }

    /// Set the record type
    pub fn with_type(mut self, record_type: RecordType) -> Self {
        self.record_type = record_type;
        self
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set the desired state
    pub fn with_state(mut self, state: RecordState) -> Self {
        self.state = state;
        self
    }

    /// Set the overwrite flag
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Validate the fields shared by both states
    pub fn validate(&self) -> Result<()> {
        if self.domain.trim().is_empty() {
            return Err(Error::validation("domain cannot be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(Error::validation("name cannot be empty"));
        }
        if self.data.is_empty() {
            return Err(Error::validation("data cannot be empty"));
        }
        if let Some(ref comment) = self.comment
            && comment.chars().count() > MAX_COMMENT_LEN
        {
            return Err(Error::validation(format!(
                "comment is {} characters long (max {})",
                comment.chars().count(),
                MAX_COMMENT_LEN
            )));
        }
        Ok(())
    }

    /// Validate the record for creation or update
    ///
    /// On top of [`DesiredRecord::validate`], MX and SRV records need a
    /// priority and every other type must not carry one.
    pub fn validate_for_present(&self) -> Result<()> {
        self.validate()?;

        match (self.record_type.requires_priority(), self.priority) {
            (true, None) => Err(Error::validation(format!(
                "priority is required for {} records",
                self.record_type
            ))),
            (false, Some(_)) => Err(Error::validation(format!(
                "priority is only allowed for MX and SRV records, not {}",
                self.record_type
            ))),
            _ => Ok(()),
        }
    }

    /// Zone name without the trailing root dot
    pub fn zone_name(&self) -> &str {
        strip_root(&self.domain)
    }

    /// Record name without the trailing root dot
    ///
    /// Providers report names without it, so lookups and creates use this
    /// form.
    pub fn record_name(&self) -> &str {
        strip_root(&self.name)
    }

    /// Lookup key for the present path: type and name, plus data when
    /// `overwrite` is off
    pub fn present_query(&self) -> RecordQuery {
        let query = RecordQuery::new(self.record_type, self.record_name());
        if self.overwrite {
            query
        } else {
            query.with_data(&self.data)
        }
    }

    /// Lookup key for the absent path: type, name and data
    pub fn absent_query(&self) -> RecordQuery {
        RecordQuery::new(self.record_type, self.record_name()).with_data(&self.data)
    }

    /// Payload to create this record
    pub fn to_new_record(&self) -> NewRecord {
        NewRecord {
            name: self.record_name().to_string(),
            record_type: self.record_type,
            data: self.data.clone(),
            ttl: self.ttl,
            priority: self.priority,
            comment: self.comment.clone(),
        }
    }
}

fn strip_root(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// A DNS zone as known by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Provider-specific zone ID
    pub id: String,
    /// Zone name (e.g. "example.org")
    pub name: String,
    /// Contact address of the zone, if reported
    pub email_address: Option<String>,
    /// Default TTL of the zone, if reported
    pub ttl: Option<u32>,
}

impl Zone {
    /// Create a zone with only an ID and a name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email_address: None,
            ttl: None,
        }
    }
}

/// An existing record in a zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Provider-specific record ID
    pub id: String,
    /// Fully-qualified name
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Record data
    pub data: String,
    /// TTL, `None` when the provider does not report one
    pub ttl: Option<u32>,
    /// Priority, `None` when unset
    pub priority: Option<u16>,
    /// Comment, `None` when unset
    pub comment: Option<String>,
    /// Creation time
    pub created: Option<DateTime<Utc>>,
    /// Last modification time
    pub updated: Option<DateTime<Utc>>,
}

/// Lookup key for records within a zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    /// Record type to match
    pub record_type: RecordType,
    /// Record name to match (case-insensitive)
    pub name: String,
    /// Record data to match exactly, if part of the key
    pub data: Option<String>,
}

impl RecordQuery {
    /// Create a query on type and name
    pub fn new(record_type: RecordType, name: impl Into<String>) -> Self {
        Self {
            record_type,
            name: name.into(),
            data: None,
        }
    }

    /// Add data to the lookup key
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Whether a record matches this key
    pub fn matches(&self, record: &Record) -> bool {
        record.record_type == self.record_type
            && strip_root(&record.name).eq_ignore_ascii_case(strip_root(&self.name))
            && self.data.as_ref().is_none_or(|data| *data == record.data)
    }

    /// Pick the single record matching this key
    ///
    /// # Returns
    ///
    /// - `Ok(Record)`: exactly one candidate matched
    /// - `Err(Error::NotFound)`: no candidate matched
    /// - `Err(Error::AmbiguousMatch)`: more than one candidate matched
    pub fn select_unique(&self, candidates: impl IntoIterator<Item = Record>) -> Result<Record> {
        let mut matching: Vec<Record> = candidates
            .into_iter()
            .filter(|record| self.matches(record))
            .collect();

        match matching.len() {
            0 => Err(Error::not_found(format!("no record matches {}", self))),
            1 => Ok(matching.remove(0)),
            n => Err(Error::ambiguous(format!(
                "{} records match {}, refusing to pick one",
                n, self
            ))),
        }
    }
}

impl fmt::Display for RecordQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type={} name={}", self.record_type, self.name)?;
        if let Some(ref data) = self.data {
            write!(f, " data={}", data)?;
        }
        Ok(())
    }
}

/// Payload for creating a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRecord {
    /// Fully-qualified name
    pub name: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Record data
    pub data: String,
    /// TTL in seconds
    pub ttl: u32,
    /// Priority, sent only when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    /// Comment, sent only when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Field-level update of an existing record
///
/// `None` means the field is not part of the update. For `priority` and
/// `comment`, `Some(None)` explicitly unsets the field and serializes as
/// JSON `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordUpdate {
    /// New data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// New TTL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// New priority, or explicit unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Option<u16>>,
    /// New comment, or explicit unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Option<String>>,
}

impl RecordUpdate {
    /// Compute the update that brings `current` to the desired values
    ///
    /// Compares comment, ttl, priority and data with exact equality. A
    /// field the current record does not report counts as unset.
    pub fn between(desired: &DesiredRecord, current: &Record) -> Self {
        let mut update = Self::default();

        if desired.comment != current.comment {
            update.comment = Some(desired.comment.clone());
        }
        if Some(desired.ttl) != current.ttl {
            update.ttl = Some(desired.ttl);
        }
        if desired.priority != current.priority {
            update.priority = Some(desired.priority);
        }
        if desired.data != current.data {
            update.data = Some(desired.data.clone());
        }

        update
    }

    /// Whether the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.data.is_none() && self.ttl.is_none() && self.priority.is_none() && self.comment.is_none()
    }

    /// Names of the fields carried by this update
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.comment.is_some() {
            fields.push("comment");
        }
        if self.ttl.is_some() {
            fields.push("ttl");
        }
        if self.priority.is_some() {
            fields.push("priority");
        }
        if self.data.is_some() {
            fields.push("data");
        }
        fields
    }

    /// Apply the update to a local copy of a record
    pub fn apply_to(&self, record: &mut Record) {
        if let Some(ref data) = self.data {
            record.data = data.clone();
        }
        if let Some(ttl) = self.ttl {
            record.ttl = Some(ttl);
        }
        if let Some(priority) = self.priority {
            record.priority = priority;
        }
        if let Some(ref comment) = self.comment {
            record.comment = comment.clone();
        }
    }
}

/// Scalar attributes of a record as reported back to the caller
///
/// Every field is optional; the empty snapshot (record absent) serializes
/// as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    /// Provider-specific record ID; absent for a record not created yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Fully-qualified record name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Record type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<RecordType>,
    /// Record data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Time-to-live in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Priority (MX and SRV)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    /// Comment stored with the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Creation time reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Last modification time reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl RecordSnapshot {
    /// Snapshot of no record
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the snapshot describes no record
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&Record> for RecordSnapshot {
    fn from(record: &Record) -> Self {
        Self {
            id: Some(record.id.clone()),
            name: Some(record.name.clone()),
            record_type: Some(record.record_type),
            data: Some(record.data.clone()),
            ttl: record.ttl,
            priority: record.priority,
            comment: record.comment.clone(),
            created: record.created,
            updated: record.updated,
        }
    }
}

impl From<&NewRecord> for RecordSnapshot {
    fn from(record: &NewRecord) -> Self {
        Self {
            id: None,
            name: Some(record.name.clone()),
            record_type: Some(record.record_type),
            data: Some(record.data.clone()),
            ttl: Some(record.ttl),
            priority: record.priority,
            comment: record.comment.clone(),
            created: None,
            updated: None,
        }
    }
}
