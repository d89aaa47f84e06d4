//! Cloud DNS v1.0 wire format
//!
//! Response bodies are decoded into these private types and converted into
//! the `dnsrec-core` model. Request bodies reuse the core payload types
//! (`NewRecord`, `RecordUpdate`), whose field names already match the API.

use chrono::{DateTime, Utc};
use dnsrec_core::{Error, NewRecord, Record, RecordType, Result, Zone};
use serde::{Deserialize, Serialize};

use crate::PROVIDER_NAME;

/// Pagination link
#[derive(Debug, Deserialize)]
pub(crate) struct Link {
    pub href: String,
    pub rel: String,
}

/// A list response that may continue on another page
pub(crate) trait Paged {
    type Item;

    fn into_parts(self) -> (Vec<Self::Item>, Vec<Link>);
}

/// URL of the next page, if any
pub(crate) fn next_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|link| link.rel.eq_ignore_ascii_case("next"))
        .map(|link| link.href.clone())
}

/// `GET /domains`
#[derive(Debug, Deserialize)]
pub(crate) struct DomainList {
    #[serde(default)]
    pub domains: Vec<ApiDomain>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Paged for DomainList {
    type Item = ApiDomain;

    fn into_parts(self) -> (Vec<ApiDomain>, Vec<Link>) {
        (self.domains, self.links)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiDomain {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub ttl: Option<u32>,
}

impl From<ApiDomain> for Zone {
    fn from(domain: ApiDomain) -> Self {
        Zone {
            id: domain.id.to_string(),
            name: domain.name,
            email_address: domain.email_address,
            ttl: domain.ttl,
        }
    }
}

/// `GET /domains/{id}/records`, also the body of a completed create job
#[derive(Debug, Deserialize)]
pub(crate) struct RecordList {
    #[serde(default)]
    pub records: Vec<ApiRecord>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Paged for RecordList {
    type Item = ApiRecord;

    fn into_parts(self) -> (Vec<ApiRecord>, Vec<Link>) {
        (self.records, self.links)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub data: String,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub priority: Option<u16>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

impl ApiRecord {
    /// Convert to the core model; `None` for record types dnsrec does not manage
    pub fn into_record(self) -> Option<Record> {
        let record_type: RecordType = self.record_type.parse().ok()?;
        Some(Record {
            created: self.created.as_deref().and_then(parse_timestamp),
            updated: self.updated.as_deref().and_then(parse_timestamp),
            id: self.id,
            name: self.name,
            record_type,
            data: self.data,
            ttl: self.ttl,
            priority: self.priority,
            comment: self.comment,
        })
    }
}

/// `POST /domains/{id}/records` body
#[derive(Debug, Serialize)]
pub(crate) struct CreateRecords<'a> {
    pub records: [&'a NewRecord; 1],
}

/// Asynchronous job as returned by mutations and `GET /status/{jobId}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AsyncJob {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub response: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<JobError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub(crate) enum JobStatus {
    Initialized,
    Running,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobError {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl JobError {
    pub fn describe(&self) -> String {
        let message = self.message.as_deref().unwrap_or("job failed");
        match (&self.details, self.code) {
            (Some(details), Some(code)) => format!("{} ({}): {}", message, code, details),
            (Some(details), None) => format!("{}: {}", message, details),
            (None, Some(code)) => format!("{} ({})", message, code),
            (None, None) => message.to_string(),
        }
    }
}

/// Parse API timestamps such as `2011-05-19T13:07:08.000+0000`
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| tracing::debug!("Ignoring unparseable timestamp {:?}: {}", value, e))
        .ok()
}

/// Turn a non-success response into an error
///
/// - 401/403 → authentication
/// - 404 → provider error; an endpoint that vanished is not an empty
///   search result
/// - 413/429 → rate limited
/// - 5xx → transient provider error
pub(crate) async fn check_status(
    response: reqwest::Response,
    context: &str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());

    Err(match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "{}: invalid credentials or insufficient permissions. Status: {}",
            context, status
        )),
        404 => Error::provider(
            PROVIDER_NAME,
            format!("{}: resource not found: {} - {}", context, status, error_text),
        ),
        409 => Error::provider(
            PROVIDER_NAME,
            format!("{}: conflict: {} - {}", context, status, error_text),
        ),
        413 | 429 => Error::rate_limited(format!(
            "{}: API limit exceeded. Status: {}",
            context, status
        )),
        500..=599 => Error::provider(
            PROVIDER_NAME,
            format!("{}: server error (transient): {} - {}", context, status, error_text),
        ),
        _ => Error::provider(
            PROVIDER_NAME,
            format!("{}: {} - {}", context, status, error_text),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp_formats() {
        let legacy = parse_timestamp("2011-05-19T13:07:08.000+0000").unwrap();
        assert_eq!((legacy.year(), legacy.month(), legacy.day()), (2011, 5, 19));
        assert_eq!(legacy.hour(), 13);

        let rfc3339 = parse_timestamp("2011-05-19T15:07:08+02:00").unwrap();
        assert_eq!(rfc3339, legacy);

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_unmanaged_record_type_is_skipped() {
        let record: ApiRecord = serde_json::from_value(serde_json::json!({
            "id": "PTR-1",
            "name": "1.0.0.127.in-addr.arpa",
            "type": "PTR",
            "data": "www.example.org",
        }))
        .unwrap();
        assert!(record.into_record().is_none());
    }

    #[test]
    fn test_job_status_decoding() {
        let job: AsyncJob = serde_json::from_value(serde_json::json!({
            "jobId": "abc",
            "status": "QUEUED",
        }))
        .unwrap();
        assert_eq!(job.status, JobStatus::Unknown);
    }

    #[test]
    fn test_job_error_description() {
        let error = JobError {
            code: Some(400),
            message: Some("Validation failed".to_string()),
            details: Some("ttl must be >= 300".to_string()),
        };
        assert_eq!(error.describe(), "Validation failed (400): ttl must be >= 300");
    }

    #[test]
    fn test_next_link() {
        let links = vec![
            Link { href: "https://a/prev".to_string(), rel: "previous".to_string() },
            Link { href: "https://a/next".to_string(), rel: "next".to_string() },
        ];
        assert_eq!(next_link(&links).as_deref(), Some("https://a/next"));
        assert_eq!(next_link(&[]), None);
    }
}
