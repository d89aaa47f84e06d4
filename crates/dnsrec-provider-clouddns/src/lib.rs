// # Rackspace Cloud DNS Provider
//
// This crate provides a `DnsProvider` implementation over the Rackspace
// Cloud DNS v1.0 API, authenticated through Identity v2.0.
//
// ## Behavior
//
// - One token per provider instance, obtained on first use
// - Zone and record lookups follow `links[rel=next]` pagination
// - Create, update and delete are asynchronous jobs; the provider polls
//   the job status until it completes or fails
// - HTTP timeout configured (30 seconds by default)
// - Specific error handling for HTTP status codes (401/403, 404, 409, 413/429, 5xx)
// - No retries: a failed request or job is returned to the caller as is
//
// ## Security Requirements
//
// - API key and token NEVER appear in logs or Debug output
//
// ## API Reference
//
// - List Domains: GET `/domains?name=...`
// - Search Records: GET `/domains/:id/records?type=...&name=...&data=...`
// - Add Records: POST `/domains/:id/records`
// - Modify Record: PUT `/domains/:id/records/:record_id`
// - Remove Record: DELETE `/domains/:id/records/:record_id`
// - Job Status: GET `/status/:job_id?showDetails=true`

mod api;
mod auth;

use async_trait::async_trait;
use dnsrec_core::config::ProviderConfig;
use dnsrec_core::traits::{DnsProvider, DnsProviderFactory};
use dnsrec_core::{Error, NewRecord, Record, RecordQuery, RecordUpdate, Result, Zone};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::OnceCell;

use api::{ApiRecord, AsyncJob, CreateRecords, DomainList, JobStatus, Paged, RecordList};
use auth::{Login, Session};

pub use auth::DEFAULT_IDENTITY_URL;

/// Name reported by [`DnsProvider::provider_name`] and in provider errors
pub const PROVIDER_NAME: &str = "clouddns";

/// Upper bound on pages followed for one listing
const MAX_PAGES: usize = 1000;

/// Cloud DNS provider
///
/// The Debug implementation intentionally does NOT expose the API key or token.
pub struct CloudDnsProvider {
    /// Account username
    username: String,

    /// Account API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Preferred endpoint region
    region: Option<String>,

    /// Identity service base URL
    identity_url: String,

    /// DNS API base URL overriding the service catalog
    endpoint: Option<String>,

    /// Delay between job status polls
    poll_interval: Duration,

    /// Number of job status polls before giving up
    max_poll_attempts: u32,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Token and endpoint, resolved on first request
    session: OnceCell<Session>,
}

impl std::fmt::Debug for CloudDnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudDnsProvider")
            .field("username", &self.username)
            .field("api_key", &"<REDACTED>")
            .field("region", &self.region)
            .field("identity_url", &self.identity_url)
            .field("endpoint", &self.endpoint)
            .field("poll_interval", &self.poll_interval)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("session", &self.session.get())
            .finish()
    }
}

impl CloudDnsProvider {
    /// Create a provider from a `ProviderConfig::CloudDns`
    ///
    /// # Returns
    ///
    /// - `Ok(CloudDnsProvider)`: ready to use; no request is made yet
    /// - `Err(Error::Config)`: wrong config variant, empty credentials, or
    ///   the HTTP client could not be built
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let ProviderConfig::CloudDns {
            username,
            api_key,
            region,
            identity_url,
            endpoint,
            timeout_secs,
            poll_interval_ms,
            max_poll_attempts,
        } = config
        else {
            return Err(Error::config("Invalid config for Cloud DNS provider"));
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(*timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            username: username.clone(),
            api_key: api_key.clone(),
            region: region.clone(),
            identity_url: identity_url
                .clone()
                .unwrap_or_else(|| DEFAULT_IDENTITY_URL.to_string()),
            endpoint: endpoint.clone(),
            poll_interval: Duration::from_millis(*poll_interval_ms),
            max_poll_attempts: *max_poll_attempts,
            client,
            session: OnceCell::new(),
        })
    }

    /// Authenticated session, created on first call
    async fn session(&self) -> Result<&Session> {
        self.session
            .get_or_try_init(|| async {
                let login = Login {
                    identity_url: &self.identity_url,
                    username: &self.username,
                    api_key: &self.api_key,
                    region: self.region.as_deref(),
                    endpoint_override: self.endpoint.as_deref(),
                };
                auth::authenticate(&self.client, &login).await
            })
            .await
    }

    /// Build a request carrying the auth token
    async fn request(&self, method: reqwest::Method, url: &str) -> Result<reqwest::RequestBuilder> {
        let session = self.session().await?;
        Ok(self
            .client
            .request(method, url)
            .header("X-Auth-Token", &session.token)
            .header("Accept", "application/json"))
    }

    /// Base URL of the DNS API
    async fn endpoint(&self) -> Result<&str> {
        Ok(self.session().await?.endpoint.as_str())
    }

    /// Send a request, map error statuses and decode the JSON body
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("{}: request failed: {}", context, e)))?;

        let response = api::check_status(response, context).await?;
        response.json().await.map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("{}: failed to parse response: {}", context, e))
        })
    }

    /// Fetch every page of a list endpoint
    async fn get_all_pages<P>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        context: &str,
    ) -> Result<Vec<P::Item>>
    where
        P: Paged + DeserializeOwned,
    {
        let first = self.request(reqwest::Method::GET, url).await?.query(query);
        let (mut items, links) = self.send_json::<P>(first, context).await?.into_parts();
        let mut next = api::next_link(&links);
        let mut seen = HashSet::new();

        while let Some(url) = next {
            if !seen.insert(url.clone()) || seen.len() > MAX_PAGES {
                return Err(Error::provider(
                    PROVIDER_NAME,
                    format!("{}: pagination does not terminate at {}", context, url),
                ));
            }
            tracing::debug!("{}: following next page {}", context, url);
            let request = self.request(reqwest::Method::GET, &url).await?;
            let (page, links) = self.send_json::<P>(request, context).await?.into_parts();
            items.extend(page);
            next = api::next_link(&links);
        }

        Ok(items)
    }

    /// Submit a mutation and wait for its job to finish
    ///
    /// Returns the job's `response` body, if any.
    async fn run_job(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<Option<serde_json::Value>> {
        let mut job: AsyncJob = self.send_json(request, context).await?;
        let mut polls = 0;

        loop {
            match job.status {
                JobStatus::Completed => {
                    tracing::debug!("{}: job {} completed", context, job.job_id);
                    return Ok(job.response);
                }
                JobStatus::Error => {
                    let reason = job
                        .error
                        .as_ref()
                        .map(|e| e.describe())
                        .unwrap_or_else(|| "job failed without details".to_string());
                    return Err(Error::provider(
                        PROVIDER_NAME,
                        format!("{}: job {} failed: {}", context, job.job_id, reason),
                    ));
                }
                JobStatus::Initialized | JobStatus::Running | JobStatus::Unknown => {}
            }

            if polls >= self.max_poll_attempts {
                return Err(Error::provider(
                    PROVIDER_NAME,
                    format!(
                        "{}: job {} did not complete after {} polls",
                        context, job.job_id, polls
                    ),
                ));
            }
            polls += 1;
            tokio::time::sleep(self.poll_interval).await;

            let url = format!("{}/status/{}", self.endpoint().await?, job.job_id);
            let request = self
                .request(reqwest::Method::GET, &url)
                .await?
                .query(&[("showDetails", "true")]);
            job = self.send_json(request, context).await?;
        }
    }

    async fn records_url(&self, zone: &Zone) -> Result<String> {
        Ok(format!("{}/domains/{}/records", self.endpoint().await?, zone.id))
    }
}

#[async_trait]
impl DnsProvider for CloudDnsProvider {
    async fn find_zone(&self, domain: &str) -> Result<Zone> {
        tracing::debug!("Looking up zone: {}", domain);

        let url = format!("{}/domains", self.endpoint().await?);
        let domains = self
            .get_all_pages::<DomainList>(&url, &[("name", domain)], "Zone lookup")
            .await?;

        // The name filter is not an exact match; sub-zones come back too
        let mut matching: Vec<Zone> = domains
            .into_iter()
            .filter(|d| d.name.eq_ignore_ascii_case(domain))
            .map(Zone::from)
            .collect();

        match matching.len() {
            0 => Err(Error::not_found(format!("Zone not found: {}", domain))),
            1 => Ok(matching.remove(0)),
            n => Err(Error::ambiguous(format!("{} zones are named {}", n, domain))),
        }
    }

    async fn find_record(&self, zone: &Zone, query: &RecordQuery) -> Result<Record> {
        tracing::debug!("Searching zone {} for {}", zone.name, query);

        let url = self.records_url(zone).await?;
        let record_type = query.record_type.as_str();
        let mut params = vec![("type", record_type), ("name", query.name.as_str())];
        if let Some(ref data) = query.data {
            params.push(("data", data.as_str()));
        }

        let candidates = self
            .get_all_pages::<RecordList>(&url, &params, "Record search")
            .await?;

        query.select_unique(candidates.into_iter().filter_map(ApiRecord::into_record))
    }

    async fn create_record(&self, zone: &Zone, record: &NewRecord) -> Result<Record> {
        tracing::info!(
            "Adding {} record {} -> {} to zone {}",
            record.record_type,
            record.name,
            record.data,
            zone.name
        );

        let url = self.records_url(zone).await?;
        let request = self
            .request(reqwest::Method::POST, &url)
            .await?
            .json(&CreateRecords { records: [record] });

        let response = self
            .run_job(request, "Record creation")
            .await?
            .ok_or_else(|| Error::provider(PROVIDER_NAME, "Record creation job returned no body"))?;

        let created: RecordList = serde_json::from_value(response)?;
        created
            .records
            .into_iter()
            .find_map(ApiRecord::into_record)
            .ok_or_else(|| Error::provider(PROVIDER_NAME, "Record creation job returned no record"))
    }

    async fn update_record(&self, zone: &Zone, record: &Record, update: &RecordUpdate) -> Result<()> {
        tracing::info!(
            "Modifying record {} in zone {}: {:?}",
            record.id,
            zone.name,
            update.fields()
        );

        let url = format!("{}/{}", self.records_url(zone).await?, record.id);
        let request = self.request(reqwest::Method::PUT, &url).await?.json(update);
        self.run_job(request, "Record update").await?;
        Ok(())
    }

    async fn get_record(&self, zone: &Zone, record_id: &str) -> Result<Record> {
        let url = format!("{}/{}", self.records_url(zone).await?, record_id);
        let request = self.request(reqwest::Method::GET, &url).await?;
        let record: ApiRecord = self.send_json(request, "Record fetch").await?;

        let record_type = record.record_type.clone();
        record.into_record().ok_or_else(|| {
            Error::provider(
                PROVIDER_NAME,
                format!("Record {} has unsupported type {}", record_id, record_type),
            )
        })
    }

    async fn delete_record(&self, zone: &Zone, record: &Record) -> Result<()> {
        tracing::info!("Removing record {} from zone {}", record.id, zone.name);

        let url = format!("{}/{}", self.records_url(zone).await?, record.id);
        let request = self.request(reqwest::Method::DELETE, &url).await?;
        self.run_job(request, "Record removal").await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating Cloud DNS providers
pub struct CloudDnsFactory;

impl DnsProviderFactory for CloudDnsFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        Ok(Box::new(CloudDnsProvider::from_config(config)?))
    }
}

/// Register the Cloud DNS provider with a registry
///
/// # Example
///
/// ```rust
/// use dnsrec_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// dnsrec_provider_clouddns::register(&registry);
/// assert!(registry.has_provider("clouddns"));
/// ```
pub fn register(registry: &dnsrec_core::ProviderRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(CloudDnsFactory));
}
