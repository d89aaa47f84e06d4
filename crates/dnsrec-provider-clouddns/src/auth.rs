//! Identity v2.0 authentication
//!
//! Exchanges a username and API key for a token and locates the Cloud DNS
//! endpoint in the returned service catalog.
//!
//! ```http
//! POST /v2.0/tokens
//! {"auth": {"RAX-KSKEY:apiKeyCredentials": {"username": "...", "apiKey": "..."}}}
//! ```

use dnsrec_core::{Error, Result};
use serde::Deserialize;
use std::fmt;

use crate::PROVIDER_NAME;
use crate::api::check_status;

/// Public identity endpoint
pub const DEFAULT_IDENTITY_URL: &str = "https://identity.api.rackspacecloud.com/v2.0";

/// Catalog type of the DNS service
const DNS_SERVICE_TYPE: &str = "rax:dns";

/// Catalog name of the DNS service
const DNS_SERVICE_NAME: &str = "cloudDNS";

/// Authenticated session: token plus DNS API base URL
pub(crate) struct Session {
    pub token: String,
    pub endpoint: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Deserialize)]
struct AuthResponse {
    access: Access,
}

#[derive(Deserialize)]
struct Access {
    token: Token,
    #[serde(rename = "serviceCatalog", default)]
    service_catalog: Vec<Service>,
}

#[derive(Deserialize)]
struct Token {
    id: String,
}

#[derive(Deserialize)]
struct Service {
    name: String,
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    endpoints: Vec<Endpoint>,
}

#[derive(Deserialize)]
struct Endpoint {
    #[serde(rename = "publicURL")]
    public_url: String,
    #[serde(default)]
    region: Option<String>,
}

/// Credentials and endpoint preferences for [`authenticate`]
pub(crate) struct Login<'a> {
    pub identity_url: &'a str,
    pub username: &'a str,
    pub api_key: &'a str,
    pub region: Option<&'a str>,
    pub endpoint_override: Option<&'a str>,
}

/// Obtain a token and resolve the DNS endpoint
pub(crate) async fn authenticate(client: &reqwest::Client, login: &Login<'_>) -> Result<Session> {
    let url = format!("{}/tokens", login.identity_url.trim_end_matches('/'));
    tracing::debug!("Authenticating {} against {}", login.username, url);

    let body = serde_json::json!({
        "auth": {
            "RAX-KSKEY:apiKeyCredentials": {
                "username": login.username,
                "apiKey": login.api_key,
            }
        }
    });

    let response = client
        .post(&url)
        .header("Accept", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| Error::http(format!("Identity request failed: {}", e)))?;

    let response = check_status(response, "Authentication").await?;
    let auth: AuthResponse = response
        .json()
        .await
        .map_err(|e| Error::provider(PROVIDER_NAME, format!("Failed to parse identity response: {}", e)))?;

    let endpoint = match login.endpoint_override {
        Some(endpoint) => endpoint.to_string(),
        None => select_endpoint(&auth.access.service_catalog, login.region)?,
    };

    tracing::debug!("Using DNS endpoint {}", endpoint);
    Ok(Session {
        token: auth.access.token.id,
        endpoint: endpoint.trim_end_matches('/').to_string(),
    })
}

/// Pick the DNS endpoint, preferring one in `region`
fn select_endpoint(catalog: &[Service], region: Option<&str>) -> Result<String> {
    let service = catalog
        .iter()
        .find(|s| s.service_type == DNS_SERVICE_TYPE || s.name == DNS_SERVICE_NAME)
        .ok_or_else(|| {
            Error::provider(PROVIDER_NAME, "No cloudDNS service in the service catalog")
        })?;

    let in_region = region.and_then(|wanted| {
        service.endpoints.iter().find(|e| {
            e.region
                .as_deref()
                .is_some_and(|r| r.eq_ignore_ascii_case(wanted))
        })
    });

    in_region
        .or_else(|| service.endpoints.first())
        .map(|e| e.public_url.clone())
        .ok_or_else(|| Error::provider(PROVIDER_NAME, "cloudDNS service lists no endpoints"))
}
