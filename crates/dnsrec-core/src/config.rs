//! Configuration types
//!
//! Provider credentials and region are not part of the desired record; they
//! travel in a [`ProviderConfig`] handed to the provider factory. Behavior of
//! the reconciler itself is controlled by [`ReconcilerConfig`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Rackspace Cloud DNS
    #[serde(rename = "clouddns")]
    CloudDns {
        /// Account username
        username: String,

        /// Account API key
        api_key: String,

        /// Preferred region of the DNS endpoint (e.g. "DFW")
        #[serde(default)]
        region: Option<String>,

        /// Identity service base URL (defaults to the public endpoint)
        #[serde(default)]
        identity_url: Option<String>,

        /// DNS API base URL, overriding the service catalog
        #[serde(default)]
        endpoint: Option<String>,

        /// HTTP request timeout in seconds
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,

        /// Delay between polls of an asynchronous job, in milliseconds
        #[serde(default = "default_poll_interval_ms")]
        poll_interval_ms: u64,

        /// Number of polls before giving up on an asynchronous job
        #[serde(default = "default_max_poll_attempts")]
        max_poll_attempts: u32,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Cloud DNS configuration with default endpoints and polling
    pub fn cloud_dns(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        ProviderConfig::CloudDns {
            username: username.into(),
            api_key: api_key.into(),
            region: None,
            identity_url: None,
            endpoint: None,
            timeout_secs: default_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::CloudDns {
                username,
                api_key,
                timeout_secs,
                max_poll_attempts,
                ..
            } => {
                if username.is_empty() {
                    return Err(crate::Error::config("Cloud DNS username cannot be empty"));
                }
                if api_key.is_empty() {
                    return Err(crate::Error::config("Cloud DNS API key cannot be empty"));
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("HTTP timeout must be > 0"));
                }
                if *max_poll_attempts == 0 {
                    return Err(crate::Error::config("Job poll attempts must be > 0"));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::CloudDns { .. } => "clouddns",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

// The API key must never reach logs
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::CloudDns {
                username,
                region,
                identity_url,
                endpoint,
                timeout_secs,
                poll_interval_ms,
                max_poll_attempts,
                ..
            } => f
                .debug_struct("CloudDns")
                .field("username", username)
                .field("api_key", &"<REDACTED>")
                .field("region", region)
                .field("identity_url", identity_url)
                .field("endpoint", endpoint)
                .field("timeout_secs", timeout_secs)
                .field("poll_interval_ms", poll_interval_ms)
                .field("max_poll_attempts", max_poll_attempts)
                .finish(),
            ProviderConfig::Custom { factory, .. } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .finish_non_exhaustive(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_max_poll_attempts() -> u32 {
    60
}

/// Reconciler settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Perform lookups but submit no create, update or delete
    #[serde(default)]
    pub dry_run: bool,
}

impl ReconcilerConfig {
    /// Live mode settings
    pub fn live() -> Self {
        Self { dry_run: false }
    }

    /// Dry-run mode settings
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }
}
