//! Environment configuration
//!
//! Everything the binary needs comes from `DNSREC_*` environment variables.
//! [`Config::from_lookup`] takes the lookup function as a parameter so the
//! parsing can be tested without touching the process environment.

use anyhow::{Context, Result};
use dnsrec_core::{DesiredRecord, ProviderConfig, ReconcilerConfig, RecordState, RecordType};
use std::path::PathBuf;

use crate::credentials::{self, ExplicitCredentials};

/// Application configuration
#[derive(Debug)]
pub struct Config {
    pub record: DesiredRecord,
    pub provider_type: String,
    pub provider: ProviderConfig,
    pub reconciler: ReconcilerConfig,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key).with_context(|| format!("{} is required. Set it via: export {}=...", key, key))
        };

        let mut record = DesiredRecord::new(
            required("DNSREC_DOMAIN")?,
            required("DNSREC_NAME")?,
            required("DNSREC_DATA")?,
        );

        if let Some(value) = var("DNSREC_TYPE") {
            record.record_type = value.parse::<RecordType>()?;
        }
        if let Some(value) = var("DNSREC_TTL") {
            record.ttl = value
                .parse()
                .with_context(|| format!("DNSREC_TTL must be a positive integer. Got: {}", value))?;
        }
        if let Some(value) = var("DNSREC_PRIORITY") {
            record.priority = Some(value.parse().with_context(|| {
                format!("DNSREC_PRIORITY must be between 0 and 65535. Got: {}", value)
            })?);
        }
        record.comment = var("DNSREC_COMMENT");
        if let Some(value) = var("DNSREC_STATE") {
            record.state = value.parse::<RecordState>()?;
        }
        if let Some(value) = var("DNSREC_OVERWRITE") {
            record.overwrite = parse_bool("DNSREC_OVERWRITE", &value)?;
        }

        let credentials = credentials::resolve(
            ExplicitCredentials {
                username: var("DNSREC_USERNAME"),
                api_key: var("DNSREC_API_KEY"),
                region: var("DNSREC_REGION"),
            },
            var("DNSREC_CREDENTIALS_FILE").map(PathBuf::from).as_deref(),
        )?;

        let mut provider = ProviderConfig::cloud_dns(credentials.username, credentials.api_key);
        if let ProviderConfig::CloudDns {
            region,
            identity_url,
            endpoint,
            timeout_secs,
            ..
        } = &mut provider
        {
            *region = credentials.region;
            *identity_url = var("DNSREC_IDENTITY_URL");
            *endpoint = var("DNSREC_ENDPOINT");
            if let Some(value) = var("DNSREC_HTTP_TIMEOUT_SECS") {
                *timeout_secs = value.parse().with_context(|| {
                    format!("DNSREC_HTTP_TIMEOUT_SECS must be an integer. Got: {}", value)
                })?;
            }
        }

        let dry_run = match var("DNSREC_MODE").map(|m| m.to_lowercase()).as_deref() {
            None | Some("live") => false,
            Some("dry-run") => true,
            Some(other) => anyhow::bail!(
                "DNSREC_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        };

        Ok(Self {
            record,
            provider_type: var("DNSREC_PROVIDER_TYPE").unwrap_or_else(|| "clouddns".to_string()),
            provider,
            reconciler: ReconcilerConfig { dry_run },
            log_level: var("DNSREC_LOG_LEVEL").unwrap_or_else(|| "warn".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Record-level rules (priority, comment length) are enforced by the
    /// reconciler; this covers what only the binary knows about.
    pub fn validate(&self) -> Result<()> {
        match self.provider_type.as_str() {
            "clouddns" => {}
            _ => anyhow::bail!(
                "DNSREC_PROVIDER_TYPE '{}' is not supported. \
                Supported providers: clouddns",
                self.provider_type
            ),
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DNSREC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        if let ProviderConfig::CloudDns { timeout_secs, .. } = &self.provider
            && !(1..=300).contains(timeout_secs)
        {
            anyhow::bail!(
                "DNSREC_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                timeout_secs
            );
        }

        validate_domain_name(&self.record.domain)?;
        validate_domain_name(&self.record.name)?;

        let name = self.record.name.trim_end_matches('.').to_lowercase();
        let domain = self.record.domain.trim_end_matches('.').to_lowercase();
        if name != domain && !name.ends_with(&format!(".{}", domain)) {
            anyhow::bail!(
                "DNSREC_NAME '{}' is not inside DNSREC_DOMAIN '{}'",
                self.record.name,
                self.record.domain
            );
        }

        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => anyhow::bail!("{} must be true or false. Got: {}", key, value),
    }
}

/// Validate that a string is a plausible DNS name
///
/// Basic RFC 1035 checks, relaxed for underscore labels (`_sip._tcp`), a
/// leading wildcard label and a trailing root dot.
fn validate_domain_name(domain: &str) -> Result<()> {
    let domain = domain.strip_suffix('.').unwrap_or(domain);

    if domain.is_empty() {
        anyhow::bail!("Domain name cannot be empty");
    }

    if domain.len() > 253 {
        anyhow::bail!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        );
    }

    for (index, label) in domain.split('.').enumerate() {
        if label.is_empty() {
            anyhow::bail!("Domain name has empty label: '{}'", domain);
        }

        if label.len() > 63 {
            anyhow::bail!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }

        if index == 0 && label == "*" {
            continue;
        }

        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            anyhow::bail!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric, hyphen and underscore only.",
                label
            );
        }

        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            );
        }
    }

    Ok(())
}
