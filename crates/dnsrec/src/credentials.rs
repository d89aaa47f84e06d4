//! Credential resolution
//!
//! Credentials come from `DNSREC_USERNAME` / `DNSREC_API_KEY` /
//! `DNSREC_REGION`, from a TOML credentials file, or from both. A value set
//! in the environment always wins over the file.
//!
//! ```toml
//! [clouddns]
//! username = "alice"
//! api_key = "0123456789abcdef"
//! region = "DFW"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    clouddns: FileCredentials,
}

#[derive(Debug, Default, Deserialize)]
struct FileCredentials {
    username: Option<String>,
    api_key: Option<String>,
    region: Option<String>,
}

/// Resolved provider credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub api_key: String,
    pub region: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &"<REDACTED>")
            .field("region", &self.region)
            .finish()
    }
}

/// Values supplied directly, before falling back to the file
#[derive(Debug, Default)]
pub struct ExplicitCredentials {
    pub username: Option<String>,
    pub api_key: Option<String>,
    pub region: Option<String>,
}

fn load_file(path: &Path) -> Result<FileCredentials> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials file {}", path.display()))?;
    let file: CredentialsFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse credentials file {}", path.display()))?;
    Ok(file.clouddns)
}

/// Merge explicit values with the optional credentials file
pub fn resolve(explicit: ExplicitCredentials, file: Option<&Path>) -> Result<Credentials> {
    let from_file = match file {
        Some(path) => load_file(path)?,
        None => FileCredentials::default(),
    };

    let username = explicit.username.or(from_file.username).filter(|s| !s.is_empty());
    let api_key = explicit.api_key.or(from_file.api_key).filter(|s| !s.is_empty());

    let (Some(username), Some(api_key)) = (username, api_key) else {
        anyhow::bail!(
            "No credentials found. Set DNSREC_USERNAME and DNSREC_API_KEY, \
            or point DNSREC_CREDENTIALS_FILE at a file with a [clouddns] section"
        );
    };

    Ok(Credentials {
        username,
        api_key,
        region: explicit.region.or(from_file.region),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn credentials_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_explicit_only() {
        let creds = resolve(
            ExplicitCredentials {
                username: Some("alice".to_string()),
                api_key: Some("key".to_string()),
                region: None,
            },
            None,
        )
        .unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.region, None);
    }

    #[test]
    fn test_file_only() {
        let file = credentials_file(
            "[clouddns]\nusername = \"bob\"\napi_key = \"file-key\"\nregion = \"DFW\"\n",
        );
        let creds = resolve(ExplicitCredentials::default(), Some(file.path())).unwrap();
        assert_eq!(creds.username, "bob");
        assert_eq!(creds.api_key, "file-key");
        assert_eq!(creds.region.as_deref(), Some("DFW"));
    }

    #[test]
    fn test_explicit_values_win_over_file() {
        let file = credentials_file("[clouddns]\nusername = \"bob\"\napi_key = \"file-key\"\n");
        let creds = resolve(
            ExplicitCredentials {
                username: None,
                api_key: Some("env-key".to_string()),
                region: Some("ORD".to_string()),
            },
            Some(file.path()),
        )
        .unwrap();
        assert_eq!(creds.username, "bob");
        assert_eq!(creds.api_key, "env-key");
        assert_eq!(creds.region.as_deref(), Some("ORD"));
    }

    #[test]
    fn test_missing_credentials() {
        assert!(resolve(ExplicitCredentials::default(), None).is_err());

        let file = credentials_file("[clouddns]\nusername = \"bob\"\n");
        assert!(resolve(ExplicitCredentials::default(), Some(file.path())).is_err());
    }

    #[test]
    fn test_unreadable_file() {
        let err = resolve(
            ExplicitCredentials::default(),
            Some(Path::new("/nonexistent/dnsrec/credentials.toml")),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read credentials file"));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let creds = Credentials {
            username: "alice".to_string(),
            api_key: "very-secret".to_string(),
            region: None,
        };
        assert!(!format!("{:?}", creds).contains("very-secret"));
    }
}
