//! `connections.toml` loading.

use std::path::Path;

use guidegen_shared::{GuideError, Result};
use serde::Deserialize;
use tracing::{debug, warn};

/// Account and token from the `[validation]` connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub account: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ConnectionsFile {
    validation: Option<ValidationSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ValidationSection {
    accountname: Option<String>,
    accesstoken: Option<String>,
}

impl ConnectionConfig {
    pub fn new(account: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
            access_token: Some(access_token.into()),
        }
    }

    /// Read the `[validation]` table of a connections file.
    ///
    /// A missing table or missing keys are not errors; they leave the
    /// corresponding fields unset.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GuideError::io(path, e))?;
        let file: ConnectionsFile = toml::from_str(&content)
            .map_err(|e| GuideError::parse(format!("{}: {e}", path.display())))?;

        let Some(validation) = file.validation else {
            warn!(path = %path.display(), "no [validation] connection in connections file");
            return Ok(Self::default());
        };

        let config = Self {
            account: non_blank(validation.accountname),
            access_token: non_blank(validation.accesstoken),
        };

        if config.account.is_none() {
            warn!("connections file has no accountname");
        }
        if config.access_token.is_none() {
            warn!("connections file has no accesstoken; requests will be rejected");
        }
        debug!(account = ?config.account, "connection loaded");
        Ok(config)
    }

    /// `https://<account>.snowflakecomputing.com`, when an account is set.
    pub fn base_url(&self) -> Option<String> {
        self.account
            .as_deref()
            .map(|account| format!("https://{account}.snowflakecomputing.com"))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn file_with(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_validation_table() {
        let file = file_with(
            "[validation]\naccountname = \"myorg-acct\"\naccesstoken = \"tok\"\n\n[other]\nx = 1\n",
        );
        let config = ConnectionConfig::load(file.path()).unwrap();

        assert_eq!(config, ConnectionConfig::new("myorg-acct", "tok"));
        assert_eq!(
            config.base_url().as_deref(),
            Some("https://myorg-acct.snowflakecomputing.com")
        );
    }

    #[test]
    fn missing_table_is_empty_config() {
        let file = file_with("[default]\naccountname = \"x\"\n");
        let config = ConnectionConfig::load(file.path()).unwrap();
        assert_eq!(config, ConnectionConfig::default());
        assert!(config.base_url().is_none());
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let file = file_with("[validation]\naccountname = \"a\"\naccesstoken = \"  \"\n");
        let config = ConnectionConfig::load(file.path()).unwrap();
        assert_eq!(config.account.as_deref(), Some("a"));
        assert!(config.access_token.is_none());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConnectionConfig::load(&dir.path().join("connections.toml")).unwrap_err();
        assert!(matches!(err, GuideError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let file = file_with("[validation\n");
        let err = ConnectionConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, GuideError::Parse { .. }));
    }
}
