//! Application configuration for guidegen.
//!
//! User config lives at `~/.guidegen/guidegen.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GuideError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "guidegen.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".guidegen";

/// Reference document listing the language and category tags.
pub const DEFAULT_TAXONOMY_SOURCE_URL: &str =
    "https://www.snowflake.com/en/developers/guides/get-started-with-guides/#language-and-category-tags";

// ---------------------------------------------------------------------------
// Config structs (matching guidegen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Metadata defaults and output location.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Category taxonomy source.
    #[serde(default)]
    pub taxonomy: TaxonomyConfig,

    /// Asset size limits and fetch timeout.
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Remote API connection settings.
    #[serde(default)]
    pub api: ApiConfig,
}

/// `[defaults]` section. Blank metadata fields in a guide input fall back to these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory the generated archive is written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default = "default_author")]
    pub author: String,

    #[serde(default = "default_summary")]
    pub summary: String,

    #[serde(default = "default_environments")]
    pub environments: String,

    #[serde(default = "default_feedback_link")]
    pub feedback_link: String,

    #[serde(default = "default_fork_repo_link")]
    pub fork_repo_link: String,

    #[serde(default = "default_open_in_link")]
    pub open_in_link: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            author: default_author(),
            summary: default_summary(),
            environments: default_environments(),
            feedback_link: default_feedback_link(),
            fork_repo_link: default_fork_repo_link(),
            open_in_link: default_open_in_link(),
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}
fn default_author() -> String {
    "First Last".into()
}
fn default_summary() -> String {
    "This is a sample Snowflake Guide".into()
}
fn default_environments() -> String {
    "web".into()
}
fn default_feedback_link() -> String {
    "https://github.com/Snowflake-Labs/sfguides/issues".into()
}
fn default_fork_repo_link() -> String {
    "<repo>".into()
}
fn default_open_in_link() -> String {
    "<deeplink or remove>".into()
}

/// `[taxonomy]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    /// Page scanned for `snowflake-site:taxonomy/...` paths.
    #[serde(default = "default_taxonomy_source_url")]
    pub source_url: String,

    #[serde(default = "default_taxonomy_timeout")]
    pub timeout_secs: u64,

    /// Skip the remote fetch and use the built-in table only.
    #[serde(default)]
    pub offline: bool,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            source_url: default_taxonomy_source_url(),
            timeout_secs: default_taxonomy_timeout(),
            offline: false,
        }
    }
}

fn default_taxonomy_source_url() -> String {
    DEFAULT_TAXONOMY_SOURCE_URL.into()
}
fn default_taxonomy_timeout() -> u64 {
    10
}

/// `[assets]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: default_max_image_bytes(),
            max_file_bytes: default_max_file_bytes(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_max_image_bytes() -> usize {
    1_000_000
}
fn default_max_file_bytes() -> usize {
    10_000_000
}
fn default_fetch_timeout() -> u64 {
    20
}

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// TOML file holding the `[validation]` connection (account + token).
    #[serde(default = "default_connections_file")]
    pub connections_file: String,

    #[serde(default = "default_api_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            connections_file: default_connections_file(),
            timeout_ms: default_api_timeout_ms(),
        }
    }
}

fn default_connections_file() -> String {
    "connections.toml".into()
}
fn default_api_timeout_ms() -> u64 {
    30_000
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.guidegen/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| GuideError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.guidegen/guidegen.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| GuideError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| GuideError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| GuideError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config).map_err(|e| GuideError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| GuideError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("max_image_bytes"));
        assert!(toml_str.contains("connections.toml"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.assets.max_image_bytes, 1_000_000);
        assert_eq!(parsed.assets.max_file_bytes, 10_000_000);
        assert_eq!(parsed.taxonomy.timeout_secs, 10);
        assert_eq!(parsed.api.timeout_ms, 30_000);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
author = "Jane Doe"

[taxonomy]
offline = true
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.author, "Jane Doe");
        assert_eq!(config.defaults.environments, "web");
        assert!(config.taxonomy.offline);
        assert_eq!(config.taxonomy.source_url, DEFAULT_TAXONOMY_SOURCE_URL);
    }

    #[test]
    fn load_config_from_reports_parse_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("guidegen.toml");
        std::fs::write(&path, "[assets]\nmax_image_bytes = \"lots\"\n").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
