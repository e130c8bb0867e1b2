//! Configuration file support for action-deps.
//!
//! Provides YAML-based configuration through `action-deps.config.yml` files,
//! including data structures, file loading, and validation.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::application::dto::{OutputFormat, RepositoryIdentity};
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "action-deps.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// `owner/repo` of the repository holding the manifests
    pub repository: Option<String>,
    pub default_branch: Option<String>,
    pub format: Option<String>,
    pub fail_on_outdated: Option<bool>,
    pub max_concurrent_lookups: Option<usize>,
    pub cache: Option<CacheSection>,
    pub github: Option<GitHubSection>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// `cache:` section
#[derive(Debug, Deserialize, Default)]
pub struct CacheSection {
    pub enabled: Option<bool>,
    pub dir: Option<PathBuf>,
    pub ttl_hours: Option<u64>,
    pub sweep_interval_secs: Option<u64>,
}

/// `github:` section
#[derive(Debug, Deserialize, Default)]
pub struct GitHubSection {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Name of the environment variable holding the API token
    pub token_env: Option<String>,
}

impl ConfigFile {
    /// The parsed `repository` value, if set
    pub fn repository_identity(&self) -> Result<Option<RepositoryIdentity>> {
        self.repository
            .as_deref()
            .map(RepositoryIdentity::parse)
            .transpose()
    }

    pub fn output_format(&self) -> Result<Option<OutputFormat>> {
        self.format
            .as_deref()
            .map(|format| format.parse::<OutputFormat>().map_err(anyhow::Error::msg))
            .transpose()
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache
            .as_ref()
            .and_then(|cache| cache.enabled)
            .unwrap_or(true)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache
            .as_ref()
            .and_then(|cache| cache.ttl_hours)
            .map(|hours| Duration::from_secs(hours * 60 * 60))
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        self.cache
            .as_ref()
            .and_then(|cache| cache.sweep_interval_secs)
            .map(Duration::from_secs)
    }

    pub fn remote_timeout(&self) -> Option<Duration> {
        self.github
            .as_ref()
            .and_then(|github| github.timeout_secs)
            .map(Duration::from_secs)
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config, path);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    config.repository_identity()?;
    config.output_format()?;

    if let Some(branch) = &config.default_branch {
        if branch.trim().is_empty() {
            bail!(
                "Invalid config: default_branch must not be empty.\n\n\
                 💡 Hint: Remove the field to use \"main\", or name the branch shell links should point at."
            );
        }
    }

    if config.max_concurrent_lookups == Some(0) {
        bail!(
            "Invalid config: max_concurrent_lookups must be at least 1.\n\n\
             💡 Hint: Remove the field to use the default of 8."
        );
    }

    if let Some(cache) = &config.cache {
        if cache.ttl_hours == Some(0) {
            bail!(
                "Invalid config: cache.ttl_hours must be at least 1.\n\n\
                 💡 Hint: Set cache.enabled: false to turn caching off."
            );
        }
    }

    if let Some(github) = &config.github {
        if github.timeout_secs == Some(0) {
            bail!(
                "Invalid config: github.timeout_secs must be at least 1.\n\n\
                 💡 Hint: Remove the field to use the default of 10 seconds."
            );
        }
        if let Some(api_url) = &github.api_url {
            if !api_url.starts_with("https://") && !api_url.starts_with("http://") {
                bail!(
                    "Invalid config: github.api_url must be an http(s) URL, got '{}'.\n\n\
                     💡 Hint: GitHub Enterprise Server uses https://<host>/api/v3",
                    api_url
                );
            }
        }
        if github.token_env.as_deref().is_some_and(|name| name.trim().is_empty()) {
            bail!(
                "Invalid config: github.token_env must not be empty.\n\n\
                 💡 Hint: Remove the field to read the token from GITHUB_TOKEN."
            );
        }
    }

    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile, path: &Path) {
    for key in config.unknown_fields.keys() {
        warn!(
            field = %key,
            path = %path.display(),
            "Unknown config field will be ignored"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, content).unwrap();
        config_path
    }

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(
            &dir,
            r#"
repository: octo-org/shared-actions
default_branch: trunk
format: json
fail_on_outdated: true
max_concurrent_lookups: 4
cache:
  enabled: true
  dir: /var/cache/action-deps
  ttl_hours: 12
  sweep_interval_secs: 60
github:
  api_url: https://ghe.example.com/api/v3
  timeout_secs: 5
  token_env: GHE_TOKEN
"#,
        );

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(
            config.repository_identity().unwrap(),
            Some(RepositoryIdentity::new("octo-org", "shared-actions"))
        );
        assert_eq!(config.default_branch.as_deref(), Some("trunk"));
        assert_eq!(config.output_format().unwrap(), Some(OutputFormat::Json));
        assert_eq!(config.fail_on_outdated, Some(true));
        assert_eq!(config.max_concurrent_lookups, Some(4));
        assert!(config.cache_enabled());
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(12 * 3600)));
        assert_eq!(config.sweep_interval(), Some(Duration::from_secs(60)));
        assert_eq!(
            config.cache.as_ref().unwrap().dir.as_deref(),
            Some(Path::new("/var/cache/action-deps"))
        );
        assert_eq!(config.remote_timeout(), Some(Duration::from_secs(5)));
        let github = config.github.unwrap();
        assert_eq!(github.api_url.as_deref(), Some("https://ghe.example.com/api/v3"));
        assert_eq!(github.token_env.as_deref(), Some("GHE_TOKEN"));
    }

    #[test]
    fn test_discover_config_found() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "repository: actions/checkout\ncache:\n  enabled: false\n",
        )
        .unwrap();

        let config = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.repository.as_deref(), Some("actions/checkout"));
        assert!(!config.cache_enabled());
    }

    #[test]
    fn test_discover_config_not_found() {
        let dir = TempDir::new().unwrap();
        let config = discover_config(dir.path()).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config_from_path(Path::new("/nonexistent/config.yml"));
        let err = format!("{}", result.unwrap_err());
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "invalid: yaml: [[[broken");

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_invalid_repository_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "repository: not-a-repo\n");

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("Invalid repository 'not-a-repo'"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let cases = [
            ("format: xml\n", "Invalid format"),
            ("default_branch: \"  \"\n", "default_branch"),
            ("max_concurrent_lookups: 0\n", "max_concurrent_lookups"),
            ("cache:\n  ttl_hours: 0\n", "cache.ttl_hours"),
            ("github:\n  timeout_secs: 0\n", "github.timeout_secs"),
            ("github:\n  api_url: ftp://example.com\n", "github.api_url"),
            ("github:\n  token_env: \"\"\n", "github.token_env"),
        ];

        for (content, expected) in cases {
            let config_path = write_config(&dir, content);
            let err = format!("{:#}", load_config_from_path(&config_path).unwrap_err());
            assert!(err.contains(expected), "{:?} gave {}", content, err);
        }
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(
            &dir,
            r#"
format: json
unknown_field: true
another_unknown: value
"#,
        );

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.unknown_fields.len(), 2);
        assert!(config.unknown_fields.contains_key("unknown_field"));
        assert!(config.unknown_fields.contains_key("another_unknown"));
    }

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();
        assert!(config.repository_identity().unwrap().is_none());
        assert!(config.output_format().unwrap().is_none());
        assert!(config.cache_enabled());
        assert!(config.cache_ttl().is_none());
        assert!(config.remote_timeout().is_none());
        assert!(config.unknown_fields.is_empty());
    }
}
