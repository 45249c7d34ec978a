//! Configuration management for hupi.
//!
//! Merchant credentials and endpoint overrides live in `~/.hupi/config.toml`:
//!
//! ```toml
//! app_id = "201906120001"
//! app_secret = "0f3a..."
//! # optional
//! payment_url = "https://api.xunhupay.com/payment/do.html"
//! query_url = "https://api.xunhupay.com/payment/query.html"
//! timeout = 30
//! ```

use crate::constants::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_PAYMENT_URL, DEFAULT_QUERY_URL};
use crate::error::{HupiError, Result};
use crate::signer::Credentials;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Merchant identifier issued by the gateway
    #[serde(default)]
    pub app_id: String,
    /// Shared secret used to sign requests
    #[serde(default)]
    pub app_secret: String,
    /// Override for the payment endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    /// Override for the order query endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_url: Option<String>,
    /// HTTP timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Custom User-Agent header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("payment_url", &self.payment_url)
            .field("query_url", &self.query_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Builder for creating Config instances
///
/// # Examples
///
/// ```
/// use hupi_lib::Config;
///
/// let config = Config::builder()
///     .credentials("test_app_id", "test_app_secret")
///     .timeout(10)
///     .build()
///     .unwrap();
/// assert_eq!(config.timeout(), 10);
/// ```
#[derive(Debug, Default)]
#[must_use]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new config builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the merchant identifier and secret
    pub fn credentials(mut self, app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        self.config.app_id = app_id.into();
        self.config.app_secret = app_secret.into();
        self
    }

    /// Override the payment endpoint
    pub fn payment_url(mut self, url: impl Into<String>) -> Self {
        self.config.payment_url = Some(url.into());
        self
    }

    /// Override the order query endpoint
    pub fn query_url(mut self, url: impl Into<String>) -> Self {
        self.config.query_url = Some(url.into());
        self
    }

    /// Set the HTTP timeout in seconds
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.config.timeout = Some(seconds);
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = Some(ua.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Config {
    /// Create a new config builder
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Load config from the specified path or default location (~/.hupi/config.toml)
    pub fn load_from(config_path: Option<impl AsRef<Path>>) -> Result<Self> {
        let config_path = Self::resolve_path(config_path)?;

        if !config_path.exists() {
            return Err(HupiError::ConfigMissing(format!(
                "Config file not found at {}. Run 'hupi config init' to create one.",
                config_path.display()
            )));
        }

        let config = Self::read(&config_path)?;

        config.validate().map_err(|e| {
            HupiError::InvalidConfig(format!(
                "Invalid configuration in {}: {}",
                config_path.display(),
                e
            ))
        })?;

        Ok(config)
    }

    /// Load config from the default location (~/.hupi/config.toml)
    pub fn load() -> Result<Self> {
        Self::load_from(None::<&str>)
    }

    /// Load config, returning default if file doesn't exist.
    ///
    /// Errors for unreadable or malformed files are still propagated. The
    /// result is not validated, so callers can fill in credentials from other
    /// sources first.
    pub fn load_or_default(config_path: Option<impl AsRef<Path>>) -> Result<Self> {
        let config_path = Self::resolve_path(config_path)?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::read(&config_path)
    }

    fn resolve_path(config_path: Option<impl AsRef<Path>>) -> Result<PathBuf> {
        match config_path {
            Some(path) => Ok(PathBuf::from(path.as_ref())),
            None => Self::default_config_path(),
        }
    }

    fn read(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path).map_err(|e| {
            HupiError::InvalidConfig(format!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            HupiError::InvalidConfig(format!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            ))
        })
    }

    /// Get the default config file path (~/.hupi/config.toml)
    pub fn default_config_path() -> Result<PathBuf> {
        crate::constants::default_config_path().ok_or(HupiError::NoConfigDir)
    }

    /// Save config to the default location with validation
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::default_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to `path`, readable by the owner only.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            // Only directories created here are tightened
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                set_owner_only(parent, 0o700)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        write_owner_only(path, content.as_bytes())?;

        Ok(())
    }

    /// Check that the credentials are present and the overrides are usable.
    pub fn validate(&self) -> Result<()> {
        self.validate_credentials()?;

        for (name, url) in [("payment_url", &self.payment_url), ("query_url", &self.query_url)] {
            if let Some(url) = url {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(HupiError::invalid_config(format!(
                        "{name} must be an http(s) URL, got '{url}'"
                    )));
                }
            }
        }

        if self.timeout == Some(0) {
            return Err(HupiError::invalid_config("timeout must be greater than zero"));
        }

        Ok(())
    }

    /// Check only what offline signing needs: a non-empty identifier and secret.
    pub fn validate_credentials(&self) -> Result<()> {
        if self.app_id.trim().is_empty() {
            return Err(HupiError::config_missing(
                "app_id is not set. Pass --appid, set HUPI_APPID, or run 'hupi config init'.",
            ));
        }
        if self.app_secret.trim().is_empty() {
            return Err(HupiError::config_missing(
                "app_secret is not set. Pass --appsecret, set HUPI_APPSECRET, or run 'hupi config init'.",
            ));
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.app_id, &self.app_secret)
    }

    /// Payment endpoint, falling back to the public gateway
    pub fn payment_url(&self) -> &str {
        self.payment_url.as_deref().unwrap_or(DEFAULT_PAYMENT_URL)
    }

    /// Order query endpoint, falling back to the public gateway
    pub fn query_url(&self) -> &str {
        self.query_url.as_deref().unwrap_or(DEFAULT_QUERY_URL)
    }

    /// HTTP timeout in seconds
    pub fn timeout(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
    }
}

#[cfg(unix)]
fn set_owner_only(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Write `content` to a file that is never readable by group or others.
///
/// New files are created with mode 0600; an existing file is tightened
/// before it is truncated and rewritten.
#[cfg(unix)]
fn write_owner_only(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .mode(0o600)
        .open(path)?;
    set_owner_only(path, 0o600)?;
    file.set_len(0)?;
    file.write_all(content)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_owner_only(path: &Path, content: &[u8]) -> Result<()> {
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config_minimal() {
        let toml = r#"
            app_id = "test_app_id"
            app_secret = "test_app_secret"
        "#;

        let config: Config = toml::from_str(toml).expect("should parse");
        assert_eq!(config.app_id, "test_app_id");
        assert_eq!(config.payment_url(), DEFAULT_PAYMENT_URL);
        assert_eq!(config.query_url(), DEFAULT_QUERY_URL);
        assert_eq!(config.timeout(), DEFAULT_HTTP_TIMEOUT_SECS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config_with_overrides() {
        let toml = r#"
            app_id = "id"
            app_secret = "secret"
            payment_url = "http://localhost:8080/do"
            query_url = "http://localhost:8080/query"
            timeout = 5
        "#;

        let config: Config = toml::from_str(toml).expect("should parse");
        assert_eq!(config.payment_url(), "http://localhost:8080/do");
        assert_eq!(config.query_url(), "http://localhost:8080/query");
        assert_eq!(config.timeout(), 5);
    }

    #[test]
    fn test_parse_config_rejects_unknown_fields() {
        let toml = r#"
            app_id = "id"
            appsecret = "typo"
        "#;

        let result: std::result::Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err(), "Should reject unknown field 'appsecret'");
    }

    #[test]
    fn test_validate_rejects_missing_credentials() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(HupiError::ConfigMissing(_))));

        let config = Config {
            app_id: "id".to_string(),
            app_secret: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(HupiError::ConfigMissing(_))));
    }

    #[test]
    fn test_validate_rejects_bad_overrides() {
        let base = Config::builder().credentials("id", "secret");

        assert!(matches!(
            base.payment_url("ftp://example.com").build(),
            Err(HupiError::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::builder().credentials("id", "secret").timeout(0).build(),
            Err(HupiError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_credentials_ignores_endpoints() {
        let config = Config {
            app_id: "id".to_string(),
            app_secret: "secret".to_string(),
            payment_url: Some("not a url".to_string()),
            timeout: Some(0),
            ..Default::default()
        };

        assert!(config.validate_credentials().is_ok());
        assert!(matches!(config.validate(), Err(HupiError::InvalidConfig(_))));
        assert!(matches!(
            Config::default().validate_credentials(),
            Err(HupiError::ConfigMissing(_))
        ));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let config = Config::builder()
            .credentials("id", "secret")
            .query_url("https://example.com/query")
            .build()
            .unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    #[cfg(unix)]
    fn test_save_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hupi").join("config.toml");
        Config::builder()
            .credentials("id", "secret")
            .build()
            .unwrap()
            .save_to(&path)
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        let mode = std::fs::metadata(path.parent().unwrap())
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, 0o700);
    }

    #[test]
    #[cfg(unix)]
    fn test_save_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "old contents that are longer than the new file will be").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let config = Config::builder().credentials("id", "secret").build().unwrap();
        config.save_to(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert_eq!(Config::load_from(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.toml");

        assert!(matches!(
            Config::load_from(Some(&path)),
            Err(HupiError::ConfigMissing(_))
        ));
        assert_eq!(Config::load_or_default(Some(&path)).unwrap(), Config::default());
    }

    #[test]
    fn test_load_or_default_propagates_parse_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "app_id = [not toml").unwrap();

        assert!(matches!(
            Config::load_or_default(Some(&path)),
            Err(HupiError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = Config::builder().credentials("id", "topsecret").build().unwrap();
        assert!(!format!("{config:?}").contains("topsecret"));
    }
}
