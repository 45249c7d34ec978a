//! Configuration loading utilities for the CLI

use anyhow::{Context, Result};
use hupi_lib::{Config, HupiError};
use std::path::Path;

use crate::cli::Cli;

/// Load the config file (if any) without overlaying CLI flags.
///
/// An explicit `--config` path must exist; the default location may be absent.
pub fn load_file_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) if !Path::new(path).exists() => Err(HupiError::config_missing(format!(
            "Config file not found at {path}."
        )))
        .context("Failed to load configuration"),
        path => Config::load_or_default(path.as_ref()).context("Failed to load configuration"),
    }
}

/// Build the effective configuration: config file, then environment and flags.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = load_file_config(cli)?;
    apply_overrides(&mut config, cli);
    config.validate()?;
    Ok(config)
}

/// Effective configuration for offline work: only the credentials must be usable.
pub fn load_credentials(cli: &Cli) -> Result<Config> {
    let mut config = load_file_config(cli)?;
    apply_overrides(&mut config, cli);
    config.validate_credentials()?;
    Ok(config)
}

/// Overlay `--appid`, `--appsecret`, endpoint and timeout flags.
pub fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(app_id) = &cli.appid {
        config.app_id = app_id.clone();
    }
    if let Some(app_secret) = &cli.appsecret {
        config.app_secret = app_secret.clone();
    }
    if let Some(url) = &cli.payment_url {
        config.payment_url = Some(url.clone());
    }
    if let Some(url) = &cli.query_url {
        config.query_url = Some(url.clone());
    }
    if let Some(timeout) = cli.max_time {
        config.timeout = Some(timeout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_flags_override_file_values() {
        let cli = Cli::try_parse_from([
            "hupi",
            "--appid",
            "flag_id",
            "--appsecret",
            "flag_secret",
            "--max-time",
            "7",
            "query",
            "order-1",
        ])
        .unwrap();

        let mut config = Config {
            app_id: "file_id".to_string(),
            app_secret: "file_secret".to_string(),
            timeout: Some(30),
            ..Default::default()
        };
        apply_overrides(&mut config, &cli);

        assert_eq!(config.app_id, "flag_id");
        assert_eq!(config.app_secret, "flag_secret");
        assert_eq!(config.timeout, Some(7));
        assert!(config.payment_url.is_none());
    }

    #[test]
    fn test_credentials_only_load_skips_endpoint_checks() {
        let cli = Cli::try_parse_from([
            "hupi",
            "--config",
            "/definitely/not/here/either.toml",
            "sign",
        ])
        .unwrap();
        assert!(load_credentials(&cli).is_err());

        let cli = Cli::try_parse_from([
            "hupi",
            "--appid",
            "id",
            "--appsecret",
            "secret",
            "--payment-url",
            "not-a-url",
            "sign",
        ])
        .unwrap();
        let mut config = Config::default();
        apply_overrides(&mut config, &cli);
        assert!(config.validate_credentials().is_ok());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let cli = Cli::try_parse_from([
            "hupi",
            "--config",
            "/definitely/not/here/config.toml",
            "config",
            "show",
        ])
        .unwrap();

        let err = load_file_config(&cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HupiError>(),
            Some(HupiError::ConfigMissing(_))
        ));
    }
}
