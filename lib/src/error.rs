//! Error types for the hupi library.

use thiserror::Error;

/// Result type alias for hupi operations.
pub type Result<T> = std::result::Result<T, HupiError>;

#[derive(Error, Debug)]
pub enum HupiError {
    // ==================== Configuration Errors ====================
    #[error("{0}")]
    ConfigMissing(String),

    #[error("{0}")]
    InvalidConfig(String),

    #[error("Could not find config directory. Ensure your home directory is accessible or pass --config.")]
    NoConfigDir,

    #[error("Failed to save config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // ==================== Request/Response Errors ====================
    #[error("Gateway request failed: {0}")]
    Transport(#[from] curl::Error),

    #[error("Could not encode request form: {0}")]
    FormEncode(#[from] serde_urlencoded::ser::Error),

    #[error("Gateway returned an unreadable response: {0}")]
    Decode(#[from] serde_json::Error),

    // ==================== External Library Errors ====================
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("System clock error: {0}")]
    SystemTime(#[from] std::time::SystemTimeError),
}

impl HupiError {
    /// Create a config missing error
    pub fn config_missing(msg: impl Into<String>) -> Self {
        Self::ConfigMissing(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for failures that happened before a response body was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::FormEncode(_))
    }

    /// True when the gateway answered with something that is not valid JSON.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_is_not_transport() {
        let err: HupiError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(err.is_decode());
        assert!(!err.is_transport());
        assert!(err.to_string().starts_with("Gateway returned an unreadable response"));
    }

    #[test]
    fn test_config_helpers() {
        let err = HupiError::config_missing("no app_id");
        assert!(matches!(err, HupiError::ConfigMissing(_)));
        assert_eq!(err.to_string(), "no app_id");

        let err = HupiError::invalid_config("bad url");
        assert!(matches!(err, HupiError::InvalidConfig(_)));
    }
}
