//! Exit codes for the hupi CLI.
//!
//! Following standard Unix conventions and providing specific codes
//! for different error categories to aid scripting and automation.

use crate::output::GatewayRejected;

/// Exit codes for the hupi CLI.
///
/// - 0: Success
/// - 1: General error
/// - 2: Misuse of shell command (e.g., invalid arguments)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful execution
    Success = 0,

    /// General/unknown error
    GeneralError = 1,

    /// Invalid usage (bad arguments, invalid flags)
    InvalidUsage = 2,

    /// Configuration error (missing credentials, invalid config)
    ConfigError = 3,

    /// Network/connection error
    NetworkError = 4,

    /// The gateway answered with a nonzero errcode
    GatewayRejected = 5,

    /// The gateway answered with something that is not the expected JSON
    DecodeError = 6,

    /// Operation timed out
    Timeout = 7,
}

impl ExitCode {
    /// Convert to process exit code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Exit the process with this code
    pub fn exit(self) -> ! {
        std::process::exit(self.code())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

impl From<&anyhow::Error> for ExitCode {
    fn from(err: &anyhow::Error) -> Self {
        if let Some(hupi_err) = err.downcast_ref::<hupi_lib::HupiError>() {
            return ExitCode::from(hupi_err);
        }

        if err.downcast_ref::<GatewayRejected>().is_some() {
            return ExitCode::GatewayRejected;
        }

        if err.downcast_ref::<InvalidUsage>().is_some() {
            return ExitCode::InvalidUsage;
        }

        ExitCode::GeneralError
    }
}

impl From<&hupi_lib::HupiError> for ExitCode {
    fn from(err: &hupi_lib::HupiError) -> Self {
        use hupi_lib::HupiError;

        match err {
            HupiError::ConfigMissing(_)
            | HupiError::InvalidConfig(_)
            | HupiError::NoConfigDir
            | HupiError::TomlSerialize(_) => ExitCode::ConfigError,

            HupiError::Transport(e) if e.is_operation_timedout() => ExitCode::Timeout,
            HupiError::Transport(_) | HupiError::FormEncode(_) => ExitCode::NetworkError,

            HupiError::Decode(_) => ExitCode::DecodeError,

            HupiError::Io(_) | HupiError::SystemTime(_) => ExitCode::GeneralError,
        }
    }
}

/// Marker for errors caused by bad command-line input.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct InvalidUsage(pub String);
