//! Common test utilities for hupi CLI tests

#![allow(dead_code)]

use std::fs;
use std::process::Command;
use tempfile::TempDir;

pub const TEST_APP_ID: &str = "test_app_id";
pub const TEST_APP_SECRET: &str = "test_app_secret";

/// Digest of the reference order parameters signed with the test credentials
pub const VECTOR_HASH: &str = "ac50bf2c0477ad966ee22880755f371d";

/// Same parameters assembled at [`VECTOR_TIMESTAMP`]
pub const VECTOR_TIMESTAMP: &str = "1700000000";
pub const VECTOR_ASSEMBLED_HASH: &str = "2838e27144d9806005928db7d7558f54";

/// Reference order parameters as KEY=VALUE arguments
pub const VECTOR_PARAMS: [&str; 4] = [
    "version=1.1",
    "trade_order_id=123456789",
    "total_fee=0.1",
    "title=测试标题",
];

/// Set up a home directory with `~/.hupi/config.toml` holding the test credentials
pub fn setup_test_config() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let hupi_dir = temp_dir.path().join(".hupi");
    fs::create_dir_all(&hupi_dir).expect("Failed to create hupi directory");

    let config = format!("app_id = \"{TEST_APP_ID}\"\napp_secret = \"{TEST_APP_SECRET}\"\n");
    fs::write(hupi_dir.join("config.toml"), config).expect("Failed to write config");

    temp_dir
}

/// Set up an empty home directory
pub fn setup_empty_home() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Create a test command isolated from the caller's environment
///
/// HOME points at the temp directory so hupi uses `$HOME/.hupi/`.
pub fn test_command(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hupi"));

    cmd.env("HOME", temp_dir.path());
    for var in [
        "HUPI_APPID",
        "HUPI_APPSECRET",
        "HUPI_PAYMENT_URL",
        "HUPI_QUERY_URL",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }

    cmd
}
