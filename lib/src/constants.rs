//! Constants used throughout the hupi library

use std::path::PathBuf;

/// Config file name
pub const CONFIG_FILE: &str = "config.toml";

/// Default gateway endpoint for creating a payment
pub const DEFAULT_PAYMENT_URL: &str = "https://api.xunhupay.com/payment/do.html";

/// Default gateway endpoint for querying an order
pub const DEFAULT_QUERY_URL: &str = "https://api.xunhupay.com/payment/query.html";

/// Default HTTP request timeout in seconds (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent sent to the gateway
pub const DEFAULT_USER_AGENT: &str = concat!("hupi/", env!("CARGO_PKG_VERSION"));

// ==================== Wire Field Names ====================

/// Request field carrying the merchant identifier
pub const APPID_FIELD: &str = "appid";

/// Request field carrying the Unix timestamp in seconds
pub const TIME_FIELD: &str = "time";

/// Request field carrying the nonce (the gateway receives the timestamp here too)
pub const NONCE_FIELD: &str = "nonce_str";

/// Request and response field carrying the signature digest
pub const HASH_FIELD: &str = "hash";

/// Query request field naming the merchant-side order
pub const OUT_TRADE_ORDER_FIELD: &str = "out_trade_order";

/// Get the hupi home directory (`~/.hupi/`)
///
/// # Returns
///
/// - `Some(PathBuf)` if the home directory can be determined
/// - `None` if the home directory cannot be determined
pub fn hupi_home_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".hupi"))
}

/// Get the default config file path (`~/.hupi/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    hupi_home_dir().map(|p| p.join(CONFIG_FILE))
}
