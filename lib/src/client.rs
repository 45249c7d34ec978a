//! Library API - high-level client for the payment gateway
//!
//! A call is one round trip: inject `appid`, `time` and `nonce_str`, sign,
//! attach `hash`, post the form, decode the JSON answer.

use crate::config::Config;
use crate::constants::{
    DEFAULT_PAYMENT_URL, DEFAULT_QUERY_URL, DEFAULT_USER_AGENT, HASH_FIELD, NONCE_FIELD,
    OUT_TRADE_ORDER_FIELD, TIME_FIELD,
};
use crate::error::Result;
use crate::http::{CurlTransport, HttpClientBuilder, Transport};
use crate::response::Response;
use crate::signer::{Credentials, Params};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Receives the raw body of every gateway response before it is decoded.
///
/// Any `Fn(&str, &[u8]) + Send + Sync` closure is an observer:
///
/// ```
/// use hupi_lib::HupiClient;
///
/// let client = HupiClient::new("app_id", "app_secret").with_observer(|url: &str, body: &[u8]| {
///     eprintln!("{url}: {}", String::from_utf8_lossy(body));
/// });
/// # let _ = client;
/// ```
pub trait ResponseObserver: Send + Sync {
    fn on_response(&self, url: &str, body: &[u8]);
}

impl<F> ResponseObserver for F
where
    F: Fn(&str, &[u8]) + Send + Sync,
{
    fn on_response(&self, url: &str, body: &[u8]) {
        self(url, body)
    }
}

/// Client for the payment gateway.
///
/// Holds the merchant credentials and endpoints; nothing in it changes after
/// construction, so one client can serve concurrent calls as long as each
/// call brings its own [`Params`].
///
/// # Example
/// ```no_run
/// # use hupi_lib::{HupiClient, Params};
/// # fn example() -> hupi_lib::Result<()> {
/// let client = HupiClient::new("201906120001", "app_secret");
///
/// let mut params = Params::new();
/// params.insert("version".into(), "1.1".into());
/// params.insert("trade_order_id".into(), "order-42".into());
/// params.insert("total_fee".into(), "0.10".into());
/// params.insert("title".into(), "Coffee".into());
///
/// let response = client.pay(params)?;
/// println!("pay at {}", response.url);
/// # Ok(())
/// # }
/// ```
pub struct HupiClient {
    credentials: Credentials,
    payment_url: String,
    query_url: String,
    transport: Box<dyn Transport>,
    observer: Option<Box<dyn ResponseObserver>>,
}

impl HupiClient {
    /// Create a client for the public gateway with the default curl transport.
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self::with_credentials(Credentials::new(app_id, app_secret))
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials,
            payment_url: DEFAULT_PAYMENT_URL.to_string(),
            query_url: DEFAULT_QUERY_URL.to_string(),
            transport: Box::new(CurlTransport::new()),
            observer: None,
        }
    }

    /// Create a client from a loaded configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration does not validate.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let builder = HttpClientBuilder::new()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT));

        Ok(Self::with_credentials(config.credentials())
            .payment_url(config.payment_url())
            .query_url(config.query_url())
            .with_transport(CurlTransport::with_builder(builder)))
    }

    /// Override the payment endpoint.
    #[must_use]
    pub fn payment_url(mut self, url: impl Into<String>) -> Self {
        self.payment_url = url.into();
        self
    }

    /// Override the order query endpoint.
    #[must_use]
    pub fn query_url(mut self, url: impl Into<String>) -> Self {
        self.query_url = url.into();
        self
    }

    /// Replace the transport used to reach the gateway.
    #[must_use]
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Box::new(transport);
        self
    }

    /// Install a hook that sees every raw response body.
    #[must_use]
    pub fn with_observer(mut self, observer: impl ResponseObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Sign `params`; see [`Credentials::sign`] for the side effect on `appid`.
    pub fn sign(&self, params: &mut Params) -> String {
        self.credentials.sign(params)
    }

    /// Verify a digest the gateway sent, e.g. on a payment notification.
    pub fn verify(&self, params: &Params, expected_hash: &str) -> bool {
        self.credentials.verify(params, expected_hash)
    }

    /// Fill in the authentication fields and return the digest.
    ///
    /// `time` and `nonce_str` both receive `timestamp`: the gateway has
    /// always been sent the timestamp as nonce, so the nonce only changes
    /// once per second. `appid` is overwritten and `hash` is set last.
    pub fn assemble(&self, params: &mut Params, timestamp: u64) -> String {
        let timestamp = timestamp.to_string();
        params.insert(TIME_FIELD.to_string(), timestamp.clone());
        params.insert(NONCE_FIELD.to_string(), timestamp);

        let hash = self.sign(params);
        params.insert(HASH_FIELD.to_string(), hash.clone());
        hash
    }

    /// Sign `params` and post them to `url`.
    ///
    /// A nonzero `errcode` in the answer is returned as data; only transport
    /// failures and undecodable bodies are errors.
    pub fn execute(&self, url: &str, mut params: Params) -> Result<Response> {
        let timestamp = unix_timestamp()?;
        self.assemble(&mut params, timestamp);
        tracing::debug!(url, fields = params.len(), timestamp, "posting signed form");

        let body = self.transport.post_form(url, &params)?;
        tracing::trace!(url, body = %String::from_utf8_lossy(&body), "raw gateway response");

        if let Some(observer) = &self.observer {
            observer.on_response(url, &body);
        }

        let response = Response::from_slice(&body)?;
        if !response.is_success() {
            tracing::debug!(
                errcode = response.errcode,
                errmsg = %response.errmsg,
                "gateway reported an error"
            );
        }
        Ok(response)
    }

    /// Create a payment on the payment endpoint.
    pub fn pay(&self, params: Params) -> Result<Response> {
        self.execute(&self.payment_url, params)
    }

    /// Look up an order by the merchant-side order number.
    pub fn query(&self, out_trade_order: &str) -> Result<Response> {
        let mut params = Params::new();
        params.insert(
            OUT_TRADE_ORDER_FIELD.to_string(),
            out_trade_order.to_string(),
        );
        self.execute(&self.query_url, params)
    }
}

impl fmt::Debug for HupiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HupiClient")
            .field("credentials", &self.credentials)
            .field("payment_url", &self.payment_url)
            .field("query_url", &self.query_url)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

/// Current Unix time in whole seconds.
pub fn unix_timestamp() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector_params() -> Params {
        [
            ("version", "1.1"),
            ("trade_order_id", "123456789"),
            ("total_fee", "0.1"),
            ("title", "测试标题"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_assemble_injects_fields() {
        let client = HupiClient::new("test_app_id", "test_app_secret");
        let mut params = vector_params();

        let hash = client.assemble(&mut params, 1_700_000_000);

        assert_eq!(params["appid"], "test_app_id");
        assert_eq!(params["time"], "1700000000");
        assert_eq!(params["nonce_str"], "1700000000");
        assert_eq!(params["hash"], hash);
        assert_eq!(hash, "2838e27144d9806005928db7d7558f54");
    }

    #[test]
    fn test_assembled_params_verify() {
        let client = HupiClient::new("test_app_id", "test_app_secret");
        let mut params = vector_params();
        let hash = client.assemble(&mut params, 1_700_000_000);

        assert!(client.verify(&params, &hash));

        params.insert("total_fee".to_string(), "100".to_string());
        assert!(!client.verify(&params, &hash));
    }

    #[test]
    fn test_unix_timestamp_is_recent() {
        // 2023-11-14, well before any machine running these tests
        assert!(unix_timestamp().unwrap() > 1_700_000_000);
    }

    #[test]
    fn test_debug_hides_secret() {
        let client = HupiClient::new("id", "very_secret_value");
        let debug = format!("{client:?}");
        assert!(debug.contains("HupiClient"));
        assert!(!debug.contains("very_secret_value"));
    }

    #[test]
    fn test_client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HupiClient>();
    }
}
