//! HTTP transport implementation using curl.

use crate::constants::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::error::Result;
use crate::signer::Params;
use curl::easy::{Easy2, Handler, WriteError};
use std::collections::BTreeMap;

/// Posts a flat form to the gateway and hands back the raw response body.
///
/// Implementations own headers, timeouts and retries. Status codes are not
/// interpreted: whatever body comes back is returned as-is.
pub trait Transport: Send + Sync {
    fn post_form(&self, url: &str, form: &Params) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn post_form(&self, url: &str, form: &Params) -> Result<Vec<u8>> {
        (**self).post_form(url, form)
    }
}

/// Encode a form as `application/x-www-form-urlencoded`, keys in sorted order.
pub fn encode_form(form: &Params) -> Result<String> {
    let sorted: BTreeMap<&str, &str> = form
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    Ok(serde_urlencoded::to_string(sorted)?)
}

#[derive(Default)]
struct ResponseHandler {
    data: Vec<u8>,
}

impl Handler for ResponseHandler {
    fn write(&mut self, data: &[u8]) -> std::result::Result<usize, WriteError> {
        self.data.extend_from_slice(data);
        Ok(data.len())
    }
}

#[derive(Debug)]
pub struct HttpResponse {
    pub status_code: u32,
    pub body: Vec<u8>,
}

/// Builder for configuring HTTP clients.
#[must_use]
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    timeout: Option<u64>,
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
}

impl HttpClientBuilder {
    /// Create a new HTTP client builder with default settings.
    pub fn new() -> Self {
        Self {
            timeout: None,
            user_agent: None,
            headers: Vec::new(),
        }
    }

    /// Set request timeout in seconds.
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Set custom User-Agent header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Add a custom HTTP header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<HttpClient> {
        let mut client = HttpClient::new()?;

        if let Some(timeout) = self.timeout {
            client.set_timeout(timeout)?;
        }

        if let Some(ref ua) = self.user_agent {
            client.set_user_agent(ua)?;
        }

        if !self.headers.is_empty() {
            client.set_headers(&self.headers)?;
        }

        Ok(client)
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct HttpClient {
    curl: Easy2<ResponseHandler>,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            curl: Easy2::new(ResponseHandler::default()),
        })
    }

    pub fn set_headers(&mut self, headers: &[(String, String)]) -> Result<()> {
        let mut list = curl::easy::List::new();
        for (name, value) in headers {
            list.append(&format!("{name}: {value}"))?;
        }
        self.curl.http_headers(list)?;
        Ok(())
    }

    /// Set timeout
    pub fn set_timeout(&mut self, timeout_secs: u64) -> Result<()> {
        self.curl
            .timeout(std::time::Duration::from_secs(timeout_secs))?;
        Ok(())
    }

    /// Set user agent
    pub fn set_user_agent(&mut self, user_agent: &str) -> Result<()> {
        self.curl.useragent(user_agent)?;
        Ok(())
    }

    /// Perform a POST request with optional body
    pub fn post(&mut self, url: &str, body: Option<&[u8]>) -> Result<HttpResponse> {
        self.curl.url(url)?;
        self.curl.post(true)?;

        if let Some(data) = body {
            self.curl.post_field_size(data.len() as u64)?;
            self.curl.post_fields_copy(data)?;
        }

        self.perform()
    }

    /// Perform the request and return the response
    fn perform(&mut self) -> Result<HttpResponse> {
        self.curl.perform()?;

        let status_code = self.curl.response_code()?;

        let body = std::mem::take(&mut self.curl.get_mut().data);

        Ok(HttpResponse { status_code, body })
    }
}

/// [`Transport`] backed by libcurl.
///
/// A fresh curl handle is built for every call so one transport can be shared
/// between threads.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    builder: HttpClientBuilder,
}

impl CurlTransport {
    /// Transport with the default timeout and User-Agent.
    pub fn new() -> Self {
        Self::with_builder(
            HttpClientBuilder::new()
                .timeout(DEFAULT_HTTP_TIMEOUT_SECS)
                .user_agent(DEFAULT_USER_AGENT),
        )
    }

    pub fn with_builder(builder: HttpClientBuilder) -> Self {
        Self { builder }
    }
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for CurlTransport {
    fn post_form(&self, url: &str, form: &Params) -> Result<Vec<u8>> {
        let body = encode_form(form)?;
        let mut client = self
            .builder
            .clone()
            .header("Content-Type", "application/x-www-form-urlencoded")
            .build()?;

        let response = client.post(url, Some(body.as_bytes()))?;
        tracing::debug!(
            url,
            status = response.status_code,
            bytes = response.body.len(),
            "gateway responded"
        );

        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_encode_form_sorts_keys() {
        let encoded = encode_form(&form(&[("time", "1"), ("appid", "x"), ("hash", "h")])).unwrap();
        assert_eq!(encoded, "appid=x&hash=h&time=1");
    }

    #[test]
    fn test_encode_form_escapes_values() {
        let encoded = encode_form(&form(&[
            ("notify_url", "http://example.com/n?a=1&b=2"),
            ("title", "a b"),
        ]))
        .unwrap();
        assert_eq!(
            encoded,
            "notify_url=http%3A%2F%2Fexample.com%2Fn%3Fa%3D1%26b%3D2&title=a+b"
        );
    }

    #[test]
    fn test_encode_form_utf8() {
        let encoded = encode_form(&form(&[("title", "测试")])).unwrap();
        assert_eq!(encoded, "title=%E6%B5%8B%E8%AF%95");
    }

    #[test]
    fn test_encode_form_empty() {
        assert_eq!(encode_form(&Params::new()).unwrap(), "");
    }

    #[test]
    fn test_curl_transport_unreachable_host_is_transport_error() {
        let transport = CurlTransport::with_builder(HttpClientBuilder::new().timeout(2));
        let err = transport
            .post_form("http://127.0.0.1:1/payment/do.html", &form(&[("a", "1")]))
            .unwrap_err();
        assert!(err.is_transport());
    }
}
