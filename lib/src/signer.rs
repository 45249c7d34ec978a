//! Request signing for the gateway.
//!
//! The gateway authenticates a request by an MD5 digest over the canonical
//! string of all form fields followed directly by the merchant secret:
//!
//! ```text
//! md5("appid=...&k1=v1&k2=v2" + app_secret)
//! ```
//!
//! Keys are sorted byte-wise and values are used raw (not URL-encoded).

use crate::constants::{APPID_FIELD, HASH_FIELD};
use md5::{Digest, Md5};
use std::collections::HashMap;
use std::fmt;

/// Flat request parameters as sent in the form body.
pub type Params = HashMap<String, String>;

/// Merchant credentials issued by the gateway.
///
/// Both values are fixed for the lifetime of a client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    app_id: String,
    app_secret: String,
}

impl Credentials {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn app_secret(&self) -> &str {
        &self.app_secret
    }

    /// Sign a parameter set and return the 32-character lowercase hex digest.
    ///
    /// `appid` is overwritten in `params` with the configured identifier
    /// before the digest is taken. The caller sees that mutation, which is
    /// what lets the same map be posted afterwards. A `hash` entry that is
    /// already present is signed like any other field, so call this on the
    /// set before the digest is attached.
    pub fn sign(&self, params: &mut Params) -> String {
        params.insert(APPID_FIELD.to_string(), self.app_id.clone());
        digest(params, &self.app_secret)
    }

    /// Check a digest received from the gateway, e.g. on a payment notification.
    ///
    /// The `hash` field itself is excluded and `appid` is forced to the
    /// configured identifier on a copy; `params` is left untouched.
    pub fn verify(&self, params: &Params, expected_hash: &str) -> bool {
        if expected_hash.is_empty() {
            return false;
        }

        let mut unsigned: Params = params
            .iter()
            .filter(|(key, _)| key.as_str() != HASH_FIELD)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        self.sign(&mut unsigned).eq_ignore_ascii_case(expected_hash)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}

/// Build the canonical `key=value&...` string over byte-wise sorted keys.
///
/// Every leading and trailing `&` is trimmed, not only the final separator.
pub fn canonical_string(params: &Params) -> String {
    let mut keys: Vec<&String> = params.keys().collect();
    keys.sort_unstable();

    let mut data = String::new();
    for key in keys {
        data.push_str(key);
        data.push('=');
        data.push_str(&params[key]);
        data.push('&');
    }

    data.trim_matches('&').to_string()
}

/// MD5 of the canonical string with the secret appended, as lowercase hex.
///
/// Unlike [`Credentials::sign`] this does not touch `appid`.
pub fn digest(params: &Params, secret: &str) -> String {
    let mut data = canonical_string(params);
    data.push_str(secret);

    hex::encode(Md5::digest(data.as_bytes()))
}
