//! Gateway response envelope.
//!
//! Every endpoint answers with the same JSON shape. Fields the gateway leaves
//! out, or sends as `null`, decode to their zero value; unknown fields are
//! ignored. A nonzero `errcode` is returned as data: deciding what a business
//! error means is up to the caller.

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Decoded response from a gateway call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    #[serde(deserialize_with = "null_as_default")]
    pub openid: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub url_qrcode: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub errcode: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub errmsg: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hash: String,
    #[serde(deserialize_with = "null_as_default")]
    pub data: OrderData,
}

/// Order details nested under `data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderData {
    #[serde(deserialize_with = "null_as_default")]
    pub open_order_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub total_amount: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub plugins: String,
    #[serde(deserialize_with = "null_as_default")]
    pub payment_method: String,
    #[serde(deserialize_with = "null_as_default")]
    pub transaction_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub paid_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pay_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub out_trade_order: String,
}

impl Response {
    /// Decode a raw response body.
    ///
    /// # Errors
    /// Returns [`HupiError::Decode`](crate::HupiError::Decode) if the body is
    /// not valid JSON or a field has the wrong type.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// `errcode == 0`
    pub fn is_success(&self) -> bool {
        self.errcode == 0
    }
}

impl FromStr for Response {
    type Err = crate::error::HupiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_slice(s.as_bytes())
    }
}

impl OrderData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
