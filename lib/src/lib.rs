//! hupi-lib - Client library for the HuPi payment gateway
//!
//! Builds signed form requests, posts them to the gateway and decodes the
//! JSON answers. The signature is an MD5 digest over the byte-wise sorted
//! `key=value` pairs followed by the merchant secret.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod response;
pub mod signer;

pub use client::{HupiClient, ResponseObserver};
pub use config::{Config, ConfigBuilder};
pub use error::{HupiError, Result};
pub use http::{CurlTransport, HttpClient, HttpClientBuilder, HttpResponse, Transport};
pub use response::{OrderData, Response};
pub use signer::{Credentials, Params};
