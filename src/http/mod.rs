//! HTTP capability used by the DynamoDB request layer, and its reqwest adapter.

mod client;
mod transport;

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::error::Result;

pub use client::HttpClient;
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};

#[cfg(test)]
pub use transport::MockTransport;

/// Header name to header value, passed through unmodified.
pub type Headers = HashMap<String, String>;

/// Decoded body of a successful POST.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// The two requests the DynamoDB client needs from an HTTP stack.
#[async_trait]
pub trait Http: Send + Sync {
    /// Fetches `url` and returns the raw body of a response with status < 400.
    async fn get(&self, url: &Url, headers: Option<&Headers>, timeout: Duration) -> Result<Bytes>;

    /// Posts `body` to `url` and decodes the JSON object of a response with status < 400.
    async fn post(&self, url: &Url, body: Bytes, headers: Option<&Headers>) -> Result<JsonObject>;
}
