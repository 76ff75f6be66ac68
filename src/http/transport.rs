//! The narrow seam between the adapter and the underlying HTTP client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use reqwest::{
    Client, Method,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use std::time::Duration;
use url::Url;

use super::Headers;

/// A request as handed to a [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    /// Names are case-insensitive on the wire. Names differing only in case
    /// collapse into a single header, and which value is sent is unspecified.
    pub headers: Headers,
    pub body: Option<Bytes>,
    /// Per-request timeout. `None` keeps the client's default.
    pub timeout: Option<Duration>,
}

/// A fully read response.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Sends one request and reads the whole response body.
///
/// Any error means no usable response was received. Error statuses are
/// returned as ordinary responses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a shared reqwest [`Client`].
///
/// Bodies are always submitted as raw content via [`reqwest::RequestBuilder::body`].
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Wraps a client handle. The connection pool stays shared with the caller.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut headers = HeaderMap::with_capacity(request.headers.len());
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("Invalid header name: {}", name))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header {}", name))?;
            headers.insert(name, value);
        }

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.context("Failed to send request")?;
        let status = response.status().as_u16();

        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?;

        debug!("Received status {} with {} bytes", status, body.len());

        Ok(TransportResponse { status, body })
    }
}
