//! Adapter from the [`Http`] capability onto a [`Transport`].

use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use reqwest::{Client, Method};
use std::time::Duration;
use url::Url;

use super::transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
use super::{Headers, Http, JsonObject};
use crate::error::{Error, Result, classify_response};

/// HTTP capability over an externally owned, already configured client.
///
/// The adapter never closes or reconfigures the client, and holds no other
/// state, so one instance can serve concurrent calls.
#[derive(Clone)]
pub struct HttpClient<T: Transport = ReqwestTransport> {
    transport: T,
}

impl HttpClient<ReqwestTransport> {
    /// Creates an adapter sharing the given reqwest Client.
    ///
    /// 3xx responses are only returned as-is if the client does not follow
    /// redirects, as clients from [`crate::config::HttpConfig::build_client`] do not.
    pub fn new(client: Client) -> Self {
        Self::with_transport(ReqwestTransport::new(client))
    }
}

impl<T: Transport> HttpClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        headers: Option<&Headers>,
        body: Option<Bytes>,
        timeout: Option<Duration>,
    ) -> Result<TransportResponse> {
        let request = TransportRequest {
            method,
            url: url.clone(),
            headers: headers.cloned().unwrap_or_default(),
            body,
            timeout,
        };

        self.transport.send(request).await.map_err(|e| {
            debug!("Request to {} failed: {:#}", url, e);
            Error::transport(e)
        })
    }
}

#[async_trait]
impl<T: Transport> Http for HttpClient<T> {
    #[tracing::instrument(skip(self, headers))]
    async fn get(&self, url: &Url, headers: Option<&Headers>, timeout: Duration) -> Result<Bytes> {
        debug!("GET {}...", url);

        let response = self
            .send(Method::GET, url, headers, None, Some(timeout))
            .await?;

        if response.status >= 400 {
            debug!("GET {} returned status {}", url, response.status);
            return Err(Error::status(response.status, response.body));
        }

        Ok(response.body)
    }

    #[tracing::instrument(skip(self, body, headers), fields(body_len = body.len()))]
    async fn post(&self, url: &Url, body: Bytes, headers: Option<&Headers>) -> Result<JsonObject> {
        debug!("POST {}...", url);

        let response = self
            .send(Method::POST, url, headers, Some(body), None)
            .await?;

        if response.status >= 400 {
            debug!("POST {} returned status {}", url, response.status);
            return Err(classify_response(response.status, &response.body).into());
        }

        serde_json::from_slice(&response.body).map_err(Error::InvalidResponse)
    }
}
