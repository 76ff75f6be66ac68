//! Construction of the shared reqwest client handed to the adapter.

use anyhow::{Context, Result};
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
    redirect::Policy,
};
use std::time::Duration;

use crate::http::Headers;

const SENSITIVE_HEADERS: &[&str] = &["x-amz-security-token"];

/// Settings for the underlying client.
///
/// The adapter itself takes no configuration: everything here is baked into
/// the [`Client`] once, and POST requests inherit `timeout` from it.
#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct HttpConfig {
    /// User-Agent sent with every request
    #[arg(
        long = "user-agent",
        env = "DYNAMO_HTTP_USER_AGENT",
        value_name = "AGENT",
        default_value = concat!("dynamo-http/", env!("DYNAMO_HTTP_VERSION")),
        global = true
    )]
    pub user_agent: String,

    /// Default request timeout in milliseconds
    #[arg(
        long = "client-timeout-ms",
        env = "DYNAMO_HTTP_TIMEOUT_MS",
        value_name = "MS",
        value_parser = parse_millis,
        global = true
    )]
    pub timeout: Option<Duration>,

    /// Connect timeout in milliseconds
    #[arg(
        long = "connect-timeout-ms",
        env = "DYNAMO_HTTP_CONNECT_TIMEOUT_MS",
        value_name = "MS",
        value_parser = parse_millis,
        global = true
    )]
    pub connect_timeout: Option<Duration>,

    /// Headers added to every request
    #[arg(skip)]
    pub headers: Headers,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("dynamo-http/", env!("DYNAMO_HTTP_VERSION")).to_string(),
            timeout: None,
            connect_timeout: None,
            headers: Headers::new(),
        }
    }
}

impl HttpConfig {
    /// Builds a client from these settings.
    pub fn build_client(&self) -> Result<Client> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("Invalid header name: {}", name))?;
            let mut value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header {}", name))?;
            if name == AUTHORIZATION || SENSITIVE_HEADERS.contains(&name.as_str()) {
                value.set_sensitive(true);
            }
            headers.insert(name, value);
        }

        debug!(
            "Building HTTP client (timeout: {:?}, connect timeout: {:?}, {} default headers)",
            self.timeout,
            self.connect_timeout,
            headers.len()
        );

        // 3xx responses go back to the caller as they are.
        let mut builder = Client::builder()
            .user_agent(&self.user_agent)
            .default_headers(headers)
            .redirect(Policy::none());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        builder.build().context("Failed to build HTTP client")
    }
}

/// Parses a millisecond count into a [`Duration`].
pub fn parse_millis(s: &str) -> Result<Duration, std::num::ParseIntError> {
    s.parse().map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn test_parse_millis() {
        assert_eq!(parse_millis("1500").unwrap(), Duration::from_millis(1500));
        assert!(parse_millis("1.5s").is_err());
        assert!(parse_millis("-1").is_err());
    }

    #[test]
    fn test_default_user_agent() {
        let config = HttpConfig::default();
        assert!(config.user_agent.starts_with("dynamo-http/"));
        assert!(config.timeout.is_none());
        assert!(config.headers.is_empty());
    }

    #[test]
    fn test_build_client_rejects_invalid_header() {
        let mut config = HttpConfig::default();
        config
            .headers
            .insert("bad header".to_string(), "value".to_string());

        assert!(config.build_client().is_err());
    }

    #[tokio::test]
    async fn test_build_client_sends_default_headers() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/")
            .match_header("user-agent", "test-agent")
            .match_header("x-amz-security-token", "session")
            .match_header("authorization", Matcher::Missing)
            .create_async()
            .await;

        let mut config = HttpConfig {
            user_agent: "test-agent".to_string(),
            ..HttpConfig::default()
        };
        config
            .headers
            .insert("X-Amz-Security-Token".to_string(), "session".to_string());

        let client = config.build_client().unwrap();
        let _ = client.get(server.url()).send().await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_build_client_does_not_follow_redirects() {
        let mut server = Server::new_async().await;

        let redirect = server
            .mock("GET", "/a")
            .with_status(302)
            .with_header("location", "/b")
            .with_body("moved")
            .create_async()
            .await;
        let target = server
            .mock("GET", "/b")
            .with_status(200)
            .with_body("other")
            .expect(0)
            .create_async()
            .await;

        let client = HttpConfig::default().build_client().unwrap();
        let response = client
            .get(format!("{}/a", server.url()))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 302);
        assert_eq!(response.text().await.unwrap(), "moved");
        redirect.assert_async().await;
        target.assert_async().await;
    }

    #[tokio::test]
    async fn test_build_client_applies_default_timeout() {
        let mut server = Server::new_async().await;

        let _mock = server
            .mock("GET", "/slow")
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(500));
                w.write_all(b"late")
            })
            .create_async()
            .await;

        let config = HttpConfig {
            timeout: Some(Duration::from_millis(50)),
            ..HttpConfig::default()
        };
        let client = config.build_client().unwrap();

        let result = async {
            client
                .get(format!("{}/slow", server.url()))
                .send()
                .await?
                .bytes()
                .await
        }
        .await;

        assert!(result.is_err());
    }
}
