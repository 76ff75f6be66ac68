//! Errors returned by the HTTP adapter.
//!
//! Every failure collapses into one of three kinds: a generic request failure,
//! a DynamoDB error classified from a POST response, or a success response
//! whose body could not be decoded.

mod classify;

use bytes::Bytes;

pub use classify::{CancellationReason, DynamoError, classify_response};

pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be completed, or a GET came back with status >= 400.
    ///
    /// `status` and `body` are set when a response was received. `source` is set
    /// when the underlying client failed before that.
    #[error("request failed{}", .status.map(|s| format!(" with status {}", s)).unwrap_or_default())]
    RequestFailed {
        status: Option<u16>,
        body: Option<Bytes>,
        #[source]
        source: Option<BoxError>,
    },

    #[error(transparent)]
    Dynamo(#[from] DynamoError),

    /// A POST succeeded but its body was not a JSON object.
    #[error("invalid JSON response: {0}")]
    InvalidResponse(#[source] serde_json::Error),
}

impl Error {
    /// A failure raised by the underlying client before any response arrived.
    pub fn transport(cause: anyhow::Error) -> Self {
        Error::RequestFailed {
            status: None,
            body: None,
            source: Some(cause.into()),
        }
    }

    /// A response that arrived with an error status.
    pub fn status(status: u16, body: Bytes) -> Self {
        Error::RequestFailed {
            status: Some(status),
            body: Some(body),
            source: None,
        }
    }

    pub fn is_request_failed(&self) -> bool {
        matches!(self, Error::RequestFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_request_failed_display_with_status() {
        let err = Error::status(404, Bytes::from_static(b"missing"));
        assert_eq!(err.to_string(), "request failed with status 404");
        assert!(err.is_request_failed());
    }

    #[test]
    fn test_request_failed_display_without_status() {
        let err = Error::transport(anyhow::anyhow!("connection refused"));
        assert_eq!(err.to_string(), "request failed");
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("connection refused".to_string())
        );
    }

    #[test]
    fn test_request_failed_keeps_body() {
        match Error::status(503, Bytes::from_static(b"busy")) {
            Error::RequestFailed { status, body, source } => {
                assert_eq!(status, Some(503));
                assert_eq!(body.as_deref(), Some(&b"busy"[..]));
                assert!(source.is_none());
            }
            other => panic!("Expected RequestFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_dynamo_error_is_transparent() {
        let err = Error::from(classify_response(
            400,
            br#"{"__type":"com.amazonaws.dynamodb.v20120810#ValidationException","message":"bad key"}"#,
        ));
        assert!(!err.is_request_failed());
        assert!(err.to_string().contains("bad key"));
    }

    #[test]
    fn test_invalid_response_display() {
        let parse_err = serde_json::from_slice::<serde_json::Value>(b"not json").unwrap_err();
        let err = Error::InvalidResponse(parse_err);
        assert!(err.to_string().starts_with("invalid JSON response"));
    }
}
