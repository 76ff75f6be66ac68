//! Classification of DynamoDB error responses.

use bytes::Bytes;
use log::debug;
use serde::Deserialize;

/// One entry of the `CancellationReasons` list of a canceled transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CancellationReason {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
}

/// An error reported by DynamoDB in a response with status >= 400.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DynamoError {
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("conditional check failed: {0}")]
    ConditionalCheckFailed(String),
    #[error("incomplete signature: {0}")]
    IncompleteSignature(String),
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    #[error("item collection size limit exceeded: {0}")]
    ItemCollectionSizeLimitExceeded(String),
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
    #[error("missing authentication token: {0}")]
    MissingAuthenticationToken(String),
    #[error("provisioned throughput exceeded: {0}")]
    ProvisionedThroughputExceeded(String),
    #[error("request limit exceeded: {0}")]
    RequestLimitExceeded(String),
    #[error("resource in use: {0}")]
    ResourceInUse(String),
    #[error("resource not found: {0}")]
    ResourceNotFound(String),
    #[error("throttled: {0}")]
    Throttling(String),
    #[error("unrecognized client: {0}")]
    UnrecognizedClient(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("expired token: {0}")]
    ExpiredToken(String),
    #[error("idempotent parameter mismatch: {0}")]
    IdempotentParameterMismatch(String),
    #[error("transaction canceled: {message}")]
    TransactionCanceled {
        message: String,
        reasons: Vec<CancellationReason>,
    },
    #[error("transaction conflict: {0}")]
    TransactionConflict(String),
    #[error("transaction in progress: {0}")]
    TransactionInProgress(String),
    #[error("service unavailable")]
    ServiceUnavailable,
    #[error("internal server error")]
    InternalServerError,
    #[error("unknown error (status {status})")]
    Unknown { status: u16, body: Bytes },
}

impl DynamoError {
    /// Whether the error signals exhausted capacity or a temporarily unhealthy
    /// service rather than a problem with the request itself.
    pub fn is_throttling(&self) -> bool {
        matches!(
            self,
            DynamoError::ProvisionedThroughputExceeded(_)
                | DynamoError::RequestLimitExceeded(_)
                | DynamoError::Throttling(_)
                | DynamoError::ServiceUnavailable
                | DynamoError::InternalServerError
        )
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    kind: String,
    #[serde(alias = "Message", default)]
    message: Option<String>,
    #[serde(rename = "CancellationReasons", default)]
    cancellation_reasons: Vec<CancellationReason>,
}

/// Builds the error for a response with status >= 400 from its status and body.
///
/// The result depends only on the inputs. Bodies that are not a DynamoDB error
/// document, or name an unknown error type, become [`DynamoError::Unknown`].
pub fn classify_response(status: u16, body: &[u8]) -> DynamoError {
    match status {
        500 => return DynamoError::InternalServerError,
        503 => return DynamoError::ServiceUnavailable,
        _ => {}
    }

    let unknown = || DynamoError::Unknown {
        status,
        body: Bytes::copy_from_slice(body),
    };

    let parsed: ErrorBody = match serde_json::from_slice(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("Error body with status {} is not a DynamoDB error: {}", status, e);
            return unknown();
        }
    };

    // "com.amazonaws.dynamodb.v20120810#ResourceNotFoundException" -> "ResourceNotFoundException"
    let name = parsed
        .kind
        .rsplit_once('#')
        .map_or(parsed.kind.as_str(), |(_, name)| name);
    let message = parsed.message.unwrap_or_default();

    match name {
        "AccessDeniedException" => DynamoError::AccessDenied(message),
        "ConditionalCheckFailedException" => DynamoError::ConditionalCheckFailed(message),
        "IncompleteSignatureException" => DynamoError::IncompleteSignature(message),
        "InvalidSignatureException" => DynamoError::InvalidSignature(message),
        "ItemCollectionSizeLimitExceededException" => {
            DynamoError::ItemCollectionSizeLimitExceeded(message)
        }
        "LimitExceededException" => DynamoError::LimitExceeded(message),
        "MissingAuthenticationTokenException" => DynamoError::MissingAuthenticationToken(message),
        "ProvisionedThroughputExceededException" => {
            DynamoError::ProvisionedThroughputExceeded(message)
        }
        "RequestLimitExceeded" => DynamoError::RequestLimitExceeded(message),
        "ResourceInUseException" => DynamoError::ResourceInUse(message),
        "ResourceNotFoundException" => DynamoError::ResourceNotFound(message),
        "ThrottlingException" => DynamoError::Throttling(message),
        "UnrecognizedClientException" => DynamoError::UnrecognizedClient(message),
        "ValidationException" => DynamoError::Validation(message),
        "ExpiredTokenException" => DynamoError::ExpiredToken(message),
        "IdempotentParameterMismatchException" => {
            DynamoError::IdempotentParameterMismatch(message)
        }
        "TransactionCanceledException" => DynamoError::TransactionCanceled {
            message,
            reasons: parsed.cancellation_reasons,
        },
        "TransactionConflictException" => DynamoError::TransactionConflict(message),
        "TransactionInProgressException" => DynamoError::TransactionInProgress(message),
        "ServiceUnavailable" => DynamoError::ServiceUnavailable,
        "InternalServerError" => DynamoError::InternalServerError,
        other => {
            debug!("Unknown DynamoDB error type {:?} with status {}", other, status);
            unknown()
        }
    }
}
