//! AWS error classification
//!
//! SDK errors are classified from `ProvideErrorMetadata::code()`. A
//! not-found code on a fetch becomes [`Lookup::NotFound`]; every other
//! classified error is recorded against the record being processed.

use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata};
use concierge_common::Lookup;
use thiserror::Error;

/// AWS error categories used by the synchronizers
#[derive(Debug, Error)]
pub enum AwsError {
    /// Resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Resource already exists
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// Rate limit exceeded after the SDK's own retries
    #[error("Rate limit exceeded")]
    Throttled,

    /// Policy document rejected, or a remote document that does not parse
    #[error("Malformed policy document: {0}")]
    MalformedDocument(String),

    /// Account or service quota reached
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    /// Operation not available in this region or account
    #[error("Not supported: {0}")]
    Unsupported(String),

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, AwsError::AlreadyExists(_))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, AwsError::Unsupported(_))
    }

    /// Error for a remote document that could not be decoded.
    pub fn malformed(what: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        AwsError::MalformedDocument(format!("{what}: {err}"))
    }
}

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    "NoSuchEntity",
    "NoSuchBucket",
    "NoSuchKey",
    "NoSuchBucketPolicy",
    "NotFound",
    "NotFoundException",
    "ResourceNotFoundException",
    "TrailNotFoundException",
];

/// Known AWS error codes for "already exists" conditions
const ALREADY_EXISTS_CODES: &[&str] = &[
    "EntityAlreadyExists",
    "BucketAlreadyOwnedByYou",
    "ResourceAlreadyExistsException",
    "TrailAlreadyExistsException",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "SlowDown",
];

/// Known AWS error codes for rejected documents
const MALFORMED_CODES: &[&str] = &[
    "MalformedPolicyDocument",
    "MalformedPolicy",
    "InvalidTrailNameException",
];

/// Known AWS error codes for quotas
const LIMIT_CODES: &[&str] = &[
    "LimitExceeded",
    "LimitExceededException",
    "MaximumNumberOfTrailsExceededException",
];

/// Known AWS error codes for operations unavailable in a region
const UNSUPPORTED_CODES: &[&str] = &[
    "UnknownOperationException",
    "CloudWatchLogsDeliveryUnavailableException",
    "UnsupportedOperation",
    "UnsupportedOperationException",
];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound(message),
        Some(c) if ALREADY_EXISTS_CODES.contains(&c) => AwsError::AlreadyExists(message),
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled,
        Some(c) if MALFORMED_CODES.contains(&c) => AwsError::MalformedDocument(message),
        Some(c) if LIMIT_CODES.contains(&c) => AwsError::LimitExceeded(message),
        Some(c) if UNSUPPORTED_CODES.contains(&c) => AwsError::Unsupported(message),
        _ => AwsError::Sdk {
            code: code.map(str::to_string),
            message,
        },
    }
}

/// Classify any SDK error that carries error metadata.
///
/// Transport errors carry no code or message; the full error context is
/// used as the message instead.
pub fn classify_sdk_error<E>(err: &E) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let meta = ProvideErrorMetadata::meta(err);
    match meta.message() {
        Some(message) => classify_aws_error(meta.code(), Some(message)),
        None => {
            let context = DisplayErrorContext(err).to_string();
            classify_aws_error(meta.code(), Some(&context))
        }
    }
}

/// Conversions from raw SDK results.
pub trait SdkResultExt<T> {
    /// Classify the error side.
    fn classify(self) -> Result<T, AwsError>;

    /// Classify, turning a not-found error into [`Lookup::NotFound`].
    fn lookup(self) -> Result<Lookup<T>, AwsError>;
}

impl<T, E> SdkResultExt<T> for Result<T, E>
where
    E: ProvideErrorMetadata + std::error::Error,
{
    fn classify(self) -> Result<T, AwsError> {
        self.map_err(|e| classify_sdk_error(&e))
    }

    fn lookup(self) -> Result<Lookup<T>, AwsError> {
        found_or_not(self.classify())
    }
}

/// Turn `Err(NotFound)` into `Ok(Lookup::NotFound)`.
pub fn found_or_not<T>(result: Result<T, AwsError>) -> Result<Lookup<T>, AwsError> {
    match result {
        Ok(value) => Ok(Lookup::Found(value)),
        Err(AwsError::NotFound(_)) => Ok(Lookup::NotFound),
        Err(e) => Err(e),
    }
}
