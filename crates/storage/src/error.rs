//! Error types for storage operations.

use std::fmt;

use thiserror::Error;

/// Failures reported by an [`ObjectGateway`](crate::ObjectGateway).
///
/// These are the raw rejections of a single remote call. The Storage Client
/// never constructs them itself; it wraps them into [`StorageError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Object does not exist.
    #[error("Object not found: {message}")]
    NotFound { message: String },

    /// Bucket does not exist.
    #[error("No such bucket: {message}")]
    NoSuchBucket { message: String },

    /// Bucket name is taken, possibly by the caller itself.
    #[error("Bucket already exists (owned by you: {owned_by_you}): {message}")]
    BucketAlreadyExists { message: String, owned_by_you: bool },

    /// Access denied.
    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    /// Any other service-side rejection.
    #[error("Service error {code}: {message}")]
    Service {
        code: String,
        message: String,
        status: Option<u16>,
    },

    /// Network error.
    #[error("Network error: {message}")]
    Network { message: String, retryable: bool },

    /// Local I/O error while producing a body.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// The request could not be built.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl GatewayError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Network { retryable, .. } => *retryable,
            GatewayError::Service { status, .. } => matches!(status, Some(s) if *s >= 500),
            GatewayError::NotFound { .. } => false,
            GatewayError::NoSuchBucket { .. } => false,
            GatewayError::BucketAlreadyExists { .. } => false,
            GatewayError::AccessDenied { .. } => false,
            GatewayError::Io { .. } => false,
            GatewayError::InvalidRequest { .. } => false,
        }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::Io {
            message: err.to_string(),
        }
    }
}

/// The public operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateBucket,
    DeleteBucket,
    Upload,
    Download,
    /// The read that precedes a delete.
    ReadBeforeDelete,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::CreateBucket => "create bucket",
            Operation::DeleteBucket => "delete bucket",
            Operation::Upload => "upload",
            Operation::Download => "download",
            Operation::ReadBeforeDelete => "read before deleting",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// The bucket or object an operation was acting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Bucket(String),
    Object { bucket: String, key: String },
}

impl Target {
    /// Target for a bucket-level operation.
    pub fn bucket(bucket: impl Into<String>) -> Self {
        Target::Bucket(bucket.into())
    }

    /// Target for an object-level operation.
    pub fn object(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Target::Object {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Name of the bucket involved.
    pub fn bucket_name(&self) -> &str {
        match self {
            Target::Bucket(bucket) => bucket,
            Target::Object { bucket, .. } => bucket,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Bucket(bucket) => write!(f, "bucket {}", bucket),
            Target::Object { bucket, key } => write!(f, "object {} in bucket {}", key, bucket),
        }
    }
}

/// Errors returned by [`StorageClient`](crate::StorageClient) operations.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// The gateway rejected a remote call.
    #[error("Failed to {operation} {target}: {source}")]
    Gateway {
        operation: Operation,
        target: Target,
        #[source]
        source: GatewayError,
    },

    /// An earlier step took effect but a dependent step failed.
    /// The earlier effect is not rolled back.
    #[error("Failed to {operation} {target}: {completed}, but could not {pending}: {source}")]
    PartialCompletion {
        operation: Operation,
        target: Target,
        /// What already happened remotely.
        completed: &'static str,
        /// The step that failed and still needs to be done.
        pending: &'static str,
        #[source]
        source: GatewayError,
    },

    /// The remote call succeeded but its result is not the expected one.
    #[error("Unexpected result for {operation} {target}: status code {actual}, expected {expected}")]
    UnexpectedStatus {
        operation: Operation,
        target: Target,
        expected: u16,
        actual: u16,
    },

    /// Invalid configuration or input.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl StorageError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            StorageError::Gateway { source, .. } => source.is_retryable(),
            StorageError::PartialCompletion { source, .. } => source.is_retryable(),
            StorageError::UnexpectedStatus { .. } => false,
            StorageError::InvalidConfig { .. } => false,
        }
    }

    /// Whether a remote effect is left in place by this failure.
    pub fn is_partial_completion(&self) -> bool {
        matches!(self, StorageError::PartialCompletion { .. })
    }

    /// The untouched gateway error, if this failure wraps one.
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            StorageError::Gateway { source, .. } => Some(source),
            StorageError::PartialCompletion { source, .. } => Some(source),
            StorageError::UnexpectedStatus { .. } | StorageError::InvalidConfig { .. } => None,
        }
    }

    /// The operation that failed, if known.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            StorageError::Gateway { operation, .. }
            | StorageError::PartialCompletion { operation, .. }
            | StorageError::UnexpectedStatus { operation, .. } => Some(*operation),
            StorageError::InvalidConfig { .. } => None,
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        StorageError::InvalidConfig {
            message: message.into(),
        }
    }
}
