//! Post error types.

use thiserror::Error;
use uuid::Uuid;

use crate::storage::StorageError;

/// Post operation errors.
#[derive(Debug, Error)]
pub enum PostError {
    /// Malformed input, such as an identifier that is not a UUID.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Post not found.
    #[error("post not found: {0}")]
    NotFound(Uuid),

    /// The upload stream could not be staged to a temp file.
    #[error("staging failed: {0}")]
    Staging(String),

    /// Blob store unreachable or rejected the upload.
    #[error("remote upload failed: {0}")]
    RemoteUpload(#[from] StorageError),

    /// Blob store reported success without an identifier or URL.
    #[error("remote upload incomplete: store returned no identifier")]
    UploadIncomplete,

    /// Repository operation failed.
    #[error("persistence failed: {0}")]
    Persistence(String),
}

impl PostError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a staging error.
    #[must_use]
    pub fn staging(msg: impl Into<String>) -> Self {
        Self::Staging(msg.into())
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Whether the error is caused by the caller rather than the service.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}
