//! Error types for the apply stage
//!
//! Apply-stage failures never abort a batch. A `StorageError` from one call
//! is retried within the budget, then recorded as an `ApplyFailure` against
//! its instruction.

use serde::{Deserialize, Serialize};

/// Errors returned by a storage or CDN collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// Call did not finish within the per-call timeout
    #[error("timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Transport-level failure (connect, reset, TLS)
    #[error("request failed: {0}")]
    Request(String),

    /// Backend answered with a non-success status
    #[error("rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Backend temporarily unavailable
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Path cannot be mapped to an object in the target bucket
    #[error("path '{0}' is outside the storage namespace")]
    InvalidPath(String),
}

impl StorageError {
    /// Check if error is worth retrying
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Request(_) | Self::Unavailable(_) => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidPath(_) => false,
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}

/// Collaborator call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStage {
    /// Metadata-only redirect write at the source path
    PutRedirect,
    /// CDN cache invalidation of the source path
    Invalidate,
}

impl std::fmt::Display for ApplyStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PutRedirect => write!(f, "put_redirect"),
            Self::Invalidate => write!(f, "invalidate"),
        }
    }
}

/// Final failure of one instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{stage} failed after {attempts} attempt(s): {message}")]
pub struct ApplyFailure {
    /// Call that failed
    pub stage: ApplyStage,
    /// Attempts made, including the first
    pub attempts: u32,
    /// Last error seen
    pub message: String,
}

impl ApplyFailure {
    /// Create failure from the last storage error
    pub fn new(stage: ApplyStage, attempts: u32, error: &StorageError) -> Self {
        Self {
            stage,
            attempts,
            message: error.to_string(),
        }
    }
}
