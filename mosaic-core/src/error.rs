//! Top-level error types for mosaic
//!
//! This module provides a simplified, user-facing error type that flattens
//! the internal error hierarchy into actionable categories.
//!
//! Most "nothing found" situations are not errors here: a missing entity, an
//! absent identity or a non-entity request item all degrade to an empty
//! contribution. Errors are reserved for upstream failures and cancellation.

use thiserror::Error;

use crate::scope::SurfaceConfigError;
use crate::store::StoreError;

/// Top-level error type for mosaic operations
///
/// - [`Error::Store`] - An entity, context or profile store failed; the request aborts
/// - [`Error::Cancelled`] - The caller cancelled the request
/// - [`Error::Config`] - Fix configuration (unknown surface, bad dimension name)
#[derive(Debug, Error)]
pub enum Error {
    /// A backing store failed (unavailable, corrupt data, IO)
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The request was cancelled before the pipeline finished
    #[error("operation cancelled")]
    Cancelled,

    /// Configuration error (unknown surface, invalid dimension)
    #[error("configuration error: {0}")]
    Config(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns true if this is a store error
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Returns true if the operation was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns true if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this error is potentially retryable
    ///
    /// Only an unavailable store is worth retrying. Cancellation and
    /// configuration errors need caller intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(StoreError::Unavailable(_)))
    }
}

impl From<SurfaceConfigError> for Error {
    fn from(err: SurfaceConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for mosaic operations
pub type Result<T> = std::result::Result<T, Error>;
