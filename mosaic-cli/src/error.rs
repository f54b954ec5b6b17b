//! CLI-specific error types

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Pipeline or evaluator error
    #[error("{0}")]
    Core(#[from] mosaic_core::Error),

    /// World file could not be loaded
    #[error("World error: {0}")]
    Store(#[from] mosaic_core::store::StoreError),

    /// Surface configuration could not be loaded
    #[error("Surface config error: {0}")]
    SurfaceConfig(#[from] mosaic_core::scope::SurfaceConfigError),

    /// Unknown dimension on the command line
    #[error("{0}")]
    Dimension(#[from] mosaic_core::scope::UnknownDimension),

    /// IO error (filesystem, stdout, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON argument or file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Logging could not be initialized
    #[error("Logging error: {0}")]
    Logging(String),

    /// One or more conformance cases disagreed with their expectation
    #[error("{failed} of {total} conformance cases failed")]
    ConformanceFailed {
        /// Number of failing cases
        failed: usize,
        /// Number of cases run
        total: usize,
    },
}
