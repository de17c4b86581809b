//! Error types for the aspect model store.
//!
//! `StoreError` covers everything the local folder store can report. `SdkError` is what the
//! external aspect-model SDK hands back. `ApiError` is the top-level error seen by the CLI and
//! the service workflows.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Stable classification of store failures, for callers that map errors onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileNotFound,
    FileWrite,
    FileRead,
    InvalidNamespace,
    InvalidAspectModel,
    IllegalArgument,
}

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("File not found: {}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: Option<io::Error>,
    },

    #[error("Failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid namespace '{namespace}': expected <namespace>:<version> without a file name")]
    InvalidNamespace { namespace: String },

    #[error("Invalid aspect model: {0}")]
    InvalidAspectModel(String),

    #[error("Illegal argument: {0}")]
    IllegalArgument(String),
}

impl StoreError {
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        StoreError::FileNotFound {
            path: path.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::FileNotFound { .. } => ErrorKind::FileNotFound,
            StoreError::FileWrite { .. } => ErrorKind::FileWrite,
            StoreError::FileRead { .. } => ErrorKind::FileRead,
            StoreError::InvalidNamespace { .. } => ErrorKind::InvalidNamespace,
            StoreError::InvalidAspectModel(_) => ErrorKind::InvalidAspectModel,
            StoreError::IllegalArgument(_) => ErrorKind::IllegalArgument,
        }
    }
}

/// Errors reported by the aspect-model SDK
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Failed to parse turtle: {0}")]
    Parse(String),

    #[error("Failed to resolve aspect model URN: {0}")]
    Resolve(String),

    #[error("Failed to migrate model: {0}")]
    Migration(String),
}

/// Top-level error type for CLI and service callers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Sdk(#[from] SdkError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
