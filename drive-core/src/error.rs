//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the Drive Client
//!
//! Every fallible operation in the crate returns `Result<T, AppError>`. The
//! listing pipeline turns these into `BackendStatus::Error` messages; stale
//! responses never become errors.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Unified error type for all drive operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Config file I/O error with path.
    #[error("Failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serialization or deserialization error (e.g., JSON).
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A listing payload could not be decoded.
    #[error("Could not decode directory listing: {reason}")]
    Decode { reason: String },

    /// The listing service reported a failure.
    #[error("Backend '{operation}' failed: {reason}")]
    Backend { operation: String, reason: String },

    /// A public address could not be resolved to a tree root.
    #[error("Could not resolve address '{address}': {reason}")]
    Unresolved { address: String, reason: String },

    /// Mutating drive operation failure
    #[error("Drive operation '{operation}' failed on {path:?}: {reason}")]
    OperationFailed {
        operation: String, // "create_directory", "rename", "remove"
        path: PathBuf,
        reason: String,
    },

    /// Input validation errors
    #[error("Invalid input: {field} - {message}")]
    InvalidInput {
        field: String, // "directory_name", "address", etc.
        message: String,
    },

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    #[must_use]
    /// Attach extra context to an error.
    pub fn with_context<S: Into<String>>(self, ctx: S) -> Self {
        Self::Other(format!("{}: {}", ctx.into(), self))
    }

    /// Create a listing decode error
    pub fn decode<S: Into<String>>(reason: S) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Create a backend failure error
    pub fn backend<S1: Into<String>, S2: Into<String>>(operation: S1, reason: S2) -> Self {
        Self::Backend {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create an address resolution error
    pub fn unresolved<S1: Into<String>, S2: Into<String>>(address: S1, reason: S2) -> Self {
        Self::Unresolved {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Create a drive operation failure error
    pub fn operation_failed<S1, P, S2>(operation: S1, path: P, reason: S2) -> Self
    where
        S1: Into<String>,
        P: Into<PathBuf>,
        S2: Into<String>,
    {
        Self::OperationFailed {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an input validation error
    pub fn invalid_input<S1: Into<String>, S2: Into<String>>(field: S1, message: S2) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

// Manual Clone implementation to handle non-Clone fields
impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            Self::Io(e) => Self::Io(io::Error::new(e.kind(), e.to_string())),
            Self::Config(e) => Self::Other(format!("Config error: {e}")),
            Self::ConfigIo { path, source } => Self::ConfigIo {
                path: path.clone(),
                source: io::Error::new(source.kind(), source.to_string()),
            },
            Self::Serde(e) => Self::Other(format!("Serde error: {e}")),
            Self::Decode { reason } => Self::Decode {
                reason: reason.clone(),
            },
            Self::Backend { operation, reason } => Self::Backend {
                operation: operation.clone(),
                reason: reason.clone(),
            },
            Self::Unresolved { address, reason } => Self::Unresolved {
                address: address.clone(),
                reason: reason.clone(),
            },
            Self::OperationFailed {
                operation,
                path,
                reason,
            } => Self::OperationFailed {
                operation: operation.clone(),
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::InvalidInput { field, message } => Self::InvalidInput {
                field: field.clone(),
                message: message.clone(),
            },
            Self::Other(msg) => Self::Other(msg.clone()),
        }
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e.to_string())
    }
}
