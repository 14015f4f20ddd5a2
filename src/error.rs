//! Error types shared by the analysis, filtering and file operation layers.
//!
//! Errors come in two flavours:
//! - [`SortError`] aborts a whole operation (missing root, bad argument, empty walk).
//! - [`ItemFailure`] is recorded for a single path inside a bulk operation and
//!   never stops the remaining items from being processed.

use crate::config::ConfigError;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort an operation before any grouping, filtering or moving happens.
#[derive(Debug, Error)]
pub enum SortError {
    /// The root directory or a path vanished.
    #[error("Path not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// A caller supplied argument is unusable (non-positive day count, empty keyword, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The process is not allowed to read or modify a path.
    #[error("Access denied: {}", .path.display())]
    AccessDenied { path: PathBuf },

    /// The walk produced nothing to work with.
    #[error("No entries found under {}", .root.display())]
    EmptyResult { root: PathBuf },

    /// Configuration could not be loaded or compiled.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The background analysis stopped before delivering a result.
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// A result could not be rendered as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other I/O failure tied to a path.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SortError {
    /// Classifies an I/O error raised while touching `path`.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => Self::AccessDenied {
                path: path.to_path_buf(),
            },
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// Result type for smartsort operations.
pub type SortResult<T> = Result<T, SortError>;

/// Why a single item in a bulk operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The path no longer exists.
    NotFound,
    /// Permission denied on the source or destination.
    AccessDenied,
    /// Something already occupies the destination name.
    AlreadyExists,
    /// Anything else reported by the operating system.
    Other,
}

impl From<io::ErrorKind> for FailureKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => FailureKind::NotFound,
            io::ErrorKind::PermissionDenied => FailureKind::AccessDenied,
            io::ErrorKind::AlreadyExists => FailureKind::AlreadyExists,
            _ => FailureKind::Other,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FailureKind::NotFound => "not found",
            FailureKind::AccessDenied => "access denied",
            FailureKind::AlreadyExists => "already exists",
            FailureKind::Other => "failed",
        };
        f.write_str(label)
    }
}

/// A per-path failure collected during a bulk operation.
#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

impl ItemFailure {
    pub fn new(path: &Path, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            kind,
            message: message.into(),
        }
    }

    pub fn from_io(path: &Path, error: &io::Error) -> Self {
        Self::new(path, error.kind().into(), error.to_string())
    }
}

impl std::fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.path.display(), self.kind, self.message)
    }
}
