//! Request-level error taxonomy.
//!
//! Every failure that happens before a response head is written maps to
//! exactly one HTTP status here. Failures after the head has gone out are
//! transfer failures and never come back through this type; the connection
//! is dropped instead.

use std::io;
use thiserror::Error;

/// Errors raised while resolving and serving a single request.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Path escaped the share root, or could not be safely decoded.
    #[error("request path rejected")]
    PathRejected,

    /// Resource does not exist, or its kind does not match the request
    /// (file target naming a directory, directory target naming a file).
    #[error("resource not found")]
    NotFound,

    /// Resource exists but cannot be read.
    #[error("resource not readable")]
    Forbidden,

    /// Range header named a region outside the file.
    #[error("range not satisfiable for size {size}")]
    RangeNotSatisfiable {
        /// Total size of the file the range was checked against.
        size: u64,
    },

    /// Unexpected I/O failure before any response was started.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl ServeError {
    /// HTTP status code this error renders as.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::PathRejected | Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::RangeNotSatisfiable { .. } => 416,
            Self::Io(_) => 500,
        }
    }

    /// Classify an I/O failure from opening or inspecting a resolved path.
    #[must_use]
    pub fn from_fs(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::Forbidden,
            _ => Self::Io(err),
        }
    }
}
