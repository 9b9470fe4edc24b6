//! VFS error types.

use std::io;
use thiserror::Error;

use crate::fetch::FetchError;

/// VFS error type.
#[derive(Debug, Error)]
pub enum VfsError {
    /// No virtual file with this name.
    #[error("not found: {0}")]
    NotFound(String),

    /// The file has no handler for the requested operation.
    #[error("{op} not supported by {file}")]
    UnsupportedOperation { file: String, op: &'static str },

    /// A collaborator the handler depends on is not reachable.
    #[error("{0}")]
    DependencyUnavailable(String),

    /// Remote fetch failed mid-refresh.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Two registrations share a name.
    #[error("duplicate file: {0}")]
    DuplicateFile(String),

    /// Path does not resolve inside the mounted tree.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl VfsError {
    /// Create a NotFound error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create an UnsupportedOperation error.
    pub fn unsupported(file: impl Into<String>, op: &'static str) -> Self {
        Self::UnsupportedOperation {
            file: file.into(),
            op,
        }
    }

    /// Create a DependencyUnavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::DependencyUnavailable(msg.into())
    }

    /// Create an InvalidPath error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Create an Other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Convert VfsError to std::io::Error for compatibility.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        match e {
            VfsError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            e @ VfsError::UnsupportedOperation { .. } => {
                io::Error::new(io::ErrorKind::PermissionDenied, e.to_string())
            }
            VfsError::DependencyUnavailable(msg) => {
                io::Error::new(io::ErrorKind::NotConnected, msg)
            }
            VfsError::Fetch(e) => io::Error::other(e.to_string()),
            VfsError::DuplicateFile(msg) => io::Error::new(io::ErrorKind::AlreadyExists, msg),
            VfsError::InvalidPath(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            VfsError::Io(e) => e,
            VfsError::Other(msg) => io::Error::other(msg),
        }
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;
