//! Storage Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Callers higher up the stack wrap these with their own
//! [`ErrorKind`]s via [`exn::ResultExt::or_raise`], so the original I/O cause
//! is never lost.

use derive_more::{Display, Error};
use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// File does not exist
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// File already exists (for operations that require new files)
    #[display("file already exists: {}", _0.display())]
    AlreadyExists(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Path contains invalid characters or escapes root
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// Backend-specific error
    #[display("backend error: {_0}")]
    BackendError(#[error(not(source))] String),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}
impl ErrorKind {
    /// Classify an I/O error that happened while operating on `path`.
    pub fn from_io(err: IoError, path: &Path) -> Self {
        match err.kind() {
            IoErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            IoErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            IoErrorKind::AlreadyExists => Self::AlreadyExists(path.to_path_buf()),
            _ => Self::Io(err),
        }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::BackendError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(IoErrorKind::NotFound, "file not found: /media/a.jpg")]
    #[case(IoErrorKind::PermissionDenied, "permission denied: /media/a.jpg")]
    #[case(IoErrorKind::AlreadyExists, "file already exists: /media/a.jpg")]
    fn test_from_io_keeps_path(#[case] kind: IoErrorKind, #[case] expected: &str) {
        let err = ErrorKind::from_io(IoError::from(kind), Path::new("/media/a.jpg"));
        assert_eq!(err.to_string(), expected);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_other_io_errors_are_retryable() {
        let err = ErrorKind::from_io(IoError::other("disk on fire"), Path::new("/media/a.jpg"));
        assert!(matches!(err, ErrorKind::Io(_)));
        assert!(err.is_retryable());
    }
}
