//! Library Error Types
//!
//! Top-level errors of the library crate. A failed import of a single file is
//! reported as [`ErrorKind::Import`], with the detailed
//! [`import::error::ErrorKind`](crate::import::error::ErrorKind) underneath.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The source directory is missing, is not a directory or cannot be inspected.
    #[display("invalid source directory: {}", _0.display())]
    Source(#[error(not(source))] PathBuf),
    /// The destination directory cannot be created or is not a directory.
    #[display("invalid destination directory: {}", _0.display())]
    Destination(#[error(not(source))] PathBuf),
    /// Listing the source directory failed.
    #[display("could not discover files in {}", _0.display())]
    Discover(#[error(not(source))] PathBuf),
    /// Importing a single file failed; other files are unaffected.
    #[display("could not import {}", _0.display())]
    Import(#[error(not(source))] PathBuf),
    #[display("issue with path generation from template")]
    Template,
    #[display("unsupported strategy: {_0}")]
    UnsupportedStrategy(#[error(not(source))] String),
    #[display("unsupported file type: {_0}")]
    UnsupportedFileType(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Import(_) | ErrorKind::Discover(_))
    }
}
