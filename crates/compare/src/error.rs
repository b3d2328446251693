//! Comparison Error Types
//!
//! A comparison never answers "not equal" because something went wrong; a
//! missing or unreadable file is always reported as one of these kinds, with
//! the storage error kept underneath.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A comparison error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for comparison operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// One of the files being compared does not exist.
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Both files exist, but at least one of them could not be opened or read.
    #[display("could not read {} or {}", first.display(), second.display())]
    Read {
        #[error(not(source))]
        first: PathBuf,
        #[error(not(source))]
        second: PathBuf,
    },
    /// The requested comparison mode does not exist.
    #[display("unsupported comparison mode: {_0}")]
    UnsupportedMode(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Read { .. })
    }
}
