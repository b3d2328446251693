//! Error types for the [`import`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.
//! The storage or comparison error that caused the failure is kept as the
//! child of each of these.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An import error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a failure to import one file.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Comparing the incoming file with the one already in the library failed.
    /// Never treated as "different".
    #[display("could not compare {} with {}", source.display(), destination.display())]
    Compare {
        #[error(not(source))]
        source: PathBuf,
        #[error(not(source))]
        destination: PathBuf,
    },
    /// Copying the file into the library failed.
    #[display("could not copy {} to {}", source.display(), destination.display())]
    Copy {
        #[error(not(source))]
        source: PathBuf,
        #[error(not(source))]
        destination: PathBuf,
    },
    /// The capture date could not be determined.
    #[display("could not determine capture date of {}", _0.display())]
    Date(#[error(not(source))] PathBuf),
    /// The [`PathGenerator`](crate::PathGenerator) could not render a folder.
    #[display("issue with path generation from template")]
    Template,
    /// The destination folder could not be created.
    #[display("could not create folder {}", _0.display())]
    Folder(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Compare { .. } | ErrorKind::Copy { .. } | ErrorKind::Folder(_))
    }
}
