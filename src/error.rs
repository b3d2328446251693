//! Binary Error Types
//!
//! Only failures that end the whole run live here. A single file failing to
//! import is counted in the [`Summary`](crate::run::Summary) instead.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A fatal error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for a whole run.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("invalid destination folder template")]
    Template,
    #[display("could not resolve path: {}", _0.display())]
    Path(#[error(not(source))] PathBuf),
    #[display("source or destination directory is unusable")]
    Directories,
    #[display("import aborted")]
    Import,
}
