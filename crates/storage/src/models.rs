//! Storage models.

use std::path::PathBuf;
use time::OffsetDateTime;

/// File metadata returned by storage backends.
///
/// Used for discovery (listing), the size short-circuit of the comparator and
/// the modification-time fallback when a file carries no capture date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Path of the file, as passed to (or listed by) the backend
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: OffsetDateTime) -> Self {
        Self { path: path.into(), size, modified }
    }

    /// File name component of the path, if it has one and it is valid UTF-8.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}
