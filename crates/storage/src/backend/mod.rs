//! Storage backend trait and implementations.
//!
//! The importer never touches `std::fs` directly: every existence check, read,
//! copy and directory creation goes through [`StorageBackend`]. That keeps the
//! comparison and conflict logic testable against an in-memory backend, and
//! lets a dry run swap in a backend that refuses to write.

mod local;
#[cfg(feature = "mock")]
mod mock;
mod ro;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
pub use self::ro::ReadOnlyBackend;
use crate::error::Result;
use crate::models::FileInfo;
use std::io::{Read, Seek};
use std::path::Path;

/// A readable, seekable byte stream.
///
/// Blanket-implemented for everything that is both [`Read`] and [`Seek`], so
/// that backends can hand out trait objects.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

pub type BoxReader = Box<dyn ReadSeek + Send>;

/// Unified interface for storage backends.
///
/// All operations are synchronous: files are imported one at a time and each
/// file is fully resolved before the next one starts.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use mediaport_storage::{backend::StorageBackend, error::Result};
///
/// fn same_size(backend: &dyn StorageBackend, a: &Path, b: &Path) -> Result<bool> {
///     Ok(backend.stat(a)?.size == backend.stat(b)?.size)
/// }
/// ```
pub trait StorageBackend {
    /// Name of the backend, used for logging only.
    fn name(&self) -> &str;

    /// List the regular files directly inside `dir` (non-recursive).
    ///
    /// Sub-directories, broken symlinks and other special entries are
    /// silently skipped. Returns [`NotFound`](crate::error::ErrorKind::NotFound)
    /// if `dir` does not exist.
    fn list(&self, dir: &Path) -> Result<Vec<FileInfo>>;

    /// Check if a file or directory exists.
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Check if a path exists and is a directory.
    fn is_dir(&self, path: &Path) -> Result<bool>;

    /// Get file metadata without reading contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    fn stat(&self, path: &Path) -> Result<FileInfo>;

    /// Open a file for streaming, seekable reads.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist and [`PermissionDenied`](crate::error::ErrorKind::PermissionDenied)
    /// if it cannot be opened.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::io::Read;
    /// use std::path::Path;
    /// # use mediaport_storage::{backend::StorageBackend, error::Result};
    /// # fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut reader = backend.reader(Path::new("/media/DCIM/IMG_0001.JPG"))?;
    /// let mut magic = [0u8; 2];
    /// reader.read_exact(&mut magic).map_err(mediaport_storage::error::ErrorKind::Io)?;
    /// assert_eq!(magic, [0xFF, 0xD8]);
    /// # Ok(())
    /// # }
    /// ```
    fn reader(&self, path: &Path) -> Result<BoxReader>;

    /// Copy the contents of `from` over `to`, returning the number of bytes
    /// copied.
    ///
    /// # Notes
    /// - An existing `to` is overwritten.
    /// - The last-modified and last-accessed timestamps of `from` are
    ///   carried over to `to`.
    /// - Parent directories are **not** created; a missing parent is an error.
    fn copy(&self, from: &Path, to: &Path) -> Result<u64>;

    /// Create a directory and all of its missing parents.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
}
