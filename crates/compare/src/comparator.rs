//! Comparator
//!
//! Both files are stat'ed before anything is opened, and a size mismatch
//! short-circuits the comparison. Memory use is bounded by the chunk sizes,
//! whatever the size of the files.

use crate::ComparisonMode;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use mediaport_storage::StorageBackend;
use mediaport_storage::backend::BoxReader;
use mediaport_storage::error::{ErrorKind as StorageErrorKind, Result as StorageResult};
use std::io::{ErrorKind as IoErrorKind, Read, Seek, SeekFrom};
use std::num::NonZeroUsize;
use std::path::Path;
use tracing::instrument;

const DEFAULT_CHUNK_SIZE: NonZeroUsize = NonZeroUsize::new(4096).unwrap();

/// Decides whether two files hold the same content.
///
/// # Examples
///
/// ```
/// use mediaport_compare::{Comparator, ComparisonMode};
/// use mediaport_storage::backend::MockBackend;
/// use std::path::Path;
///
/// let backend = MockBackend::with_files([
///     ("/card/IMG_0001.JPG", b"same pixels".as_slice()),
///     ("/library/IMG_0001.JPG", b"same pixels".as_slice()),
///     ("/library/IMG_0002.JPG", b"other".as_slice()),
/// ]);
/// let comparator = Comparator::default();
/// let (a, b, c) = (
///     Path::new("/card/IMG_0001.JPG"),
///     Path::new("/library/IMG_0001.JPG"),
///     Path::new("/library/IMG_0002.JPG"),
/// );
/// assert!(comparator.files_are_equal(&backend, a, b, ComparisonMode::Full).unwrap());
/// // Different sizes: decided without opening either file.
/// let opened = backend.opened();
/// assert!(!comparator.files_are_equal(&backend, a, c, ComparisonMode::Partial).unwrap());
/// assert_eq!(backend.opened(), opened);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Comparator {
    full_hash_chunk_size: NonZeroUsize,
    partial_chunk_size: NonZeroUsize,
}
impl Default for Comparator {
    fn default() -> Self {
        Self { full_hash_chunk_size: DEFAULT_CHUNK_SIZE, partial_chunk_size: DEFAULT_CHUNK_SIZE }
    }
}

/// The two paths under comparison, used to attribute storage errors.
struct Pair<'a> {
    first: &'a Path,
    second: &'a Path,
}
impl Pair<'_> {
    /// Wrap a storage error that happened while touching `path`.
    ///
    /// A missing file becomes [`NotFound`](ErrorKind::NotFound) for that path,
    /// anything else becomes [`Read`](ErrorKind::Read) naming both.
    fn wrap<T>(&self, path: &Path, result: StorageResult<T>) -> Result<T> {
        match result {
            Err(e) if matches!(&*e, StorageErrorKind::NotFound(_)) => {
                Err(e).or_raise(|| ErrorKind::NotFound(path.to_path_buf()))
            },
            result => result.or_raise(|| ErrorKind::Read {
                first: self.first.to_path_buf(),
                second: self.second.to_path_buf(),
            }),
        }
    }
}

impl Comparator {
    /// Number of bytes read at a time while hashing in [`Full`](ComparisonMode::Full) mode.
    pub fn with_full_hash_chunk_size(mut self, size: NonZeroUsize) -> Self {
        self.full_hash_chunk_size = size;
        self
    }

    /// Length of the leading and trailing chunk compared in
    /// [`Partial`](ComparisonMode::Partial) mode.
    pub fn with_partial_chunk_size(mut self, size: NonZeroUsize) -> Self {
        self.partial_chunk_size = size;
        self
    }

    pub fn full_hash_chunk_size(&self) -> NonZeroUsize {
        self.full_hash_chunk_size
    }

    pub fn partial_chunk_size(&self) -> NonZeroUsize {
        self.partial_chunk_size
    }

    /// Whether `first` and `second` hold the same content.
    ///
    /// # Notes
    /// - [`Partial`](ComparisonMode::Partial) may report two different files
    ///   as equal when they only differ between the leading and trailing
    ///   chunk. It never reports two equal files as different.
    ///   Files shorter than twice the chunk size are compared exactly.
    /// - [`Full`](ComparisonMode::Full) is exact.
    ///
    /// # Errors
    /// - [`NotFound`](ErrorKind::NotFound) when either file does not exist,
    ///   `first` being checked first.
    /// - [`Read`](ErrorKind::Read) when either file exists but cannot be read.
    ///
    /// A failure is never reported as "not equal".
    #[instrument(level = "debug", skip_all, fields(
        first = %first.display(),
        second = %second.display(),
        mode = %mode,
    ))]
    pub fn files_are_equal(
        &self,
        backend: &dyn StorageBackend,
        first: &Path,
        second: &Path,
        mode: ComparisonMode,
    ) -> Result<bool> {
        let pair = Pair { first, second };
        let first_size = pair.wrap(first, backend.stat(first))?.size;
        let second_size = pair.wrap(second, backend.stat(second))?.size;
        if first_size != second_size {
            tracing::debug!(first_size, second_size, "Sizes differ");
            return Ok(false);
        }
        let equal = match mode {
            ComparisonMode::Partial => self.partial(backend, &pair, first_size)?,
            ComparisonMode::Full => {
                let first_hash = pair.wrap(first, self.hash_file(backend, first))?;
                let second_hash = pair.wrap(second, self.hash_file(backend, second))?;
                first_hash == second_hash
            },
        };
        tracing::debug!(equal, "Compared contents");
        Ok(equal)
    }

    fn partial(&self, backend: &dyn StorageBackend, pair: &Pair<'_>, size: u64) -> Result<bool> {
        let chunk = self.partial_chunk_size.get();
        let mut first = pair.wrap(pair.first, backend.reader(pair.first))?;
        let mut second = pair.wrap(pair.second, backend.reader(pair.second))?;
        let mut first_buffer = Vec::with_capacity(chunk);
        let mut second_buffer = Vec::with_capacity(chunk);

        let mut offsets = vec![0];
        // The head chunk already covered a file no longer than one chunk.
        if size > chunk as u64 {
            offsets.push(size.saturating_sub(chunk as u64));
        }
        for offset in offsets {
            pair.wrap(pair.first, read_chunk(&mut first, pair.first, offset, chunk, &mut first_buffer))?;
            pair.wrap(pair.second, read_chunk(&mut second, pair.second, offset, chunk, &mut second_buffer))?;
            if first_buffer != second_buffer {
                tracing::trace!(offset, "Chunk differs");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Stream a file through BLAKE3, [`full_hash_chunk_size`](Self::full_hash_chunk_size)
    /// bytes at a time.
    ///
    /// # Examples
    ///
    /// ```
    /// use mediaport_compare::Comparator;
    /// use mediaport_storage::backend::MockBackend;
    /// use std::path::Path;
    ///
    /// let backend = MockBackend::with_files([("/card/clip.mp4", b"frames".as_slice())]);
    /// let hash = Comparator::default().hash_file(&backend, Path::new("/card/clip.mp4")).unwrap();
    /// assert_eq!(hash, blake3::hash(b"frames"));
    /// ```
    #[instrument(level = "trace", skip_all, fields(path = %path.display()))]
    pub fn hash_file(&self, backend: &dyn StorageBackend, path: &Path) -> StorageResult<blake3::Hash> {
        let mut reader = backend.reader(path)?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.full_hash_chunk_size.get()];
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    hasher.update(&buffer[..n]);
                },
                Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
                Err(e) => exn::bail!(StorageErrorKind::from_io(e, path)),
            }
        }
        Ok(hasher.finalize())
    }
}

/// Read up to `len` bytes starting at `offset` into `buffer`, replacing its contents.
fn read_chunk(reader: &mut BoxReader, path: &Path, offset: u64, len: usize, buffer: &mut Vec<u8>) -> StorageResult<()> {
    buffer.clear();
    reader.seek(SeekFrom::Start(offset)).map_err(|e| StorageErrorKind::from_io(e, path))?;
    reader.by_ref().take(len as u64).read_to_end(buffer).map_err(|e| StorageErrorKind::from_io(e, path))?;
    Ok(())
}
