//! In-memory storage backend for testing.

use crate::backend::BoxReader;
use crate::error::{ErrorKind, Result};
use crate::{FileInfo, StorageBackend};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use time::OffsetDateTime;

#[derive(Clone)]
struct Entry {
    modified: OffsetDateTime,
    data: Vec<u8>,
}

/// In-memory storage backend for testing.
///
/// Files live in a `HashMap` behind a [`RwLock`], so all trait methods operate
/// on `&self`. Every call to [`reader()`](StorageBackend::reader) is counted,
/// which lets tests assert that a code path never looked at file contents.
/// Directories are implicit: a directory "exists" when it was created
/// explicitly or when any file lives below it.
///
/// # Examples
///
/// ```
/// use mediaport_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// let backend = MockBackend::with_files([
///     ("/import/IMG_0001.JPG", b"jpeg bytes".as_slice()),
/// ]);
/// assert!(backend.exists(Path::new("/import/IMG_0001.JPG")).unwrap());
/// assert!(backend.is_dir(Path::new("/import")).unwrap());
/// assert_eq!(backend.opened(), 0);
/// ```
pub struct MockBackend {
    name: String,
    storage: RwLock<HashMap<PathBuf, Entry>>,
    directories: RwLock<HashSet<PathBuf>>,
    unreadable: RwLock<HashSet<PathBuf>>,
    opened: AtomicUsize,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let now = OffsetDateTime::now_utc();
        let storage = files
            .into_iter()
            .map(|(path, data)| (path.into(), Entry { modified: now, data: data.into() }))
            .collect();
        Self {
            name: "mock".to_string(),
            storage: RwLock::new(storage),
            directories: RwLock::new(HashSet::new()),
            unreadable: RwLock::new(HashSet::new()),
            opened: AtomicUsize::new(0),
        }
    }

    /// Change the name of the mock backend.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Mark a path as existing but impossible to open, simulating a
    /// permission problem or I/O fault.
    pub fn with_unreadable(self, path: impl Into<PathBuf>) -> Self {
        self.unreadable.write().unwrap_or_else(PoisonError::into_inner).insert(path.into());
        self
    }

    /// Overwrite the modification time of an existing file.
    pub fn set_modified(&self, path: &Path, modified: OffsetDateTime) {
        if let Some(entry) = self.storage.write().unwrap_or_else(PoisonError::into_inner).get_mut(path) {
            entry.modified = modified;
        }
    }

    /// Contents of a file, if it exists.
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.storage.read().unwrap_or_else(PoisonError::into_inner).get(path).map(|entry| entry.data.clone())
    }

    /// Number of times a file has been opened for reading.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    fn entry(&self, path: &Path) -> Result<Entry> {
        match self.storage.read().unwrap_or_else(PoisonError::into_inner).get(path) {
            Some(entry) => Ok(entry.clone()),
            None => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
        }
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &[u8]); 0] = [];
        Self::with_files(files)
    }
}

impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list(&self, dir: &Path) -> Result<Vec<FileInfo>> {
        if !self.is_dir(dir)? {
            exn::bail!(ErrorKind::NotFound(dir.to_path_buf()));
        }
        let guard = self.storage.read().unwrap_or_else(PoisonError::into_inner);
        Ok(guard
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir))
            .map(|(path, entry)| FileInfo::new(path, entry.data.len() as u64, entry.modified))
            .collect())
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.storage.read().unwrap_or_else(PoisonError::into_inner).contains_key(path) || self.is_dir(path)?)
    }

    fn is_dir(&self, path: &Path) -> Result<bool> {
        if self.directories.read().unwrap_or_else(PoisonError::into_inner).iter().any(|d| d.starts_with(path)) {
            return Ok(true);
        }
        let guard = self.storage.read().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.keys().any(|file| file != path && file.starts_with(path)))
    }

    fn stat(&self, path: &Path) -> Result<FileInfo> {
        let entry = self.entry(path)?;
        Ok(FileInfo::new(path, entry.data.len() as u64, entry.modified))
    }

    fn reader(&self, path: &Path) -> Result<BoxReader> {
        let entry = self.entry(path)?;
        if self.unreadable.read().unwrap_or_else(PoisonError::into_inner).contains(path) {
            exn::bail!(ErrorKind::PermissionDenied(path.to_path_buf()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(Cursor::new(entry.data)))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        let entry = self.entry(from)?;
        if let Some(parent) = to.parent()
            && !parent.as_os_str().is_empty()
            && !self.is_dir(parent)?
        {
            exn::bail!(ErrorKind::NotFound(parent.to_path_buf()));
        }
        let size = entry.data.len() as u64;
        self.storage.write().unwrap_or_else(PoisonError::into_inner).insert(to.to_path_buf(), entry);
        Ok(size)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.directories.write().unwrap_or_else(PoisonError::into_inner).insert(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_counts_opens() {
        let backend = MockBackend::with_files([("/a/one.jpg", b"one".as_slice())]);
        assert_eq!(backend.opened(), 0);
        backend.stat(Path::new("/a/one.jpg")).unwrap();
        assert_eq!(backend.opened(), 0);
        let mut data = Vec::new();
        backend.reader(Path::new("/a/one.jpg")).unwrap().read_to_end(&mut data).unwrap();
        assert_eq!(data, b"one");
        assert_eq!(backend.opened(), 1);
    }

    #[test]
    fn test_unreadable() {
        let backend = MockBackend::with_files([("/a/one.jpg", b"one".as_slice())]).with_unreadable("/a/one.jpg");
        assert!(backend.exists(Path::new("/a/one.jpg")).unwrap());
        let err = backend.reader(Path::new("/a/one.jpg")).err().unwrap();
        assert!(matches!(&*err, ErrorKind::PermissionDenied(_)));
        assert_eq!(backend.opened(), 0);
    }

    #[test]
    fn test_copy_requires_parent() {
        let backend = MockBackend::with_files([("/a/one.jpg", b"one".as_slice())]);
        assert!(backend.copy(Path::new("/a/one.jpg"), Path::new("/b/one.jpg")).is_err());
        backend.create_dir_all(Path::new("/b")).unwrap();
        assert_eq!(backend.copy(Path::new("/a/one.jpg"), Path::new("/b/one.jpg")).unwrap(), 3);
        assert_eq!(backend.contents(Path::new("/b/one.jpg")).unwrap(), b"one");
    }

    #[test]
    fn test_list_direct_children_only() {
        let backend = MockBackend::with_files([
            ("/a/one.jpg", b"one".as_slice()),
            ("/a/two.jpg", b"two".as_slice()),
            ("/a/nested/three.jpg", b"three".as_slice()),
        ]);
        assert_eq!(backend.list(Path::new("/a")).unwrap().len(), 2);
        assert!(backend.list(Path::new("/missing")).is_err());
    }
}
