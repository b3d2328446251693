//! Read-only storage backend.
//!
//! Wraps another backend and prevents write operations from executing, while
//! still indicating success on return. This is what a dry run uses: every
//! decision is made against the real files, nothing is written.

use std::path::Path;

use crate::backend::BoxReader;
use crate::{BackendHandle, FileInfo, StorageBackend, error::Result};

/// Read-only storage backend.
///
/// Wraps another backend and silently drops all write operations, logging an
/// [`info event`](tracing::Event).
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}
impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn list(&self, dir: &Path) -> Result<Vec<FileInfo>> {
        self.inner.list(dir)
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        self.inner.exists(path)
    }

    fn is_dir(&self, path: &Path) -> Result<bool> {
        self.inner.is_dir(path)
    }

    fn stat(&self, path: &Path) -> Result<FileInfo> {
        self.inner.stat(path)
    }

    fn reader(&self, path: &Path) -> Result<BoxReader> {
        self.inner.reader(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        // Still fail on a missing source so a dry run reports what a real run would.
        let size = self.inner.stat(from)?.size;
        tracing::info!(from = %from.display(), to = %to.display(), "Skipping copy during read-only mode");
        Ok(size)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "Skipping directory creation during read-only mode");
        Ok(())
    }
}
