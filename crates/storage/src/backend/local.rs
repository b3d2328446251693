//! Local filesystem storage backend.
//!
//! Thin wrapper over `std::fs`, plus [`filetime`] to carry timestamps over
//! when copying. Paths are used exactly as given; resolving them to absolute
//! paths is the caller's job.

use crate::backend::BoxReader;
use crate::error::{ErrorKind, Result};
use crate::{FileInfo, StorageBackend};
use filetime::FileTime;
use std::fs::{self, File, Metadata};
use std::path::Path;

/// Local filesystem storage backend.
///
/// # Examples
///
/// ```no_run
/// use mediaport_storage::backend::{LocalBackend, StorageBackend};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("local");
/// let info = backend.stat(Path::new("/media/DCIM/IMG_0001.JPG")).unwrap();
/// println!("{} bytes", info.size);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalBackend {
    name: String,
}
impl LocalBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Re-use same data collection from file metadata for both list and stat functions
    fn metadata(path: &Path, metadata: &Metadata) -> Result<FileInfo> {
        let modified = metadata.modified().map_err(|e| ErrorKind::from_io(e, path))?.into();
        Ok(FileInfo::new(path, metadata.len(), modified))
    }
}
impl Default for LocalBackend {
    fn default() -> Self {
        Self::new("local")
    }
}

impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list(&self, dir: &Path) -> Result<Vec<FileInfo>> {
        let entries = fs::read_dir(dir).map_err(|e| ErrorKind::from_io(e, dir))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ErrorKind::from_io(e, dir))?;
            let path = entry.path();
            // Follows symlinks, so a link to a regular file is listed as a file.
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                // Note: silently drop what is most likely a broken symlink.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => exn::bail!(ErrorKind::from_io(e, &path)),
            };
            if metadata.is_file() {
                files.push(Self::metadata(&path, &metadata)?);
            }
        }
        Ok(files)
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(fs::exists(path).map_err(|e| ErrorKind::from_io(e, path))?)
    }

    fn is_dir(&self, path: &Path) -> Result<bool> {
        match fs::metadata(path) {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => exn::bail!(ErrorKind::from_io(e, path)),
        }
    }

    fn stat(&self, path: &Path) -> Result<FileInfo> {
        let metadata = fs::metadata(path).map_err(|e| ErrorKind::from_io(e, path))?;
        Self::metadata(path, &metadata)
    }

    fn reader(&self, path: &Path) -> Result<BoxReader> {
        let file = File::open(path).map_err(|e| ErrorKind::from_io(e, path))?;
        Ok(Box::new(file))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        // Stat the source first so that a missing source is reported against
        // the source path, not the destination.
        let metadata = fs::metadata(from).map_err(|e| ErrorKind::from_io(e, from))?;
        let bytes = fs::copy(from, to).map_err(|e| ErrorKind::from_io(e, to))?;
        let accessed = FileTime::from_last_access_time(&metadata);
        let modified = FileTime::from_last_modification_time(&metadata);
        filetime::set_file_times(to, accessed, modified).map_err(|e| ErrorKind::from_io(e, to))?;
        tracing::trace!(from = %from.display(), to = %to.display(), bytes, "Copied file");
        Ok(bytes)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        Ok(fs::create_dir_all(path).map_err(|e| ErrorKind::from_io(e, path))?)
    }
}
