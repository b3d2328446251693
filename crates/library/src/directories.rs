use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use mediaport_storage::StorageBackend;
use std::path::Path;

/// Check that `source` is an existing directory and make sure `destination`
/// is one, creating it (and its parents) when missing.
pub fn validate_directories(backend: &dyn StorageBackend, source: &Path, destination: &Path) -> Result<()> {
    if !backend.is_dir(source).or_raise(|| ErrorKind::Source(source.to_path_buf()))? {
        exn::bail!(ErrorKind::Source(source.to_path_buf()));
    }
    if !backend.exists(destination).or_raise(|| ErrorKind::Destination(destination.to_path_buf()))? {
        tracing::info!(path = %destination.display(), "Creating destination directory");
        backend.create_dir_all(destination).or_raise(|| ErrorKind::Destination(destination.to_path_buf()))?;
    } else if !backend.is_dir(destination).or_raise(|| ErrorKind::Destination(destination.to_path_buf()))? {
        exn::bail!(ErrorKind::Destination(destination.to_path_buf()));
    }
    Ok(())
}
