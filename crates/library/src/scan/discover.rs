use crate::scan::FileType;
use mediaport_storage::error::Result;
use mediaport_storage::{FileInfo, StorageBackend};
use std::path::Path;
use tracing::instrument;

/// Prefix of the AppleDouble companion files macOS leaves on non-HFS volumes.
const APPLE_DOUBLE_PREFIX: &str = "._";

/// List the files of `filetype` directly inside `dir`, sorted by path.
///
/// AppleDouble files (`._IMG_0001.JPG`) are skipped even though their
/// extension matches.
#[instrument(skip_all, fields(dir = %dir.display(), filetype = %filetype))]
pub fn discover(backend: &dyn StorageBackend, dir: &Path, filetype: FileType) -> Result<Vec<FileInfo>> {
    let mut files: Vec<FileInfo> = backend
        .list(dir)?
        .into_iter()
        .filter(|file| filetype.matches(&file.path))
        .filter(|file| !file.file_name().is_some_and(|name| name.starts_with(APPLE_DOUBLE_PREFIX)))
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(count = files.len(), "Discovered files");
    Ok(files)
}
