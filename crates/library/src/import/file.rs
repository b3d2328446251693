use crate::Context;
use crate::date::capture_date;
use crate::import::Outcome;
use crate::import::conflict::resolve;
use crate::import::error::{ErrorKind, Result};
use exn::ResultExt;
use mediaport_storage::{FileInfo, StorageBackend};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Work out (and create) the folder below `root` that `file` belongs in.
///
/// # Errors
/// - [`ErrorKind::Date`] when the file cannot be opened to read its capture date.
/// - [`ErrorKind::Template`] when the template renders an unusable path.
/// - [`ErrorKind::Folder`] when the folder cannot be created.
pub fn destination_folder(backend: &dyn StorageBackend, ctx: &Context, root: &Path, file: &FileInfo) -> Result<PathBuf> {
    let date = capture_date(backend, file, ctx.filetype).or_raise(|| ErrorKind::Date(file.path.clone()))?;
    tracing::debug!(taken = %date.taken, source = ?date.source, "Determined capture date");
    let relative = ctx.template.generate(date.taken, ctx.filetype).or_raise(|| ErrorKind::Template)?;
    let folder = root.join(relative);
    backend.create_dir_all(&folder).or_raise(|| ErrorKind::Folder(folder.clone()))?;
    Ok(folder)
}

/// Import a single file into the library rooted at `root`.
///
/// A file whose folder cannot be determined or created never reaches the
/// conflict resolution.
#[instrument(skip_all, fields(path = %file.path.display()))]
pub fn import_file(backend: &dyn StorageBackend, ctx: &Context, root: &Path, file: &FileInfo) -> Result<Outcome> {
    let folder = destination_folder(backend, ctx, root, file)?;
    resolve(backend, ctx, &file.path, &folder)
}
