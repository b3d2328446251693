use crate::Context;
use crate::import::error::{ErrorKind, Result};
use crate::import::{Outcome, Strategy};
use exn::{OptionExt, ResultExt};
use mediaport_storage::StorageBackend;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// The first suffix tried by [`resolve_rename`]: `IMG_0001_02.JPG`.
const FIRST_RENAME_SUFFIX: u64 = 2;

/// Copy `source` into `folder`, letting the [`Context`]'s [`Strategy`] decide
/// when a file of the same name is already there.
///
/// A free destination is always a plain [`copy_file`].
#[instrument(skip_all, fields(source = %source.display(), strategy = %ctx.strategy))]
pub fn resolve(backend: &dyn StorageBackend, ctx: &Context, source: &Path, folder: &Path) -> Result<Outcome> {
    let destination = folder.join(file_name(source)?);
    let occupied = backend.exists(&destination).or_raise(|| ErrorKind::Copy {
        source: source.to_path_buf(),
        destination: destination.clone(),
    })?;
    if !occupied {
        return copy_file(backend, source, &destination);
    }
    tracing::debug!(destination = %destination.display(), "Destination already exists");
    match ctx.strategy {
        Strategy::Replace => resolve_replace(backend, ctx, source, &destination),
        Strategy::OnlyNew => resolve_only_new(backend, ctx, source, &destination),
        Strategy::Rename => resolve_rename(backend, source, folder),
    }
}

/// Overwrite `destination` with `source`, but only if both files are the same
/// according to the [`Context`]'s comparison mode.
///
/// In force mode the comparison is skipped and the destination is always
/// overwritten. Different content yields [`Outcome::SkippedMismatch`] and
/// nothing is written.
///
/// # Errors
/// A failed comparison is [`ErrorKind::Compare`], never "different".
pub fn resolve_replace(
    backend: &dyn StorageBackend,
    ctx: &Context,
    source: &Path,
    destination: &Path,
) -> Result<Outcome> {
    if !ctx.force && !same(backend, ctx, source, destination)? {
        return Ok(Outcome::SkippedMismatch(destination.to_path_buf()));
    }
    copy_file(backend, source, destination)
}

/// Never write: report whether the existing `destination` matches `source`.
///
/// Force mode skips without comparing.
pub fn resolve_only_new(
    backend: &dyn StorageBackend,
    ctx: &Context,
    source: &Path,
    destination: &Path,
) -> Result<Outcome> {
    if ctx.force || same(backend, ctx, source, destination)? {
        Ok(Outcome::Skipped(destination.to_path_buf()))
    } else {
        Ok(Outcome::SkippedMismatch(destination.to_path_buf()))
    }
}

/// Copy `source` into `folder` under its own name or, when taken, under the
/// first free `<stem>_NN<.ext>` name counting up from `_02`.
///
/// Never compares contents: an identical file already in `folder` still gets
/// a renamed copy. There is no upper bound; past `_99` the suffix simply grows
/// to three digits.
///
/// ```
/// use mediaport_library::Outcome;
/// use mediaport_library::import::resolve_rename;
/// use mediaport_storage::backend::MockBackend;
/// use std::path::Path;
///
/// let backend = MockBackend::with_files([
///     ("/card/IMG_0001.JPG", b"new".as_slice()),
///     ("/library/IMG_0001.JPG", b"old".as_slice()),
///     ("/library/IMG_0001_02.JPG", b"older".as_slice()),
/// ]);
/// let outcome = resolve_rename(&backend, Path::new("/card/IMG_0001.JPG"), Path::new("/library")).unwrap();
/// assert_eq!(outcome, Outcome::Copied("/library/IMG_0001_03.JPG".into()));
/// ```
pub fn resolve_rename(backend: &dyn StorageBackend, source: &Path, folder: &Path) -> Result<Outcome> {
    let name = file_name(source)?;
    let mut candidate = folder.join(&name);
    let stem = Path::new(&name).file_stem().map(OsString::from).unwrap_or_default();
    let extension = Path::new(&name).extension().map(OsString::from);
    let mut suffix = FIRST_RENAME_SUFFIX;
    loop {
        let taken = backend.exists(&candidate).or_raise(|| ErrorKind::Copy {
            source: source.to_path_buf(),
            destination: candidate.clone(),
        })?;
        if !taken {
            return copy_file(backend, source, &candidate);
        }
        let mut renamed = stem.clone();
        renamed.push(format!("_{suffix:02}"));
        if let Some(extension) = &extension {
            renamed.push(".");
            renamed.push(extension);
        }
        candidate = folder.join(renamed);
        suffix += 1;
    }
}

/// Copy `source` over `destination`, keeping its timestamps.
///
/// The destination's folder must already exist.
pub fn copy_file(backend: &dyn StorageBackend, source: &Path, destination: &Path) -> Result<Outcome> {
    backend.copy(source, destination).or_raise(|| ErrorKind::Copy {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
    })?;
    Ok(Outcome::Copied(destination.to_path_buf()))
}

fn same(backend: &dyn StorageBackend, ctx: &Context, source: &Path, destination: &Path) -> Result<bool> {
    ctx.comparator.files_are_equal(backend, source, destination, ctx.mode).or_raise(|| ErrorKind::Compare {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
    })
}

fn file_name(source: &Path) -> Result<OsString> {
    source.file_name().map(OsString::from).ok_or_raise(|| ErrorKind::Copy {
        source: source.to_path_buf(),
        destination: PathBuf::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEFAULT_TEMPLATE, PathGenerator};
    use mediaport_compare::ComparisonMode;
    use mediaport_storage::backend::{LocalBackend, MockBackend};
    use rstest::rstest;
    use std::fs;
    use std::ops::Deref;

    const SOURCE: &str = "/card/IMG_0001.JPG";
    const DESTINATION: &str = "/library/IMG_0001.JPG";

    fn context(strategy: Strategy, force: bool) -> Context {
        let mut ctx = Context::new(DEFAULT_TEMPLATE.parse::<PathGenerator>().unwrap());
        ctx.strategy = strategy;
        ctx.force = force;
        ctx
    }

    fn mock(source: &[u8], destination: &[u8]) -> MockBackend {
        MockBackend::with_files([(SOURCE, source), (DESTINATION, destination)])
    }

    #[rstest]
    #[case(false, b"pixels", Outcome::Copied(DESTINATION.into()), b"pixels")]
    #[case(false, b"PIXELS", Outcome::SkippedMismatch(DESTINATION.into()), b"PIXELS")]
    #[case(false, b"longer pixels", Outcome::SkippedMismatch(DESTINATION.into()), b"longer pixels")]
    #[case(true, b"PIXELS", Outcome::Copied(DESTINATION.into()), b"pixels")]
    fn test_replace(
        #[case] force: bool,
        #[case] existing: &[u8],
        #[case] expected: Outcome,
        #[case] contents: &[u8],
    ) {
        let backend = mock(b"pixels", existing);
        let ctx = context(Strategy::Replace, force);
        let outcome = resolve_replace(&backend, &ctx, Path::new(SOURCE), Path::new(DESTINATION)).unwrap();
        assert_eq!(outcome, expected);
        assert_eq!(backend.contents(Path::new(DESTINATION)).unwrap(), contents);
    }

    #[test]
    fn test_replace_force_never_compares() {
        let backend = mock(b"pixels", b"PIXELS");
        let ctx = context(Strategy::Replace, true);
        resolve_replace(&backend, &ctx, Path::new(SOURCE), Path::new(DESTINATION)).unwrap();
        assert_eq!(backend.opened(), 0);
    }

    #[test]
    fn test_replace_comparison_failure_is_not_a_mismatch() {
        let backend = mock(b"pixels", b"pixels").with_unreadable(DESTINATION);
        let ctx = context(Strategy::Replace, false);
        let err = resolve_replace(&backend, &ctx, Path::new(SOURCE), Path::new(DESTINATION)).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Compare { source, destination }
            if *source == Path::new(SOURCE) && *destination == Path::new(DESTINATION)));
        assert_eq!(backend.contents(Path::new(DESTINATION)).unwrap(), b"pixels");
    }

    #[rstest]
    #[case(false, b"pixels", Outcome::Skipped(DESTINATION.into()))]
    #[case(false, b"PIXELS", Outcome::SkippedMismatch(DESTINATION.into()))]
    #[case(true, b"PIXELS", Outcome::Skipped(DESTINATION.into()))]
    fn test_only_new(#[case] force: bool, #[case] existing: &[u8], #[case] expected: Outcome) {
        let backend = mock(b"pixels", existing);
        let ctx = context(Strategy::OnlyNew, force);
        let outcome = resolve_only_new(&backend, &ctx, Path::new(SOURCE), Path::new(DESTINATION)).unwrap();
        assert_eq!(outcome, expected);
        // Never writes.
        assert_eq!(backend.contents(Path::new(DESTINATION)).unwrap(), existing);
    }

    #[test]
    fn test_only_new_force_never_compares() {
        let backend = mock(b"pixels", b"PIXELS");
        resolve_only_new(&backend, &context(Strategy::OnlyNew, true), Path::new(SOURCE), Path::new(DESTINATION))
            .unwrap();
        assert_eq!(backend.opened(), 0);
    }

    #[test]
    fn test_only_new_missing_destination() {
        let backend = MockBackend::with_files([(SOURCE, b"pixels".as_slice())]);
        let ctx = context(Strategy::OnlyNew, false);
        let err = resolve_only_new(&backend, &ctx, Path::new(SOURCE), Path::new(DESTINATION)).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Compare { .. }));
    }

    #[test]
    fn test_partial_mode_heuristic_applies_to_replace() {
        let chunk = std::num::NonZeroUsize::new(4).unwrap();
        let backend = mock(b"HEADxxAxTAIL", b"HEADxxBxTAIL");
        let mut ctx = context(Strategy::Replace, false);
        ctx.comparator = ctx.comparator.with_partial_chunk_size(chunk);
        let outcome = resolve_replace(&backend, &ctx, Path::new(SOURCE), Path::new(DESTINATION)).unwrap();
        assert_eq!(outcome, Outcome::Copied(DESTINATION.into()));

        let backend = mock(b"HEADxxAxTAIL", b"HEADxxBxTAIL");
        ctx.mode = ComparisonMode::Full;
        let outcome = resolve_replace(&backend, &ctx, Path::new(SOURCE), Path::new(DESTINATION)).unwrap();
        assert_eq!(outcome, Outcome::SkippedMismatch(DESTINATION.into()));
    }

    #[test]
    fn test_rename_free_name() {
        let backend = MockBackend::with_files([(SOURCE, b"pixels".as_slice())]);
        backend.create_dir_all(Path::new("/library")).unwrap();
        let outcome = resolve_rename(&backend, Path::new(SOURCE), Path::new("/library")).unwrap();
        assert_eq!(outcome, Outcome::Copied(DESTINATION.into()));
    }

    #[test]
    fn test_rename_never_compares() {
        let backend = mock(b"pixels", b"pixels");
        let outcome = resolve_rename(&backend, Path::new(SOURCE), Path::new("/library")).unwrap();
        assert_eq!(outcome, Outcome::Copied("/library/IMG_0001_02.JPG".into()));
        assert_eq!(backend.opened(), 0);
        assert_eq!(backend.contents(Path::new(DESTINATION)).unwrap(), b"pixels");
    }

    #[test]
    fn test_rename_grows_past_two_digits() {
        let mut files = vec![(SOURCE.to_string(), b"new".to_vec()), (DESTINATION.to_string(), b"old".to_vec())];
        files.extend((2..=99).map(|i| (format!("/library/IMG_0001_{i:02}.JPG"), b"old".to_vec())));
        let backend = MockBackend::with_files(files);
        let outcome = resolve_rename(&backend, Path::new(SOURCE), Path::new("/library")).unwrap();
        assert_eq!(outcome, Outcome::Copied("/library/IMG_0001_100.JPG".into()));
    }

    #[rstest]
    #[case("/card/clip", "/library/clip_02")]
    #[case("/card/archive.tar.gz", "/library/archive.tar_02.gz")]
    fn test_rename_extensions(#[case] source: &str, #[case] expected: &str) {
        let name = Path::new(source).file_name().unwrap().to_str().unwrap();
        let backend = MockBackend::with_files([
            (source.to_string(), b"new".to_vec()),
            (format!("/library/{name}"), b"old".to_vec()),
        ]);
        let outcome = resolve_rename(&backend, Path::new(source), Path::new("/library")).unwrap();
        assert_eq!(outcome, Outcome::Copied(expected.into()));
    }

    #[rstest]
    #[case(Strategy::Replace, Outcome::Copied(DESTINATION.into()))]
    #[case(Strategy::OnlyNew, Outcome::Skipped(DESTINATION.into()))]
    #[case(Strategy::Rename, Outcome::Copied("/library/IMG_0001_02.JPG".into()))]
    fn test_resolve_dispatches_on_conflict(#[case] strategy: Strategy, #[case] expected: Outcome) {
        let backend = mock(b"pixels", b"pixels");
        let outcome = resolve(&backend, &context(strategy, false), Path::new(SOURCE), Path::new("/library")).unwrap();
        assert_eq!(outcome, expected);
    }

    #[rstest]
    #[case(Strategy::Replace)]
    #[case(Strategy::OnlyNew)]
    #[case(Strategy::Rename)]
    fn test_resolve_copies_when_free(#[case] strategy: Strategy) {
        let backend = MockBackend::with_files([(SOURCE, b"pixels".as_slice())]);
        backend.create_dir_all(Path::new("/library")).unwrap();
        let outcome = resolve(&backend, &context(strategy, false), Path::new(SOURCE), Path::new("/library")).unwrap();
        assert_eq!(outcome, Outcome::Copied(DESTINATION.into()));
        assert_eq!(backend.opened(), 0);
    }

    #[test]
    fn test_copy_file_failure_keeps_paths() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("IMG_0001.JPG");
        fs::write(&source, b"pixels").unwrap();
        let destination = temp_dir.path().join("2023/May/15/IMG_0001.JPG");
        let err = copy_file(&LocalBackend::default(), &source, &destination).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Copy { source: s, destination: d } if *s == source && *d == destination));
    }
}
