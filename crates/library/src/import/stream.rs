use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::import::Outcome;
use crate::import::file::import_file;
use crate::scan::discover;
use exn::ResultExt;
use mediaport_storage::{FileInfo, StorageBackend};
use std::path::{Path, PathBuf};
use std::vec::IntoIter;

/// Progress events emitted by [`import`] as it works through the source
/// directory.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete): exactly once, with the
///    total file count.
/// 3. [`Imported`](Self::Imported): zero or more times, one per file.
/// 4. [`Complete`](Self::Complete): exactly once, signalling the run is
///    finished.
///
/// A discovery error terminates the iterator early, in which case
/// [`Complete`](Self::Complete) is never emitted.
#[derive(Debug, PartialEq, Eq)]
pub enum ImportEvent {
    /// Importing has begun; emitted exactly once before any other event.
    Started,
    /// The source directory has been listed; the total count is now known.
    DiscoveryComplete(u64),
    /// A file has been handled.
    Imported { source: PathBuf, outcome: Outcome },
    /// All discovered files have been handled.
    Complete,
}

/// Iterate over [`ImportEvent`]s for every file of the [`Context`]'s file type
/// in `source`, importing each one into `destination`.
///
/// Files are handled one at a time, in path order, and only when the next
/// event is pulled: dropping the iterator between files stops the run.
///
/// Individual file failures are surfaced as `Err` items
/// ([`Import`](LibraryErrorKind::Import)) without terminating the iterator.
/// Only a discovery failure ([`Discover`](LibraryErrorKind::Discover)) is fatal.
pub fn import<'a>(
    backend: &'a dyn StorageBackend,
    ctx: &'a Context,
    source: &'a Path,
    destination: &'a Path,
) -> impl Iterator<Item = LibraryResult<ImportEvent>> + 'a {
    Import { backend, ctx, source, destination, state: State::Start }
}

enum State {
    Start,
    Discover,
    Files(IntoIter<FileInfo>),
    Done,
}

struct Import<'a> {
    backend: &'a dyn StorageBackend,
    ctx: &'a Context,
    source: &'a Path,
    destination: &'a Path,
    state: State,
}

impl Iterator for Import<'_> {
    type Item = LibraryResult<ImportEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.state, State::Done) {
            State::Start => {
                tracing::info!(
                    source = %self.source.display(),
                    destination = %self.destination.display(),
                    filetype = %self.ctx.filetype,
                    strategy = %self.ctx.strategy,
                    mode = %self.ctx.mode,
                    force = self.ctx.force,
                    "Starting import"
                );
                self.state = State::Discover;
                Some(Ok(ImportEvent::Started))
            },
            State::Discover => match discover(self.backend, self.source, self.ctx.filetype) {
                Ok(files) => {
                    // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
                    let count = u64::try_from(files.len()).unwrap_or(u64::MAX);
                    self.state = State::Files(files.into_iter());
                    Some(Ok(ImportEvent::DiscoveryComplete(count)))
                },
                Err(e) => Some(Err::<ImportEvent, _>(e).or_raise(|| LibraryErrorKind::Discover(self.source.to_path_buf()))),
            },
            State::Files(mut files) => match files.next() {
                Some(file) => {
                    let result = import_file(self.backend, self.ctx, self.destination, &file)
                        .map(|outcome| ImportEvent::Imported { source: file.path.clone(), outcome })
                        .or_raise(|| LibraryErrorKind::Import(file.path.clone()));
                    self.state = State::Files(files);
                    Some(result)
                },
                None => Some(Ok(ImportEvent::Complete)),
            },
            State::Done => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::tests::jpeg_with_exif;
    use crate::import::Strategy;
    use crate::{DEFAULT_TEMPLATE, PathGenerator};
    use filetime::FileTime;
    use mediaport_storage::backend::{LocalBackend, MockBackend};
    use std::fs;
    use std::ops::Deref;

    fn context(strategy: Strategy) -> Context {
        let mut ctx = Context::new(DEFAULT_TEMPLATE.parse::<PathGenerator>().unwrap());
        ctx.strategy = strategy;
        ctx
    }

    fn outcomes(events: Vec<LibraryResult<ImportEvent>>) -> Vec<Outcome> {
        events
            .into_iter()
            .filter_map(|event| match event {
                Ok(ImportEvent::Imported { outcome, .. }) => Some(outcome),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_end_to_end() {
        let card = tempfile::tempdir().unwrap();
        let library = tempfile::tempdir().unwrap();
        fs::write(card.path().join("IMG_0001.JPG"), jpeg_with_exif("2023:05:15 12:30:45")).unwrap();
        fs::write(card.path().join("IMG_0002.jpg"), jpeg_with_exif("2023:06:01 08:00:00")).unwrap();
        fs::write(card.path().join("._IMG_0001.JPG"), b"apple").unwrap();
        fs::write(card.path().join("GX010001.MP4"), b"frames").unwrap();
        let mtime = FileTime::from_unix_time(1_684_153_845, 0);
        filetime::set_file_mtime(card.path().join("IMG_0001.JPG"), mtime).unwrap();

        let backend = LocalBackend::default();
        let ctx = context(Strategy::OnlyNew);
        let events: Vec<_> = import(&backend, &ctx, card.path(), library.path()).collect();
        assert_eq!(events.len(), 5);
        assert_eq!(*events[0].as_ref().unwrap(), ImportEvent::Started);
        assert_eq!(*events[1].as_ref().unwrap(), ImportEvent::DiscoveryComplete(2));
        assert_eq!(*events[4].as_ref().unwrap(), ImportEvent::Complete);
        let first = library.path().join("2023/May/15/IMG_0001.JPG");
        let second = library.path().join("2023/June/01/IMG_0002.jpg");
        assert_eq!(outcomes(events), [Outcome::Copied(first.clone()), Outcome::Copied(second.clone())]);
        assert_eq!(FileTime::from_last_modification_time(&fs::metadata(&first).unwrap()), mtime);
        assert!(second.is_file());

        // A second run finds everything already there.
        let events: Vec<_> = import(&backend, &ctx, card.path(), library.path()).collect();
        assert_eq!(outcomes(events), [Outcome::Skipped(first), Outcome::Skipped(second)]);
    }

    #[test]
    fn test_rename_on_second_run() {
        let card = tempfile::tempdir().unwrap();
        let library = tempfile::tempdir().unwrap();
        fs::write(card.path().join("IMG_0001.JPG"), jpeg_with_exif("2023:05:15 12:30:45")).unwrap();

        let backend = LocalBackend::default();
        let ctx = context(Strategy::Rename);
        assert_eq!(import(&backend, &ctx, card.path(), library.path()).filter(Result::is_ok).count(), 4);
        let events: Vec<_> = import(&backend, &ctx, card.path(), library.path()).collect();
        let renamed = library.path().join("2023/May/15/IMG_0001_02.JPG");
        assert_eq!(outcomes(events), [Outcome::Copied(renamed.clone())]);
        assert!(renamed.is_file());
    }

    #[test]
    fn test_failed_file_does_not_stop_the_run() {
        let backend = MockBackend::with_files([
            ("/card/IMG_0001.JPG", jpeg_with_exif("2023:05:15 12:30:45")),
            ("/card/IMG_0002.JPG", jpeg_with_exif("2023:05:15 12:31:00")),
        ])
        .with_unreadable("/card/IMG_0001.JPG");
        let ctx = context(Strategy::OnlyNew);
        let mut events = import(&backend, &ctx, Path::new("/card"), Path::new("/library"));

        assert_eq!(events.next().unwrap().unwrap(), ImportEvent::Started);
        assert_eq!(events.next().unwrap().unwrap(), ImportEvent::DiscoveryComplete(2));
        let err = events.next().unwrap().unwrap_err();
        assert!(matches!(err.deref(), LibraryErrorKind::Import(p) if *p == Path::new("/card/IMG_0001.JPG")));
        assert_eq!(
            events.next().unwrap().unwrap(),
            ImportEvent::Imported {
                source: "/card/IMG_0002.JPG".into(),
                outcome: Outcome::Copied("/library/2023/May/15/IMG_0002.JPG".into()),
            }
        );
        assert_eq!(events.next().unwrap().unwrap(), ImportEvent::Complete);
        assert!(events.next().is_none());
    }

    #[test]
    fn test_discovery_failure_ends_the_run() {
        let backend = MockBackend::default();
        let ctx = context(Strategy::OnlyNew);
        let mut events = import(&backend, &ctx, Path::new("/card"), Path::new("/library"));
        assert_eq!(events.next().unwrap().unwrap(), ImportEvent::Started);
        let err = events.next().unwrap().unwrap_err();
        assert!(matches!(err.deref(), LibraryErrorKind::Discover(_)));
        assert!(events.next().is_none());
    }

    #[test]
    fn test_stopping_between_files() {
        let backend = MockBackend::with_files([
            ("/card/IMG_0001.JPG", jpeg_with_exif("2023:05:15 12:30:45")),
            ("/card/IMG_0002.JPG", jpeg_with_exif("2023:05:15 12:31:00")),
        ]);
        let ctx = context(Strategy::OnlyNew);
        let handled = import(&backend, &ctx, Path::new("/card"), Path::new("/library")).take(3).count();
        assert_eq!(handled, 3);
        assert!(backend.exists(Path::new("/library/2023/May/15/IMG_0001.JPG")).unwrap());
        assert!(!backend.exists(Path::new("/library/2023/May/15/IMG_0002.JPG")).unwrap());
    }
}
