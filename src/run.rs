//! One import run, from configuration to summary.

use crate::Cli;
use crate::error::{ErrorKind, Result};
use crate::progress;
use exn::ResultExt;
use indicatif::ProgressBar;
use mediaport_config::Config;
use mediaport_library::error::ErrorKind as LibraryErrorKind;
use mediaport_library::import::{ImportEvent, import};
use mediaport_library::{Context, Outcome, PathGenerator, validate_directories};
use mediaport_storage::BackendHandle;
use mediaport_storage::backend::{LocalBackend, ReadOnlyBackend};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{self, Path, PathBuf};
use std::sync::Arc;

/// Per-outcome counts of a finished run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub copied: u64,
    pub skipped: u64,
    pub mismatched: u64,
    pub failed: u64,
}
impl Summary {
    fn record(&mut self, source: &Path, outcome: &Outcome) {
        match outcome {
            Outcome::Copied(destination) => {
                self.copied += 1;
                tracing::info!(source = %source.display(), destination = %destination.display(), "Copied");
            },
            Outcome::Skipped(destination) => {
                self.skipped += 1;
                tracing::info!(source = %source.display(), destination = %destination.display(), "Skipped, already imported");
            },
            Outcome::SkippedMismatch(destination) => {
                self.mismatched += 1;
                tracing::warn!(
                    source = %source.display(),
                    destination = %destination.display(),
                    "Skipped, a different file with the same name exists"
                );
            },
        }
    }
}
impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} copied, {} skipped, {} mismatched, {} failed",
            self.copied, self.skipped, self.mismatched, self.failed
        )
    }
}

/// Merge the command-line flags over the loaded configuration.
fn configure(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    if let Some(filetype) = cli.filetype {
        config.filetype = filetype;
    }
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    if let Some(mode) = cli.comparison_mode {
        config.comparison_mode = mode;
    }
    if let Some(template) = &cli.template {
        config.template = template.clone();
    }
    config.force |= cli.force;
    Ok(config)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    path::absolute(path).or_raise(|| ErrorKind::Path(path.to_path_buf()))
}

/// Import everything the command line asks for.
///
/// Files that fail are logged and counted; only problems that make the whole
/// run pointless are returned as errors.
pub fn run(cli: &Cli, bar: &ProgressBar) -> Result<Summary> {
    let config = configure(cli)?;
    let ctx = Context {
        filetype: config.filetype,
        strategy: config.strategy,
        mode: config.comparison_mode,
        comparator: config.comparator(),
        force: config.force,
        template: config.template.parse::<PathGenerator>().or_raise(|| ErrorKind::Template)?,
    };
    let source = absolute(&cli.source)?;
    let destination = absolute(&cli.destination)?;

    let local: BackendHandle = Arc::new(LocalBackend::default());
    let backend: BackendHandle = if cli.dry_run {
        tracing::info!("Dry run, nothing will be written");
        Arc::new(ReadOnlyBackend::new(local))
    } else {
        local
    };
    validate_directories(&*backend, &source, &destination).or_raise(|| ErrorKind::Directories)?;

    let mut summary = Summary::default();
    for event in import(&*backend, &ctx, &source, &destination) {
        match event {
            Ok(ImportEvent::Started) => {},
            Ok(ImportEvent::DiscoveryComplete(total)) => {
                tracing::info!(total, "Discovered files");
                progress::start(bar, total);
            },
            Ok(ImportEvent::Imported { source, outcome }) => {
                summary.record(&source, &outcome);
                bar.inc(1);
            },
            Ok(ImportEvent::Complete) => bar.finish_and_clear(),
            Err(e) if matches!(&*e, LibraryErrorKind::Import(_)) => {
                tracing::error!("{e:?}");
                summary.failed += 1;
                bar.inc(1);
            },
            Err(e) => return Err(e).or_raise(|| ErrorKind::Import),
        }
    }
    Ok(summary)
}
