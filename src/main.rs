//! `mediaport`: copy photos or videos off a card into a date-structured
//! library, skipping what has already been imported.

mod error;
mod logging;
mod progress;
mod run;

use clap::Parser;
use mediaport_compare::ComparisonMode;
use mediaport_library::{FileType, Strategy};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Directory to import from, e.g. a mounted memory card.
    #[arg(short, long)]
    pub source: PathBuf,
    /// Library root to import into; created when missing.
    #[arg(short, long)]
    pub destination: PathBuf,
    /// Which media to import.
    #[arg(short, long, value_enum)]
    pub filetype: Option<FileType>,
    /// What to do when the destination file already exists.
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,
    /// How existing files are compared with the one being imported.
    #[arg(short = 'm', long, value_enum)]
    pub comparison_mode: Option<ComparisonMode>,
    /// Treat existing destination files as different without comparing them.
    #[arg(long)]
    pub force: bool,
    /// Decide everything but copy nothing.
    #[arg(short = 'n', long)]
    pub dry_run: bool,
    /// Destination folder template, e.g. "{{ year }}/{{ month }}".
    #[arg(short, long)]
    pub template: Option<String>,
    /// Configuration file, instead of the one in the platform config directory.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Log debug output.
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let bar = progress::hidden();
    logging::init(cli.verbose, bar.clone());

    match run::run(&cli, &bar) {
        Ok(summary) => {
            bar.finish_and_clear();
            if summary.failed > 0 {
                tracing::error!(%summary, "Import finished with failures");
                ExitCode::FAILURE
            } else {
                tracing::info!(%summary, "Import finished");
                ExitCode::SUCCESS
            }
        },
        Err(e) => {
            bar.finish_and_clear();
            tracing::error!("{e:?}");
            ExitCode::FAILURE
        },
    }
}
