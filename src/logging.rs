//! Log output.
//!
//! Log lines go to stderr through the progress bar, which hides itself while a
//! line is written so the two never interleave.

use indicatif::ProgressBar;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Writes to stderr with the progress bar suspended.
#[derive(Clone)]
pub struct ProgressWriter {
    bar: ProgressBar,
}
impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bar.suspend(|| io::stderr().write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}
impl<'a> MakeWriter<'a> for ProgressWriter {
    type Writer = ProgressWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install the global subscriber.
///
/// `info` by default, `debug` when verbose; `RUST_LOG` overrides both.
pub fn init(verbose: bool, bar: ProgressBar) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(ProgressWriter { bar })
        .init();
}
