//! Importing media into the library.
//!
//! Each discovered file is dated, given a destination folder from the
//! [`PathGenerator`](crate::PathGenerator), and then copied. When a file with
//! the same name already exists in that folder the configured [`Strategy`]
//! decides what happens, using the [`Comparator`](mediaport_compare::Comparator)
//! where the strategy needs to know whether both files are the same.
//!
//! The primary entry point is [`import`], which yields an [`ImportEvent`] per
//! file. The building blocks ([`resolve`], [`copy_file`], the individual
//! strategies and [`destination_folder`]) are public for callers that drive
//! files one at a time.

mod conflict;
pub mod error;
mod file;
mod stream;

pub use self::conflict::{copy_file, resolve, resolve_only_new, resolve_rename, resolve_replace};
pub use self::file::{destination_folder, import_file};
pub use self::stream::{ImportEvent, import};

use crate::error::{Error as LibraryError, ErrorKind as LibraryErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What to do when the destination file already exists.
///
/// Defaults to [`OnlyNew`](Self::OnlyNew).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Strategy {
    /// Overwrite the existing file, but only when both files are the same
    /// (or unconditionally in force mode).
    Replace,
    /// Never overwrite; report whether the existing file matches.
    #[default]
    #[cfg_attr(feature = "cli", value(name = "onlynew"))]
    OnlyNew,
    /// Keep both, copying the incoming file under the first free
    /// `<stem>_NN<.ext>` name.
    Rename,
}

impl Strategy {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Replace => "replace",
            Strategy::OnlyNew => "onlynew",
            Strategy::Rename => "rename",
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = LibraryError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(Strategy::Replace),
            "onlynew" | "only-new" | "only_new" => Ok(Strategy::OnlyNew),
            "rename" => Ok(Strategy::Rename),
            _ => exn::bail!(LibraryErrorKind::UnsupportedStrategy(s.to_string())),
        }
    }
}

/// The outcome of (successfully) handling a single file.
///
/// Each variant carries the destination path the decision was made about.
/// Failures are the `Err` arm of the surrounding result instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The file was copied to this path.
    Copied(PathBuf),
    /// The file was not copied; the destination already holds the same
    /// content (or force mode skipped the check).
    Skipped(PathBuf),
    /// The file was not copied; the destination holds different content
    /// under the same name.
    SkippedMismatch(PathBuf),
}
impl Outcome {
    /// The destination path this outcome refers to.
    pub fn path(&self) -> &Path {
        match self {
            Outcome::Copied(path) | Outcome::Skipped(path) | Outcome::SkippedMismatch(path) => path,
        }
    }
}
