//! Tiered file equality.
//!
//! Deciding whether two media files are "the same" is done cheapest first,
//! stopping at the first difference:
//!
//! 1. **Size**: files of different length are never equal, and neither file
//!    is opened.
//! 2. **Partial** ([`ComparisonMode::Partial`]): the first and last chunk of
//!    both files are compared byte for byte. This is a heuristic: two files
//!    that only differ somewhere in the middle are reported as equal. Camera
//!    files that share a name and size but differ only in their middle bytes
//!    are rare enough that this is the default.
//! 3. **Full** ([`ComparisonMode::Full`]): a streaming BLAKE3 digest of each
//!    file. Exact, but reads everything.
//!
//! All file access goes through a [`StorageBackend`](mediaport_storage::StorageBackend).

mod comparator;
mod construct;
pub mod error;
mod util;

pub use crate::comparator::Comparator;

/// How thoroughly two files of equal size are compared.
///
/// Selected once per run. Defaults to [`Partial`](Self::Partial).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ComparisonMode {
    /// Hash the entire contents of both files
    Full,
    /// Compare only the leading and trailing chunk of both files
    #[default]
    Partial,
}
