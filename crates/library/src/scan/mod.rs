//! Media discovery.
//!
//! Only the top level of the source directory is considered, and only files
//! whose extension belongs to the selected [`FileType`].

mod discover;

pub use self::discover::discover;

use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "lrf", "mov"];

/// The kind of media imported in one run. Defaults to [`Image`](Self::Image).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FileType {
    /// JPEG photos (.jpg, .jpeg)
    #[default]
    Image,
    /// Camera video and low-resolution proxy files (.mp4, .lrf, .mov)
    Video,
}

impl FileType {
    /// Lowercase extensions (without the dot) that belong to this file type.
    #[must_use]
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileType::Image => IMAGE_EXTENSIONS,
            FileType::Video => VIDEO_EXTENSIONS,
        }
    }

    /// Whether the extension of `path` belongs to this file type (case-insensitive).
    #[must_use]
    pub fn matches(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext.to_lowercase().as_str()))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Video => "video",
        }
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "image" | "images" | "photo" => Ok(FileType::Image),
            "video" | "videos" => Ok(FileType::Video),
            _ => exn::bail!(ErrorKind::UnsupportedFileType(s.to_string())),
        }
    }
}
