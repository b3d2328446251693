//! Layered configuration.
//!
//! Values are merged, later sources winning:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A configuration file: either the path given explicitly, or
//!    `config.toml` in the platform configuration directory when it exists.
//!    TOML by default, YAML (`.yaml`/`.yml`) or JSON (`.json`) by extension.
//! 3. Environment variables prefixed with `MEDIAPORT_`, e.g.
//!    `MEDIAPORT_COMPARISON_MODE=full`.
//!
//! Command-line flags are applied on top by the binary.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use mediaport_compare::{Comparator, ComparisonMode};
use mediaport_library::{DEFAULT_TEMPLATE, FileType, Strategy};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "MEDIAPORT_";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_HASH_CHUNK_SIZE: NonZeroUsize = NonZeroUsize::new(65_536).unwrap();
const DEFAULT_PARTIAL_CHUNK_SIZE: NonZeroUsize = NonZeroUsize::new(4096).unwrap();

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub filetype: FileType,
    pub strategy: Strategy,
    pub comparison_mode: ComparisonMode,
    /// Skip content comparisons when the destination already exists.
    pub force: bool,
    /// Destination folder template, see [`mediaport_library::PathGenerator`].
    pub template: String,
    /// Read size while hashing in full comparison mode.
    pub hash_chunk_size: NonZeroUsize,
    /// Size of the leading and trailing chunk in partial comparison mode.
    pub partial_chunk_size: NonZeroUsize,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            filetype: FileType::default(),
            strategy: Strategy::default(),
            comparison_mode: ComparisonMode::default(),
            force: false,
            template: DEFAULT_TEMPLATE.to_string(),
            hash_chunk_size: DEFAULT_HASH_CHUNK_SIZE,
            partial_chunk_size: DEFAULT_PARTIAL_CHUNK_SIZE,
        }
    }
}

impl Config {
    /// Load the configuration from all sources.
    ///
    /// # Errors
    /// - [`ErrorKind::NotFound`] when `path` is given but is not a file.
    /// - [`ErrorKind::Invalid`] when any source cannot be parsed or holds an
    ///   unknown key or value.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => figment = merge_file(figment, path),
            None => {
                if let Some(path) = default_path().filter(|p| p.is_file()) {
                    figment = merge_file(figment, &path);
                }
            },
        }
        figment.merge(Env::prefixed(ENV_PREFIX)).extract().or_raise(|| ErrorKind::Invalid)
    }

    /// A [`Comparator`] using the configured chunk sizes.
    pub fn comparator(&self) -> Comparator {
        Comparator::default()
            .with_full_hash_chunk_size(self.hash_chunk_size)
            .with_partial_chunk_size(self.partial_chunk_size)
    }
}

/// `config.toml` inside the platform configuration directory, e.g.
/// `~/.config/mediaport/config.toml` on Linux.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mediaport").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

fn merge_file(figment: Figment, path: &Path) -> Figment {
    tracing::debug!(path = %path.display(), "Loading configuration file");
    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase);
    match extension.as_deref() {
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        _ => figment.merge(Toml::file(path)),
    }
}
