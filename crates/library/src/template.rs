//! Destination folder templating.
//!
//! Converts a capture date into a folder below the library root using a
//! user-configured [upon] template. The template syntax follows upon's
//! Mustache-like conventions (`{{ variable }}`, `{{ value|formatter }}`),
//! extended with:
//!
//! - **`lower`**: lowercases strings (`{{ month_name|lower }}` → `may`).
//! - **`truncate`**: truncates strings to a maximum byte length at a character
//!   boundary, usable as either `truncate(value, n)` or `{{ value|truncate: n }}`.
//!
//! # Template Variables
//!
//! | Variable     | Example  | Description                         |
//! |--------------|----------|-------------------------------------|
//! | `year`       | `2023`   | Four-digit year                     |
//! | `month`      | `05`     | Zero-padded month number            |
//! | `month_name` | `May`    | English month name                  |
//! | `day`        | `15`     | Zero-padded day of the month        |
//! | `hour`       | `09`     | Zero-padded hour (24-hour clock)    |
//! | `minute`     | `07`     | Zero-padded minute                  |
//! | `filetype`   | `image`  | `image` or `video`                  |
//!
//! # Example
//!
//! ```
//! use mediaport_library::{FileType, PathGenerator};
//! use std::path::Path;
//! use time::macros::datetime;
//!
//! let generator: PathGenerator = "{{ year }}/{{ month }}-{{ month_name|lower }}".parse().unwrap();
//! let path = generator.generate(datetime!(2023-05-15 12:30), FileType::Image).unwrap();
//! assert_eq!(path, Path::new("2023/05-may"));
//! ```

use crate::error::{Error, ErrorKind, Result};
use crate::scan::FileType;
use exn::ResultExt;
use mediaport_storage::validate_path;
use std::path::PathBuf;
use std::str::FromStr;
use time::PrimitiveDateTime;
use tracing::instrument;
use upon::{Engine, Template};

/// Year, then English month name, then day: `2023/May/15`.
pub const DEFAULT_TEMPLATE: &str = "{{ year }}/{{ month_name }}/{{ day }}";

/// Generates destination folders (relative to the library root) from capture
/// dates and a user-defined template string.
///
/// Constructed via [`FromStr`], which compiles the template eagerly so that
/// syntax errors surface at creation time rather than at render time. The
/// compiled template is reusable across many [`generate`](Self::generate) calls.
///
/// Generated paths are normalized (trimmed, deduplicated separators) and
/// validated by [`mediaport_storage::validate_path`] so they cannot climb out
/// of the library root.
pub struct PathGenerator {
    engine: Engine<'static>,
    template: Template<'static>,
}
impl FromStr for PathGenerator {
    type Err = Error;

    /// Compiles the given template string into a reusable [`PathGenerator`].
    ///
    /// Returns [`ErrorKind::Template`] if the template syntax is invalid.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        // Compile the template early so we can fail-fast in construction.
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template })
    }
}
impl PathGenerator {
    /// Renders the template for a capture date, returning the normalized
    /// folder relative to the library root.
    #[instrument(skip_all, fields(taken = %taken, filetype = %filetype))]
    pub fn generate(&self, taken: PrimitiveDateTime, filetype: FileType) -> Result<PathBuf> {
        let path = self
            .template
            .render(&self.engine, Self::parameters(taken, filetype))
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        Self::normalize(path)
    }

    /// Trims each path segment, joins them with `/`, then validates via
    /// [`mediaport_storage::validate_path`].
    fn normalize(s: impl Into<String>) -> Result<PathBuf> {
        let path = s.into().trim().split('/').map(str::trim).collect::<Vec<_>>().join("/");
        validate_path(&path).or_raise(|| ErrorKind::Template)
    }

    fn parameters(taken: PrimitiveDateTime, filetype: FileType) -> upon::Value {
        upon::value! {
            year: format!("{:04}", taken.year()),
            month: format!("{:02}", u8::from(taken.month())),
            month_name: taken.month().to_string(),
            day: format!("{:02}", taken.day()),
            hour: format!("{:02}", taken.hour()),
            minute: format!("{:02}", taken.minute()),
            filetype: filetype.as_str(),
        }
    }
}

/// Custom [`upon`] extensions for path-safe string manipulation.
mod addons {
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    fn lower_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => write!(f, "{}", s.to_lowercase())?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    /// Truncates a string to a maximum byte length at a character boundary.
    fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> String {
        s[..s.floor_char_boundary(max_bytes)].to_string()
    }

    /// Registers the `lower` formatter and `truncate` function on the given engine.
    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("lower", lower_formatter);
        engine.add_function("truncate", truncate_to_char_boundary);
    }
}
