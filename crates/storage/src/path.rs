//! Relative path validation.
//!
//! Destination folders are rendered from user templates and then joined onto
//! the library root. Anything that renders to an absolute path, climbs above
//! the root or smuggles in a null byte is rejected here.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates and normalizes a path that is meant to stay *below* some root.
///
/// Leading `/` and `.` components are dropped, `..` is resolved lexically and
/// must never climb above the root.
///
/// # Returns
/// The normalized relative path, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath)
/// when the path escapes, contains a null byte, has a Windows prefix or ends
/// up empty.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use mediaport_storage::validate_path;
/// assert!(validate_path("2023/May/15").is_ok());
/// assert!(validate_path("2023/May/../June/01").is_ok());
/// assert!(validate_path("../2023").is_err());
/// assert!(validate_path("2023/../../May").is_err());
/// assert!(validate_path("20\023").is_err());
/// assert_eq!(
///     validate_path("/2023//./May/15/").unwrap(),
///     Path::new("2023/May/15")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
            },
        }
    }
    if components.is_empty() {
        exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
    }
    Ok(components.into_iter().collect())
}
