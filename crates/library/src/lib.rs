//! Importing photos and videos into a date-structured library.
//!
//! Files are discovered in a flat source directory ([`discover`]), dated
//! ([`capture_date`]), assigned a folder by a [`PathGenerator`] and copied
//! into the destination, with conflicts settled by a [`Strategy`]
//! (see [`import`](crate::import)).

mod date;
mod directories;
pub mod error;
pub mod import;
mod scan;
mod template;

pub use crate::date::{CaptureDate, DateSource, capture_date};
pub use crate::directories::validate_directories;
pub use crate::import::{Outcome, Strategy};
pub use crate::scan::{FileType, discover};
pub use crate::template::{DEFAULT_TEMPLATE, PathGenerator};
use mediaport_compare::{Comparator, ComparisonMode};

/// Everything an import run needs to know besides where to read and write.
pub struct Context {
    pub filetype: FileType,
    pub strategy: Strategy,
    pub mode: ComparisonMode,
    pub comparator: Comparator,
    /// Skip comparisons: [`Strategy::Replace`] always overwrites and
    /// [`Strategy::OnlyNew`] always skips.
    pub force: bool,
    pub template: PathGenerator,
}
impl Context {
    /// A context with default settings and the given folder template.
    pub fn new(template: PathGenerator) -> Self {
        Self {
            filetype: FileType::default(),
            strategy: Strategy::default(),
            mode: ComparisonMode::default(),
            comparator: Comparator::default(),
            force: false,
            template,
        }
    }
}
