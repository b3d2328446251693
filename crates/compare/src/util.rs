use crate::ComparisonMode;
use std::fmt::{Display, Formatter, Result as FmtResult};

impl Display for ComparisonMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for ComparisonMode {
    fn as_ref(&self) -> &'static str {
        self.as_str()
    }
}

impl ComparisonMode {
    /// Returns the short name for configuration (for displaying to user)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonMode::Full => "full",
            ComparisonMode::Partial => "partial",
        }
    }
}
