use crate::ComparisonMode;
use crate::error::{Error, ErrorKind};
use std::str::FromStr;

impl FromStr for ComparisonMode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(ComparisonMode::Full),
            "partial" => Ok(ComparisonMode::Partial),
            _ => exn::bail!(ErrorKind::UnsupportedMode(s.to_string())),
        }
    }
}
