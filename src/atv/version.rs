//! Document schema versions
//!
//! The `version` pragma of every ATV document carries a version of the form
//! `major.minor.patch-suffix`, e.g. `8.1.0-default`. The suffix names the
//! configuration flavor and is part of the identity: `8.0.2-default` and
//! `8.0.2-beta` are different versions, although neither is newer than the other.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::atv::error::VersionError;

static VERSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)-([A-Za-z0-9_.\-]+)$").unwrap()
});

/// Schema version of an ATV document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub suffix: String,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32, suffix: impl Into<String>) -> Self {
        Self {
            major,
            minor,
            patch,
            suffix: suffix.into(),
        }
    }

    /// Compare release numbers only, ignoring the suffix.
    ///
    /// `Equal` here does not imply equality of the versions.
    pub fn release_cmp(&self, other: &Version) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}-{}",
            self.major, self.minor, self.patch, self.suffix
        )
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = VERSION_REGEX
            .captures(s)
            .ok_or_else(|| VersionError::Malformed(s.to_string()))?;

        let number = |index: usize| -> Result<u32, VersionError> {
            captures[index]
                .parse()
                .map_err(|_| VersionError::OutOfRange {
                    text: s.to_string(),
                    component: captures[index].to_string(),
                })
        };

        Ok(Version {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            suffix: captures[4].to_string(),
        })
    }
}
