// SPDX-License-Identifier: MPL-2.0

//! Traits and implementations to create and compare versions.
//!
//! The resolver itself never orders versions: it walks them in the order
//! the [MetadataProvider](crate::metadata::MetadataProvider) lists them
//! and asks the provider whether one satisfies a constraint.
//! Ordering is only needed by the default constraint check.

use std::fmt::{self, Debug, Display};
use std::str::FromStr;
use thiserror::Error;

/// Trait for package versions.
/// Automatically implemented for types already implementing Clone + Ord + Debug + Display.
pub trait Version: Clone + Ord + Debug + Display {}

impl<T: Clone + Ord + Debug + Display> Version for T {}

/// Type for dotted numeric versions: major[.minor[.patch]].
///
/// Missing components are read as zero, so `"2"`, `"2.0"` and `"2.0.0"`
/// all denote the same version.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct SemanticVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

/// Error creating [SemanticVersion] from [String].
#[derive(Error, Debug, PartialEq)]
pub enum VersionParseError {
    /// [SemanticVersion] must contain between one and three numbers.
    #[error("version {full_version} must contain 1 to 3 numbers separated by dot")]
    WrongPartCount {
        /// [SemanticVersion] that was being parsed.
        full_version: String,
    },
    /// Wrapper around [ParseIntError](core::num::ParseIntError).
    #[error("cannot parse '{version_part}' in '{full_version}' as u32: {parse_error}")]
    ParseIntError {
        /// [SemanticVersion] that was being parsed.
        full_version: String,
        /// A version part where parsing failed.
        version_part: String,
        /// A specific error resulted from parsing a part of the version as [u32].
        parse_error: String,
    },
}

impl FromStr for SemanticVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_u32 = |part: &str| {
            part.parse::<u32>().map_err(|e| Self::Err::ParseIntError {
                full_version: s.to_string(),
                version_part: part.to_string(),
                parse_error: e.to_string(),
            })
        };

        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(Self::Err::WrongPartCount {
                full_version: s.to_string(),
            });
        }
        let mut numbers = [0; 3];
        for (slot, part) in numbers.iter_mut().zip(parts) {
            *slot = parse_u32(part)?;
        }
        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }
}

impl SemanticVersion {
    /// Create a version with "major", "minor" and "patch" values.
    /// `version = major.minor.patch`
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SemanticVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SemanticVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}
