//! Boost release versions.
//!
//! Boost numbers its releases `major.minor.micro`. The release history page
//! spells them as `Version 1.60.0`, archives and source directories use the
//! `BOOST_LIB_VERSION` style `1_60_0`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Oldest release that is still offered as a source download.
pub const MIN_VERSION: Version = Version(semver::Version::new(1, 42, 0));

/// Errors produced when parsing a [`Version`] from text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid version '{input}': expected 'major.minor.micro'")]
pub struct VersionParseError {
    /// The rejected input, as given.
    pub input: String,
}

/// A totally ordered `major.minor.micro` release version.
///
/// # Example
///
/// ```
/// use boostup_schema::Version;
///
/// let v: Version = "1.60.0".parse().unwrap();
/// assert_eq!(v.to_string(), "1.60.0");
/// assert_eq!(v.lib_version(), "1_60_0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(semver::Version);

impl Version {
    /// Create a version from its three components.
    pub const fn new(major: u64, minor: u64, micro: u64) -> Self {
        Self(semver::Version::new(major, minor, micro))
    }

    /// Major component.
    pub fn major(&self) -> u64 {
        self.0.major
    }

    /// Minor component.
    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    /// Micro (patch) component.
    pub fn micro(&self) -> u64 {
        self.0.patch
    }

    /// Version string in `BOOST_LIB_VERSION` style, always with all three
    /// components: `1_60_0`.
    pub fn lib_version(&self) -> String {
        format!("{}_{}_{}", self.major(), self.minor(), self.micro())
    }

    /// Suffix of the versioned header directory (`include/boost-1_60`).
    ///
    /// Boost drops the micro component from this name when it is zero.
    pub fn header_suffix(&self) -> String {
        if self.micro() == 0 {
            format!("{}_{}", self.major(), self.minor())
        } else {
            self.lib_version()
        }
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    /// Parse `major.minor.micro`. A missing micro component (`1.34`) is read
    /// as zero; anything else that is not purely numeric is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VersionParseError {
            input: s.to_string(),
        };

        let parts: Vec<u64> = s
            .trim()
            .split('.')
            .map(|p| p.parse::<u64>().map_err(|_| err()))
            .collect::<Result<_, _>>()?;

        match parts.as_slice() {
            [major, minor] => Ok(Self::new(*major, *minor, 0)),
            [major, minor, micro] => Ok(Self::new(*major, *minor, *micro)),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Version {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.micro())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trip() {
        for s in ["1.42.0", "1.60.0", "1.65.1", "2.0.10"] {
            let v: Version = s.parse().unwrap();
            assert_eq!(v.to_string(), s);
        }
    }

    #[test]
    fn test_two_component_version() {
        let v: Version = "1.34".parse().unwrap();
        assert_eq!(v, Version::new(1, 34, 0));
    }

    #[test]
    fn test_rejects_garbage() {
        for s in ["", "1", "1..0", "1.60.0.1", "1.60.0-beta", "v1.60.0"] {
            let err = s.parse::<Version>().unwrap_err();
            assert_eq!(err.input, s);
        }
    }

    #[test]
    fn test_ordering_is_numeric() {
        let a: Version = "1.9.0".parse().unwrap();
        let b: Version = "1.10.0".parse().unwrap();
        assert!(a < b);
        assert!(Version::new(1, 65, 1) > Version::new(1, 65, 0));
    }

    #[test]
    fn test_lib_version() {
        assert_eq!(Version::new(1, 60, 0).lib_version(), "1_60_0");
        assert_eq!(Version::new(1, 65, 1).lib_version(), "1_65_1");
    }

    #[test]
    fn test_header_suffix() {
        assert_eq!(Version::new(1, 60, 0).header_suffix(), "1_60");
        assert_eq!(Version::new(1, 65, 1).header_suffix(), "1_65_1");
    }

    #[test]
    fn test_floor_ordering() {
        assert_eq!(MIN_VERSION, Version::new(1, 42, 0));
        assert!(Version::new(1, 60, 0) > MIN_VERSION);
        assert!(Version::new(1, 41, 9) < MIN_VERSION);
    }

    #[test]
    fn test_serde_as_string() {
        let v = Version::new(1, 60, 0);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"1.60.0\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
        assert!(serde_json::from_str::<Version>("\"nope\"").is_err());
    }
}
