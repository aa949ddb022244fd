//! SIF protocol version tokens
//!
//! Versions are written `major.minor` with an optional `rN` revision suffix
//! (`1.5r1`, `2.0`, `2.0r1`) and compare by (major, minor, revision).
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Wildcard token accepted in version filter lists
pub const WILDCARD: &str = "*";

/// A SIF standard version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SifVersion {
    major: u8,
    minor: u8,
    revision: u8,
}

impl SifVersion {
    pub const SIF11: SifVersion = SifVersion::new(1, 1, 0);
    pub const SIF15R1: SifVersion = SifVersion::new(1, 5, 1);
    pub const SIF20: SifVersion = SifVersion::new(2, 0, 0);
    pub const SIF20R1: SifVersion = SifVersion::new(2, 0, 1);
    pub const SIF21: SifVersion = SifVersion::new(2, 1, 0);
    pub const SIF26: SifVersion = SifVersion::new(2, 6, 0);
    pub const SIF30: SifVersion = SifVersion::new(3, 0, 0);
    pub const LATEST: SifVersion = Self::SIF30;

    pub const fn new(major: u8, minor: u8, revision: u8) -> Self {
        Self {
            major,
            minor,
            revision,
        }
    }

    pub fn major(&self) -> u8 {
        self.major
    }

    pub fn minor(&self) -> u8 {
        self.minor
    }

    pub fn revision(&self) -> u8 {
        self.revision
    }
}

impl fmt::Display for SifVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.revision == 0 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}r{}", self.major, self.minor, self.revision)
        }
    }
}

impl FromStr for SifVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::configuration(format!("invalid SIF version '{}'", s));
        let text = s.trim();
        let (major, rest) = text.split_once('.').ok_or_else(invalid)?;
        let (minor, revision) = match rest.split_once(['r', 'R']) {
            Some((minor, revision)) => (minor, Some(revision)),
            None => (rest, None),
        };

        let major = major.parse::<u8>().map_err(|_| invalid())?;
        let minor = minor.parse::<u8>().map_err(|_| invalid())?;
        let revision = match revision {
            Some(r) => r.parse::<u8>().map_err(|_| invalid())?,
            None => 0,
        };
        Ok(Self::new(major, minor, revision))
    }
}

impl Serialize for SifVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SifVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_and_display() {
        assert_eq!("1.5r1".parse::<SifVersion>().unwrap(), SifVersion::SIF15R1);
        assert_eq!("2.0".parse::<SifVersion>().unwrap(), SifVersion::SIF20);
        assert_eq!(SifVersion::SIF15R1.to_string(), "1.5r1");
        assert_eq!(SifVersion::SIF21.to_string(), "2.1");
    }

    #[test]
    fn test_invalid_versions() {
        assert!("".parse::<SifVersion>().is_err());
        assert!("2".parse::<SifVersion>().is_err());
        assert!("2.x".parse::<SifVersion>().is_err());
        assert!("1.5r".parse::<SifVersion>().is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(SifVersion::SIF11 < SifVersion::SIF15R1);
        assert!(SifVersion::SIF15R1 < SifVersion::SIF20);
        assert!(SifVersion::SIF20 < SifVersion::SIF20R1);
        assert!(SifVersion::SIF26 < SifVersion::SIF30);
    }

    proptest! {
        #[test]
        fn prop_display_round_trips(major in 1u8..10, minor in 0u8..10, revision in 0u8..5) {
            let version = SifVersion::new(major, minor, revision);
            let parsed: SifVersion = version.to_string().parse().unwrap();
            prop_assert_eq!(parsed, version);
        }

        #[test]
        fn prop_order_follows_components(a in (1u8..4, 0u8..10, 0u8..3), b in (1u8..4, 0u8..10, 0u8..3)) {
            let va = SifVersion::new(a.0, a.1, a.2);
            let vb = SifVersion::new(b.0, b.1, b.2);
            prop_assert_eq!(va.cmp(&vb), a.cmp(&b));
        }
    }
}
