//! Applicability filters of field rules
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::Direction;
use crate::version::SifVersion;
use crate::{Error, Result};

/// Comparison applied between a constraint version and the mapping version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionOperator {
    /// `=`
    Equal,
    /// `+`, the mapping version is the constraint version or later
    AtLeast,
    /// `-`, the mapping version is the constraint version or earlier
    AtMost,
}

impl VersionOperator {
    fn symbol(self) -> char {
        match self {
            VersionOperator::Equal => '=',
            VersionOperator::AtLeast => '+',
            VersionOperator::AtMost => '-',
        }
    }
}

/// A version constraint such as `+2.0` or `=1.5r1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionConstraint {
    pub operator: VersionOperator,
    pub version: SifVersion,
}

impl VersionConstraint {
    pub fn new(operator: VersionOperator, version: SifVersion) -> Self {
        Self { operator, version }
    }

    pub fn matches(&self, version: SifVersion) -> bool {
        match self.operator {
            VersionOperator::Equal => version == self.version,
            VersionOperator::AtLeast => version >= self.version,
            VersionOperator::AtMost => version <= self.version,
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator.symbol(), self.version)
    }
}

impl FromStr for VersionConstraint {
    type Err = Error;

    /// A bare version means `=`
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let (operator, rest) = match text.chars().next() {
            Some('=') => (VersionOperator::Equal, &text[1..]),
            Some('+') => (VersionOperator::AtLeast, &text[1..]),
            Some('-') => (VersionOperator::AtMost, &text[1..]),
            Some(_) => (VersionOperator::Equal, text),
            None => return Err(Error::configuration("empty version constraint")),
        };
        Ok(Self::new(operator, rest.parse()?))
    }
}

impl Serialize for VersionConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionConstraint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Direction and version predicate gating a field rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MappingsFilter {
    pub direction: Option<Direction>,
    pub version: Option<VersionConstraint>,
}

impl MappingsFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_version(mut self, constraint: VersionConstraint) -> Self {
        self.version = Some(constraint);
        self
    }

    /// True if neither a direction nor a version is set
    pub fn is_empty(&self) -> bool {
        self.direction.is_none() && self.version.is_none()
    }

    /// Whether a rule carrying this filter takes part in a mapping pass
    pub fn evaluate(&self, direction: Direction, version: SifVersion) -> bool {
        self.direction.map_or(true, |d| d == direction)
            && self.version.map_or(true, |c| c.matches(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_parsing() {
        let c: VersionConstraint = "+2.0".parse().unwrap();
        assert_eq!(c.operator, VersionOperator::AtLeast);
        assert_eq!(c.version, SifVersion::SIF20);
        assert_eq!(c.to_string(), "+2.0");

        let c: VersionConstraint = "1.5r1".parse().unwrap();
        assert_eq!(c.operator, VersionOperator::Equal);
        assert_eq!(c.to_string(), "=1.5r1");

        assert!("".parse::<VersionConstraint>().is_err());
        assert!("+abc".parse::<VersionConstraint>().is_err());
    }

    #[test]
    fn test_constraint_matching() {
        let at_least: VersionConstraint = "+2.0".parse().unwrap();
        assert!(at_least.matches(SifVersion::SIF21));
        assert!(at_least.matches(SifVersion::SIF20));
        assert!(!at_least.matches(SifVersion::SIF15R1));

        let at_most: VersionConstraint = "-1.5r1".parse().unwrap();
        assert!(at_most.matches(SifVersion::SIF11));
        assert!(!at_most.matches(SifVersion::SIF20));
    }

    #[test]
    fn test_filter_evaluation() {
        assert!(MappingsFilter::new().evaluate(Direction::Inbound, SifVersion::SIF11));

        let outbound = MappingsFilter::new().with_direction(Direction::Outbound);
        assert!(outbound.evaluate(Direction::Outbound, SifVersion::SIF11));
        assert!(!outbound.evaluate(Direction::Inbound, SifVersion::SIF11));

        let both = outbound.with_version("+2.0".parse().unwrap());
        assert!(both.evaluate(Direction::Outbound, SifVersion::SIF26));
        assert!(!both.evaluate(Direction::Outbound, SifVersion::SIF15R1));
        assert!(!both.evaluate(Direction::Inbound, SifVersion::SIF26));
    }
}
