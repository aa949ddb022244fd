//! Core value types shared by the mapping engine
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Declared simple type of a field or element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Int,
    Decimal,
    Boolean,
    Date,
    Time,
    DateTime,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::String => write!(f, "string"),
            DataType::Int => write!(f, "int"),
            DataType::Decimal => write!(f, "decimal"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Date => write!(f, "date"),
            DataType::Time => write!(f, "time"),
            DataType::DateTime => write!(f, "datetime"),
        }
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(DataType::String),
            "int" | "integer" => Ok(DataType::Int),
            "decimal" | "float" | "double" => Ok(DataType::Decimal),
            "boolean" | "bool" => Ok(DataType::Boolean),
            "date" => Ok(DataType::Date),
            "time" => Ok(DataType::Time),
            "datetime" => Ok(DataType::DateTime),
            other => Err(Error::configuration(format!("unknown data type '{}'", other))),
        }
    }
}

/// A concrete, non-null simple value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Int(i64),
    /// Keeps the scale it was written with, so `3.50` stays `3.50`
    Decimal(Decimal),
    Boolean(bool),
    Date(NaiveDate),
    Time(Offset<NaiveTime>),
    DateTime(Offset<NaiveDateTime>),
}

/// A local time or date-time with the UTC offset it was written with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset<T> {
    pub local: T,
    /// `None` when the text carried no offset
    pub offset: Option<FixedOffset>,
}

impl<T> Offset<T> {
    pub fn local(local: T) -> Self {
        Self { local, offset: None }
    }

    pub fn with_offset(local: T, offset: FixedOffset) -> Self {
        Self {
            local,
            offset: Some(offset),
        }
    }
}

impl Scalar {
    pub fn data_type(&self) -> DataType {
        match self {
            Scalar::String(_) => DataType::String,
            Scalar::Int(_) => DataType::Int,
            Scalar::Decimal(_) => DataType::Decimal,
            Scalar::Boolean(_) => DataType::Boolean,
            Scalar::Date(_) => DataType::Date,
            Scalar::Time(_) => DataType::Time,
            Scalar::DateTime(_) => DataType::DateTime,
        }
    }
}

/// A typed simple value that may be null
///
/// A null value still carries its type, so a rule that pulled "nothing" for a
/// date field can be told apart from one that pulled nothing for a string.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleValue {
    data_type: DataType,
    value: Option<Scalar>,
}

impl SimpleValue {
    pub fn new(value: Scalar) -> Self {
        Self {
            data_type: value.data_type(),
            value: Some(value),
        }
    }

    /// A null value of the given type
    pub fn null(data_type: DataType) -> Self {
        Self {
            data_type,
            value: None,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(Scalar::String(value.into()))
    }

    /// A string value, or a string-typed null
    pub fn optional_string(value: Option<String>) -> Self {
        match value {
            Some(v) => Self::string(v),
            None => Self::null(DataType::String),
        }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    pub fn scalar(&self) -> Option<&Scalar> {
        self.value.as_ref()
    }

    pub fn into_scalar(self) -> Option<Scalar> {
        self.value
    }

    /// The raw string if this is a non-null string value
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Some(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<Scalar> for SimpleValue {
    fn from(value: Scalar) -> Self {
        Self::new(value)
    }
}

/// Transfer direction of a mapping operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// XML object to record
    Inbound,
    /// Record to XML object
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => write!(f, "inbound"),
            Direction::Outbound => write!(f, "outbound"),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inbound" | "in" => Ok(Direction::Inbound),
            "outbound" | "out" => Ok(Direction::Outbound),
            other => Err(Error::configuration(format!(
                "unknown direction '{}', expected 'inbound' or 'outbound'",
                other
            ))),
        }
    }
}
