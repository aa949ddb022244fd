//! Version-dependent text formatting of simple values
//!
//! SIF 1.x transmits dates as `YYYYMMDD` and booleans as `Yes`/`No`; SIF 2.x
//! and later use the XML Schema lexical forms. Parsing accepts either style so
//! that records prepared for one version still map under another.
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::types::{DataType, Offset, Scalar, SimpleValue};
use crate::version::SifVersion;
use crate::{Error, Result};

/// Lexical style of one protocol generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatStyle {
    Sif1x,
    Sif2x,
}

const TIME_FORMAT: &str = "%H:%M:%S%.f";

impl FormatStyle {
    fn date_format(self) -> &'static str {
        match self {
            FormatStyle::Sif1x => "%Y%m%d",
            FormatStyle::Sif2x => "%Y-%m-%d",
        }
    }

    fn datetime_format(self) -> &'static str {
        match self {
            FormatStyle::Sif1x => "%Y%m%d %H:%M:%S%.f",
            FormatStyle::Sif2x => "%Y-%m-%dT%H:%M:%S%.f",
        }
    }

    fn boolean_text(self, value: bool) -> &'static str {
        match (self, value) {
            (FormatStyle::Sif1x, true) => "Yes",
            (FormatStyle::Sif1x, false) => "No",
            (FormatStyle::Sif2x, true) => "true",
            (FormatStyle::Sif2x, false) => "false",
        }
    }

    fn other(self) -> Self {
        match self {
            FormatStyle::Sif1x => FormatStyle::Sif2x,
            FormatStyle::Sif2x => FormatStyle::Sif1x,
        }
    }
}

/// Converts simple values to and from transmitted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFormatter {
    style: FormatStyle,
}

impl TextFormatter {
    pub fn new(style: FormatStyle) -> Self {
        Self { style }
    }

    /// Formatter for the lexical rules of a protocol version
    pub fn for_version(version: SifVersion) -> Self {
        if version.major() < 2 {
            Self::new(FormatStyle::Sif1x)
        } else {
            Self::new(FormatStyle::Sif2x)
        }
    }

    pub fn style(&self) -> FormatStyle {
        self.style
    }

    /// Parse text into a value of the given type
    pub fn parse(&self, text: &str, data_type: DataType) -> Result<SimpleValue> {
        let trimmed = text.trim();
        let fail = || Error::format(text, data_type);
        let scalar = match data_type {
            DataType::String => Scalar::String(text.to_string()),
            DataType::Int => Scalar::Int(trimmed.parse().map_err(|_| fail())?),
            DataType::Decimal => Scalar::Decimal(
                Decimal::from_str(trimmed)
                    .or_else(|_| Decimal::from_scientific(trimmed))
                    .map_err(|_| fail())?,
            ),
            DataType::Boolean => Scalar::Boolean(parse_boolean(trimmed).ok_or_else(fail)?),
            DataType::Date => Scalar::Date(
                self.with_fallback(|style| NaiveDate::parse_from_str(trimmed, style.date_format()).ok())
                    .ok_or_else(fail)?,
            ),
            DataType::Time => {
                let (local, offset) = split_offset(trimmed);
                let local = NaiveTime::parse_from_str(local, TIME_FORMAT).map_err(|_| fail())?;
                Scalar::Time(Offset { local, offset })
            }
            DataType::DateTime => {
                let (local, offset) = split_offset(trimmed);
                let local = self
                    .with_fallback(|style| NaiveDateTime::parse_from_str(local, style.datetime_format()).ok())
                    .ok_or_else(fail)?;
                Scalar::DateTime(Offset { local, offset })
            }
        };
        Ok(SimpleValue::new(scalar))
    }

    fn with_fallback<T>(&self, parse: impl Fn(FormatStyle) -> Option<T>) -> Option<T> {
        parse(self.style).or_else(|| parse(self.style.other()))
    }

    /// Text form of a value, or `None` for a null
    pub fn format(&self, value: &SimpleValue) -> Option<String> {
        let text = match value.scalar()? {
            Scalar::String(s) => s.clone(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Decimal(d) => d.to_string(),
            Scalar::Boolean(b) => self.style.boolean_text(*b).to_string(),
            Scalar::Date(d) => d.format(self.style.date_format()).to_string(),
            Scalar::Time(t) => with_offset(t.local.format(TIME_FORMAT).to_string(), t.offset),
            Scalar::DateTime(dt) => with_offset(
                dt.local.format(self.style.datetime_format()).to_string(),
                dt.offset,
            ),
        };
        Some(text)
    }

    /// Re-type a value through its text form; nulls keep their null-ness
    pub fn convert(&self, value: &SimpleValue, data_type: DataType) -> Result<SimpleValue> {
        if value.data_type() == data_type {
            return Ok(value.clone());
        }
        match self.format(value) {
            Some(text) => self.parse(&text, data_type),
            None => Ok(SimpleValue::null(data_type)),
        }
    }

    pub fn converter(&self, data_type: DataType) -> TypeConverter<'_> {
        TypeConverter {
            data_type,
            formatter: self,
        }
    }
}

/// Split a trailing `Z` or `+hh:mm`/`-hh:mm` off a time or date-time
fn split_offset(text: &str) -> (&str, Option<FixedOffset>) {
    if let Some(rest) = text.strip_suffix('Z') {
        return (rest, FixedOffset::east_opt(0));
    }

    let parsed = text.len().checked_sub(6).and_then(|split| {
        let (rest, tail) = (text.get(..split)?, text.get(split..)?);
        let sign = match tail.as_bytes() {
            [b'+', _, _, b':', _, _] => 1,
            [b'-', _, _, b':', _, _] => -1,
            _ => return None,
        };
        let hours: i32 = tail.get(1..3)?.parse().ok()?;
        let minutes: i32 = tail.get(4..6)?.parse().ok()?;
        if hours > 14 || minutes > 59 {
            return None;
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).map(|offset| (rest, offset))
    });

    match parsed {
        Some((rest, offset)) => (rest, Some(offset)),
        None => (text, None),
    }
}

fn with_offset(mut text: String, offset: Option<FixedOffset>) -> String {
    let Some(offset) = offset else {
        return text;
    };
    let seconds = offset.local_minus_utc();
    if seconds == 0 {
        text.push('Z');
    } else {
        let sign = if seconds < 0 { '-' } else { '+' };
        let seconds = seconds.abs();
        text.push_str(&format!("{}{:02}:{:02}", sign, seconds / 3600, seconds % 3600 / 60));
    }
    text
}

fn parse_boolean(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// A formatter bound to one target type
///
/// Record adaptors receive one of these when asked for an outbound value, so
/// they can produce a value of the type the target element declares.
#[derive(Debug, Clone, Copy)]
pub struct TypeConverter<'a> {
    data_type: DataType,
    formatter: &'a TextFormatter,
}

impl<'a> TypeConverter<'a> {
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn formatter(&self) -> &TextFormatter {
        self.formatter
    }

    pub fn parse(&self, text: &str) -> Result<SimpleValue> {
        self.formatter.parse(text, self.data_type)
    }

    pub fn format(&self, value: &SimpleValue) -> Option<String> {
        self.formatter.format(value)
    }

    pub fn null(&self) -> SimpleValue {
        SimpleValue::null(self.data_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sif1x_forms() {
        let formatter = TextFormatter::for_version(SifVersion::SIF15R1);
        let date = formatter.parse("19811020", DataType::Date).unwrap();
        assert_eq!(formatter.format(&date).as_deref(), Some("19811020"));

        let yes = formatter.parse("Yes", DataType::Boolean).unwrap();
        assert_eq!(formatter.format(&yes).as_deref(), Some("Yes"));
    }

    #[test]
    fn test_sif2x_forms() {
        let formatter = TextFormatter::for_version(SifVersion::SIF21);
        let date = formatter.parse("1981-10-20", DataType::Date).unwrap();
        assert_eq!(formatter.format(&date).as_deref(), Some("1981-10-20"));
        let no = formatter.parse("false", DataType::Boolean).unwrap();
        assert_eq!(formatter.format(&no).as_deref(), Some("false"));
    }

    #[test]
    fn test_lenient_parsing_across_styles() {
        let formatter = TextFormatter::for_version(SifVersion::SIF20);
        let date = formatter.parse("19811020", DataType::Date).unwrap();
        assert_eq!(formatter.format(&date).as_deref(), Some("1981-10-20"));
        assert!(formatter.parse("YES", DataType::Boolean).is_ok());
    }

    #[test]
    fn test_parse_failure() {
        let formatter = TextFormatter::for_version(SifVersion::SIF20);
        let err = formatter.parse("twelve", DataType::Int).unwrap_err();
        assert!(matches!(err, Error::Format { data_type: DataType::Int, .. }));
        assert!(formatter.parse("1981-13-40", DataType::Date).is_err());
    }

    #[test]
    fn test_convert_between_types() {
        let formatter = TextFormatter::for_version(SifVersion::SIF20);
        let text = SimpleValue::string("42");
        let int = formatter.convert(&text, DataType::Int).unwrap();
        assert_eq!(int.scalar(), Some(&Scalar::Int(42)));

        let null = formatter.convert(&SimpleValue::null(DataType::String), DataType::Date).unwrap();
        assert!(null.is_null());
        assert_eq!(null.data_type(), DataType::Date);
    }

    #[test]
    fn test_decimal_keeps_scale_and_precision() {
        let formatter = TextFormatter::for_version(SifVersion::SIF20);
        for text in ["3.50", "12345678901234567.89", "-0.001", "100"] {
            let value = formatter.parse(text, DataType::Decimal).unwrap();
            assert_eq!(formatter.format(&value).as_deref(), Some(text));
        }
        let value = formatter.parse("1.5e2", DataType::Decimal).unwrap();
        assert_eq!(value.scalar(), Some(&Scalar::Decimal(Decimal::new(150, 0))));
        assert!(formatter.parse("3.5.0", DataType::Decimal).is_err());
    }

    #[test]
    fn test_datetime_lexical_forms() {
        let formatter = TextFormatter::for_version(SifVersion::SIF20);
        for text in [
            "2008-01-01T10:00:00",
            "2008-01-01T10:00:00Z",
            "2008-01-01T10:00:00-05:00",
            "2008-01-01T10:00:00+09:30",
            "2008-01-01T10:00:00.123",
            "2008-01-01T10:00:00.500Z",
        ] {
            let value = formatter.parse(text, DataType::DateTime).unwrap();
            assert_eq!(formatter.format(&value).as_deref(), Some(text), "{}", text);
        }

        let value = formatter.parse("2008-01-01T10:00:00-05:00", DataType::DateTime).unwrap();
        let Some(Scalar::DateTime(dt)) = value.scalar() else {
            panic!("expected a date-time, got {:?}", value);
        };
        assert_eq!(dt.offset, FixedOffset::west_opt(5 * 3600));

        assert!(formatter.parse("2008-01-01T10:00:00+25:00", DataType::DateTime).is_err());
    }

    #[test]
    fn test_time_lexical_forms() {
        let formatter = TextFormatter::for_version(SifVersion::SIF20);
        for text in ["08:30:00", "08:30:00Z", "08:30:00-05:00", "08:30:00.250"] {
            let value = formatter.parse(text, DataType::Time).unwrap();
            assert_eq!(formatter.format(&value).as_deref(), Some(text), "{}", text);
        }
        assert!(formatter.parse("08:30", DataType::Time).is_err());
    }

    #[test]
    fn test_sif1x_datetime_offset() {
        let formatter = TextFormatter::for_version(SifVersion::SIF15R1);
        let value = formatter.parse("20080101 10:00:00Z", DataType::DateTime).unwrap();
        assert_eq!(formatter.format(&value).as_deref(), Some("20080101 10:00:00Z"));
    }

    #[test]
    fn test_string_is_not_trimmed() {
        let formatter = TextFormatter::for_version(SifVersion::SIF20);
        let value = formatter.parse(" padded ", DataType::String).unwrap();
        assert_eq!(value.as_str(), Some(" padded "));
    }
}
