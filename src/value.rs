//! Typed cell values flowing through the field-processing pipeline.
//!
//! On the read path every parsed field enters the pipeline as
//! [`CsvValue::String`] (or [`CsvValue::Null`] for an empty unquoted field)
//! and leaves it as whatever its converter produces. On the write path the
//! model's values go through a format converter and come out as text.
//!
//! ```rust
//! use serde_dsv::{CsvValue, ValueType};
//!
//! let value = CsvValue::from(42);
//! assert_eq!(value.value_type(), ValueType::Integer);
//! assert_eq!(value.to_string(), "42");
//! assert!(CsvValue::Null.is_null());
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single typed cell.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum CsvValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    BigInt(BigInt),
}

/// Semantic type a converter consumes or produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Any,
    Bool,
    Integer,
    Float,
    String,
    Date,
    DateTime,
    BigInt,
}

impl ValueType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ValueType::Any => "any",
            ValueType::Bool => "bool",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Date => "date",
            ValueType::DateTime => "datetime",
            ValueType::BigInt => "bigint",
        }
    }

    /// Returns `true` if a value of type `other` is acceptable where `self` is
    /// expected.
    #[must_use]
    pub fn accepts(self, other: ValueType) -> bool {
        self == ValueType::Any || self == other
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CsvValue {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, CsvValue::Null)
    }

    /// Semantic type of this value; `Null` reports [`ValueType::Any`].
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            CsvValue::Null => ValueType::Any,
            CsvValue::Bool(_) => ValueType::Bool,
            CsvValue::Integer(_) => ValueType::Integer,
            CsvValue::Float(_) => ValueType::Float,
            CsvValue::String(_) => ValueType::String,
            CsvValue::Date(_) => ValueType::Date,
            CsvValue::DateTime(_) => ValueType::DateTime,
            CsvValue::BigInt(_) => ValueType::BigInt,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CsvValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CsvValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CsvValue::Integer(i) => Some(*i),
            CsvValue::BigInt(b) => i64::try_from(b).ok(),
            _ => None,
        }
    }

    /// Numeric view used by range checks. Integers and big integers that fit
    /// are widened to `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CsvValue::Integer(i) => Some(*i as f64),
            CsvValue::Float(f) => Some(*f),
            CsvValue::BigInt(b) => i64::try_from(b).ok().map(|i| i as f64),
            _ => None,
        }
    }

    /// Text form, `None` for null.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            CsvValue::Null => None,
            CsvValue::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Consumes the value into its text form, `None` for null.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            CsvValue::Null => None,
            CsvValue::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for CsvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvValue::Null => Ok(()),
            CsvValue::Bool(b) => write!(f, "{}", b),
            CsvValue::Integer(i) => write!(f, "{}", i),
            CsvValue::Float(fl) => write!(f, "{}", fl),
            CsvValue::String(s) => f.write_str(s),
            CsvValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CsvValue::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
            CsvValue::BigInt(b) => write!(f, "{}", b),
        }
    }
}

impl From<bool> for CsvValue {
    fn from(value: bool) -> Self {
        CsvValue::Bool(value)
    }
}

impl From<i32> for CsvValue {
    fn from(value: i32) -> Self {
        CsvValue::Integer(value as i64)
    }
}

impl From<i64> for CsvValue {
    fn from(value: i64) -> Self {
        CsvValue::Integer(value)
    }
}

impl From<u32> for CsvValue {
    fn from(value: u32) -> Self {
        CsvValue::Integer(value as i64)
    }
}

impl From<f64> for CsvValue {
    fn from(value: f64) -> Self {
        CsvValue::Float(value)
    }
}

impl From<&str> for CsvValue {
    fn from(value: &str) -> Self {
        CsvValue::String(value.to_string())
    }
}

impl From<String> for CsvValue {
    fn from(value: String) -> Self {
        CsvValue::String(value)
    }
}

impl From<NaiveDate> for CsvValue {
    fn from(value: NaiveDate) -> Self {
        CsvValue::Date(value)
    }
}

impl From<DateTime<Utc>> for CsvValue {
    fn from(value: DateTime<Utc>) -> Self {
        CsvValue::DateTime(value)
    }
}

impl From<BigInt> for CsvValue {
    fn from(value: BigInt) -> Self {
        CsvValue::BigInt(value)
    }
}

impl<T: Into<CsvValue>> From<Option<T>> for CsvValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CsvValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(CsvValue::Null.to_string(), "");
        assert_eq!(CsvValue::from(true).to_string(), "true");
        assert_eq!(CsvValue::from(2.5).to_string(), "2.5");
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(CsvValue::from(date).to_string(), "2024-01-15");
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(CsvValue::from(None::<i64>), CsvValue::Null);
        assert_eq!(CsvValue::from(Some("x")), CsvValue::String("x".into()));
    }

    #[test]
    fn test_bigint_narrowing() {
        let small = CsvValue::BigInt(BigInt::from(12));
        assert_eq!(small.as_i64(), Some(12));
        let huge: BigInt = "123456789012345678901234567890".parse().unwrap();
        assert_eq!(CsvValue::BigInt(huge).as_i64(), None);
    }

    #[test]
    fn test_text_forms() {
        assert_eq!(CsvValue::Null.to_text(), None);
        assert_eq!(CsvValue::from(7).into_text(), Some("7".to_string()));
    }

    #[test]
    fn test_type_acceptance() {
        assert!(ValueType::Any.accepts(ValueType::Date));
        assert!(ValueType::Integer.accepts(ValueType::Integer));
        assert!(!ValueType::Integer.accepts(ValueType::String));
    }
}
