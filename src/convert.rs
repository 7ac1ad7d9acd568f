//! Built-in converters, validators and the type-name registry.
//!
//! Each built-in type is a [`Codec`]: a pair of text → value and value → text
//! functions. [`Codec::directed`] turns a codec into a [`Converter`] for one
//! direction. New field types plug in through [`Registry::register_converter`]
//! with a constructor function.
//!
//! | Name | Value | Parameters |
//! |------|-------|------------|
//! | `string` | `String` | `trim` (`true`/`false`) |
//! | `integer` | `Integer` | |
//! | `float` | `Float` | |
//! | `boolean` | `Bool` | `true`, `false` (literals) |
//! | `date` | `Date` | `format` (strftime, default `%Y-%m-%d`) |
//! | `datetime` | `DateTime` | `format` (strftime, default RFC 3339) |
//! | `bigint` | `BigInt` | |
//!
//! ```rust
//! use serde_dsv::convert::Registry;
//! use serde_dsv::{CsvValue, Direction};
//! use indexmap::IndexMap;
//!
//! let registry = Registry::with_defaults();
//! let mut params = IndexMap::new();
//! params.insert("format".to_string(), "%d/%m/%Y".to_string());
//!
//! let converter = registry.converter("date", Direction::Parse, &params).unwrap();
//! let value = converter.convert(&CsvValue::from("15/01/2024")).unwrap();
//! assert_eq!(value.to_string(), "2024-01-15");
//! ```

use crate::processor::{ConversionError, Converter, Direction, Validator};
use crate::{CsvValue, Error, Result, ValueType};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use indexmap::IndexMap;
use num_bigint::BigInt;
use std::fmt::Write as _;

type ConvertResult<T> = std::result::Result<T, ConversionError>;

/// Named parameters for registry constructors.
pub type Params = IndexMap<String, String>;

type ConverterCtor = Box<dyn Fn(Direction, &Params) -> Result<Box<dyn Converter>> + Send + Sync>;
type ValidatorCtor = Box<dyn Fn(&Params) -> Result<Box<dyn Validator>> + Send + Sync>;

/// Text ↔ value codec for one semantic type.
pub trait Codec: Send + Sync {
    fn name(&self) -> &str;

    fn value_type(&self) -> ValueType;

    /// Type accepted when formatting.
    fn format_type(&self) -> ValueType {
        self.value_type()
    }

    fn error_template(&self) -> &str;

    fn parse(&self, text: &str) -> ConvertResult<CsvValue>;

    fn format(&self, value: &CsvValue) -> ConvertResult<String>;

    /// Wraps the codec as a converter for `direction`.
    fn directed(self, direction: Direction) -> Directed<Self>
    where
        Self: Sized,
    {
        Directed {
            codec: self,
            direction,
        }
    }
}

/// A [`Codec`] bound to a direction.
#[derive(Clone, Debug)]
pub struct Directed<C> {
    codec: C,
    direction: Direction,
}

impl<C: Codec> Converter for Directed<C> {
    fn name(&self) -> &str {
        self.codec.name()
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn source_type(&self) -> ValueType {
        match self.direction {
            Direction::Parse => ValueType::String,
            Direction::Format => self.codec.format_type(),
        }
    }

    fn target_type(&self) -> ValueType {
        match self.direction {
            Direction::Parse => self.codec.value_type(),
            Direction::Format => ValueType::String,
        }
    }

    fn error_template(&self) -> &str {
        self.codec.error_template()
    }

    fn convert(&self, source: &CsvValue) -> ConvertResult<CsvValue> {
        match (self.direction, source) {
            (Direction::Parse, CsvValue::String(text)) => self.codec.parse(text),
            (Direction::Parse, other) if other.value_type() == self.codec.value_type() => {
                Ok(other.clone())
            }
            (Direction::Parse, other) => Err(ConversionError::new(format!(
                "expected text, found {}",
                other.value_type()
            ))),
            (Direction::Format, CsvValue::String(text))
                if self.codec.format_type() != ValueType::Any =>
            {
                let typed = self.codec.parse(text)?;
                self.codec.format(&typed).map(CsvValue::String)
            }
            (Direction::Format, value) => self.codec.format(value).map(CsvValue::String),
        }
    }
}

fn mismatch(expected: ValueType, found: &CsvValue) -> ConversionError {
    ConversionError::new(format!("expected {}, found {}", expected, found.value_type()))
}

/// Text pass-through; formats any value with its display form.
#[derive(Clone, Debug, Default)]
pub struct TextCodec {
    pub trim: bool,
}

impl Codec for TextCodec {
    fn name(&self) -> &str {
        "string"
    }

    fn value_type(&self) -> ValueType {
        ValueType::String
    }

    fn format_type(&self) -> ValueType {
        ValueType::Any
    }

    fn error_template(&self) -> &str {
        "cannot convert column {column_name} to text: {detail}"
    }

    fn parse(&self, text: &str) -> ConvertResult<CsvValue> {
        let text = if self.trim { text.trim() } else { text };
        Ok(CsvValue::String(text.to_string()))
    }

    fn format(&self, value: &CsvValue) -> ConvertResult<String> {
        let text = value.to_string();
        Ok(if self.trim {
            text.trim().to_string()
        } else {
            text
        })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct IntegerCodec;

impl Codec for IntegerCodec {
    fn name(&self) -> &str {
        "integer"
    }

    fn value_type(&self) -> ValueType {
        ValueType::Integer
    }

    fn error_template(&self) -> &str {
        "'{original_value}' in column {column_name} is not a valid integer: {detail}"
    }

    fn parse(&self, text: &str) -> ConvertResult<CsvValue> {
        text.trim()
            .parse::<i64>()
            .map(CsvValue::Integer)
            .map_err(ConversionError::new)
    }

    fn format(&self, value: &CsvValue) -> ConvertResult<String> {
        value
            .as_i64()
            .map(|i| i.to_string())
            .ok_or_else(|| mismatch(ValueType::Integer, value))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FloatCodec;

impl Codec for FloatCodec {
    fn name(&self) -> &str {
        "float"
    }

    fn value_type(&self) -> ValueType {
        ValueType::Float
    }

    fn error_template(&self) -> &str {
        "'{original_value}' in column {column_name} is not a valid number: {detail}"
    }

    fn parse(&self, text: &str) -> ConvertResult<CsvValue> {
        text.trim()
            .parse::<f64>()
            .map(CsvValue::Float)
            .map_err(ConversionError::new)
    }

    fn format(&self, value: &CsvValue) -> ConvertResult<String> {
        match value {
            CsvValue::Float(f) => Ok(f.to_string()),
            CsvValue::Integer(i) => Ok(i.to_string()),
            other => Err(mismatch(ValueType::Float, other)),
        }
    }
}

/// Boolean with configurable literals; parsing ignores ASCII case.
#[derive(Clone, Debug)]
pub struct BoolCodec {
    pub true_literal: String,
    pub false_literal: String,
}

impl Default for BoolCodec {
    fn default() -> Self {
        BoolCodec {
            true_literal: "true".to_string(),
            false_literal: "false".to_string(),
        }
    }
}

impl Codec for BoolCodec {
    fn name(&self) -> &str {
        "boolean"
    }

    fn value_type(&self) -> ValueType {
        ValueType::Bool
    }

    fn error_template(&self) -> &str {
        "'{original_value}' in column {column_name} is not a boolean: {detail}"
    }

    fn parse(&self, text: &str) -> ConvertResult<CsvValue> {
        let text = text.trim();
        if text.eq_ignore_ascii_case(&self.true_literal) {
            Ok(CsvValue::Bool(true))
        } else if text.eq_ignore_ascii_case(&self.false_literal) {
            Ok(CsvValue::Bool(false))
        } else {
            Err(ConversionError::new(format!(
                "expected `{}` or `{}`",
                self.true_literal, self.false_literal
            )))
        }
    }

    fn format(&self, value: &CsvValue) -> ConvertResult<String> {
        match value.as_bool() {
            Some(true) => Ok(self.true_literal.clone()),
            Some(false) => Ok(self.false_literal.clone()),
            None => Err(mismatch(ValueType::Bool, value)),
        }
    }
}

/// Calendar date with a strftime pattern.
#[derive(Clone, Debug)]
pub struct DateCodec {
    format: String,
}

impl DateCodec {
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid strftime pattern.
    pub fn new(format: &str) -> Result<Self> {
        check_strftime(format)?;
        Ok(DateCodec {
            format: format.to_string(),
        })
    }
}

impl Default for DateCodec {
    fn default() -> Self {
        DateCodec {
            format: "%Y-%m-%d".to_string(),
        }
    }
}

impl Codec for DateCodec {
    fn name(&self) -> &str {
        "date"
    }

    fn value_type(&self) -> ValueType {
        ValueType::Date
    }

    fn error_template(&self) -> &str {
        "'{original_value}' in column {column_name} is not a valid date: {detail}"
    }

    fn parse(&self, text: &str) -> ConvertResult<CsvValue> {
        NaiveDate::parse_from_str(text.trim(), &self.format)
            .map(CsvValue::Date)
            .map_err(ConversionError::new)
    }

    fn format(&self, value: &CsvValue) -> ConvertResult<String> {
        let mut out = String::new();
        let written = match value {
            CsvValue::Date(d) => write!(out, "{}", d.format(&self.format)),
            CsvValue::DateTime(dt) => write!(out, "{}", dt.date_naive().format(&self.format)),
            other => return Err(mismatch(ValueType::Date, other)),
        };
        written.map_err(|_| ConversionError::new("date cannot be rendered with this format"))?;
        Ok(out)
    }
}

/// UTC timestamp; RFC 3339 unless a strftime pattern is given.
#[derive(Clone, Debug, Default)]
pub struct DateTimeCodec {
    format: Option<String>,
}

impl DateTimeCodec {
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid strftime pattern.
    pub fn with_format(format: &str) -> Result<Self> {
        check_strftime(format)?;
        Ok(DateTimeCodec {
            format: Some(format.to_string()),
        })
    }
}

impl Codec for DateTimeCodec {
    fn name(&self) -> &str {
        "datetime"
    }

    fn value_type(&self) -> ValueType {
        ValueType::DateTime
    }

    fn error_template(&self) -> &str {
        "'{original_value}' in column {column_name} is not a valid timestamp: {detail}"
    }

    fn parse(&self, text: &str) -> ConvertResult<CsvValue> {
        let text = text.trim();
        let parsed = match &self.format {
            None => DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Utc)),
            Some(format) => {
                NaiveDateTime::parse_from_str(text, format).map(|ndt| Utc.from_utc_datetime(&ndt))
            }
        };
        parsed.map(CsvValue::DateTime).map_err(ConversionError::new)
    }

    fn format(&self, value: &CsvValue) -> ConvertResult<String> {
        let CsvValue::DateTime(dt) = value else {
            return Err(mismatch(ValueType::DateTime, value));
        };
        match &self.format {
            None => Ok(dt.to_rfc3339()),
            Some(format) => {
                let mut out = String::new();
                write!(out, "{}", dt.format(format)).map_err(|_| {
                    ConversionError::new("timestamp cannot be rendered with this format")
                })?;
                Ok(out)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BigIntCodec;

impl Codec for BigIntCodec {
    fn name(&self) -> &str {
        "bigint"
    }

    fn value_type(&self) -> ValueType {
        ValueType::BigInt
    }

    fn error_template(&self) -> &str {
        "'{original_value}' in column {column_name} is not a valid integer: {detail}"
    }

    fn parse(&self, text: &str) -> ConvertResult<CsvValue> {
        text.trim()
            .parse::<BigInt>()
            .map(CsvValue::BigInt)
            .map_err(ConversionError::new)
    }

    fn format(&self, value: &CsvValue) -> ConvertResult<String> {
        match value {
            CsvValue::BigInt(b) => Ok(b.to_string()),
            CsvValue::Integer(i) => Ok(i.to_string()),
            other => Err(mismatch(ValueType::BigInt, other)),
        }
    }
}

fn check_strftime(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(Error::config(format!("invalid date format `{}`", format)));
    }
    Ok(())
}

/// Rejects empty or blank text.
#[derive(Clone, Copy, Debug, Default)]
pub struct NotEmpty;

impl Validator for NotEmpty {
    fn name(&self) -> &str {
        "not_empty"
    }

    fn error_template(&self) -> &str {
        "column {column_name} must not be empty"
    }

    fn validate(&self, value: &CsvValue) -> bool {
        match value {
            CsvValue::Null => false,
            CsvValue::String(s) => !s.trim().is_empty(),
            _ => true,
        }
    }
}

/// Bounds on the character count of the text form.
#[derive(Clone, Copy, Debug, Default)]
pub struct Length {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Length {
    #[must_use]
    pub const fn new(min: Option<usize>, max: Option<usize>) -> Self {
        Length { min, max }
    }
}

impl Validator for Length {
    fn name(&self) -> &str {
        "length"
    }

    fn error_template(&self) -> &str {
        "length of '{original_value}' in column {column_name} is out of bounds"
    }

    fn validate(&self, value: &CsvValue) -> bool {
        let len = match value {
            CsvValue::String(s) => s.chars().count(),
            other => other.to_string().chars().count(),
        };
        self.min.map_or(true, |min| len >= min) && self.max.map_or(true, |max| len <= max)
    }
}

/// Inclusive numeric bounds. Text is read as a number; anything else fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct Range {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Range {
    #[must_use]
    pub const fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Range { min, max }
    }
}

impl Validator for Range {
    fn name(&self) -> &str {
        "range"
    }

    fn error_template(&self) -> &str {
        "{converted_value} in column {column_name} is out of range"
    }

    fn validate(&self, value: &CsvValue) -> bool {
        let number = match value {
            CsvValue::String(s) => s.trim().parse::<f64>().ok(),
            other => other.as_f64(),
        };
        let Some(n) = number else {
            return false;
        };
        self.min.map_or(true, |min| n >= min) && self.max.map_or(true, |max| n <= max)
    }
}

/// Text form must be one of an allowed set.
#[derive(Clone, Debug, Default)]
pub struct OneOf {
    allowed: Vec<String>,
}

impl OneOf {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OneOf {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for OneOf {
    fn name(&self) -> &str {
        "one_of"
    }

    fn error_template(&self) -> &str {
        "'{original_value}' is not an allowed value for column {column_name}"
    }

    fn validate(&self, value: &CsvValue) -> bool {
        match value {
            CsvValue::String(s) => self.allowed.iter().any(|a| a == s),
            other => {
                let text = other.to_string();
                self.allowed.iter().any(|a| *a == text)
            }
        }
    }
}

type PredicateFn = Box<dyn Fn(&CsvValue) -> bool + Send + Sync>;

/// Validator backed by a closure.
pub struct Predicate {
    name: String,
    template: String,
    check: PredicateFn,
}

impl Predicate {
    pub fn new<F>(name: &str, template: &str, check: F) -> Self
    where
        F: Fn(&CsvValue) -> bool + Send + Sync + 'static,
    {
        Predicate {
            name: name.to_string(),
            template: template.to_string(),
            check: Box::new(check),
        }
    }
}

impl Validator for Predicate {
    fn name(&self) -> &str {
        &self.name
    }

    fn error_template(&self) -> &str {
        &self.template
    }

    fn validate(&self, value: &CsvValue) -> bool {
        (self.check)(value)
    }
}

/// Constructors for converters and validators, keyed by type name.
pub struct Registry {
    converters: IndexMap<String, ConverterCtor>,
    validators: IndexMap<String, ValidatorCtor>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Registry {
            converters: IndexMap::new(),
            validators: IndexMap::new(),
        }
    }

    /// A registry with every built-in converter and validator.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Registry::new();

        registry.register_converter("string", |direction, params| {
            let trim = param_bool(params, "trim")?.unwrap_or(false);
            Ok(boxed(TextCodec { trim }, direction))
        });
        registry.register_converter("integer", |direction, _| Ok(boxed(IntegerCodec, direction)));
        registry.register_converter("float", |direction, _| Ok(boxed(FloatCodec, direction)));
        registry.register_converter("boolean", |direction, params| {
            let mut codec = BoolCodec::default();
            if let Some(literal) = params.get("true") {
                codec.true_literal = literal.clone();
            }
            if let Some(literal) = params.get("false") {
                codec.false_literal = literal.clone();
            }
            Ok(boxed(codec, direction))
        });
        registry.register_converter("date", |direction, params| {
            let codec = match params.get("format") {
                Some(format) => DateCodec::new(format)?,
                None => DateCodec::default(),
            };
            Ok(boxed(codec, direction))
        });
        registry.register_converter("datetime", |direction, params| {
            let codec = match params.get("format") {
                Some(format) => DateTimeCodec::with_format(format)?,
                None => DateTimeCodec::default(),
            };
            Ok(boxed(codec, direction))
        });
        registry.register_converter("bigint", |direction, _| Ok(boxed(BigIntCodec, direction)));

        registry.register_validator("not_empty", |_| Ok(Box::new(NotEmpty)));
        registry.register_validator("length", |params| {
            Ok(Box::new(Length::new(
                param_parsed(params, "min")?,
                param_parsed(params, "max")?,
            )))
        });
        registry.register_validator("range", |params| {
            Ok(Box::new(Range::new(
                param_parsed(params, "min")?,
                param_parsed(params, "max")?,
            )))
        });
        registry.register_validator("one_of", |params| {
            let allowed = params
                .get("values")
                .ok_or_else(|| Error::config("one_of requires a `values` parameter"))?;
            Ok(Box::new(OneOf::new(allowed.split('|'))))
        });

        registry
    }

    /// Registers (or replaces) a converter constructor.
    pub fn register_converter<F>(&mut self, name: &str, ctor: F)
    where
        F: Fn(Direction, &Params) -> Result<Box<dyn Converter>> + Send + Sync + 'static,
    {
        self.converters.insert(name.to_string(), Box::new(ctor));
    }

    /// Registers (or replaces) a validator constructor.
    pub fn register_validator<F>(&mut self, name: &str, ctor: F)
    where
        F: Fn(&Params) -> Result<Box<dyn Validator>> + Send + Sync + 'static,
    {
        self.validators.insert(name.to_string(), Box::new(ctor));
    }

    /// Builds a converter by type name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown name or invalid parameters.
    pub fn converter(
        &self,
        name: &str,
        direction: Direction,
        params: &Params,
    ) -> Result<Box<dyn Converter>> {
        let ctor = self
            .converters
            .get(name)
            .ok_or_else(|| Error::config(format!("unknown converter type `{}`", name)))?;
        ctor(direction, params)
    }

    /// Builds a validator by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown name or invalid parameters.
    pub fn validator(&self, name: &str, params: &Params) -> Result<Box<dyn Validator>> {
        let ctor = self
            .validators
            .get(name)
            .ok_or_else(|| Error::config(format!("unknown validator `{}`", name)))?;
        ctor(params)
    }

    pub fn converter_names(&self) -> impl Iterator<Item = &str> {
        self.converters.keys().map(String::as_str)
    }

    pub fn validator_names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }
}

fn boxed<C: Codec + 'static>(codec: C, direction: Direction) -> Box<dyn Converter> {
    Box::new(codec.directed(direction))
}

fn param_bool(params: &Params, key: &str) -> Result<Option<bool>> {
    param_parsed(params, key)
}

fn param_parsed<T: std::str::FromStr>(params: &Params, key: &str) -> Result<Option<T>> {
    params
        .get(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| Error::config(format!("invalid value `{}` for parameter `{}`", raw, key)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<C: Codec>(codec: C, text: &str) -> ConvertResult<CsvValue> {
        codec.directed(Direction::Parse).convert(&CsvValue::from(text))
    }

    fn format<C: Codec>(codec: C, value: CsvValue) -> ConvertResult<CsvValue> {
        codec.directed(Direction::Format).convert(&value)
    }

    #[test]
    fn test_integer() {
        assert_eq!(parse(IntegerCodec, " 42 ").unwrap(), CsvValue::Integer(42));
        assert!(parse(IntegerCodec, "4.2").is_err());
        assert_eq!(
            format(IntegerCodec, CsvValue::Integer(-7)).unwrap(),
            CsvValue::from("-7")
        );
        assert!(format(IntegerCodec, CsvValue::from(true)).is_err());
    }

    #[test]
    fn test_format_validates_text_input() {
        assert_eq!(
            format(IntegerCodec, CsvValue::from("12")).unwrap(),
            CsvValue::from("12")
        );
        assert!(format(IntegerCodec, CsvValue::from("twelve")).is_err());
    }

    #[test]
    fn test_parse_passes_typed_values() {
        assert_eq!(
            IntegerCodec
                .directed(Direction::Parse)
                .convert(&CsvValue::Integer(3))
                .unwrap(),
            CsvValue::Integer(3)
        );
    }

    #[test]
    fn test_text_trim() {
        assert_eq!(
            parse(TextCodec { trim: true }, "  a b ").unwrap(),
            CsvValue::from("a b")
        );
        assert_eq!(
            format(TextCodec::default(), CsvValue::Float(1.5)).unwrap(),
            CsvValue::from("1.5")
        );
    }

    #[test]
    fn test_bool_literals() {
        let codec = BoolCodec {
            true_literal: "Y".to_string(),
            false_literal: "N".to_string(),
        };
        assert_eq!(parse(codec.clone(), "y").unwrap(), CsvValue::Bool(true));
        assert!(parse(codec.clone(), "true").is_err());
        assert_eq!(format(codec, CsvValue::Bool(false)).unwrap(), CsvValue::from("N"));
    }

    #[test]
    fn test_date_formats() {
        let codec = DateCodec::new("%d.%m.%Y").unwrap();
        let value = parse(codec.clone(), "01.02.2024").unwrap();
        assert_eq!(value, CsvValue::Date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
        assert_eq!(format(codec, value).unwrap(), CsvValue::from("01.02.2024"));
        assert!(DateCodec::new("%Q").is_err());
    }

    #[test]
    fn test_datetime_rfc3339() {
        let value = parse(DateTimeCodec::default(), "2024-01-15T10:30:00+02:00").unwrap();
        let CsvValue::DateTime(dt) = &value else {
            panic!("expected timestamp");
        };
        assert_eq!(dt.to_rfc3339(), "2024-01-15T08:30:00+00:00");
    }

    #[test]
    fn test_bigint() {
        let text = "123456789012345678901234567890";
        let value = parse(BigIntCodec, text).unwrap();
        assert_eq!(format(BigIntCodec, value).unwrap(), CsvValue::from(text));
    }

    #[test]
    fn test_validators() {
        assert!(!NotEmpty.validate(&CsvValue::from("  ")));
        assert!(NotEmpty.validate(&CsvValue::from(0)));
        assert!(Length::new(Some(2), Some(3)).validate(&CsvValue::from("äöü")));
        assert!(!Length::new(None, Some(2)).validate(&CsvValue::from("abc")));
        assert!(Range::new(Some(0.0), None).validate(&CsvValue::Integer(0)));
        assert!(Range::new(Some(0.0), None).validate(&CsvValue::from(" 5")));
        assert!(!Range::new(Some(0.0), None).validate(&CsvValue::from("five")));
        assert!(OneOf::new(["a", "b"]).validate(&CsvValue::from("b")));
        let even = Predicate::new("even", "odd value", |v| v.as_i64().map_or(false, |i| i % 2 == 0));
        assert!(even.validate(&CsvValue::Integer(4)));
    }

    #[test]
    fn test_registry_lookup() {
        let registry = Registry::with_defaults();
        let converter = registry
            .converter("integer", Direction::Format, &Params::new())
            .unwrap();
        assert_eq!(converter.direction(), Direction::Format);
        assert_eq!(converter.model_type(), ValueType::Integer);
        assert!(registry.converter("uuid", Direction::Parse, &Params::new()).is_err());

        let mut params = Params::new();
        params.insert("min".to_string(), "abc".to_string());
        assert!(registry.validator("length", &params).is_err());
    }

    #[test]
    fn test_registry_custom_type() {
        let mut registry = Registry::new();
        registry.register_converter("upper", |direction, _| {
            struct Upper(Direction);
            impl Converter for Upper {
                fn name(&self) -> &str {
                    "upper"
                }
                fn direction(&self) -> Direction {
                    self.0
                }
                fn source_type(&self) -> ValueType {
                    ValueType::String
                }
                fn target_type(&self) -> ValueType {
                    ValueType::String
                }
                fn convert(&self, source: &CsvValue) -> ConvertResult<CsvValue> {
                    Ok(CsvValue::from(source.to_string().to_uppercase()))
                }
            }
            Ok(Box::new(Upper(direction)))
        });
        let converter = registry
            .converter("upper", Direction::Parse, &Params::new())
            .unwrap();
        assert_eq!(converter.convert(&CsvValue::from("ab")).unwrap(), CsvValue::from("AB"));
        assert_eq!(registry.converter_names().collect::<Vec<_>>(), vec!["upper"]);
    }
}
