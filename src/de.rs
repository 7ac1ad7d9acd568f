//! Deserialization of records into Rust values.
//!
//! [`RecordDeserializer`] presents a [`RecordMap`] to serde as a map (for
//! structs and maps) or as a sequence of its values (for tuples and
//! vectors). Each cell goes through [`ValueDeserializer`], which accepts
//! text where a number, bool or char is requested and parses it on demand.
//! This is what lets a header-driven text record land in a typed struct.
//!
//! ## Null handling
//!
//! - `Option<T>` fields: null becomes `None`.
//! - `String` fields: null becomes the empty string.
//! - Any other type: null is a [`Error::TypeMismatch`].
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_dsv::{de::from_record, record};
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Row { id: u32, score: f64, note: Option<String> }
//!
//! let row: Row = from_record(record! { "id": "7", "score": "0.5", "note": null }).unwrap();
//! assert_eq!(row, Row { id: 7, score: 0.5, note: None });
//! ```

use crate::{CsvValue, Error, RecordMap, Result};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{de, forward_to_deserialize_any};

/// Deserializes a record into `T`.
///
/// # Errors
///
/// Returns [`Error::TypeMismatch`] when a cell cannot be read as the
/// requested type, or a custom error raised by `T`'s implementation (for
/// example a missing field).
pub fn from_record<T: DeserializeOwned>(record: RecordMap) -> Result<T> {
    T::deserialize(RecordDeserializer::new(record))
}

/// Deserializes one cell into `T`.
///
/// # Errors
///
/// Returns [`Error::TypeMismatch`] when the cell cannot be read as `T`.
pub fn from_value<T: DeserializeOwned>(value: CsvValue) -> Result<T> {
    T::deserialize(ValueDeserializer::new(String::new(), value))
}

/// Deserializer over a whole record.
pub struct RecordDeserializer {
    record: RecordMap,
}

impl RecordDeserializer {
    #[must_use]
    pub fn new(record: RecordMap) -> Self {
        RecordDeserializer { record }
    }
}

impl<'de> de::Deserializer<'de> for RecordDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(MapDeserializer::new(self.record))
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(SeqDeserializer::new(self.record))
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.record.is_empty() {
            visitor.visit_unit()
        } else {
            Err(Error::custom("expected an empty record"))
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf map struct enum identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: indexmap::map::IntoIter<String, CsvValue>,
}

impl SeqDeserializer {
    fn new(record: RecordMap) -> Self {
        SeqDeserializer {
            iter: record.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => seed.deserialize(ValueDeserializer::new(key, value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, CsvValue>,
    pending: Option<(String, CsvValue)>,
}

impl MapDeserializer {
    fn new(record: RecordMap) -> Self {
        MapDeserializer {
            iter: record.into_iter(),
            pending: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                let result = seed.deserialize(key.clone().into_deserializer()).map(Some);
                self.pending = Some((key, value));
                result
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.pending.take() {
            Some((key, value)) => seed.deserialize(ValueDeserializer::new(key, value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

/// Deserializer for one cell, remembering its key for error messages.
pub struct ValueDeserializer {
    key: String,
    value: CsvValue,
}

impl ValueDeserializer {
    #[must_use]
    pub fn new(key: String, value: CsvValue) -> Self {
        ValueDeserializer { key, value }
    }

    fn mismatch(&self, expected: &str) -> Error {
        let found = match &self.value {
            CsvValue::Null => "null".to_string(),
            other => format!("{} \"{}\"", other.value_type(), other),
        };
        Error::type_mismatch(&self.key, expected, &found)
    }
}

macro_rules! deserialize_integer {
    ($method:ident, $visit:ident, $ty:ty) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            let parsed: Option<$ty> = match &self.value {
                CsvValue::Integer(i) => <$ty>::try_from(*i).ok(),
                CsvValue::BigInt(b) => <$ty>::try_from(b).ok(),
                CsvValue::String(s) => s.trim().parse::<$ty>().ok(),
                _ => None,
            };
            match parsed {
                Some(v) => visitor.$visit(v),
                None => Err(self.mismatch(stringify!($ty))),
            }
        }
    };
}

macro_rules! deserialize_float {
    ($method:ident, $visit:ident, $ty:ty) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            let parsed: Option<$ty> = match &self.value {
                CsvValue::Float(f) => Some(*f as $ty),
                CsvValue::Integer(i) => Some(*i as $ty),
                CsvValue::String(s) => s.trim().parse::<$ty>().ok(),
                _ => None,
            };
            match parsed {
                Some(v) => visitor.$visit(v),
                None => Err(self.mismatch(stringify!($ty))),
            }
        }
    };
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            CsvValue::Null => visitor.visit_unit(),
            CsvValue::Bool(b) => visitor.visit_bool(b),
            CsvValue::Integer(i) => visitor.visit_i64(i),
            CsvValue::Float(f) => visitor.visit_f64(f),
            CsvValue::String(s) => visitor.visit_string(s),
            CsvValue::BigInt(b) => match i64::try_from(&b) {
                Ok(i) => visitor.visit_i64(i),
                Err(_) => visitor.visit_string(b.to_string()),
            },
            other @ (CsvValue::Date(_) | CsvValue::DateTime(_)) => {
                visitor.visit_string(other.to_string())
            }
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match &self.value {
            CsvValue::Bool(b) => visitor.visit_bool(*b),
            CsvValue::String(s) if s.trim().eq_ignore_ascii_case("true") => visitor.visit_bool(true),
            CsvValue::String(s) if s.trim().eq_ignore_ascii_case("false") => {
                visitor.visit_bool(false)
            }
            _ => Err(self.mismatch("bool")),
        }
    }

    deserialize_integer!(deserialize_i8, visit_i8, i8);
    deserialize_integer!(deserialize_i16, visit_i16, i16);
    deserialize_integer!(deserialize_i32, visit_i32, i32);
    deserialize_integer!(deserialize_i64, visit_i64, i64);
    deserialize_integer!(deserialize_i128, visit_i128, i128);
    deserialize_integer!(deserialize_u8, visit_u8, u8);
    deserialize_integer!(deserialize_u16, visit_u16, u16);
    deserialize_integer!(deserialize_u32, visit_u32, u32);
    deserialize_integer!(deserialize_u64, visit_u64, u64);
    deserialize_integer!(deserialize_u128, visit_u128, u128);
    deserialize_float!(deserialize_f32, visit_f32, f32);
    deserialize_float!(deserialize_f64, visit_f64, f64);

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if let CsvValue::String(s) = &self.value {
            let mut chars = s.chars();
            if let (Some(ch), None) = (chars.next(), chars.next()) {
                return visitor.visit_char(ch);
            }
        }
        Err(self.mismatch("char"))
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            CsvValue::Null => visitor.visit_str(""),
            CsvValue::String(s) => visitor.visit_string(s),
            other => visitor.visit_string(other.to_string()),
        }
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            CsvValue::String(s) => visitor.visit_byte_buf(s.into_bytes()),
            _ => Err(self.mismatch("bytes")),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.value.is_null() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.value.is_null() {
            visitor.visit_unit()
        } else {
            Err(self.mismatch("null"))
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported_type("nested sequences in a field"))
    }

    fn deserialize_tuple<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported_type("nested tuples in a field"))
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported_type("nested tuple structs in a field"))
    }

    fn deserialize_map<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported_type("nested maps in a field"))
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported_type("nested structs in a field"))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            CsvValue::String(s) => visitor.visit_enum(s.trim().to_string().into_deserializer()),
            _ => Err(self.mismatch("enum variant name")),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}
