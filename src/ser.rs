//! Serialization of Rust values into records.
//!
//! [`RecordSerializer`] turns a struct, map or sequence into a [`RecordMap`];
//! [`ValueSerializer`] turns a scalar into a [`CsvValue`]. A record is flat:
//! nested structs, maps and sequences inside a record are rejected with
//! [`Error::UnsupportedType`].
//!
//! Sequences and tuples become records keyed by position (`"0"`, `"1"`, ...).
//!
//! ```rust
//! use serde::Serialize;
//! use serde_dsv::{ser::to_record, CsvValue};
//!
//! #[derive(Serialize)]
//! struct Row { id: u32, name: Option<String> }
//!
//! let record = to_record(&Row { id: 7, name: None }).unwrap();
//! assert_eq!(record.get("id"), Some(&CsvValue::Integer(7)));
//! assert_eq!(record.get("name"), Some(&CsvValue::Null));
//! ```

use crate::{CsvValue, Error, RecordMap, Result};
use num_bigint::BigInt;
use serde::{ser, Serialize};

/// Serializes a value into a flat record.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for scalars at the top level, for
/// nested compound values and for enum variants carrying data.
pub fn to_record<T: Serialize + ?Sized>(value: &T) -> Result<RecordMap> {
    value.serialize(RecordSerializer)
}

/// Serializes a scalar into a cell value.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for compound values.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<CsvValue> {
    value.serialize(ValueSerializer)
}

/// Serializer for one cell.
pub struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = CsvValue;
    type Error = Error;

    type SerializeSeq = ser::Impossible<CsvValue, Error>;
    type SerializeTuple = ser::Impossible<CsvValue, Error>;
    type SerializeTupleStruct = ser::Impossible<CsvValue, Error>;
    type SerializeTupleVariant = ser::Impossible<CsvValue, Error>;
    type SerializeMap = ser::Impossible<CsvValue, Error>;
    type SerializeStruct = ser::Impossible<CsvValue, Error>;
    type SerializeStructVariant = ser::Impossible<CsvValue, Error>;

    fn serialize_bool(self, v: bool) -> Result<CsvValue> {
        Ok(CsvValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<CsvValue> {
        Ok(CsvValue::Integer(i64::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<CsvValue> {
        Ok(CsvValue::Integer(i64::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<CsvValue> {
        Ok(CsvValue::Integer(i64::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<CsvValue> {
        Ok(CsvValue::Integer(v))
    }

    fn serialize_i128(self, v: i128) -> Result<CsvValue> {
        Ok(match i64::try_from(v) {
            Ok(i) => CsvValue::Integer(i),
            Err(_) => CsvValue::BigInt(BigInt::from(v)),
        })
    }

    fn serialize_u8(self, v: u8) -> Result<CsvValue> {
        Ok(CsvValue::Integer(i64::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<CsvValue> {
        Ok(CsvValue::Integer(i64::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<CsvValue> {
        Ok(CsvValue::Integer(i64::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<CsvValue> {
        Ok(match i64::try_from(v) {
            Ok(i) => CsvValue::Integer(i),
            Err(_) => CsvValue::BigInt(BigInt::from(v)),
        })
    }

    fn serialize_u128(self, v: u128) -> Result<CsvValue> {
        Ok(match i64::try_from(v) {
            Ok(i) => CsvValue::Integer(i),
            Err(_) => CsvValue::BigInt(BigInt::from(v)),
        })
    }

    fn serialize_f32(self, v: f32) -> Result<CsvValue> {
        Ok(CsvValue::Float(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<CsvValue> {
        Ok(CsvValue::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<CsvValue> {
        Ok(CsvValue::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<CsvValue> {
        Ok(CsvValue::String(v.to_string()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<CsvValue> {
        Err(Error::unsupported_type("byte arrays in a field"))
    }

    fn serialize_none(self) -> Result<CsvValue> {
        Ok(CsvValue::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<CsvValue>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<CsvValue> {
        Ok(CsvValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<CsvValue> {
        Ok(CsvValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<CsvValue> {
        Ok(CsvValue::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<CsvValue>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<CsvValue>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::unsupported_type("newtype variants in a field"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Error::unsupported_type("nested sequences in a field"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(Error::unsupported_type("nested tuples in a field"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(Error::unsupported_type("nested tuple structs in a field"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::unsupported_type("tuple variants in a field"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::unsupported_type("nested maps in a field"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(Error::unsupported_type("nested structs in a field"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::unsupported_type("struct variants in a field"))
    }
}

/// Serializer for a whole record.
pub struct RecordSerializer;

/// Accumulates the fields of one record.
pub struct SerializeRecord {
    record: RecordMap,
    current_key: Option<String>,
}

impl SerializeRecord {
    fn new(len: Option<usize>) -> Self {
        SerializeRecord {
            record: RecordMap::with_capacity(len.unwrap_or(0)),
            current_key: None,
        }
    }

    fn push_positional<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self.record.len().to_string();
        self.record.insert(key, to_value(value)?);
        Ok(())
    }
}

fn not_a_record(kind: &str) -> Error {
    Error::unsupported_type(&format!("{} cannot be written as a record", kind))
}

impl ser::Serializer for RecordSerializer {
    type Ok = RecordMap;
    type Error = Error;

    type SerializeSeq = SerializeRecord;
    type SerializeTuple = SerializeRecord;
    type SerializeTupleStruct = SerializeRecord;
    type SerializeTupleVariant = ser::Impossible<RecordMap, Error>;
    type SerializeMap = SerializeRecord;
    type SerializeStruct = SerializeRecord;
    type SerializeStructVariant = ser::Impossible<RecordMap, Error>;

    fn serialize_bool(self, _v: bool) -> Result<RecordMap> {
        Err(not_a_record("a boolean"))
    }

    fn serialize_i8(self, _v: i8) -> Result<RecordMap> {
        Err(not_a_record("an integer"))
    }

    fn serialize_i16(self, _v: i16) -> Result<RecordMap> {
        Err(not_a_record("an integer"))
    }

    fn serialize_i32(self, _v: i32) -> Result<RecordMap> {
        Err(not_a_record("an integer"))
    }

    fn serialize_i64(self, _v: i64) -> Result<RecordMap> {
        Err(not_a_record("an integer"))
    }

    fn serialize_u8(self, _v: u8) -> Result<RecordMap> {
        Err(not_a_record("an integer"))
    }

    fn serialize_u16(self, _v: u16) -> Result<RecordMap> {
        Err(not_a_record("an integer"))
    }

    fn serialize_u32(self, _v: u32) -> Result<RecordMap> {
        Err(not_a_record("an integer"))
    }

    fn serialize_u64(self, _v: u64) -> Result<RecordMap> {
        Err(not_a_record("an integer"))
    }

    fn serialize_f32(self, _v: f32) -> Result<RecordMap> {
        Err(not_a_record("a float"))
    }

    fn serialize_f64(self, _v: f64) -> Result<RecordMap> {
        Err(not_a_record("a float"))
    }

    fn serialize_char(self, _v: char) -> Result<RecordMap> {
        Err(not_a_record("a char"))
    }

    fn serialize_str(self, _v: &str) -> Result<RecordMap> {
        Err(not_a_record("a string"))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<RecordMap> {
        Err(not_a_record("a byte array"))
    }

    fn serialize_none(self) -> Result<RecordMap> {
        Err(not_a_record("`None`"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<RecordMap>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<RecordMap> {
        Ok(RecordMap::new())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<RecordMap> {
        Ok(RecordMap::new())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<RecordMap> {
        Err(not_a_record("an enum variant"))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<RecordMap>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<RecordMap>
    where
        T: ?Sized + Serialize,
    {
        Err(not_a_record("an enum variant"))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeRecord> {
        Ok(SerializeRecord::new(len))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeRecord> {
        Ok(SerializeRecord::new(Some(len)))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeRecord> {
        Ok(SerializeRecord::new(Some(len)))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(not_a_record("an enum variant"))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeRecord> {
        Ok(SerializeRecord::new(len))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeRecord> {
        Ok(SerializeRecord::new(Some(len)))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(not_a_record("an enum variant"))
    }
}

impl ser::SerializeSeq for SerializeRecord {
    type Ok = RecordMap;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push_positional(value)
    }

    fn end(self) -> Result<RecordMap> {
        Ok(self.record)
    }
}

impl ser::SerializeTuple for SerializeRecord {
    type Ok = RecordMap;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push_positional(value)
    }

    fn end(self) -> Result<RecordMap> {
        Ok(self.record)
    }
}

impl ser::SerializeTupleStruct for SerializeRecord {
    type Ok = RecordMap;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push_positional(value)
    }

    fn end(self) -> Result<RecordMap> {
        Ok(self.record)
    }
}

impl ser::SerializeMap for SerializeRecord {
    type Ok = RecordMap;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_value(key)?.into_text() {
            Some(key) => {
                self.current_key = Some(key);
                Ok(())
            }
            None => Err(Error::custom("record keys must not be null")),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.record.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<RecordMap> {
        Ok(self.record)
    }
}

impl ser::SerializeStruct for SerializeRecord {
    type Ok = RecordMap;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.record.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<RecordMap> {
        Ok(self.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    enum Status {
        Active,
    }

    #[derive(Serialize)]
    struct Row {
        id: u64,
        score: f32,
        status: Status,
        note: Option<&'static str>,
    }

    #[test]
    fn test_struct_keeps_field_order() {
        let record = to_record(&Row {
            id: 1,
            score: 0.5,
            status: Status::Active,
            note: None,
        })
        .unwrap();
        let keys: Vec<_> = record.keys().cloned().collect();
        assert_eq!(keys, vec!["id", "score", "status", "note"]);
        assert_eq!(record.get("status"), Some(&CsvValue::from("Active")));
        assert_eq!(record.get("note"), Some(&CsvValue::Null));
    }

    #[test]
    fn test_tuple_keys_are_positions() {
        let record = to_record(&("a", 2, true)).unwrap();
        assert_eq!(record.get("1"), Some(&CsvValue::Integer(2)));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_map_with_integer_keys() {
        let mut map = BTreeMap::new();
        map.insert(10, "x");
        let record = to_record(&map).unwrap();
        assert_eq!(record.get("10"), Some(&CsvValue::from("x")));
    }

    #[test]
    fn test_large_unsigned_widens() {
        assert!(matches!(to_value(&u64::MAX).unwrap(), CsvValue::BigInt(_)));
    }

    #[test]
    fn test_rejects_nested_and_scalar() {
        #[derive(Serialize)]
        struct Nested {
            tags: Vec<String>,
        }
        let err = to_record(&Nested { tags: vec![] }).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));
        assert!(to_record(&42).is_err());
    }
}
