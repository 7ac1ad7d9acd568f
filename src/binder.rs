//! Model binding between ordered field values and a data model.
//!
//! The read path drives a [`ReadBinder`]: `init_model`, one `fill` per
//! schema field, then `get_model`. The write path drives a [`WriteBinder`]:
//! `set_model`, then `value` for each schema field. Every call carries both
//! the field's position and its model key; a binder uses whichever fits
//! its model.
//!
//! | Binder | Model | Addressed by |
//! |--------|-------|--------------|
//! | [`ArrayBinder`] | `Vec<CsvValue>` | position |
//! | [`MapBinder`] | [`RecordMap`] | model key |
//! | [`SerdeBinder<T>`] | any serde type | model key |

use crate::de::RecordDeserializer;
use crate::ser::to_record;
use crate::{CsvValue, RecordMap, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// Builds models on the read path.
pub trait ReadBinder {
    type Model;

    /// Starts a new model with room for `size` fields.
    fn init_model(&mut self, size: usize);

    fn fill(&mut self, index: usize, key: &str, value: CsvValue) -> Result<()>;

    /// Finishes the current model.
    fn get_model(&mut self) -> Result<Self::Model>;
}

/// Exposes a model's values on the write path.
pub trait WriteBinder {
    type Model;

    fn set_model(&mut self, model: &Self::Model) -> Result<()>;

    /// Number of values in the current model.
    fn record_size(&self) -> usize;

    /// Value for a field; [`CsvValue::Null`] if the model has none.
    fn value(&self, index: usize, key: &str) -> CsvValue;
}

/// Binds positional `Vec<CsvValue>` rows.
#[derive(Debug, Default)]
pub struct ArrayBinder {
    values: Vec<CsvValue>,
}

impl ArrayBinder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadBinder for ArrayBinder {
    type Model = Vec<CsvValue>;

    fn init_model(&mut self, size: usize) {
        self.values = Vec::with_capacity(size);
    }

    fn fill(&mut self, index: usize, _key: &str, value: CsvValue) -> Result<()> {
        if index >= self.values.len() {
            self.values.resize(index + 1, CsvValue::Null);
        }
        self.values[index] = value;
        Ok(())
    }

    fn get_model(&mut self) -> Result<Vec<CsvValue>> {
        Ok(std::mem::take(&mut self.values))
    }
}

impl WriteBinder for ArrayBinder {
    type Model = Vec<CsvValue>;

    fn set_model(&mut self, model: &Vec<CsvValue>) -> Result<()> {
        self.values.clone_from(model);
        Ok(())
    }

    fn record_size(&self) -> usize {
        self.values.len()
    }

    fn value(&self, index: usize, _key: &str) -> CsvValue {
        self.values.get(index).cloned().unwrap_or_default()
    }
}

/// Binds [`RecordMap`] rows keyed by model key.
#[derive(Debug, Default)]
pub struct MapBinder {
    record: RecordMap,
}

impl MapBinder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadBinder for MapBinder {
    type Model = RecordMap;

    fn init_model(&mut self, size: usize) {
        self.record = RecordMap::with_capacity(size);
    }

    fn fill(&mut self, _index: usize, key: &str, value: CsvValue) -> Result<()> {
        self.record.insert(key.to_string(), value);
        Ok(())
    }

    fn get_model(&mut self) -> Result<RecordMap> {
        Ok(std::mem::take(&mut self.record))
    }
}

impl WriteBinder for MapBinder {
    type Model = RecordMap;

    fn set_model(&mut self, model: &RecordMap) -> Result<()> {
        self.record.clone_from(model);
        Ok(())
    }

    fn record_size(&self) -> usize {
        self.record.len()
    }

    fn value(&self, _index: usize, key: &str) -> CsvValue {
        self.record.get(key).cloned().unwrap_or_default()
    }
}

/// Binds any serde type through an intermediate [`RecordMap`].
///
/// Reading requires `T: Deserialize`, writing requires `T: Serialize`.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_dsv::binder::{ReadBinder, SerdeBinder};
/// use serde_dsv::CsvValue;
///
/// #[derive(Serialize, Deserialize, Debug, PartialEq)]
/// struct Point { x: i64, y: i64 }
///
/// let mut binder = SerdeBinder::<Point>::new();
/// binder.init_model(2);
/// binder.fill(0, "x", CsvValue::from(1)).unwrap();
/// binder.fill(1, "y", CsvValue::from(2)).unwrap();
/// assert_eq!(binder.get_model().unwrap(), Point { x: 1, y: 2 });
/// ```
pub struct SerdeBinder<T> {
    record: RecordMap,
    _model: PhantomData<fn() -> T>,
}

impl<T> SerdeBinder<T> {
    #[must_use]
    pub fn new() -> Self {
        SerdeBinder {
            record: RecordMap::new(),
            _model: PhantomData,
        }
    }
}

impl<T> Default for SerdeBinder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> ReadBinder for SerdeBinder<T> {
    type Model = T;

    fn init_model(&mut self, size: usize) {
        self.record = RecordMap::with_capacity(size);
    }

    fn fill(&mut self, _index: usize, key: &str, value: CsvValue) -> Result<()> {
        self.record.insert(key.to_string(), value);
        Ok(())
    }

    fn get_model(&mut self) -> Result<T> {
        let record = std::mem::take(&mut self.record);
        T::deserialize(RecordDeserializer::new(record))
    }
}

impl<T: Serialize> WriteBinder for SerdeBinder<T> {
    type Model = T;

    fn set_model(&mut self, model: &T) -> Result<()> {
        self.record = to_record(model)?;
        Ok(())
    }

    fn record_size(&self) -> usize {
        self.record.len()
    }

    fn value(&self, _index: usize, key: &str) -> CsvValue {
        self.record.get(key).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_binder_fills_gaps() {
        let mut binder = ArrayBinder::new();
        binder.init_model(3);
        binder.fill(2, "c", CsvValue::from("z")).unwrap();
        binder.fill(0, "a", CsvValue::from("x")).unwrap();
        let row = binder.get_model().unwrap();
        assert_eq!(row, vec![CsvValue::from("x"), CsvValue::Null, CsvValue::from("z")]);
    }

    #[test]
    fn test_array_binder_write_side() {
        let mut binder = ArrayBinder::new();
        binder.set_model(&vec![CsvValue::from(1)]).unwrap();
        assert_eq!(binder.record_size(), 1);
        assert_eq!(binder.value(0, "ignored"), CsvValue::Integer(1));
        assert!(binder.value(5, "ignored").is_null());
    }

    #[test]
    fn test_map_binder_by_key() {
        let mut binder = MapBinder::new();
        binder.set_model(&crate::record! { "name": "Ann" }).unwrap();
        assert_eq!(binder.value(7, "name"), CsvValue::from("Ann"));
        assert!(binder.value(0, "missing").is_null());
    }

    #[test]
    fn test_serde_binder_round_trip() {
        #[derive(Serialize, serde::Deserialize, Debug, PartialEq)]
        struct Item {
            sku: String,
            qty: u32,
        }
        let mut binder = SerdeBinder::<Item>::new();
        WriteBinder::set_model(
            &mut binder,
            &Item {
                sku: "A-1".to_string(),
                qty: 4,
            },
        )
        .unwrap();
        assert_eq!(binder.value(0, "qty"), CsvValue::Integer(4));

        binder.init_model(2);
        binder.fill(0, "sku", CsvValue::from("B-2")).unwrap();
        binder.fill(1, "qty", CsvValue::from("9")).unwrap();
        let item = binder.get_model().unwrap();
        assert_eq!(item.qty, 9);
    }
}
