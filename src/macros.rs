/// Builds a [`RecordMap`](crate::RecordMap) from `"key": value` pairs.
///
/// Values go through `CsvValue::from`; the bare word `null` produces
/// [`CsvValue::Null`](crate::CsvValue::Null).
///
/// ```rust
/// use serde_dsv::{record, CsvValue};
///
/// let row = record! {
///     "id": 1,
///     "name": "Alice",
///     "balance": -12.5,
///     "note": null,
/// };
/// assert_eq!(row.get("balance"), Some(&CsvValue::Float(-12.5)));
/// assert_eq!(row.get("note"), Some(&CsvValue::Null));
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::RecordMap::new()
    };

    (@entries $record:ident;) => {};

    (@entries $record:ident; $key:literal : null $(, $($rest:tt)*)?) => {
        $record.insert($key.to_string(), $crate::CsvValue::Null);
        $crate::record!(@entries $record; $($($rest)*)?);
    };

    (@entries $record:ident; $key:literal : $value:expr $(, $($rest:tt)*)?) => {
        $record.insert($key.to_string(), $crate::CsvValue::from($value));
        $crate::record!(@entries $record; $($($rest)*)?);
    };

    ($($body:tt)+) => {{
        let mut record = $crate::RecordMap::new();
        $crate::record!(@entries record; $($body)+);
        record
    }};
}

#[cfg(test)]
mod tests {
    use crate::{CsvValue, RecordMap};

    #[test]
    fn test_empty_record() {
        assert_eq!(record!(), RecordMap::new());
    }

    #[test]
    fn test_record_values() {
        let row = record! { "a": 1, "b": "x", "c": true, "d": null };
        assert_eq!(row.len(), 4);
        assert_eq!(row.get("a"), Some(&CsvValue::Integer(1)));
        assert_eq!(row.get("b"), Some(&CsvValue::from("x")));
        assert_eq!(row.get("c"), Some(&CsvValue::Bool(true)));
        assert_eq!(row.get("d"), Some(&CsvValue::Null));
    }

    #[test]
    fn test_record_expressions_keep_order() {
        let name = String::from("Bob");
        let row = record! { "z": name.clone(), "a": -3, "m": Some(2.5) };
        let keys: Vec<_> = row.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(row.get("a"), Some(&CsvValue::Integer(-3)));
        assert_eq!(row.get("m"), Some(&CsvValue::Float(2.5)));
    }
}
