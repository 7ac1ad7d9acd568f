//! # serde_dsv
//!
//! Delimiter-separated values (CSV, TSV and friends) with a character-level
//! parser and formatter, a typed field-processing pipeline and serde binding.
//!
//! ## Layers
//!
//! - **Tokens**: [`Parser`] turns a byte stream into [`Token`]s
//!   (`Field`, `EndOfRecord`, `EndOfData`); [`Formatter`] writes fields back,
//!   quoting and escaping per a shared [`ClassificationTable`].
//! - **Pipeline**: each column runs through a [`FieldProcessor`]
//!   (precondition → converter → postcondition). Bad data is recorded in a
//!   [`ProcessContext`] and surfaces as a failed [`Outcome`], never a panic.
//! - **Records**: [`CsvReader`] and [`CsvWriter`] tie the two together with
//!   a [`Schema`] and a model binder ([`ArrayBinder`], [`MapBinder`] or
//!   [`SerdeBinder`]).
//! - **serde**: [`from_str`] and [`to_string`] for the common case of a
//!   header row and `#[derive(Serialize, Deserialize)]` types.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_dsv::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     email: Option<String>,
//! }
//!
//! let users = vec![
//!     User { id: 1, name: "Alice".to_string(), email: None },
//!     User { id: 2, name: "Smith, Bob".to_string(), email: Some("bob@example.com".to_string()) },
//! ];
//!
//! let text = to_string(&users).unwrap();
//! assert_eq!(text, "id,name,email\n1,Alice,\n2,\"Smith, Bob\",bob@example.com\n");
//!
//! let back: Vec<User> = from_str(&text).unwrap();
//! assert_eq!(back, users);
//! ```
//!
//! ### Tokens
//!
//! An unquoted empty field is null; a quoted empty field is an empty string.
//!
//! ```rust
//! use serde_dsv::{Parser, Token};
//!
//! let mut parser = Parser::from_str("a,,\"\"\n");
//! assert_eq!(parser.read().unwrap(), &Token::Field(Some("a".to_string())));
//! assert_eq!(parser.read().unwrap(), &Token::Field(None));
//! assert_eq!(parser.read().unwrap(), &Token::Field(Some(String::new())));
//! assert_eq!(parser.read().unwrap(), &Token::EndOfRecord);
//! assert_eq!(parser.read().unwrap(), &Token::EndOfData);
//! assert_eq!(parser.read().unwrap(), &Token::EndOfData);
//! ```
//!
//! ### Typed records with validation
//!
//! ```rust
//! use serde_dsv::binder::MapBinder;
//! use serde_dsv::convert::{Codec, DateCodec, NotEmpty, TextCodec};
//! use serde_dsv::{CsvOptions, CsvReader, Direction, FieldProcessor, Schema, ValueType};
//!
//! let schema = Schema::new()
//!     .field(
//!         "name",
//!         ValueType::String,
//!         FieldProcessor::new(TextCodec { trim: true }.directed(Direction::Parse))
//!             .with_precondition(NotEmpty),
//!     )?
//!     .field(
//!         "born",
//!         ValueType::Date,
//!         FieldProcessor::new(DateCodec::new("%d/%m/%Y")?.directed(Direction::Parse)),
//!     )?;
//!
//! let options = CsvOptions::excel_semicolon();
//! let input = "name;born\r\nAda;10/12/1815\r\n;01/01/2000\r\n";
//! let mut reader = CsvReader::new(input.as_bytes(), &options, schema, MapBinder::new())?;
//!
//! let ada = reader.read()?.unwrap();
//! assert!(ada.is_ok());
//!
//! let blank = reader.read()?.unwrap();
//! let err = blank.error().unwrap();
//! assert_eq!(err.message(), "mandatory field name is missing");
//! # Ok::<(), serde_dsv::Error>(())
//! ```
//!
//! ## Error Model
//!
//! - **Configuration errors** ([`Error::Config`]) are raised when options,
//!   tables or schemas are built.
//! - **Data errors** travel in [`Outcome`]; the `*_strict` methods turn them
//!   into [`Error::Data`].
//! - **Fatal errors** (I/O, unterminated quotes, invalid UTF-8) leave the
//!   parser, formatter, reader or writer unusable ([`Error::Unusable`]).
//!
//! ## Concurrency
//!
//! Parsers, formatters, contexts, readers and writers are single-threaded.
//! A [`FormatterFactory`] and its [`ClassificationTable`] are immutable and
//! can be shared; converters and validators are `Send + Sync`.
//!
//! ## Examples
//!
//! Runnable programs live in `demos/`:
//!
//! - **`read_typed.rs`**: a schema with converters and validators over a
//!   file with bad rows
//! - **`custom_dialect.rs`**: TSV with escapes and a CRLF dialect loaded from JSON
//!
//! Run any example with: `cargo run --example <name>`

pub mod binder;
pub mod context;
pub mod convert;
pub mod de;
pub mod error;
pub mod field;
pub mod formatter;
pub mod macros;
pub mod map;
pub mod options;
pub mod parser;
pub mod processor;
pub mod reader;
pub mod ser;
pub mod table;
pub mod value;
pub mod writer;

pub use binder::{ArrayBinder, MapBinder, ReadBinder, SerdeBinder, WriteBinder};
pub use context::{FailedOperation, Outcome, ProcessContext, ProcessError, Stage};
pub use error::{Error, Result};
pub use field::FieldBuilder;
pub use formatter::{Formatter, FormatterFactory};
pub use map::RecordMap;
pub use options::CsvOptions;
pub use parser::{Parser, Token, TokenKind};
pub use processor::{
    ColumnMapping, ConversionError, Converter, Direction, FieldMetadata, FieldProcessor, Schema,
    Validator,
};
pub use reader::{CsvReader, Records};
pub use table::{Action, ClassificationTable};
pub use value::{CsvValue, ValueType};
pub use writer::CsvWriter;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Deserialize every record of a CSV string with a header row.
///
/// Header names are matched to field names; cells are text until a field
/// asks for a number, bool or char. Empty unquoted cells are null, so they
/// only fit `Option` or `String` fields.
///
/// # Examples
///
/// ```rust
/// use serde_dsv::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let points: Vec<Point> = from_str("y,x\n2,1\n4,3\n").unwrap();
/// assert_eq!(points, vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }]);
/// ```
///
/// # Errors
///
/// Returns an error if the input is malformed or a record cannot be
/// deserialized to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    from_str_with_options(s, &CsvOptions::default())
}

/// Deserialize every record of a CSV string in a custom dialect.
///
/// Without a header (`has_header = false`) records are keyed by position,
/// which suits tuples and tuple structs.
///
/// ```rust
/// use serde_dsv::{from_str_with_options, CsvOptions};
///
/// let rows: Vec<(String, u8)> =
///     from_str_with_options("a\t1\nb\t2\n", &CsvOptions::tsv().with_header(false)).unwrap();
/// assert_eq!(rows[1], ("b".to_string(), 2));
/// ```
///
/// # Errors
///
/// Returns an error for invalid options, malformed input or a record that
/// cannot be deserialized to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options<T>(s: &str, options: &CsvOptions) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    from_buf_reader(s.as_bytes(), options)
}

/// Deserialize every record from an I/O stream with a header row.
///
/// # Examples
///
/// ```rust
/// use serde_dsv::from_reader;
/// use std::collections::HashMap;
/// use std::io::Cursor;
///
/// let rows: Vec<HashMap<String, String>> = from_reader(Cursor::new(b"k\nv\n")).unwrap();
/// assert_eq!(rows[0]["k"], "v");
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is malformed, or a record
/// cannot be deserialized to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<Vec<T>>
where
    R: io::Read,
    T: DeserializeOwned,
{
    from_reader_with_options(reader, &CsvOptions::default())
}

/// Deserialize every record from an I/O stream in a custom dialect.
///
/// # Errors
///
/// Same as [`from_reader`], plus [`Error::Config`] for invalid options.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader_with_options<R, T>(reader: R, options: &CsvOptions) -> Result<Vec<T>>
where
    R: io::Read,
    T: DeserializeOwned,
{
    from_buf_reader(io::BufReader::new(reader), options)
}

fn from_buf_reader<R, T>(source: R, options: &CsvOptions) -> Result<Vec<T>>
where
    R: io::BufRead,
    T: DeserializeOwned,
{
    let mut reader = CsvReader::text(source, options, SerdeBinder::<T>::new())?;
    let mut rows = Vec::new();
    while let Some(row) = reader.read_strict()? {
        rows.push(row);
    }
    Ok(rows)
}

/// Serialize rows to a CSV string with a header row.
///
/// The header comes from the first row's field names. An empty slice
/// produces an empty string.
///
/// ```rust
/// use serde_dsv::to_string;
///
/// let text = to_string(&[(1, "a b"), (2, "c")]).unwrap();
/// assert_eq!(text, "0,1\n1,\"a b\"\n2,c\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for rows that are not flat structs,
/// maps or tuples.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(rows: &[T]) -> Result<String>
where
    T: Serialize,
{
    to_string_with_options(rows, &CsvOptions::default())
}

/// Serialize rows to a CSV string in a custom dialect.
///
/// # Errors
///
/// Same as [`to_string`], plus [`Error::Config`] for invalid options.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(rows: &[T], options: &CsvOptions) -> Result<String>
where
    T: Serialize,
{
    let mut buffer = Vec::with_capacity(64 * rows.len().max(1));
    to_writer_with_options(&mut buffer, rows, options)?;
    String::from_utf8(buffer).map_err(|e| Error::custom(e.to_string()))
}

/// Serialize rows to a writer with a header row.
///
/// ```rust
/// use serde_dsv::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &[[1, 2], [3, 4]]).unwrap();
/// assert_eq!(buffer, b"0,1\n1,2\n3,4\n");
/// ```
///
/// # Errors
///
/// Returns an error if a row cannot be serialized or writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, rows: &[T]) -> Result<()>
where
    W: io::Write,
    T: Serialize,
{
    to_writer_with_options(writer, rows, &CsvOptions::default())
}

/// Serialize rows to a writer in a custom dialect.
///
/// # Errors
///
/// Same as [`to_writer`], plus [`Error::Config`] for invalid options.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(writer: W, rows: &[T], options: &CsvOptions) -> Result<()>
where
    W: io::Write,
    T: Serialize,
{
    let Some(first) = rows.first() else {
        options.validate()?;
        return Ok(());
    };
    let keys: Vec<String> = ser::to_record(first)?.keys().cloned().collect();
    let schema = Schema::text(&keys, Direction::Format)?;
    let mut writer = CsvWriter::new(writer, options, schema, SerdeBinder::<T>::new())?;
    for row in rows {
        writer.write_strict(row)?;
    }
    writer.finish()
}
