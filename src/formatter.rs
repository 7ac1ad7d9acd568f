//! Field writer applying the classification table.
//!
//! The [`Formatter`] is the inverse of the [`Parser`](crate::Parser): each
//! character of a field is looked up in the shared
//! [`ClassificationTable`] and written verbatim, escaped or doubled. Whether
//! the field needs surrounding quotes is only known once the whole value has
//! been scanned, so the escaped content is staged in a reusable buffer and
//! the quotes are emitted around it at the end.
//!
//! ## Usage
//!
//! ```rust
//! use serde_dsv::{CsvOptions, FormatterFactory};
//!
//! let factory = FormatterFactory::new(&CsvOptions::new()).unwrap();
//! let mut formatter = factory.formatter(Vec::new());
//! formatter.write_field(Some("plain"), false).unwrap();
//! formatter.write_field(Some("a,b"), false).unwrap();
//! formatter.write_field(None, false).unwrap();
//! formatter.write_eor().unwrap();
//! let out = String::from_utf8(formatter.into_inner()).unwrap();
//! assert_eq!(out, "plain,\"a,b\",\n");
//! ```

use crate::table::{Action, ClassificationTable};
use crate::{CsvOptions, Error, Result};
use std::io::Write;
use std::sync::Arc;

/// Builds formatters sharing one validated dialect and classification table.
#[derive(Clone, Debug)]
pub struct FormatterFactory {
    table: Arc<ClassificationTable>,
    options: CsvOptions,
}

impl FormatterFactory {
    /// Validates the dialect and builds the classification table once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid dialect.
    pub fn new(options: &CsvOptions) -> Result<Self> {
        let table = ClassificationTable::new(options)?;
        Ok(FormatterFactory {
            table: Arc::new(table),
            options: options.clone(),
        })
    }

    /// Creates a formatter writing to `sink`.
    pub fn formatter<W: Write>(&self, sink: W) -> Formatter<W> {
        Formatter {
            sink,
            table: Arc::clone(&self.table),
            field_separator: self.options.field_separator,
            record_separator: self.options.record_separator.clone(),
            quote_all: self.options.quote_all,
            quote_empty: self.options.quote_empty,
            buffer: String::with_capacity(256),
            field_count: 0,
            failed: false,
        }
    }

    #[must_use]
    pub fn table(&self) -> &Arc<ClassificationTable> {
        &self.table
    }

    #[must_use]
    pub fn options(&self) -> &CsvOptions {
        &self.options
    }
}

/// Writes fields and records to a byte sink. Not thread-safe.
pub struct Formatter<W: Write> {
    sink: W,
    table: Arc<ClassificationTable>,
    field_separator: char,
    record_separator: String,
    quote_all: bool,
    quote_empty: bool,
    buffer: String,
    field_count: usize,
    failed: bool,
}

impl<W: Write> Formatter<W> {
    /// Writes one field, preceded by a separator unless it opens the record.
    ///
    /// `None` is written as a zero-length field and is never quoted.
    /// `force_quote` quotes the field regardless of its content.
    ///
    /// # Errors
    ///
    /// I/O failures and classification defects are fatal; the formatter
    /// returns [`Error::Unusable`] afterwards.
    pub fn write_field(&mut self, value: Option<&str>, force_quote: bool) -> Result<()> {
        self.guard()?;
        let result = self.format_field(value, force_quote);
        self.check(result)
    }

    /// Writes every field of `fields` followed by the record separator.
    ///
    /// # Errors
    ///
    /// Same as [`Formatter::write_field`].
    pub fn write_record<'a, I>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        for field in fields {
            self.write_field(field, false)?;
        }
        self.write_eor()
    }

    /// Writes the record separator and starts a new record.
    ///
    /// # Errors
    ///
    /// Same as [`Formatter::write_field`].
    pub fn write_eor(&mut self) -> Result<()> {
        self.guard()?;
        let result = self
            .sink
            .write_all(self.record_separator.as_bytes())
            .map_err(Error::from);
        self.field_count = 0;
        self.check(result)
    }

    /// Marks the logical end of output. The sink is neither flushed nor closed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unusable`] after a fatal error.
    pub fn write_eod(&mut self) -> Result<()> {
        self.guard()?;
        if self.field_count > 0 {
            log::debug!("end of data with {} fields in an unterminated record", self.field_count);
        }
        self.field_count = 0;
        Ok(())
    }

    /// Flushes the sink.
    ///
    /// # Errors
    ///
    /// Same as [`Formatter::write_field`].
    pub fn flush(&mut self) -> Result<()> {
        self.guard()?;
        let result = self.sink.flush().map_err(Error::from);
        self.check(result)
    }

    /// Number of fields written in the current record.
    #[must_use]
    pub const fn field_count(&self) -> usize {
        self.field_count
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Returns the sink without flushing.
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn format_field(&mut self, value: Option<&str>, force_quote: bool) -> Result<()> {
        if self.field_count > 0 {
            write_char(&mut self.sink, self.field_separator)?;
        }
        self.field_count += 1;

        let Some(value) = value else {
            return Ok(());
        };

        self.buffer.clear();
        self.buffer.reserve(value.len() * 4);

        let mut quote = force_quote || self.quote_all || (value.is_empty() && self.quote_empty);
        for ch in value.chars() {
            match self.table.action(ch) {
                Action::Write => self.buffer.push(ch),
                Action::Escape => {
                    self.push_escaped(ch)?;
                }
                Action::ForceQuote => {
                    self.buffer.push(ch);
                    quote = true;
                }
                Action::QuoteAndEscape => {
                    self.push_escaped(ch)?;
                    quote = true;
                }
                Action::DoubleQuote => {
                    if ch != self.table.quote() {
                        return Err(Error::internal(format!(
                            "double-quote action on non-quote character {:?}",
                            ch
                        )));
                    }
                    self.buffer.push(ch);
                    self.buffer.push(ch);
                    quote = true;
                }
            }
        }

        if quote {
            write_char(&mut self.sink, self.table.quote())?;
        }
        self.sink.write_all(self.buffer.as_bytes())?;
        if quote {
            write_char(&mut self.sink, self.table.quote())?;
        }
        Ok(())
    }

    fn push_escaped(&mut self, ch: char) -> Result<()> {
        let escape = self
            .table
            .escape()
            .ok_or_else(|| Error::internal("escape action without an escape character"))?;
        self.buffer.push(escape);
        self.buffer.push(ch);
        Ok(())
    }

    fn guard(&self) -> Result<()> {
        if self.failed {
            Err(Error::Unusable)
        } else {
            Ok(())
        }
    }

    fn check(&mut self, result: Result<()>) -> Result<()> {
        if let Err(err) = &result {
            if err.is_fatal() {
                self.failed = true;
                log::error!("formatter failed: {}", err);
            }
        }
        result
    }
}

fn write_char<W: Write>(sink: &mut W, ch: char) -> Result<()> {
    let mut bytes = [0u8; 4];
    sink.write_all(ch.encode_utf8(&mut bytes).as_bytes())?;
    Ok(())
}
