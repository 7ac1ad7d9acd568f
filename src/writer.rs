//! Write path: model binder → field pipeline → formatter.
//!
//! [`CsvWriter::write`] pulls every schema field out of the model through a
//! [`WriteBinder`], formats it with its processor and only then hands the
//! whole row to the [`Formatter`]. A row rejected for a data error never
//! leaves a partial record in the sink.

use crate::binder::WriteBinder;
use crate::context::{Outcome, ProcessContext};
use crate::formatter::{Formatter, FormatterFactory};
use crate::processor::{Direction, Schema};
use crate::{CsvOptions, Error, Result};
use std::io::Write;

/// Typed record writer. Not thread-safe.
pub struct CsvWriter<W: Write, B> {
    formatter: Formatter<W>,
    schema: Schema,
    binder: B,
    ctx: ProcessContext,
    row: Vec<Option<String>>,
    header_pending: bool,
    rows_written: usize,
    failed: bool,
}

impl<W: Write, B: WriteBinder> CsvWriter<W, B> {
    /// Creates a writer. With `has_header` set, the header is written
    /// before the first row (or by [`CsvWriter::finish`] if no row is).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid options or a schema whose
    /// converters do not format.
    pub fn new(sink: W, options: &CsvOptions, schema: Schema, binder: B) -> Result<Self> {
        let factory = FormatterFactory::new(options)?;
        Self::with_factory(&factory, sink, schema, binder)
    }

    /// Creates a writer sharing `factory`'s classification table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a schema whose converters do not format.
    pub fn with_factory(
        factory: &FormatterFactory,
        sink: W,
        schema: Schema,
        binder: B,
    ) -> Result<Self> {
        schema.check_direction(Direction::Format)?;
        let mut ctx = ProcessContext::new();
        ctx.set_headers(schema.column_keys().into());
        Ok(CsvWriter {
            formatter: factory.formatter(sink),
            row: Vec::with_capacity(schema.len()),
            schema,
            binder,
            ctx,
            header_pending: factory.options().has_header,
            rows_written: 0,
            failed: false,
        })
    }

    /// Writes the schema's column keys as a header row.
    ///
    /// # Errors
    ///
    /// Fatal formatter errors leave the writer unusable.
    pub fn write_header(&mut self) -> Result<()> {
        self.guard()?;
        self.header_pending = false;
        self.ctx.new_row();
        let result = self
            .formatter
            .write_record(self.schema.fields().iter().map(|f| Some(f.mapping().column_key())));
        self.check(result)
    }

    /// Processes and writes one model.
    ///
    /// # Errors
    ///
    /// Fatal formatter errors leave the writer unusable. A binder failure
    /// (for example an unsupported serde type) is returned as-is and is not
    /// fatal. Data errors are reported through the returned [`Outcome`].
    pub fn write(&mut self, model: &B::Model) -> Result<Outcome<()>> {
        self.guard()?;
        if self.header_pending {
            self.write_header()?;
        }
        self.binder.set_model(model)?;

        self.ctx.new_row();
        self.row.clear();
        for (index, field) in self.schema.fields().iter().enumerate() {
            self.ctx.new_column();
            let source = self.binder.value(index, field.mapping().model_key());
            let value = field.processor().process(source, &mut self.ctx);
            if let Some(err) = self.ctx.error() {
                log::warn!(
                    "rejected row {}, column {}: {}",
                    err.row,
                    err.column,
                    err.message()
                );
                return Ok(Outcome::failure(err));
            }
            self.row.push(value.into_text());
        }

        let result = self
            .formatter
            .write_record(self.row.iter().map(Option::as_deref));
        self.check(result)?;
        self.rows_written += 1;
        Ok(Outcome::success(()))
    }

    /// Writes one model, turning a data error into [`Error::Data`].
    ///
    /// # Errors
    ///
    /// Same as [`CsvWriter::write`], plus [`Error::Data`] for a rejected row.
    pub fn write_strict(&mut self, model: &B::Model) -> Result<()> {
        self.write(model)?.strict()
    }

    /// Writes any pending header, marks end of data and flushes.
    ///
    /// # Errors
    ///
    /// Fatal formatter errors.
    pub fn finish(&mut self) -> Result<()> {
        self.guard()?;
        if self.header_pending {
            self.write_header()?;
        }
        let result = self.formatter.write_eod().and_then(|()| self.formatter.flush());
        self.check(result)?;
        log::debug!("writer finished after {} rows", self.rows_written);
        Ok(())
    }

    /// Rows written so far, header excluded.
    #[must_use]
    pub const fn rows_written(&self) -> usize {
        self.rows_written
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn get_ref(&self) -> &W {
        self.formatter.get_ref()
    }

    /// Returns the sink without flushing; call [`CsvWriter::finish`] first.
    pub fn into_inner(self) -> W {
        self.formatter.into_inner()
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
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{ArrayBinder, MapBinder};
    use crate::convert::{Codec, IntegerCodec, Range, TextCodec};
    use crate::{record, CsvValue, FieldProcessor, Stage, ValueType};

    fn schema() -> Schema {
        Schema::new()
            .field(
                "id",
                ValueType::Integer,
                FieldProcessor::new(IntegerCodec.directed(Direction::Format))
                    .with_postcondition(Range::new(Some(0.0), None)),
            )
            .unwrap()
            .field(
                "note",
                ValueType::Any,
                FieldProcessor::new(TextCodec::default().directed(Direction::Format)).optional(true),
            )
            .unwrap()
    }

    #[test]
    fn test_writes_header_and_rows() {
        let mut writer =
            CsvWriter::new(Vec::new(), &CsvOptions::default(), schema(), MapBinder::new()).unwrap();
        writer.write_strict(&record! { "id": 1, "note": "a, b" }).unwrap();
        writer.write_strict(&record! { "id": 2 }).unwrap();
        writer.finish().unwrap();
        assert_eq!(writer.rows_written(), 2);
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "id,note\n1,\"a, b\"\n2,\n");
    }

    #[test]
    fn test_rejected_row_leaves_no_partial_record() {
        let options = CsvOptions::default().with_header(false);
        let mut writer = CsvWriter::new(Vec::new(), &options, schema(), ArrayBinder::new()).unwrap();
        let outcome = writer
            .write(&vec![CsvValue::from(-5), CsvValue::from("x")])
            .unwrap();
        let err = outcome.error().unwrap();
        assert_eq!(err.stage(), Stage::Postcondition);
        assert_eq!(err.column_name.as_deref(), Some("id"));

        writer.write_strict(&vec![CsvValue::from(3)]).unwrap();
        writer.finish().unwrap();
        assert_eq!(writer.into_inner(), b"3,\n");
    }

    #[test]
    fn test_header_written_on_finish_without_rows() {
        let mut writer =
            CsvWriter::new(Vec::new(), &CsvOptions::default(), schema(), MapBinder::new()).unwrap();
        writer.finish().unwrap();
        assert_eq!(writer.get_ref().as_slice(), b"id,note\n");
    }

    #[test]
    fn test_rejects_parse_schema() {
        let schema = Schema::new()
            .field(
                "id",
                ValueType::Integer,
                FieldProcessor::new(IntegerCodec.directed(Direction::Parse)),
            )
            .unwrap();
        assert!(matches!(
            CsvWriter::new(Vec::new(), &CsvOptions::default(), schema, MapBinder::new()),
            Err(Error::Config(_))
        ));
    }
}
