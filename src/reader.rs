//! Read path: parser → field pipeline → model binder.
//!
//! [`CsvReader`] pulls one record at a time from a [`Parser`], runs every
//! schema field through its [`FieldProcessor`](crate::FieldProcessor) and
//! hands the converted values to a [`ReadBinder`]. Data errors come back as
//! a failed [`Outcome`]; only configuration and fatal errors are `Err`.
//!
//! Column mapping:
//! - with a header, columns are matched to schema fields by header name;
//! - without one, the n-th column feeds the n-th schema field.
//!
//! Columns without a schema field are skipped without materializing their
//! text. Schema fields with no column read as null.
//!
//! ```rust
//! use serde_dsv::binder::MapBinder;
//! use serde_dsv::convert::{Codec, IntegerCodec, TextCodec};
//! use serde_dsv::{CsvOptions, CsvReader, CsvValue, Direction, FieldProcessor, Schema, ValueType};
//!
//! let schema = Schema::new()
//!     .field("id", ValueType::Integer, FieldProcessor::new(IntegerCodec.directed(Direction::Parse)))?
//!     .field("name", ValueType::String, FieldProcessor::new(TextCodec::default().directed(Direction::Parse)))?;
//!
//! let input = "name,id,extra\nAlice,1,x\nBob,oops,y\n";
//! let mut reader = CsvReader::new(input.as_bytes(), &CsvOptions::default(), schema, MapBinder::new())?;
//!
//! let first = reader.read()?.unwrap();
//! assert_eq!(first.value().unwrap().get("id"), Some(&CsvValue::Integer(1)));
//!
//! let second = reader.read()?.unwrap();
//! assert_eq!(second.error().unwrap().column_name.as_deref(), Some("id"));
//!
//! assert!(reader.read()?.is_none());
//! # Ok::<(), serde_dsv::Error>(())
//! ```

use crate::binder::ReadBinder;
use crate::context::{Outcome, ProcessContext};
use crate::parser::{Parser, TokenKind};
use crate::processor::{Direction, Schema};
use crate::{CsvOptions, CsvValue, Error, Result};
use std::io::BufRead;
use std::sync::Arc;

/// Typed record reader. Not thread-safe.
pub struct CsvReader<R, B> {
    parser: Parser<R>,
    schema: Schema,
    binder: B,
    ctx: ProcessContext,
    has_header: bool,
    /// Build a text schema from the first record when none was given.
    derive_schema: bool,
    header: Option<Vec<String>>,
    /// Schema index for each file column; `None` columns are skipped.
    plan: Vec<Option<usize>>,
    /// Schema fields with no file column.
    missing: Vec<usize>,
    raw: Vec<Option<String>>,
    started: bool,
    failed: bool,
}

impl<R: BufRead, B: ReadBinder> CsvReader<R, B> {
    /// Creates a reader over `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid options or a schema whose
    /// converters do not parse.
    pub fn new(source: R, options: &CsvOptions, schema: Schema, binder: B) -> Result<Self> {
        schema.check_direction(Direction::Parse)?;
        let parser = Parser::new(source, options)?;
        Ok(CsvReader {
            parser,
            schema,
            binder,
            ctx: ProcessContext::new(),
            has_header: options.has_header,
            derive_schema: false,
            header: None,
            plan: Vec::new(),
            missing: Vec::new(),
            raw: Vec::new(),
            started: false,
            failed: false,
        })
    }

    /// Creates a reader whose schema is optional text pass-through for every
    /// column: keyed by header name, or by position (`"0"`, `"1"`, ...)
    /// without a header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid options.
    pub fn text(source: R, options: &CsvOptions, binder: B) -> Result<Self> {
        let mut reader = Self::new(source, options, Schema::new(), binder)?;
        reader.derive_schema = true;
        Ok(reader)
    }

    /// Header consumed from the input, reading it if needed.
    ///
    /// # Errors
    ///
    /// Fatal parser errors. A failure while consuming the header leaves the
    /// reader unusable.
    pub fn headers(&mut self) -> Result<Option<&[String]>> {
        self.start()?;
        Ok(self.header.as_deref())
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Context of the last processed row.
    #[must_use]
    pub fn context(&self) -> &ProcessContext {
        &self.ctx
    }

    /// Reads the next record.
    ///
    /// Returns `Ok(None)` at end of data. A record rejected by the pipeline
    /// yields a failed [`Outcome`] and the reader moves on to the next
    /// record on the following call.
    ///
    /// # Errors
    ///
    /// Fatal parser errors leave the reader unusable. A binder failure
    /// (for example a serde type mismatch) is returned as-is and is not
    /// fatal.
    pub fn read(&mut self) -> Result<Option<Outcome<B::Model>>> {
        if self.failed {
            return Err(Error::Unusable);
        }
        let result = self.start().and_then(|()| self.next_fields());
        if !self.check(result)? {
            return Ok(None);
        }
        if self.derive_schema && self.schema.is_empty() {
            let keys: Vec<String> = (0..self.raw.len()).map(|i| i.to_string()).collect();
            self.schema = Schema::text(&keys, Direction::Parse)?;
            self.plan = (0..keys.len()).map(Some).collect();
            self.ctx.set_headers(keys.into());
        }
        self.process_row().map(Some)
    }

    /// Reads the next record, turning a data error into [`Error::Data`].
    ///
    /// # Errors
    ///
    /// Same as [`CsvReader::read`], plus [`Error::Data`] for a rejected record.
    pub fn read_strict(&mut self) -> Result<Option<B::Model>> {
        self.read()?.map(Outcome::strict).transpose()
    }

    /// Iterator over the remaining records. It stops after the first `Err`.
    pub fn records(&mut self) -> Records<'_, R, B> {
        Records {
            reader: self,
            done: false,
        }
    }

    /// Returns the parser's source.
    pub fn into_inner(self) -> R {
        self.parser.into_inner()
    }

    fn start(&mut self) -> Result<()> {
        if self.failed {
            return Err(Error::Unusable);
        }
        if self.started {
            return Ok(());
        }
        if let Err(err) = self.read_header() {
            self.failed = true;
            log::error!("reader failed while consuming the header: {}", err);
            return Err(err);
        }
        self.started = true;
        Ok(())
    }

    fn read_header(&mut self) -> Result<()> {
        if !self.has_header {
            if !self.derive_schema {
                self.plan = (0..self.schema.len()).map(Some).collect();
                self.ctx.set_headers(self.schema.column_keys().into());
            }
            return Ok(());
        }

        // Blank lines before the header are skipped like blank data lines.
        let header: Vec<String> = loop {
            self.ctx.new_row();
            match self.parser.read_record()? {
                Some(fields) if fields.is_empty() => continue,
                fields => {
                    break fields
                        .unwrap_or_default()
                        .into_iter()
                        .map(Option::unwrap_or_default)
                        .collect()
                }
            }
        };
        log::debug!("consumed header with {} columns: {:?}", header.len(), header);
        if self.derive_schema {
            let keys = derived_keys(&header);
            self.schema = Schema::text(&keys, Direction::Parse)?;
            self.plan_by_name(&keys);
        } else {
            self.plan_by_name(&header);
        }
        self.header = Some(header);
        Ok(())
    }

    fn plan_by_name(&mut self, header: &[String]) {
        let mut used = vec![false; self.schema.len()];
        self.plan = header
            .iter()
            .map(|name| {
                let index = self.schema.position(name).filter(|&i| !used[i])?;
                used[index] = true;
                Some(index)
            })
            .collect();
        self.missing = (0..self.schema.len()).filter(|&i| !used[i]).collect();

        let mut names = header.to_vec();
        names.extend(
            self.missing
                .iter()
                .map(|&i| self.schema.fields()[i].mapping().column_key().to_string()),
        );
        self.ctx.set_headers(Arc::from(names));
    }

    /// Collects the next non-empty record into `raw`. Returns `false` at
    /// end of data.
    fn next_fields(&mut self) -> Result<bool> {
        loop {
            self.raw.clear();
            let mut column = 0;
            loop {
                let capture = match self.plan.get(column) {
                    Some(slot) => slot.is_some(),
                    None => self.derive_schema && self.schema.is_empty(),
                };
                let kind = if capture {
                    self.parser.read()?.kind()
                } else {
                    self.parser.skip()?.kind()
                };
                match kind {
                    TokenKind::Field => {
                        self.raw.push(self.parser.take_current_value());
                        column += 1;
                    }
                    TokenKind::EndOfRecord => break,
                    TokenKind::EndOfData if column == 0 => return Ok(false),
                    TokenKind::EndOfData => break,
                }
            }
            if column > 0 {
                return Ok(true);
            }
            // Blank line: a physical record with no fields.
            self.ctx.new_row();
        }
    }

    fn process_row(&mut self) -> Result<Outcome<B::Model>> {
        self.ctx.new_row();
        self.binder.init_model(self.schema.len());

        let columns = self.plan.len() + self.missing.len();
        for column in 0..columns {
            self.ctx.new_column();
            let (index, source) = if column < self.plan.len() {
                let Some(index) = self.plan[column] else {
                    continue;
                };
                let source = self
                    .raw
                    .get_mut(column)
                    .and_then(Option::take)
                    .map_or(CsvValue::Null, CsvValue::String);
                (index, source)
            } else {
                (self.missing[column - self.plan.len()], CsvValue::Null)
            };

            let field = &self.schema.fields()[index];
            let value = field.processor().process(source, &mut self.ctx);
            if let Some(err) = self.ctx.error() {
                log::warn!(
                    "rejected record at row {}, column {}: {}",
                    err.row,
                    err.column,
                    err.message()
                );
                return Ok(Outcome::failure(err));
            }
            self.binder
                .fill(index, field.mapping().model_key(), value)?;
        }

        self.binder.get_model().map(Outcome::success)
    }

    fn check<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_fatal() {
                self.failed = true;
            }
        }
        result
    }
}

/// Column keys for a header-derived schema. An empty or repeated name is
/// replaced by the column position, suffixed with `_` until it is unique.
fn derived_keys(header: &[String]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::with_capacity(header.len());
    for (position, name) in header.iter().enumerate() {
        let mut key = if name.is_empty() || keys.contains(name) {
            position.to_string()
        } else {
            name.clone()
        };
        while keys.contains(&key) {
            key.push('_');
        }
        keys.push(key);
    }
    keys
}

impl<'a, B: ReadBinder> CsvReader<&'a [u8], B> {
    /// Reader over a string.
    ///
    /// # Errors
    ///
    /// Same as [`CsvReader::new`].
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str, options: &CsvOptions, schema: Schema, binder: B) -> Result<Self> {
        CsvReader::new(input.as_bytes(), options, schema, binder)
    }
}

/// Iterator returned by [`CsvReader::records`].
pub struct Records<'r, R, B> {
    reader: &'r mut CsvReader<R, B>,
    done: bool,
}

impl<R: BufRead, B: ReadBinder> Iterator for Records<'_, R, B> {
    type Item = Result<Outcome<B::Model>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read() {
            Ok(Some(outcome)) => Some(Ok(outcome)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
