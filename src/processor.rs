//! Per-column precondition → conversion → postcondition pipeline.
//!
//! A [`FieldProcessor`] wraps one mandatory [`Converter`] between two
//! optional [`Validator`]s. Processing stops at the first failing stage; the
//! failure is recorded in the [`ProcessContext`] and the field yields
//! [`CsvValue::Null`]. Nothing here returns `Err` for bad data.
//!
//! ```rust
//! use serde_dsv::convert::{Codec, IntegerCodec, Range};
//! use serde_dsv::{CsvValue, Direction, FieldProcessor, ProcessContext};
//!
//! let processor = FieldProcessor::new(IntegerCodec.directed(Direction::Parse))
//!     .with_postcondition(Range::new(Some(0.0), Some(150.0)));
//!
//! let mut ctx = ProcessContext::new();
//! ctx.new_row();
//! ctx.new_column();
//! assert_eq!(processor.process(CsvValue::from("42"), &mut ctx), CsvValue::from(42));
//!
//! ctx.new_column();
//! assert!(processor.process(CsvValue::from("200"), &mut ctx).is_null());
//! assert!(ctx.is_error());
//! ```

use crate::context::{ProcessContext, Stage};
use crate::convert::{Codec, TextCodec};
use crate::{CsvValue, Error, Result, ValueType};
use std::fmt;

/// Message template used for a missing mandatory field.
pub const MANDATORY_TEMPLATE: &str = "mandatory field {column_name} is missing";

/// Conversion direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Text to typed value (read path).
    Parse,
    /// Typed value to text (write path).
    Format,
}

/// Reason a converter rejected a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionError {
    pub detail: String,
}

impl ConversionError {
    pub fn new<T: fmt::Display>(detail: T) -> Self {
        ConversionError {
            detail: detail.to_string(),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail)
    }
}

impl std::error::Error for ConversionError {}

/// Mandatory conversion stage of a [`FieldProcessor`].
///
/// Implementations must report bad input through `Err`, never panic.
pub trait Converter: Send + Sync {
    fn name(&self) -> &str;

    fn direction(&self) -> Direction;

    fn source_type(&self) -> ValueType;

    fn target_type(&self) -> ValueType;

    /// Message template for conversion failures.
    fn error_template(&self) -> &str {
        "cannot convert '{original_value}' in column {column_name}: {detail}"
    }

    fn convert(&self, source: &CsvValue) -> std::result::Result<CsvValue, ConversionError>;

    /// Type on the model side of the conversion.
    fn model_type(&self) -> ValueType {
        match self.direction() {
            Direction::Parse => self.target_type(),
            Direction::Format => self.source_type(),
        }
    }
}

/// Optional pre- or postcondition of a [`FieldProcessor`].
pub trait Validator: Send + Sync {
    fn name(&self) -> &str;

    fn error_template(&self) -> &str;

    fn validate(&self, value: &CsvValue) -> bool;
}

/// Validation and conversion pipeline for one column.
pub struct FieldProcessor {
    precondition: Option<Box<dyn Validator>>,
    converter: Box<dyn Converter>,
    postcondition: Option<Box<dyn Validator>>,
    optional: bool,
}

impl fmt::Debug for FieldProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldProcessor")
            .field("precondition", &self.precondition.as_ref().map(|v| v.name()))
            .field("converter", &self.converter.name())
            .field("postcondition", &self.postcondition.as_ref().map(|v| v.name()))
            .field("optional", &self.optional)
            .finish()
    }
}

impl FieldProcessor {
    /// Mandatory field with only a converter.
    pub fn new<C: Converter + 'static>(converter: C) -> Self {
        Self::from_boxed(Box::new(converter))
    }

    pub fn from_boxed(converter: Box<dyn Converter>) -> Self {
        FieldProcessor {
            precondition: None,
            converter,
            postcondition: None,
            optional: false,
        }
    }

    #[must_use]
    pub fn with_precondition<V: Validator + 'static>(self, validator: V) -> Self {
        self.with_boxed_precondition(Box::new(validator))
    }

    #[must_use]
    pub fn with_boxed_precondition(mut self, validator: Box<dyn Validator>) -> Self {
        self.precondition = Some(validator);
        self
    }

    #[must_use]
    pub fn with_postcondition<V: Validator + 'static>(self, validator: V) -> Self {
        self.with_boxed_postcondition(Box::new(validator))
    }

    #[must_use]
    pub fn with_boxed_postcondition(mut self, validator: Box<dyn Validator>) -> Self {
        self.postcondition = Some(validator);
        self
    }

    /// Null is accepted silently when `optional` is set.
    #[must_use]
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    #[must_use]
    pub fn converter(&self) -> &dyn Converter {
        self.converter.as_ref()
    }

    /// Runs the pipeline on one field value.
    ///
    /// Returns the converted value, or [`CsvValue::Null`] when the source is
    /// null or a stage failed; check [`ProcessContext::is_error`] to tell the
    /// two apart. A converted value rejected by the postcondition is still
    /// available as [`ProcessContext::processed`].
    pub fn process(&self, source: CsvValue, ctx: &mut ProcessContext) -> CsvValue {
        if source.is_null() {
            if !self.optional {
                ctx.set_original(CsvValue::Null);
                ctx.set_processed(CsvValue::Null);
                ctx.fail(Stage::Mandatory, "mandatory", MANDATORY_TEMPLATE, None);
            }
            return CsvValue::Null;
        }

        ctx.set_original(source);
        ctx.set_processed(CsvValue::Null);

        if let Some(pre) = &self.precondition {
            if !pre.validate(ctx.original()) {
                ctx.fail(Stage::Precondition, pre.name(), pre.error_template(), None);
                return CsvValue::Null;
            }
        }

        let converted = match self.converter.convert(ctx.original()) {
            Ok(value) => value,
            Err(err) => {
                ctx.fail(
                    Stage::Conversion,
                    self.converter.name(),
                    self.converter.error_template(),
                    Some(err.detail),
                );
                return CsvValue::Null;
            }
        };
        ctx.set_processed(converted.clone());

        if let Some(post) = &self.postcondition {
            if !post.validate(&converted) {
                ctx.fail(Stage::Postcondition, post.name(), post.error_template(), None);
                return CsvValue::Null;
            }
        }

        converted
    }
}

/// Binding of a CSV column to a model location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMapping {
    column_key: String,
    model_key: String,
    model_type: ValueType,
}

impl ColumnMapping {
    /// # Errors
    ///
    /// Returns [`Error::Config`] if either key is empty.
    pub fn new(column_key: &str, model_key: &str, model_type: ValueType) -> Result<Self> {
        if column_key.is_empty() {
            return Err(Error::config("column key must not be empty"));
        }
        if model_key.is_empty() {
            return Err(Error::config("model key must not be empty"));
        }
        Ok(ColumnMapping {
            column_key: column_key.to_string(),
            model_key: model_key.to_string(),
            model_type,
        })
    }

    #[must_use]
    pub fn column_key(&self) -> &str {
        &self.column_key
    }

    #[must_use]
    pub fn model_key(&self) -> &str {
        &self.model_key
    }

    #[must_use]
    pub const fn model_type(&self) -> ValueType {
        self.model_type
    }
}

/// A processor bound to a column mapping and a write position.
#[derive(Debug)]
pub struct FieldMetadata {
    mapping: ColumnMapping,
    processor: FieldProcessor,
    order: usize,
}

impl FieldMetadata {
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the converter's model-side type does not
    /// fit the mapping's model type.
    pub fn new(mapping: ColumnMapping, processor: FieldProcessor, order: usize) -> Result<Self> {
        let produced = processor.converter().model_type();
        if !(mapping.model_type.accepts(produced) || produced == ValueType::Any) {
            return Err(Error::config(format!(
                "column `{}` maps to {} but converter `{}` handles {}",
                mapping.column_key,
                mapping.model_type,
                processor.converter().name(),
                produced
            )));
        }
        Ok(FieldMetadata {
            mapping,
            processor,
            order,
        })
    }

    #[must_use]
    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    #[must_use]
    pub fn processor(&self) -> &FieldProcessor {
        &self.processor
    }

    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
    }
}

/// Ordered set of field metadata for one direction.
#[derive(Debug, Default)]
pub struct Schema {
    fields: Vec<FieldMetadata>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field; fields stay sorted by declared order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a duplicate column key.
    pub fn push(&mut self, field: FieldMetadata) -> Result<()> {
        if self.position(field.mapping.column_key()).is_some() {
            return Err(Error::config(format!(
                "column `{}` is mapped twice",
                field.mapping.column_key()
            )));
        }
        let at = self.fields.partition_point(|f| f.order <= field.order);
        self.fields.insert(at, field);
        Ok(())
    }

    /// Adds a field mapped to the same column and model key, ordered last.
    ///
    /// # Errors
    ///
    /// See [`ColumnMapping::new`], [`FieldMetadata::new`] and [`Schema::push`].
    pub fn field(mut self, key: &str, model_type: ValueType, processor: FieldProcessor) -> Result<Self> {
        let order = self.fields.last().map_or(0, |f| f.order + 1);
        let mapping = ColumnMapping::new(key, key, model_type)?;
        self.push(FieldMetadata::new(mapping, processor, order)?)?;
        Ok(self)
    }

    /// Optional text pass-through fields for `keys`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty or duplicate key.
    pub fn text<S: AsRef<str>>(keys: &[S], direction: Direction) -> Result<Self> {
        keys.iter().try_fold(Schema::new(), |schema, key| {
            let processor =
                FieldProcessor::new(TextCodec::default().directed(direction)).optional(true);
            schema.field(key.as_ref(), ValueType::String, processor)
        })
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Index of the field mapped to a column key.
    #[must_use]
    pub fn position(&self, column_key: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.mapping.column_key() == column_key)
    }

    /// Column keys in write order.
    #[must_use]
    pub fn column_keys(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| f.mapping.column_key().to_string())
            .collect()
    }

    /// Checks that every converter runs in `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first mismatching column.
    pub fn check_direction(&self, direction: Direction) -> Result<()> {
        match self
            .fields
            .iter()
            .find(|f| f.processor.converter().direction() != direction)
        {
            Some(field) => Err(Error::config(format!(
                "converter `{}` for column `{}` does not run in {:?} direction",
                field.processor.converter().name(),
                field.mapping.column_key(),
                direction
            ))),
            None => Ok(()),
        }
    }
}
