use indexmap::IndexMap;
use serde_dsv::convert::{
    BigIntCodec, BoolCodec, Codec, DateCodec, DateTimeCodec, FloatCodec, IntegerCodec, Length,
    NotEmpty, OneOf, Predicate, Range, Registry, TextCodec,
};
use serde_dsv::{
    ConversionError, Converter, CsvValue, Direction, Error, FieldProcessor, Outcome,
    ProcessContext, Schema, Stage, Validator, ValueType,
};
use std::sync::Arc;

fn context(headers: &[&str]) -> ProcessContext {
    let mut ctx = ProcessContext::new();
    let headers: Vec<String> = headers.iter().map(ToString::to_string).collect();
    ctx.set_headers(Arc::from(headers));
    ctx.new_row();
    ctx.new_column();
    ctx
}

#[test]
fn test_null_optional_field_has_no_side_effects() {
    let processor =
        FieldProcessor::new(IntegerCodec.directed(Direction::Parse)).optional(true);
    let mut ctx = context(&["age"]);
    assert_eq!(processor.process(CsvValue::Null, &mut ctx), CsvValue::Null);
    assert!(!ctx.is_error());
}

#[test]
fn test_null_mandatory_field_fails() {
    let processor = FieldProcessor::new(IntegerCodec.directed(Direction::Parse));
    let mut ctx = context(&["age"]);
    assert_eq!(processor.process(CsvValue::Null, &mut ctx), CsvValue::Null);
    let err = ctx.error().unwrap();
    assert_eq!(err.stage(), Stage::Mandatory);
    assert_eq!(err.message(), "mandatory field age is missing");
}

#[test]
fn test_precondition_stops_before_conversion() {
    let processor =
        FieldProcessor::new(IntegerCodec.directed(Direction::Parse)).with_precondition(NotEmpty);
    let mut ctx = context(&["age"]);
    processor.process(CsvValue::from("  "), &mut ctx);
    let err = ctx.error().unwrap();
    assert_eq!(err.stage(), Stage::Precondition);
    assert_eq!(err.operation.name, "not_empty");
    assert_eq!(err.processed, CsvValue::Null);
}

#[test]
fn test_conversion_failure_is_data_error() {
    let processor = FieldProcessor::new(IntegerCodec.directed(Direction::Parse));
    let mut ctx = context(&["age"]);
    assert_eq!(processor.process(CsvValue::from("12x"), &mut ctx), CsvValue::Null);
    let err = ctx.error().unwrap();
    assert_eq!(err.stage(), Stage::Conversion);
    assert_eq!(err.original, CsvValue::from("12x"));
    assert!(err
        .message()
        .starts_with("'12x' in column age is not a valid integer: "));
}

#[test]
fn test_postcondition_keeps_converted_value() {
    let processor = FieldProcessor::new(IntegerCodec.directed(Direction::Parse))
        .with_postcondition(Range::new(Some(0.0), Some(120.0)));
    let mut ctx = context(&["age"]);
    processor.process(CsvValue::from("130"), &mut ctx);
    let err = ctx.error().unwrap();
    assert_eq!(err.stage(), Stage::Postcondition);
    assert_eq!(err.processed, CsvValue::Integer(130));
    assert_eq!(err.message(), "130 in column age is out of range");
}

#[test]
fn test_successful_pipeline() {
    let processor = FieldProcessor::new(TextCodec { trim: true }.directed(Direction::Parse))
        .with_precondition(NotEmpty)
        .with_postcondition(OneOf::new(["red", "green"]));
    let mut ctx = context(&["color"]);
    assert_eq!(processor.process(CsvValue::from(" red "), &mut ctx), CsvValue::from("red"));
    assert!(!ctx.is_error());
    assert_eq!(ctx.processed(), &CsvValue::from("red"));
}

#[test]
fn test_context_cursor() {
    let mut ctx = ProcessContext::new();
    assert_eq!((ctx.row(), ctx.column()), (-1, -1));
    ctx.new_row();
    ctx.new_column();
    ctx.new_column();
    assert_eq!((ctx.row(), ctx.column()), (0, 1));
    ctx.fail(Stage::Conversion, "x", "row {row} column {column} {unknown}", None);
    assert_eq!(ctx.error().unwrap().message(), "row 0 column 1 {unknown}");
    ctx.new_row();
    assert_eq!((ctx.row(), ctx.column()), (1, -1));
    assert!(!ctx.is_error());
}

#[test]
fn test_column_name_falls_back_to_index() {
    let mut ctx = ProcessContext::new();
    ctx.new_row();
    ctx.new_column();
    ctx.fail(Stage::Mandatory, "mandatory", "mandatory field {column_name} is missing", None);
    assert_eq!(ctx.error().unwrap().message(), "mandatory field 0 is missing");
}

#[test]
fn test_outcome_combinators() {
    let mut ctx = context(&["id"]);
    ctx.fail(Stage::Conversion, "integer", "bad {column_name}", Some("detail".to_string()));
    let failed: Outcome<i64> = Outcome::failure(ctx.error().unwrap());

    let mut seen = String::new();
    let failed = failed
        .on_success(|_| unreachable!())
        .on_error(|err| seen = err.message());
    assert_eq!(seen, "bad id");
    assert!(failed.is_error());
    assert!(matches!(failed.clone().strict(), Err(Error::Data(_))));
    assert_eq!(failed.map(|v| v * 2).into_result().unwrap_err().stage(), Stage::Conversion);

    assert_eq!(Outcome::success(2).map(|v| v + 1).strict().unwrap(), 3);
}

#[test]
fn test_codec_parse_and_format() {
    let date = DateCodec::new("%d.%m.%Y").unwrap();
    let parsed = date.parse("03.02.2024").unwrap();
    assert_eq!(date.format(&parsed).unwrap(), "03.02.2024");

    let datetime = DateTimeCodec::default();
    let ts = datetime.parse("2024-01-15T10:30:00+02:00").unwrap();
    assert_eq!(datetime.format(&ts).unwrap(), "2024-01-15T08:30:00+00:00");

    let flag = BoolCodec {
        true_literal: "Y".to_string(),
        false_literal: "N".to_string(),
    };
    assert_eq!(flag.parse("y").unwrap(), CsvValue::Bool(true));
    assert!(flag.parse("maybe").is_err());

    let big = BigIntCodec.parse("123456789012345678901234567890").unwrap();
    assert_eq!(BigIntCodec.format(&big).unwrap(), "123456789012345678901234567890");

    assert_eq!(FloatCodec.parse(" 2.5 ").unwrap(), CsvValue::Float(2.5));
    assert!(DateCodec::new("%Q").is_err());
}

#[test]
fn test_format_direction_accepts_text() {
    let converter = IntegerCodec.directed(Direction::Format);
    assert_eq!(converter.source_type(), ValueType::Integer);
    assert_eq!(converter.target_type(), ValueType::String);
    assert_eq!(
        converter.convert(&CsvValue::from(" 42")).unwrap(),
        CsvValue::from("42")
    );
    assert!(converter.convert(&CsvValue::Bool(true)).is_err());
}

#[test]
fn test_validators() {
    assert!(Length::new(Some(2), Some(3)).validate(&CsvValue::from("héé")));
    assert!(!Length::new(Some(2), None).validate(&CsvValue::from("a")));
    assert!(Range::new(None, Some(10.0)).validate(&CsvValue::Float(9.5)));
    assert!(!Range::new(None, None).validate(&CsvValue::from("five")));

    let even = Predicate::new("even", "{original_value} is odd", |v| {
        v.as_i64().map_or(false, |i| i % 2 == 0)
    });
    assert_eq!(even.name(), "even");
    assert!(even.validate(&CsvValue::Integer(4)));
    assert!(!even.validate(&CsvValue::Integer(3)));
}

#[test]
fn test_registry_builds_by_name() {
    let registry = Registry::with_defaults();
    let mut params = IndexMap::new();
    params.insert("true".to_string(), "ja".to_string());
    params.insert("false".to_string(), "nein".to_string());
    let converter = registry
        .converter("boolean", Direction::Parse, &params)
        .unwrap();
    assert_eq!(converter.convert(&CsvValue::from("JA")).unwrap(), CsvValue::Bool(true));

    let mut range = IndexMap::new();
    range.insert("min".to_string(), "1".to_string());
    let validator = registry.validator("range", &range).unwrap();
    assert!(!validator.validate(&CsvValue::Integer(0)));

    let processor = FieldProcessor::from_boxed(converter).with_boxed_postcondition(validator);
    assert!(!processor.is_optional());

    assert!(matches!(
        registry.converter("uuid", Direction::Parse, &IndexMap::new()),
        Err(Error::Config(_))
    ));
    let mut bad = IndexMap::new();
    bad.insert("min".to_string(), "one".to_string());
    assert!(matches!(registry.validator("length", &bad), Err(Error::Config(_))));
    assert!(registry.converter_names().any(|name| name == "bigint"));
    assert!(registry.validator_names().any(|name| name == "one_of"));
}

struct Upper;

impl Converter for Upper {
    fn name(&self) -> &str {
        "upper"
    }

    fn direction(&self) -> Direction {
        Direction::Parse
    }

    fn source_type(&self) -> ValueType {
        ValueType::String
    }

    fn target_type(&self) -> ValueType {
        ValueType::String
    }

    fn error_template(&self) -> &str {
        "cannot upper-case {column_name}"
    }

    fn convert(&self, source: &CsvValue) -> Result<CsvValue, ConversionError> {
        match source {
            CsvValue::String(s) => Ok(CsvValue::String(s.to_uppercase())),
            other => Err(ConversionError::new(format!("not text: {}", other))),
        }
    }
}

#[test]
fn test_custom_converter_registration() {
    let mut registry = Registry::new();
    registry.register_converter("upper", |_, _| Ok(Box::new(Upper)));
    let converter = registry
        .converter("upper", Direction::Parse, &IndexMap::new())
        .unwrap();
    let processor = FieldProcessor::from_boxed(converter);
    let mut ctx = context(&["code"]);
    assert_eq!(processor.process(CsvValue::from("ab"), &mut ctx), CsvValue::from("AB"));
}

#[test]
fn test_schema_rules() {
    let schema = Schema::new()
        .field(
            "id",
            ValueType::Integer,
            FieldProcessor::new(IntegerCodec.directed(Direction::Parse)),
        )
        .unwrap();
    assert_eq!(schema.len(), 1);
    assert_eq!(schema.position("id"), Some(0));
    assert!(schema.check_direction(Direction::Format).is_err());

    let duplicate = schema.field(
        "id",
        ValueType::Integer,
        FieldProcessor::new(IntegerCodec.directed(Direction::Parse)),
    );
    assert!(matches!(duplicate, Err(Error::Config(_))));

    let text = Schema::text(&["a", "b"], Direction::Format).unwrap();
    assert_eq!(text.column_keys(), vec!["a".to_string(), "b".to_string()]);
    assert!(text.fields().iter().all(|f| f.processor().is_optional()));
}
