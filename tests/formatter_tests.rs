use serde_dsv::{Action, ClassificationTable, CsvOptions, Error, FormatterFactory};
use std::io::{self, Write};
use std::sync::Arc;

fn format_record(options: &CsvOptions, fields: &[Option<&str>]) -> String {
    let factory = FormatterFactory::new(options).unwrap();
    let mut formatter = factory.formatter(Vec::new());
    formatter.write_record(fields.iter().copied()).unwrap();
    formatter.write_eod().unwrap();
    String::from_utf8(formatter.into_inner()).unwrap()
}

#[test]
fn test_mixed_record_is_written_verbatim() {
    let out = format_record(
        &CsvOptions::new(),
        &[
            Some("abcdefgh"),
            Some("12345"),
            Some(""),
            Some("abcdefgh"),
            Some("*+"),
        ],
    );
    assert_eq!(out, "abcdefgh,12345,,abcdefgh,*+\n");
}

#[test]
fn test_quote_escaped_with_escape_character() {
    let options = CsvOptions::new()
        .with_escape('\\')
        .with_chars_to_escape(&['"']);
    assert_eq!(format_record(&options, &[Some("abc\"def\"gh")]), "abc\\\"def\\\"gh\n");
}

#[test]
fn test_quote_doubled_by_default() {
    assert_eq!(
        format_record(&CsvOptions::new(), &[Some("abc\"def\"gh")]),
        "\"abc\"\"def\"\"gh\"\n"
    );
}

#[test]
fn test_null_and_empty() {
    assert_eq!(format_record(&CsvOptions::new(), &[None, Some(""), None]), ",,\n");
    let options = CsvOptions::new().with_quote_empty(true);
    assert_eq!(format_record(&options, &[None, Some("")]), ",\"\"\n");
}

#[test]
fn test_separators_force_quoting() {
    let out = format_record(&CsvOptions::new(), &[Some("a,b"), Some("two\nlines"), Some(" pad")]);
    assert_eq!(out, "\"a,b\",\"two\nlines\",\" pad\"\n");
}

#[test]
fn test_quote_all() {
    let options = CsvOptions::new().with_quote_all(true);
    assert_eq!(format_record(&options, &[Some("a"), None]), "\"a\",\n");
}

#[test]
fn test_force_quote_per_field() {
    let factory = FormatterFactory::new(&CsvOptions::new()).unwrap();
    let mut formatter = factory.formatter(Vec::new());
    formatter.write_field(Some("plain"), true).unwrap();
    formatter.write_field(Some("plain"), false).unwrap();
    assert_eq!(formatter.field_count(), 2);
    formatter.write_eor().unwrap();
    assert_eq!(formatter.field_count(), 0);
    assert_eq!(formatter.get_ref().as_slice(), b"\"plain\",plain\n");
}

#[test]
fn test_escape_and_quote() {
    let options = CsvOptions::new()
        .with_escape('\\')
        .with_chars_to_escape(&[';'])
        .with_chars_forcing_quote(&[';']);
    let table = ClassificationTable::new(&options).unwrap();
    assert_eq!(table.action(';'), Action::QuoteAndEscape);
    assert_eq!(table.action('\\'), Action::Escape);
    assert_eq!(format_record(&options, &[Some("a;b\\c")]), "\"a\\;b\\\\c\"\n");
}

#[test]
fn test_crlf_dialect() {
    let out = format_record(&CsvOptions::rfc4180(), &[Some("x"), Some("y")]);
    assert_eq!(out, "x,y\r\n");
}

#[test]
fn test_non_ascii_written_verbatim() {
    assert_eq!(format_record(&CsvOptions::new(), &[Some("日本,é")]), "\"日本,é\"\n");
}

#[test]
fn test_factory_shares_table() {
    let factory = FormatterFactory::new(&CsvOptions::new()).unwrap();
    let first = factory.formatter(Vec::new());
    let second = factory.formatter(Vec::new());
    drop((first, second));
    assert_eq!(Arc::strong_count(factory.table()), 1);
    assert_eq!(factory.options().field_separator, ',');
}

struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_io_error_makes_formatter_unusable() {
    let factory = FormatterFactory::new(&CsvOptions::new()).unwrap();
    let mut formatter = factory.formatter(FailingSink);
    assert!(matches!(formatter.write_field(Some("a"), false), Err(Error::Io(_))));
    assert!(matches!(formatter.write_eor(), Err(Error::Unusable)));
}
