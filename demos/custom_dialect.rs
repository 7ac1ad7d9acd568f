//! Non-default dialects: backslash-escaped TSV and a dialect loaded from JSON.
//!
//! Run with: cargo run --example custom_dialect

use serde::{Deserialize, Serialize};
use serde_dsv::{
    from_str_with_options, to_string_with_options, CsvOptions, FormatterFactory, Parser, Token,
};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Note {
    id: u32,
    title: String,
    body: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let notes = vec![
        Note {
            id: 1,
            title: "tabs\tand\nnewlines".to_string(),
            body: Some("C:\\temp".to_string()),
        },
        Note {
            id: 2,
            title: "plain".to_string(),
            body: None,
        },
    ];

    // Tab separated, special characters escaped instead of quoted
    let tsv = CsvOptions::tsv();
    let text = to_string_with_options(&notes, &tsv)?;
    println!("TSV:\n{}", text);
    let back: Vec<Note> = from_str_with_options(&text, &tsv)?;
    assert_eq!(back, notes);

    // Dialect from configuration: pipe separated, CRLF, everything quoted
    let dialect: CsvOptions = serde_json::from_str(
        r#"{ "field_separator": "|", "record_separator": "\r\n", "quote_all": true }"#,
    )?;
    dialect.validate()?;
    let text = to_string_with_options(&notes, &dialect)?;
    println!("Pipe dialect:\n{}", text.replace("\r\n", "\\r\\n\n"));

    // Token level: null versus empty string
    let mut parser = Parser::from_str("a,,\"\"\n");
    loop {
        match parser.read()? {
            Token::EndOfData => break,
            token => println!("{:?}", token),
        }
    }

    // Formatting one record by hand with a shared factory
    let factory = FormatterFactory::new(&CsvOptions::rfc4180())?;
    let mut formatter = factory.formatter(Vec::new());
    formatter.write_record([Some("x"), None, Some("y, z")])?;
    formatter.flush()?;
    println!("Hand-formatted: {:?}", String::from_utf8(formatter.into_inner())?);

    Ok(())
}
