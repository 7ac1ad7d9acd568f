//! Pull tokenizer turning delimited text into [`Token`]s.
//!
//! The [`Parser`] reads one character at a time from a [`BufRead`] source and
//! produces one token per call to [`Parser::read`]:
//!
//! - `Field(value)` for every field; an unquoted empty field is `None`, a
//!   quoted empty field (`""`) is `Some("")`
//! - `EndOfRecord` after the last field of a record
//! - `EndOfData` once the input is exhausted, and on every call after that
//!
//! ## Usage
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
//! ## Quoting and escaping
//!
//! A quote opens a quoted field only as the first character of a field.
//! Inside quotes separators are plain content, a doubled quote is a literal
//! quote and the escape character (if any) takes the next character
//! literally. Outside quotes the escape character works the same way and a
//! stray quote is plain content. A quoted field still open at end of input
//! is the only lexical error ([`Error::MalformedQuoting`]).
//!
//! The parser is single pass and not thread-safe.

use crate::field::FieldBuilder;
use crate::{CsvOptions, Error, Result};
use std::io::{self, BufRead};

/// Unit of parser output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Field(Option<String>),
    EndOfRecord,
    EndOfData,
}

/// Token discriminant without the field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Field,
    EndOfRecord,
    EndOfData,
}

impl Token {
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        match self {
            Token::Field(_) => TokenKind::Field,
            Token::EndOfRecord => TokenKind::EndOfRecord,
            Token::EndOfData => TokenKind::EndOfData,
        }
    }

    /// Field value, if this is a non-null field.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Token::Field(Some(value)) => Some(value),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    BeforeField,
    InField,
    InQuotedField,
    AfterQuote,
    /// `matched` characters of a multi-character record separator seen.
    AfterRecordSepPrefix { matched: usize },
    EndOfRecord,
    EndOfData,
}

/// Character-driven CSV tokenizer over a buffered byte source.
pub struct Parser<R> {
    source: R,
    pushback: Vec<char>,
    exhausted: bool,
    field_separator: char,
    record_separator: Vec<char>,
    quote: char,
    escape: Option<char>,
    state: State,
    field: FieldBuilder,
    quoted: bool,
    record_started: bool,
    capture: bool,
    current: Token,
    record_index: usize,
    field_index: usize,
    failed: bool,
}

impl<'a> Parser<&'a [u8]> {
    /// Parser over a string with the default dialect.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Self {
        Parser::build(input.as_bytes(), &CsvOptions::default())
    }

    /// Parser over a string with a custom dialect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the options are invalid.
    pub fn from_str_with_options(input: &'a str, options: &CsvOptions) -> Result<Self> {
        Parser::new(input.as_bytes(), options)
    }
}

impl<R: BufRead> Parser<R> {
    /// Creates a parser reading from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the options are invalid.
    pub fn new(source: R, options: &CsvOptions) -> Result<Self> {
        options.validate()?;
        Ok(Parser::build(source, options))
    }

    fn build(source: R, options: &CsvOptions) -> Self {
        Parser {
            source,
            pushback: Vec::new(),
            exhausted: false,
            field_separator: options.field_separator,
            record_separator: options.record_separator_chars(),
            quote: options.quote,
            escape: options.escape,
            state: State::BeforeField,
            field: FieldBuilder::new(),
            quoted: false,
            record_started: false,
            capture: true,
            current: Token::EndOfRecord,
            record_index: 0,
            field_index: 0,
            failed: false,
        }
    }

    /// Advances one token.
    ///
    /// # Errors
    ///
    /// Fatal errors ([`Error::Io`], [`Error::MalformedQuoting`],
    /// [`Error::InvalidEncoding`]) leave the parser unusable; later calls
    /// return [`Error::Unusable`].
    pub fn read(&mut self) -> Result<&Token> {
        self.advance(true)
    }

    /// Advances one token without materializing the field value.
    ///
    /// A skipped field is always reported as `Field(None)`.
    ///
    /// # Errors
    ///
    /// Same as [`Parser::read`].
    pub fn skip(&mut self) -> Result<&Token> {
        self.advance(false)
    }

    /// Last token produced.
    #[must_use]
    pub fn current_token(&self) -> &Token {
        &self.current
    }

    /// Value of the last token, if it is a non-null field.
    #[must_use]
    pub fn current_value(&self) -> Option<&str> {
        self.current.value()
    }

    /// Moves the value of the last field token out, leaving `Field(None)`.
    pub fn take_current_value(&mut self) -> Option<String> {
        match &mut self.current {
            Token::Field(value) => value.take(),
            _ => None,
        }
    }

    /// Zero-based index of the record being read.
    #[must_use]
    pub const fn record_index(&self) -> usize {
        self.record_index
    }

    /// Zero-based index of the field being read within its record.
    #[must_use]
    pub const fn field_index(&self) -> usize {
        self.field_index
    }

    /// Reads the remaining fields of the current record.
    ///
    /// Returns `None` once the input is exhausted.
    ///
    /// # Errors
    ///
    /// Same as [`Parser::read`].
    pub fn read_record(&mut self) -> Result<Option<Vec<Option<String>>>> {
        let mut fields = Vec::new();
        loop {
            match self.read()?.kind() {
                TokenKind::Field => fields.push(self.take_current_value()),
                TokenKind::EndOfRecord => return Ok(Some(fields)),
                TokenKind::EndOfData if fields.is_empty() => return Ok(None),
                TokenKind::EndOfData => return Ok(Some(fields)),
            }
        }
    }

    /// Returns the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }

    fn advance(&mut self, capture: bool) -> Result<&Token> {
        if self.failed {
            return Err(Error::Unusable);
        }
        self.capture = capture;
        match self.next_token() {
            Ok(token) => {
                log::trace!("record {} token {:?}", self.record_index, token);
                self.current = token;
                Ok(&self.current)
            }
            Err(err) => {
                if err.is_fatal() {
                    self.failed = true;
                    log::error!("parser failed at record {}: {}", self.record_index, err);
                }
                Err(err)
            }
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        loop {
            match self.state {
                State::EndOfData => return Ok(Token::EndOfData),
                State::EndOfRecord => return Ok(self.finish_record()),
                _ => {}
            }

            let ch = match self.next_char()? {
                Some(ch) => ch,
                None => return self.end_of_input(),
            };

            if let Some(token) = self.consume(ch)? {
                return Ok(token);
            }
        }
    }

    fn consume(&mut self, ch: char) -> Result<Option<Token>> {
        match self.state {
            State::BeforeField if ch == self.quote => {
                self.quoted = true;
                self.record_started = true;
                self.state = State::InQuotedField;
                Ok(None)
            }
            State::BeforeField | State::InField => self.unquoted(ch),
            State::InQuotedField => {
                if ch == self.quote {
                    self.state = State::AfterQuote;
                } else if Some(ch) == self.escape {
                    match self.next_char()? {
                        Some(next) => self.append(next),
                        None => {
                            return Err(Error::malformed_quoting(
                                self.record_index,
                                self.field_index,
                            ))
                        }
                    }
                } else {
                    self.append(ch);
                }
                Ok(None)
            }
            State::AfterQuote if ch == self.quote => {
                self.append(ch);
                self.state = State::InQuotedField;
                Ok(None)
            }
            State::AfterQuote => self.unquoted(ch),
            State::AfterRecordSepPrefix { matched } => {
                if ch == self.record_separator[matched] {
                    self.append(ch);
                    if matched + 1 == self.record_separator.len() {
                        self.field.rollback();
                        return Ok(Some(self.end_record()));
                    }
                    self.state = State::AfterRecordSepPrefix {
                        matched: matched + 1,
                    };
                } else {
                    // Only the first prefix character is content. The rest is
                    // rescanned, since a separator may start inside the prefix.
                    let first = self.record_separator[0];
                    self.field.rollback();
                    self.append(first);
                    self.record_started = true;
                    self.state = State::InField;
                    self.pushback.push(ch);
                    self.pushback
                        .extend(self.record_separator[1..matched].iter().rev());
                }
                Ok(None)
            }
            State::EndOfRecord | State::EndOfData => Err(Error::internal(format!(
                "character consumed in terminal parser state {:?}",
                self.state
            ))),
        }
    }

    fn unquoted(&mut self, ch: char) -> Result<Option<Token>> {
        if ch == self.field_separator {
            self.record_started = true;
            let token = self.emit_field();
            self.field_index += 1;
            self.state = State::BeforeField;
            return Ok(Some(token));
        }

        if ch == self.record_separator[0] {
            if self.record_separator.len() == 1 {
                return Ok(Some(self.end_record()));
            }
            self.field.mark();
            self.append(ch);
            self.state = State::AfterRecordSepPrefix { matched: 1 };
            return Ok(None);
        }

        self.record_started = true;
        self.state = State::InField;
        if Some(ch) == self.escape {
            // Trailing escape at end of input is kept literally.
            let literal = self.next_char()?.unwrap_or(ch);
            self.append(literal);
        } else {
            self.append(ch);
        }
        Ok(None)
    }

    /// Full record separator consumed.
    fn end_record(&mut self) -> Token {
        if self.record_started {
            let token = self.emit_field();
            self.state = State::EndOfRecord;
            token
        } else {
            self.finish_record()
        }
    }

    fn finish_record(&mut self) -> Token {
        self.state = State::BeforeField;
        self.record_started = false;
        self.record_index += 1;
        self.field_index = 0;
        Token::EndOfRecord
    }

    fn end_of_input(&mut self) -> Result<Token> {
        match self.state {
            State::InQuotedField => Err(Error::malformed_quoting(
                self.record_index,
                self.field_index,
            )),
            State::BeforeField if !self.record_started => {
                self.state = State::EndOfData;
                Ok(Token::EndOfData)
            }
            State::AfterRecordSepPrefix { .. } => {
                self.field.commit();
                self.record_started = true;
                let token = self.emit_field();
                self.state = State::EndOfRecord;
                Ok(token)
            }
            _ => {
                let token = self.emit_field();
                self.state = State::EndOfRecord;
                Ok(token)
            }
        }
    }

    fn emit_field(&mut self) -> Token {
        let value = if !self.capture {
            self.field.clear();
            None
        } else if self.quoted || !self.field.is_empty() {
            Some(self.field.take())
        } else {
            None
        };
        self.quoted = false;
        Token::Field(value)
    }

    #[inline]
    fn append(&mut self, ch: char) {
        if self.capture {
            self.field.push(ch);
        }
    }

    fn next_char(&mut self) -> Result<Option<char>> {
        if let Some(ch) = self.pushback.pop() {
            return Ok(Some(ch));
        }
        if self.exhausted {
            return Ok(None);
        }

        let first = match self.next_byte()? {
            Some(byte) => byte,
            None => {
                self.exhausted = true;
                return Ok(None);
            }
        };
        if first.is_ascii() {
            return Ok(Some(first as char));
        }

        let width = match first {
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return Err(self.invalid_encoding()),
        };
        let mut bytes = [first, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            *slot = self.next_byte()?.ok_or_else(|| self.invalid_encoding())?;
        }
        std::str::from_utf8(&bytes[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or_else(|| self.invalid_encoding())
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        loop {
            let buf = match self.source.fill_buf() {
                Ok(buf) => buf,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            let Some(&byte) = buf.first() else {
                return Ok(None);
            };
            self.source.consume(1);
            return Ok(Some(byte));
        }
    }

    fn invalid_encoding(&self) -> Error {
        Error::InvalidEncoding {
            record: self.record_index,
        }
    }
}
