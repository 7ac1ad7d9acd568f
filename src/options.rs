//! Dialect configuration shared by the parser and the formatter.
//!
//! [`CsvOptions`] carries every character role the state machines need:
//! field separator, record separator sequence, quote, optional escape and the
//! sets of characters that must be escaped or force quoting.
//!
//! ## Examples
//!
//! ```rust
//! use serde_dsv::CsvOptions;
//!
//! // Default: comma, LF, double quote, no escape
//! let options = CsvOptions::new();
//! assert_eq!(options.field_separator, ',');
//!
//! // Tab separated with backslash escaping
//! let options = CsvOptions::tsv();
//! assert_eq!(options.escape, Some('\\'));
//!
//! // Custom dialect
//! let options = CsvOptions::new()
//!     .with_field_separator('|')
//!     .with_record_separator("\r\n")
//!     .with_quote_all(true);
//! assert!(options.validate().is_ok());
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Characters that force quoting unless configured otherwise.
pub const DEFAULT_CHARS_FORCING_QUOTE: [char; 4] = [' ', '\t', '\n', '\r'];

/// Configuration for both parse and format direction.
///
/// All special characters must be ASCII; see [`CsvOptions::validate`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    pub field_separator: char,
    pub record_separator: String,
    pub quote: char,
    pub escape: Option<char>,
    pub chars_to_escape: Vec<char>,
    pub chars_forcing_quote: Vec<char>,
    /// Quote every non-null field when formatting.
    pub quote_all: bool,
    /// Write empty strings as `""` so they stay distinct from null.
    pub quote_empty: bool,
    /// First record holds column names.
    pub has_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            field_separator: ',',
            record_separator: "\n".to_string(),
            quote: '"',
            escape: None,
            chars_to_escape: Vec::new(),
            chars_forcing_quote: DEFAULT_CHARS_FORCING_QUOTE.to_vec(),
            quote_all: false,
            quote_empty: false,
            has_header: true,
        }
    }
}

impl CsvOptions {
    /// Creates default options (comma, LF, double quote, header present).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// RFC 4180 dialect: CRLF record separator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_dsv::CsvOptions;
    ///
    /// assert_eq!(CsvOptions::rfc4180().record_separator, "\r\n");
    /// ```
    #[must_use]
    pub fn rfc4180() -> Self {
        CsvOptions {
            record_separator: "\r\n".to_string(),
            ..Default::default()
        }
    }

    /// Tab separated values with backslash escaping of tabs and newlines.
    #[must_use]
    pub fn tsv() -> Self {
        CsvOptions {
            field_separator: '\t',
            escape: Some('\\'),
            chars_to_escape: vec!['\t', '\n', '\r'],
            chars_forcing_quote: Vec::new(),
            ..Default::default()
        }
    }

    /// Semicolon separated with CRLF, as written by spreadsheet tools in
    /// comma-decimal locales.
    #[must_use]
    pub fn excel_semicolon() -> Self {
        CsvOptions {
            field_separator: ';',
            record_separator: "\r\n".to_string(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_field_separator(mut self, separator: char) -> Self {
        self.field_separator = separator;
        self
    }

    /// Sets the record separator sequence (one or more characters).
    #[must_use]
    pub fn with_record_separator(mut self, separator: &str) -> Self {
        self.record_separator = separator.to_string();
        self
    }

    #[must_use]
    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    /// Sets the escape character.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_dsv::CsvOptions;
    ///
    /// let options = CsvOptions::new().with_escape('\\').with_chars_to_escape(&['"']);
    /// assert!(options.validate().is_ok());
    /// ```
    #[must_use]
    pub fn with_escape(mut self, escape: char) -> Self {
        self.escape = Some(escape);
        self
    }

    #[must_use]
    pub fn without_escape(mut self) -> Self {
        self.escape = None;
        self
    }

    #[must_use]
    pub fn with_chars_to_escape(mut self, chars: &[char]) -> Self {
        self.chars_to_escape = chars.to_vec();
        self
    }

    #[must_use]
    pub fn with_chars_forcing_quote(mut self, chars: &[char]) -> Self {
        self.chars_forcing_quote = chars.to_vec();
        self
    }

    #[must_use]
    pub fn with_quote_all(mut self, quote_all: bool) -> Self {
        self.quote_all = quote_all;
        self
    }

    #[must_use]
    pub fn with_quote_empty(mut self, quote_empty: bool) -> Self {
        self.quote_empty = quote_empty;
        self
    }

    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Record separator as a character sequence.
    #[must_use]
    pub fn record_separator_chars(&self) -> Vec<char> {
        self.record_separator.chars().collect()
    }

    /// Checks the dialect for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the record separator is empty, a special
    /// character is not ASCII, two roles share a character, or characters
    /// must be escaped but no escape character is configured.
    pub fn validate(&self) -> Result<()> {
        if self.record_separator.is_empty() {
            return Err(Error::config("record separator must hold at least one character"));
        }

        let mut specials = vec![("field separator", self.field_separator), ("quote", self.quote)];
        specials.extend(self.record_separator.chars().map(|c| ("record separator", c)));
        specials.extend(self.escape.map(|c| ("escape", c)));
        specials.extend(self.chars_to_escape.iter().map(|&c| ("escaped character", c)));
        specials.extend(self.chars_forcing_quote.iter().map(|&c| ("quote-forcing character", c)));
        for (role, ch) in specials {
            if !ch.is_ascii() {
                return Err(Error::config(format!("{} {:?} is not ASCII", role, ch)));
            }
        }

        if self.quote == self.field_separator {
            return Err(Error::config("quote and field separator must differ"));
        }
        if self.record_separator.contains(self.field_separator) {
            return Err(Error::config(
                "record separator must not contain the field separator",
            ));
        }
        if self.record_separator.contains(self.quote) {
            return Err(Error::config("record separator must not contain the quote"));
        }

        match self.escape {
            Some(escape) => {
                if escape == self.field_separator || self.record_separator.contains(escape) {
                    return Err(Error::config("escape must differ from the separators"));
                }
                if escape == self.quote {
                    return Err(Error::config(
                        "escape must differ from quote; quotes are doubled by default",
                    ));
                }
            }
            None => {
                if !self.chars_to_escape.is_empty() {
                    return Err(Error::config(
                        "characters to escape are configured but no escape character is set",
                    ));
                }
            }
        }

        Ok(())
    }
}
