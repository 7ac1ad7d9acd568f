//! Per-character action table driving the formatter.
//!
//! Every ASCII code point maps to an [`Action`]. Characters outside ASCII are
//! always written verbatim. The table is immutable once built and is shared
//! read-only (behind an `Arc`) by all formatters of a
//! [`FormatterFactory`](crate::FormatterFactory).
//!
//! ## Examples
//!
//! ```rust
//! use serde_dsv::{Action, ClassificationTable, CsvOptions};
//!
//! let table = ClassificationTable::new(&CsvOptions::new()).unwrap();
//! assert_eq!(table.action('a'), Action::Write);
//! assert_eq!(table.action(','), Action::ForceQuote);
//! assert_eq!(table.action('"'), Action::DoubleQuote);
//! assert_eq!(table.action('é'), Action::Write);
//! ```

use crate::{CsvOptions, Result};

const ASCII_LEN: usize = 128;

/// What the formatter does when it meets a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Action {
    /// Copy the character.
    #[default]
    Write,
    /// Write the escape character, then the character.
    Escape,
    /// Copy the character and quote the whole field.
    ForceQuote,
    /// Escape the character and quote the whole field.
    QuoteAndEscape,
    /// Write the quote character twice and quote the whole field.
    DoubleQuote,
}

impl Action {
    /// Returns `true` if the action requires the field to be quoted.
    #[inline]
    #[must_use]
    pub const fn forces_quote(self) -> bool {
        matches!(
            self,
            Action::ForceQuote | Action::QuoteAndEscape | Action::DoubleQuote
        )
    }

    /// Returns `true` if the action writes the escape character.
    #[inline]
    #[must_use]
    pub const fn escapes(self) -> bool {
        matches!(self, Action::Escape | Action::QuoteAndEscape)
    }
}

/// Immutable ASCII classification built from a [`CsvOptions`] dialect.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationTable {
    actions: [Action; ASCII_LEN],
    quote: char,
    escape: Option<char>,
}

impl ClassificationTable {
    /// Builds the table.
    ///
    /// Precedence, lowest first: quote-forcing characters and both separators
    /// force quoting; characters to escape (and the escape character itself)
    /// escape, upgraded to quote-and-escape when they also force quoting by
    /// configuration; the quote character doubles unless it was put in the
    /// escape set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) when the dialect fails
    /// [`CsvOptions::validate`].
    pub fn new(options: &CsvOptions) -> Result<Self> {
        options.validate()?;

        let mut actions = [Action::Write; ASCII_LEN];

        for &ch in &options.chars_forcing_quote {
            actions[ch as usize] = Action::ForceQuote;
        }
        actions[options.field_separator as usize] = Action::ForceQuote;
        for ch in options.record_separator.chars() {
            actions[ch as usize] = Action::ForceQuote;
        }

        let mut escaped: Vec<char> = options.chars_to_escape.clone();
        if let Some(escape) = options.escape {
            escaped.push(escape);
        }
        for ch in escaped {
            actions[ch as usize] = if options.chars_forcing_quote.contains(&ch) {
                Action::QuoteAndEscape
            } else {
                Action::Escape
            };
        }

        if !options.chars_to_escape.contains(&options.quote) {
            actions[options.quote as usize] = Action::DoubleQuote;
        }

        log::debug!(
            "built classification table: separator={:?} record_separator={:?} quote={:?} escape={:?}",
            options.field_separator,
            options.record_separator,
            options.quote,
            options.escape
        );

        Ok(ClassificationTable {
            actions,
            quote: options.quote,
            escape: options.escape,
        })
    }

    /// Looks up the action for a character; non-ASCII is always [`Action::Write`].
    #[inline]
    #[must_use]
    pub fn action(&self, ch: char) -> Action {
        let code = ch as usize;
        if code < ASCII_LEN {
            self.actions[code]
        } else {
            Action::Write
        }
    }

    #[inline]
    #[must_use]
    pub const fn quote(&self) -> char {
        self.quote
    }

    #[inline]
    #[must_use]
    pub const fn escape(&self) -> Option<char> {
        self.escape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_default_dialect() {
        let table = ClassificationTable::new(&CsvOptions::new()).unwrap();
        assert_eq!(table.action(' '), Action::ForceQuote);
        assert_eq!(table.action('\n'), Action::ForceQuote);
        assert_eq!(table.action('\r'), Action::ForceQuote);
        assert_eq!(table.action('\t'), Action::ForceQuote);
        assert_eq!(table.action('*'), Action::Write);
        assert_eq!(table.escape(), None);
    }

    #[test]
    fn test_quote_in_escape_set() {
        let options = CsvOptions::new()
            .with_escape('\\')
            .with_chars_to_escape(&['"']);
        let table = ClassificationTable::new(&options).unwrap();
        assert_eq!(table.action('"'), Action::Escape);
        assert_eq!(table.action('\\'), Action::Escape);
    }

    #[test]
    fn test_quote_escaped_and_forcing() {
        let options = CsvOptions::new()
            .with_escape('\\')
            .with_chars_to_escape(&['"'])
            .with_chars_forcing_quote(&['"']);
        let table = ClassificationTable::new(&options).unwrap();
        assert_eq!(table.action('"'), Action::QuoteAndEscape);
        assert!(Action::QuoteAndEscape.forces_quote());
        assert!(Action::QuoteAndEscape.escapes());
        assert!(!Action::Escape.forces_quote());
    }

    #[test]
    fn test_escaped_separator_is_not_quoted() {
        let options = CsvOptions::new()
            .with_escape('\\')
            .with_chars_to_escape(&[',']);
        let table = ClassificationTable::new(&options).unwrap();
        assert_eq!(table.action(','), Action::Escape);
    }

    #[test]
    fn test_multi_char_record_separator() {
        let options = CsvOptions::rfc4180().with_chars_forcing_quote(&[]);
        let table = ClassificationTable::new(&options).unwrap();
        assert_eq!(table.action('\r'), Action::ForceQuote);
        assert_eq!(table.action('\n'), Action::ForceQuote);
        assert_eq!(table.action(' '), Action::Write);
    }

    #[test]
    fn test_escape_without_escape_char_is_rejected() {
        let options = CsvOptions::new().with_chars_to_escape(&['x']);
        assert!(matches!(
            ClassificationTable::new(&options),
            Err(Error::Config(_))
        ));
    }
}
