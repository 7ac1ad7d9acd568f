//! Error types for delimited-text parsing, formatting and field processing.
//!
//! ## Error Categories
//!
//! - **Configuration errors**: invalid separator, quote or escape setup, empty
//!   column mappings. Raised at construction time, never per record.
//! - **Fatal errors**: broken streams, unterminated quoted fields, invalid
//!   UTF-8 and internal classification defects. The instance that raised one
//!   is unusable afterwards.
//! - **Data errors**: per-field failures (mandatory field missing, validation
//!   or conversion failure). These normally travel through
//!   [`Outcome`](crate::Outcome); the strict APIs wrap them in [`Error::Data`].
//!
//! ## Examples
//!
//! ```rust
//! use serde_dsv::{Parser, Error};
//!
//! let mut parser = Parser::from_str("a,\"unterminated");
//! parser.read().unwrap();
//! let err = parser.read().unwrap_err();
//! assert!(matches!(err, Error::MalformedQuoting { .. }));
//! assert!(err.is_fatal());
//! ```

use crate::context::ProcessError;
use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised by this crate.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Invalid separator, quote, escape or mapping configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Quoted field still open when the input ended
    #[error("Malformed quoting at record {record}, field {field}: quoted field is not terminated")]
    MalformedQuoting { record: usize, field: usize },

    /// Input is not valid UTF-8
    #[error("Invalid UTF-8 in record {record}")]
    InvalidEncoding { record: usize },

    /// Internal consistency defect
    #[error("Internal error: {0}")]
    Internal(String),

    /// The instance already failed fatally
    #[error("Instance is unusable after a previous fatal error")]
    Unusable,

    /// Field-level data error surfaced by a strict API
    #[error("{0}")]
    Data(ProcessError),

    /// Type mismatch while binding a record to a model
    #[error("Type mismatch for `{key}`: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: String,
        found: String,
    },

    /// Unsupported type for record binding
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a configuration error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_dsv::Error;
    ///
    /// let err = Error::config("quote character is required");
    /// assert!(err.to_string().contains("quote character"));
    /// ```
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    pub fn malformed_quoting(record: usize, field: usize) -> Self {
        Error::MalformedQuoting { record, field }
    }

    pub fn internal<T: fmt::Display>(msg: T) -> Self {
        Error::Internal(msg.to_string())
    }

    /// Creates a type mismatch error for a record key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_dsv::Error;
    ///
    /// let err = Error::type_mismatch("age", "integer", "\"abc\"");
    /// assert!(err.to_string().contains("expected integer"));
    /// ```
    pub fn type_mismatch(key: &str, expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            key: key.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Returns `true` if the error leaves the raising instance unusable.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::MalformedQuoting { .. }
                | Error::InvalidEncoding { .. }
                | Error::Internal(_)
                | Error::Unusable
        )
    }

    /// Returns the data error if this is [`Error::Data`].
    #[must_use]
    pub fn as_data(&self) -> Option<&ProcessError> {
        match self {
            Error::Data(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::malformed_quoting(0, 1).is_fatal());
        assert!(Error::internal("table mismatch").is_fatal());
        assert!(Error::Unusable.is_fatal());
        assert!(!Error::config("bad").is_fatal());
        assert!(!Error::custom("x").is_fatal());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(ref msg) if msg.contains("pipe closed")));
    }
}
